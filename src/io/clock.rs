use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Engine time base: the number of frames already handed to the device.
///
/// Cloning shares the counter. The audio callback advances it; the control
/// thread reads it to timestamp key edges.
#[derive(Debug, Clone)]
pub struct SampleClock {
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl SampleClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Seconds of audio rendered so far.
    pub fn current_time(&self) -> f64 {
        self.time_at(self.frames())
    }

    /// Time of an absolute frame index.
    #[inline]
    pub fn time_at(&self, frame: u64) -> f64 {
        frame as f64 / self.sample_rate as f64
    }

    pub fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::Release);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_frames_into_seconds() {
        let clock = SampleClock::new(48_000);
        assert_eq!(clock.current_time(), 0.0);
        clock.advance(24_000);
        assert_eq!(clock.current_time(), 0.5);
        assert_eq!(clock.time_at(96_000), 2.0);
    }

    #[test]
    fn clones_share_the_counter() {
        let clock = SampleClock::new(100);
        let reader = clock.clone();
        clock.advance(250);
        assert_eq!(reader.frames(), 250);
        assert_eq!(reader.current_time(), 2.5);
    }
}
