//! Output level meter: audio thread → UI thread, lock-free.
//!
//! The tap sits inside the audio callback, tracks the peak over a window of
//! samples and pushes one value per window into an `rtrb` ring. Pushing
//! never blocks; when the UI falls behind, new peaks are dropped.

use rtrb::{Consumer, Producer, RingBuffer};

/// Create a connected tap/reader pair.
///
/// `window` is the number of samples folded into one peak; `capacity` is
/// how many peaks the ring holds.
pub fn meter(capacity: usize, window: usize) -> (MeterTap, MeterReader) {
    let (tx, rx) = RingBuffer::new(capacity.max(1));
    (
        MeterTap {
            tx,
            peak: 0.0,
            count: 0,
            window: window.max(1),
        },
        MeterReader { rx, level: 0.0 },
    )
}

/// Audio-thread half.
pub struct MeterTap {
    tx: Producer<f32>,
    peak: f32,
    count: usize,
    window: usize,
}

impl MeterTap {
    #[inline]
    pub fn observe(&mut self, sample: f64) {
        self.peak = self.peak.max(sample.abs() as f32);
        self.count += 1;
        if self.count >= self.window {
            // full ring: drop the reading rather than wait
            let _ = self.tx.push(self.peak);
            self.peak = 0.0;
            self.count = 0;
        }
    }
}

/// UI-thread half.
pub struct MeterReader {
    rx: Consumer<f32>,
    level: f32,
}

impl MeterReader {
    /// Drain pending peaks and return the most recent one.
    pub fn poll(&mut self) -> f32 {
        while let Ok(peak) = self.rx.pop() {
            self.level = peak;
        }
        self.level
    }
}
