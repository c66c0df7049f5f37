//! Startup configuration for the engine and its collaborators.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::time::Duration;

use crate::error::{Error, Result};
use crate::synth::{Channel, ChannelRouter, InstrumentKind, KeyLayout};

/// Fixed scale applied to the summed mix so simultaneous notes have room.
pub const DEFAULT_HEADROOM: f64 = 0.2;

/// Longer than common keyboard auto-repeat delays.
pub const DEFAULT_HOLD_TIMEOUT: f64 = 0.8;

/// What to ask of the audio output device.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub sample_rate: u32,
    pub channels: u16,
    /// 8 (u8), 16 (i16) or 32 (f32).
    pub bit_depth: u16,
    /// How many buffers of latency are tolerated.
    pub buffer_count: u32,
    /// Frames per device buffer.
    pub samples_per_buffer: u32,
    /// Case-insensitive substring of the device name. `None` takes the
    /// first enumerated device.
    pub device: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
            bit_depth: 16,
            buffer_count: 8,
            samples_per_buffer: 512,
            device: None,
        }
    }
}

impl OutputSettings {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidConfig("sample rate must be positive".into()));
        }
        if self.channels == 0 {
            return Err(Error::InvalidConfig("need at least one output channel".into()));
        }
        if self.buffer_count == 0 || self.samples_per_buffer == 0 {
            return Err(Error::InvalidConfig("buffer sizes must be positive".into()));
        }
        if !matches!(self.bit_depth, 8 | 16 | 32) {
            return Err(Error::UnsupportedBitDepth(self.bit_depth));
        }
        Ok(())
    }

    /// Total frames of buffering the caller asked for.
    pub fn latency_frames(&self) -> usize {
        self.buffer_count as usize * self.samples_per_buffer as usize
    }
}

/// One row of the channel table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteConfig {
    pub channel: Channel,
    pub instrument: InstrumentKind,
    pub gain: f64,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    pub output: OutputSettings,
    pub headroom: f64,
    pub routes: Vec<RouteConfig>,
    /// Channel given to notes created from the keyboard.
    pub input_channel: Channel,
    pub layout: KeyLayout,
    /// Seconds a key counts as held after its last press or repeat, for
    /// terminals that never report key releases. Must exceed the OS
    /// auto-repeat delay (660 ms on X11, 500 ms on most others), or a held
    /// key drops out before its first repeat and re-attacks.
    pub hold_timeout: f64,
    /// Control-thread key polling period.
    pub poll_interval: Duration,
    /// Seeds the noise source. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            output: OutputSettings::default(),
            headroom: DEFAULT_HEADROOM,
            routes: vec![
                RouteConfig {
                    channel: 1,
                    instrument: InstrumentKind::Harmonica,
                    gain: 0.5,
                },
                RouteConfig {
                    channel: 2,
                    instrument: InstrumentKind::Bell,
                    gain: 1.0,
                },
            ],
            input_channel: 2,
            layout: KeyLayout::default(),
            hold_timeout: DEFAULT_HOLD_TIMEOUT,
            poll_interval: Duration::from_millis(5),
            seed: None,
        }
    }
}

impl SynthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(mut self, output: OutputSettings) -> Self {
        self.output = output;
        self
    }

    pub fn headroom(mut self, headroom: f64) -> Self {
        self.headroom = headroom;
        self
    }

    /// Add or replace the route for `channel`.
    pub fn route(mut self, channel: Channel, instrument: InstrumentKind, gain: f64) -> Self {
        self.routes.retain(|r| r.channel != channel);
        self.routes.push(RouteConfig {
            channel,
            instrument,
            gain,
        });
        self
    }

    pub fn input_channel(mut self, channel: Channel) -> Self {
        self.input_channel = channel;
        self
    }

    /// Play keyboard notes on whichever channel routes to `kind`, adding a
    /// route on the next free channel if none does.
    pub fn play_with(mut self, kind: InstrumentKind) -> Self {
        if let Some(route) = self.routes.iter().find(|r| r.instrument == kind) {
            self.input_channel = route.channel;
            return self;
        }
        let channel = self
            .routes
            .iter()
            .map(|r| r.channel)
            .max()
            .map_or(1, |c| c.saturating_add(1));
        self.input_channel = channel;
        self.route(channel, kind, 1.0)
    }

    pub fn layout(mut self, layout: KeyLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn hold_timeout(mut self, seconds: f64) -> Self {
        self.hold_timeout = seconds;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.output.validate()?;
        self.layout.validate()?;
        if !self.headroom.is_finite() || self.headroom < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "headroom must be a non-negative number, got {}",
                self.headroom
            )));
        }
        if !self.hold_timeout.is_finite() || self.hold_timeout < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "hold timeout must be non-negative, got {}",
                self.hold_timeout
            )));
        }
        if self.routes.iter().any(|r| !r.gain.is_finite()) {
            return Err(Error::InvalidConfig("route gains must be finite".into()));
        }
        Ok(())
    }

    /// Channel table built from `routes`.
    pub fn router(&self) -> ChannelRouter {
        self.routes.iter().fold(ChannelRouter::new(), |router, r| {
            router.route(r.channel, r.instrument.build(), r.gain)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SynthConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.latency_frames(), 8 * 512);
        assert!(config.hold_timeout > 0.66);
        let router = config.router();
        assert_eq!(router.get(1).map(|r| r.gain), Some(0.5));
        assert_eq!(router.get(2).map(|r| r.instrument.name()), Some("bell"));
    }

    #[test]
    fn rejects_bad_values() {
        let bad_depth = SynthConfig::default().output(OutputSettings {
            bit_depth: 24,
            ..OutputSettings::default()
        });
        assert!(matches!(bad_depth.validate(), Err(Error::UnsupportedBitDepth(24))));

        assert!(SynthConfig::default().headroom(f64::NAN).validate().is_err());
        assert!(SynthConfig::default().hold_timeout(-1.0).validate().is_err());
        let shared_note = KeyLayout::from_pairs(vec![('a', 3), ('b', 3)]);
        assert!(matches!(
            SynthConfig::default().layout(shared_note).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(SynthConfig::default()
            .layout(KeyLayout::chromatic("aa", 0))
            .validate()
            .is_err());

        let silent = SynthConfig::default().output(OutputSettings {
            sample_rate: 0,
            ..OutputSettings::default()
        });
        assert!(silent.validate().is_err());
    }

    #[test]
    fn play_with_picks_existing_route() {
        let config = SynthConfig::default().play_with(InstrumentKind::Harmonica);
        assert_eq!(config.input_channel, 1);
        assert_eq!(config.routes.len(), 2);
    }

    #[test]
    fn play_with_adds_missing_route() {
        let config = SynthConfig::default()
            .route(1, InstrumentKind::Bell, 1.0)
            .play_with(InstrumentKind::Harmonica);
        // channel 1 and 2 are both bells now, so harmonica goes on 3
        assert_eq!(config.input_channel, 3);
        assert_eq!(
            config.router().get(3).map(|r| r.instrument.name()),
            Some("harmonica")
        );
    }
}
