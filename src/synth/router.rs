use rand::Rng;

use super::instrument::{Instrument, InstrumentKind, Sound};
use super::note::{Channel, Note};

/// Instrument plus the mixer-side gain for one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub channel: Channel,
    pub instrument: Instrument,
    /// Applied by the mixer on top of the instrument's own volume.
    pub gain: f64,
}

/// Channel → instrument dispatch table used by the mixer.
///
/// Notes on a channel with no route render silence. They still report
/// `finished` once released, so they are pruned instead of lingering.
#[derive(Debug, Clone, Default)]
pub struct ChannelRouter {
    routes: Vec<Route>,
}

impl ChannelRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the route for `channel`.
    pub fn route(mut self, channel: Channel, instrument: Instrument, gain: f64) -> Self {
        self.routes.retain(|r| r.channel != channel);
        self.routes.push(Route {
            channel,
            instrument,
            gain,
        });
        self
    }

    pub fn get(&self, channel: Channel) -> Option<&Route> {
        self.routes.iter().find(|r| r.channel == channel)
    }

    #[inline]
    pub fn sound<R: Rng + ?Sized>(&self, time: f64, note: &Note, noise: &mut R) -> Sound {
        match self.get(note.channel) {
            Some(route) => route.instrument.sound(time, note, noise).scaled(route.gain),
            None => Sound {
                sample: 0.0,
                finished: note.is_released(),
            },
        }
    }

    /// Longest release time across all routed instruments.
    pub fn longest_release(&self) -> f64 {
        self.routes
            .iter()
            .map(|r| r.instrument.envelope().release_tail())
            .fold(0.0, f64::max)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

/// Build a router from `(channel, instrument, gain)` rows.
impl From<&[(Channel, InstrumentKind, f64)]> for ChannelRouter {
    fn from(table: &[(Channel, InstrumentKind, f64)]) -> Self {
        table
            .iter()
            .fold(ChannelRouter::new(), |router, &(channel, kind, gain)| {
                router.route(channel, kind.build(), gain)
            })
    }
}
