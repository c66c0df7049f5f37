use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::SynthConfig;

use super::input::{KeyLayout, KeyPoller};
use super::note::{Channel, Note, NoteId};
use super::registry::{KeyTransition, NoteRegistry};
use super::router::ChannelRouter;

/*
The Engine
==========

Two threads touch the same notes:

  audio thread     calls `render` once per output sample (per channel).
                   Hard deadline: one sample period.
  control thread   polls the keyboard at a bounded rate and starts,
                   releases and retriggers notes.

Both go through ONE mutex that guards the whole note registry together
with the noise generator:

    ┌──────────── lock ────────────┐
    │ registry: Vec<Note>          │   audio: scan all notes, mix, prune
    │ noise:    R (seedable)       │   control: find one id, mutate it
    └──────────────────────────────┘

The audio side holds the lock for time proportional to the number of
sounding notes. The control side locks once PER KEY and does one bounded
lookup each time, so a full keyboard poll never blocks the audio thread
for more than a single key's worth of work.

Keeping the noise source inside the same critical section serializes every
draw from it, so a seeded engine produces the same output for the same
sequence of calls.


One Mix Pass
------------

  1. For every note, route by channel to an instrument → (sample, finished)
  2. Sum the samples
  3. Multiply by the headroom factor (0.2 by default). No clamping: a full
     chord can exceed [-1, 1]; clipping is the output device's business.
  4. Drop notes that are finished AND released. Held notes always stay,
     even while their envelope is momentarily at zero (the first sample
     of an attack, for instance).
*/

/// Notes reserved up front so the control thread rarely allocates under the lock.
const RESERVED_NOTES: usize = 64;

/// An edge from an event-driven input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    Press(NoteId),
    Release(NoteId),
}

struct EngineState<R> {
    notes: NoteRegistry,
    noise: R,
}

/// Owns the note registry, the instruments and the noise source.
///
/// Share it between threads with `Arc<SynthEngine>`.
pub struct SynthEngine<R = StdRng> {
    state: Mutex<EngineState<R>>,
    router: ChannelRouter,
    headroom: f64,
    input_channel: Channel,
    layout: KeyLayout,
}

impl SynthEngine<StdRng> {
    /// Engine with noise seeded from `config.seed`, or from the OS.
    pub fn new(config: &SynthConfig) -> Self {
        let noise = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_noise(config, noise)
    }
}

impl<R: Rng> SynthEngine<R> {
    /// Engine drawing noise from `noise`.
    pub fn with_noise(config: &SynthConfig, noise: R) -> Self {
        let capacity = RESERVED_NOTES.max(config.layout.len() * 2);
        Self {
            state: Mutex::new(EngineState {
                notes: NoteRegistry::with_capacity(capacity),
                noise,
            }),
            router: config.router(),
            headroom: config.headroom,
            input_channel: config.input_channel,
            layout: config.layout.clone(),
        }
    }

    /// Per-sample output callback: `(channel index, time) -> sample`.
    ///
    /// The mix is mono, so every channel gets the same signal.
    #[inline]
    pub fn render(&self, _channel: usize, time: f64) -> f64 {
        self.mix(time)
    }

    /// One mix pass at `time`: sum every note, scale, prune finished notes.
    pub fn mix(&self, time: f64) -> f64 {
        let mut state = self.state.lock();
        let EngineState { notes, noise } = &mut *state;

        let mut mixed = 0.0;
        notes.sweep(|note| {
            let sound = self.router.sound(time, note, &mut *noise);
            mixed += sound.sample;
            sound.finished
        });

        mixed * self.headroom
    }

    /// Bring note `id` in line with whether its key is down at `now`.
    pub fn sync_key(&self, id: NoteId, pressed: bool, now: f64) -> Option<KeyTransition> {
        let transition = self
            .state
            .lock()
            .notes
            .sync_key(id, pressed, now, self.input_channel);

        if let Some(transition) = transition {
            tracing::trace!(id, ?transition, now, "key edge");
        }
        transition
    }

    pub fn key_down(&self, id: NoteId, now: f64) -> Option<KeyTransition> {
        self.sync_key(id, true, now)
    }

    pub fn key_up(&self, id: NoteId, now: f64) -> Option<KeyTransition> {
        self.sync_key(id, false, now)
    }

    pub fn handle(&self, event: NoteEvent, now: f64) -> Option<KeyTransition> {
        match event {
            NoteEvent::Press(id) => self.key_down(id, now),
            NoteEvent::Release(id) => self.key_up(id, now),
        }
    }

    /// Poll every key in the layout and apply its state at `now`.
    ///
    /// The lock is taken and released once per note. Keys bound to the same
    /// note act as one key: the note is held while any of them is down.
    /// Returns the number of edges found.
    pub fn poll_keys<P: KeyPoller + ?Sized>(&self, keys: &P, now: f64) -> usize {
        (0..self.layout.len())
            .filter_map(|position| {
                let id = self.layout.note(position)?;
                let mut bound = self.layout.positions(id);
                if bound.next() != Some(position) {
                    return None;
                }
                let pressed = keys.is_pressed(position) || bound.any(|p| keys.is_pressed(p));
                self.sync_key(id, pressed, now)
            })
            .count()
    }

    /// Release every held note at `now`.
    pub fn all_notes_off(&self, now: f64) -> usize {
        let released = self.state.lock().notes.release_all(now);
        tracing::debug!(released, now, "all notes off");
        released
    }

    /// Number of notes currently sounding or releasing.
    pub fn note_count(&self) -> usize {
        self.state.lock().notes.len()
    }

    /// Copy the live notes into `out`, reusing its allocation.
    pub fn snapshot_into(&self, out: &mut Vec<Note>) {
        out.clear();
        let state = self.state.lock();
        out.extend(state.notes.iter().copied());
    }

    pub fn snapshot(&self) -> Vec<Note> {
        let mut notes = Vec::new();
        self.snapshot_into(&mut notes);
        notes
    }

    pub fn router(&self) -> &ChannelRouter {
        &self.router
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    pub fn headroom(&self) -> f64 {
        self.headroom
    }

    pub fn input_channel(&self) -> Channel {
        self.input_channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::InstrumentKind;

    fn engine() -> SynthEngine {
        SynthEngine::new(&SynthConfig::default().seed(11))
    }

    #[test]
    fn empty_engine_is_silent() {
        let engine = engine();
        assert_eq!(engine.mix(0.0), 0.0);
        assert_eq!(engine.note_count(), 0);
    }

    #[test]
    fn mix_is_headroom_scaled_sum() {
        let config = SynthConfig::default().seed(1);
        let engine = SynthEngine::new(&config);
        engine.key_down(0, 0.0);
        engine.key_down(4, 0.0);

        let time = 0.5;
        let mut noise = StdRng::seed_from_u64(1);
        let router = config.router();
        let expected: f64 = engine
            .snapshot()
            .iter()
            .map(|n| router.sound(time, n, &mut noise).sample)
            .sum::<f64>()
            * 0.2;

        assert!((engine.mix(time) - expected).abs() < 1e-12);
    }

    #[test]
    fn harmonica_channel_is_attenuated() {
        let bell_engine = SynthEngine::new(&SynthConfig::default().seed(1));
        let harp_engine =
            SynthEngine::new(&SynthConfig::default().seed(1).play_with(InstrumentKind::Harmonica));
        assert_eq!(harp_engine.input_channel(), 1);
        assert_eq!(bell_engine.input_channel(), 2);

        harp_engine.key_down(0, 0.0);
        let time = 1.5;
        let sample = harp_engine.mix(time);

        let note = Note::pressed(0, 1, 0.0);
        let mut noise = StdRng::seed_from_u64(1);
        let raw = crate::synth::Instrument::harmonica().sound(time, &note, &mut noise);
        assert!((sample - raw.sample * 0.5 * 0.2).abs() < 1e-12);
    }

    #[test]
    fn poll_keys_finds_edges() {
        let engine = engine();
        let mut keys = vec![false; engine.layout().len()];
        keys[0] = true;
        keys[3] = true;
        assert_eq!(engine.poll_keys(&keys, 0.0), 2);
        assert_eq!(engine.poll_keys(&keys, 0.01), 0);

        keys[0] = false;
        assert_eq!(engine.poll_keys(&keys, 0.5), 1);
        assert_eq!(engine.note_count(), 2);
        let released = engine.snapshot().into_iter().find(|n| n.id == 0).unwrap();
        assert_eq!(released.off, 0.5);
    }

    #[test]
    fn keys_sharing_a_note_poll_as_one() {
        let layout = KeyLayout::from_pairs(vec![('a', 3), ('b', 3)]);
        let engine = SynthEngine::new(&SynthConfig::default().layout(layout).seed(4));

        assert_eq!(engine.poll_keys(&[true, false][..], 0.0), 1);
        assert_eq!(engine.poll_keys(&[true, false][..], 0.01), 0);
        assert_eq!(engine.poll_keys(&[false, true][..], 0.02), 0);

        let notes = engine.snapshot();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].is_held());
        assert_eq!(notes[0].on, 0.0);

        assert_eq!(engine.poll_keys(&[false, false][..], 0.5), 1);
        assert!(engine.snapshot()[0].is_released());
    }

    #[test]
    fn events_drive_the_registry() {
        let engine = engine();
        assert_eq!(engine.handle(NoteEvent::Press(7), 0.0), Some(KeyTransition::Started));
        assert_eq!(engine.handle(NoteEvent::Release(7), 0.2), Some(KeyTransition::Released));
        assert_eq!(engine.handle(NoteEvent::Press(7), 0.4), Some(KeyTransition::Retriggered));
    }

    #[test]
    fn all_notes_off_lets_everything_decay() {
        let engine = engine();
        for id in 0..5 {
            engine.key_down(id, 0.0);
        }
        assert_eq!(engine.all_notes_off(1.0), 5);
        engine.mix(1.5);
        assert_eq!(engine.note_count(), 5);
        engine.mix(2.0 + 1e-3);
        assert_eq!(engine.note_count(), 0);
    }

    #[test]
    fn unrouted_channel_notes_are_pruned() {
        let engine = SynthEngine::new(&SynthConfig::default().input_channel(9).seed(3));
        engine.key_down(1, 0.0);
        assert_eq!(engine.mix(0.5), 0.0);
        assert_eq!(engine.note_count(), 1);
        engine.key_up(1, 0.6);
        engine.mix(0.7);
        assert_eq!(engine.note_count(), 0);
    }
}
