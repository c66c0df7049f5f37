// Purpose: notes, voices and the per-sample mix
// This layer sits above the dsp functions and owns all shared state

pub mod engine;
pub mod input;
pub mod instrument;
pub mod note;
pub mod registry;
pub mod router;

pub use engine::{NoteEvent, SynthEngine};
pub use input::{KeyLayout, KeyPoller};
pub use instrument::{Instrument, InstrumentKind, Partial, Sound};
pub use note::{Channel, Note, NoteId};
pub use registry::{KeyTransition, NoteRegistry};
pub use router::{ChannelRouter, Route};
