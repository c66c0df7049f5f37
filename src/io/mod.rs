// Purpose - device-facing edges: audio output, time base, keyboard, metering

pub mod audio;
pub mod clock;
pub mod keyboard;
#[cfg(feature = "rtrb")]
pub mod meter;

pub use audio::{choose_device, fill_frames, list_output_devices, sample_format, AudioOutput};
pub use clock::SampleClock;
pub use keyboard::{disable_key_releases, enable_key_releases, KeyAction, KeyboardState};
#[cfg(feature = "rtrb")]
pub use meter::{meter, MeterReader, MeterTap};
