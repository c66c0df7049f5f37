//! Error types for the synthesizer and its audio/input collaborators.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong outside the per-sample mixing path.
///
/// The mixing path itself is infallible: unknown channels render silence,
/// unknown waveforms render 0.0, and the registry lock cannot be poisoned.
#[derive(Debug, Error)]
pub enum Error {
    /// The host enumerated zero output devices.
    #[error("no audio output device available")]
    NoOutputDevice,

    /// A device was requested by name and nothing matched.
    #[error("no output device matching '{0}'")]
    DeviceNotFound(String),

    #[error("failed to enumerate output devices")]
    DeviceEnumeration(#[from] cpal::DevicesError),

    #[error("failed to read output device name")]
    DeviceName(#[from] cpal::DeviceNameError),

    /// Only 8, 16 and 32 bit output is supported.
    #[error("unsupported sample bit depth: {0}")]
    UnsupportedBitDepth(u16),

    #[error("failed to open output device")]
    OpenDevice(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream")]
    StartStream(#[from] cpal::PlayStreamError),

    #[error("unknown scale id {0}")]
    UnknownScale(u8),

    #[error("unknown waveform id {0}")]
    UnknownWaveform(u8),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("terminal I/O failed")]
    Terminal(#[from] std::io::Error),
}
