//! Microphone availability probe via `cpal`.
//!
//! [`CpalProbe`] asks the default audio host for its default input device and
//! that device's default input config; either failing means the microphone
//! cannot be used. No stream is opened.

use cpal::traits::{DeviceTrait, HostTrait};
use thiserror::Error;

// ---------------------------------------------------------------------------
// MicrophoneError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MicrophoneError {
    /// The platform has no audio input support.
    #[error("microphone access is not supported")]
    Unsupported,

    /// The OS refused access.
    #[error("microphone access was denied")]
    Denied,

    /// No input device is connected.
    #[error("no microphone found")]
    NotFound,

    /// Any other device failure.
    #[error("microphone error: {0}")]
    Device(String),
}

impl MicrophoneError {
    pub fn user_message(&self) -> String {
        match self {
            MicrophoneError::Unsupported => "Your browser doesn't support microphone access".into(),
            MicrophoneError::Denied => {
                "Microphone access was denied. Please enable it in your browser settings.".into()
            }
            MicrophoneError::NotFound => {
                "No microphone detected. Please connect a microphone and try again.".into()
            }
            MicrophoneError::Device(_) => "Error accessing your microphone. Please try again.".into(),
        }
    }
}

impl From<cpal::DefaultStreamConfigError> for MicrophoneError {
    fn from(e: cpal::DefaultStreamConfigError) -> Self {
        match e {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => MicrophoneError::NotFound,
            cpal::DefaultStreamConfigError::StreamTypeNotSupported => MicrophoneError::Unsupported,
            cpal::DefaultStreamConfigError::BackendSpecific { err } => {
                let lowered = err.description.to_lowercase();
                if lowered.contains("permission") || lowered.contains("denied") {
                    MicrophoneError::Denied
                } else {
                    MicrophoneError::Device(err.description)
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MicrophoneProbe trait
// ---------------------------------------------------------------------------

/// Checks whether the microphone can be opened right now.
pub trait MicrophoneProbe: Send {
    fn probe(&mut self) -> Result<(), MicrophoneError>;
}

// ---------------------------------------------------------------------------
// CpalProbe
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct CpalProbe;

impl CpalProbe {
    pub fn new() -> Self {
        Self
    }
}

impl MicrophoneProbe for CpalProbe {
    fn probe(&mut self) -> Result<(), MicrophoneError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(MicrophoneError::NotFound)?;
        let config = device.default_input_config()?;

        log::debug!(
            "probe: input '{}' ok ({} Hz, {} ch)",
            device.name().unwrap_or_else(|_| "unknown".into()),
            config.sample_rate().0,
            config.channels()
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockProbe;
