//! Error taxonomy for the speech subsystem.
//!
//! [`RecognitionSession`](crate::speech::RecognitionSession) never returns
//! these across its public API; they are delivered through the registered
//! error callback instead.

use thiserror::Error;

use crate::speech::capability::RecognitionErrorKind;

// ---------------------------------------------------------------------------
// RecognizerFault
// ---------------------------------------------------------------------------

/// A native `start()`/`stop()` call was rejected by the host recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RecognizerFault(pub String);

impl RecognizerFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Everything that can go wrong with a recognition session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    /// The host has no speech-recognition capability at all.
    #[error("speech recognition is not supported")]
    CapabilityUnsupported,

    /// The user (or the OS) refused microphone access.
    #[error("microphone access denied")]
    PermissionDenied,

    /// A transient recognizer error; the end-of-session handler restarts.
    #[error("recognition error: {0}")]
    Recognition(RecognitionErrorKind),

    /// A recognizer error that ends the session without a restart.
    #[error("recognition failed: {0}")]
    Terminal(RecognitionErrorKind),

    /// The native `start()` call was rejected.
    #[error("failed to start recognition: {0}")]
    StartFailed(String),

    /// The native start never confirmed within the guard window.
    #[error("starting recognition timed out")]
    StartTimeout,

    /// The native stop never confirmed within the guard window.
    #[error("stopping recognition timed out")]
    StopTimeout,

    /// The recognizer kept ending on its own; the session gave up.
    #[error("recognition stopped after exceeding the retry limit")]
    MaxRetriesExceeded,
}

impl SpeechError {
    /// Fatal errors end the session and need explicit user action.
    ///
    /// ```
    /// use voice_chef::speech::SpeechError;
    ///
    /// assert!(SpeechError::PermissionDenied.is_fatal());
    /// assert!(SpeechError::MaxRetriesExceeded.is_fatal());
    /// assert!(!SpeechError::StartTimeout.is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SpeechError::CapabilityUnsupported
                | SpeechError::PermissionDenied
                | SpeechError::MaxRetriesExceeded
                | SpeechError::Terminal(_)
        )
    }

    /// Text shown to (or spoken to) the user.
    pub fn user_message(&self) -> String {
        match self {
            SpeechError::CapabilityUnsupported => {
                "Speech recognition is not supported in your browser. Please try using Chrome, Edge, or Safari.".into()
            }
            SpeechError::PermissionDenied => {
                "Microphone access denied. Please allow microphone access in your browser settings.".into()
            }
            SpeechError::Recognition(kind) | SpeechError::Terminal(kind) => {
                format!("Speech recognition error: {kind}. Please try again.")
            }
            SpeechError::StartFailed(msg) => {
                format!("Error starting speech recognition: {msg}. Please try again.")
            }
            SpeechError::StartTimeout => {
                "Starting speech recognition timed out. Please try again.".into()
            }
            SpeechError::StopTimeout => "Stopping speech recognition timed out.".into(),
            SpeechError::MaxRetriesExceeded => {
                "Speech recognition stopped unexpectedly after multiple retries. Please try again.".into()
            }
        }
    }
}
