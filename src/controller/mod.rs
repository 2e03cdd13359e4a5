//! Microphone control between the user and the recognition session.
//!
//! ```text
//! toggle ──▶ debounce (300 ms) ──▶ probe (≤ 1 per 500 ms) ──▶ RecognitionSession
//!                                                                   │
//!   SessionOutput channel ◀── result / error callbacks ─────────────┘
//!          │
//!          ▼
//!   on_transcript()  → final text for the interpreter
//!   on_session_error() → MicStatus::Error on fatal errors
//! ```

pub mod probe;
pub mod voice_input;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use probe::{CpalProbe, MicrophoneError, MicrophoneProbe};
pub use voice_input::{MicStatus, SessionOutput, ToggleOutcome, VoiceInputController};

#[cfg(test)]
pub use probe::MockProbe;
