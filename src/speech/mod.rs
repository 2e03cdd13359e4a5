//! Speech recognition and synthesis, wrapped and stabilised.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │              SpeechCapability (trait, host-provided)         │
//! │                                                              │
//! │   create_recognizer()                create_synthesizer()    │
//! │          │                                    │              │
//! │          ▼                                    ▼              │
//! │  ┌──────────────────────┐          ┌───────────────────┐     │
//! │  │  RecognitionSession  │          │  SynthesisChannel │     │
//! │  │  Inactive/Starting/  │          │  cancel → speak   │     │
//! │  │  Active/Stopping     │          │  newest wins      │     │
//! │  │  one scheduled op    │          └───────────────────┘     │
//! │  └──────────┬───────────┘                                    │
//! │             │ Transcript / SpeechError callbacks             │
//! └─────────────┼────────────────────────────────────────────────┘
//!               ▼
//!        VoiceInputController
//! ```
//!
//! Native recognizer callbacks come back in as [`NativeEvent`]s through
//! [`RecognitionSession::handle_native`]; the caller's event loop sleeps until
//! [`RecognitionSession::pending_deadline`] and then calls
//! [`RecognitionSession::fire_pending`].

pub mod capability;
pub mod console;
pub mod error;
pub mod session;
pub mod synthesis;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use capability::{
    NativeEvent, RecognitionErrorKind, Recognizer, RecognizerSettings, ResultSegment,
    SpeechCapability, Synthesizer, Transcript, Utterance, UtteranceId,
};
pub use console::{ConsoleCapability, ConsoleSynthesizer};
pub use error::{RecognizerFault, SpeechError};
pub use session::{ErrorCallback, RecognitionSession, ResultCallback, ScheduledOp, SessionState};
pub use synthesis::{CompletionCallback, SynthesisChannel};

// test-only re-export so the controller and assistant tests can build a
// session around the recording doubles.
#[cfg(test)]
pub use capability::{MockCapability, MockLog, MockSynthesizer, SynthCall};
