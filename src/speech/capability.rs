//! The host's native speech capability, seen through traits.
//!
//! Recognition and synthesis are provided by the execution environment. The
//! core only talks to them through [`SpeechCapability`], [`Recognizer`] and
//! [`Synthesizer`]; the host feeds recognizer callbacks back in as
//! [`NativeEvent`]s and synthesis completions as [`UtteranceId`]s.
//!
//! [`MockCapability`] and [`MockSynthesizer`] (available under
//! `#[cfg(test)]`) record every native call so the state machines can be
//! tested without a speech engine.

use std::fmt;

use crate::speech::error::{RecognizerFault, SpeechError};

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Entry point to the host's speech engines.
pub trait SpeechCapability: Send {
    /// Whether continuous speech-to-text exists on this host at all.
    fn is_supported(&self) -> bool;

    /// Create a fresh native recognizer object.
    fn create_recognizer(&mut self) -> Result<Box<dyn Recognizer>, SpeechError>;

    /// Create the text-to-speech engine, if the host has one.
    fn create_synthesizer(&mut self) -> Option<Box<dyn Synthesizer>>;
}

/// One native continuous recognizer.
///
/// Both calls only *request* a transition; the host confirms later through
/// [`NativeEvent::Started`] and [`NativeEvent::Ended`] (or never does).
pub trait Recognizer: Send {
    fn configure(&mut self, settings: &RecognizerSettings);
    fn start(&mut self) -> Result<(), RecognizerFault>;
    fn stop(&mut self) -> Result<(), RecognizerFault>;
}

/// Native text-to-speech engine. Shared, last writer wins.
pub trait Synthesizer: Send {
    /// Drop whatever is queued or playing. Cancelled utterances never report
    /// completion.
    fn cancel(&mut self);

    /// Queue `utterance`; the host reports completion with `id`.
    fn speak(&mut self, id: UtteranceId, utterance: &Utterance);
}

// ---------------------------------------------------------------------------
// Recognizer settings and events
// ---------------------------------------------------------------------------

/// Properties applied to a recognizer before each start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerSettings {
    pub continuous: bool,
    pub interim_results: bool,
    pub max_alternatives: u32,
    pub language: String,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            continuous: true,
            interim_results: true,
            max_alternatives: 1,
            language: "en-US".into(),
        }
    }
}

/// One entry of a native result list (first alternative only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSegment {
    pub transcript: String,
    pub is_final: bool,
}

impl ResultSegment {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    pub fn final_(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

/// Callbacks raised by the native recognizer, as a typed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    /// The recognizer confirmed it is capturing audio.
    Started,
    /// New or updated results; segments before `result_index` are unchanged.
    Result {
        result_index: usize,
        results: Vec<ResultSegment>,
    },
    /// The recognizer reported an error.
    Error(RecognitionErrorKind),
    /// The recognizer stopped, requested or not.
    Ended,
}

impl NativeEvent {
    /// A single final result, the common case in tests and the console.
    pub fn final_result(text: impl Into<String>) -> Self {
        NativeEvent::Result {
            result_index: 0,
            results: vec![ResultSegment::final_(text)],
        }
    }

    pub fn interim_result(text: impl Into<String>) -> Self {
        NativeEvent::Result {
            result_index: 0,
            results: vec![ResultSegment::interim(text)],
        }
    }
}

/// Error codes reported by native recognizers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    NoSpeech,
    NotAllowed,
    ServiceNotAllowed,
    Network,
    Aborted,
    AudioCapture,
    LanguageNotSupported,
    BadGrammar,
    Other(String),
}

impl RecognitionErrorKind {
    /// Map the host's error code string.
    ///
    /// ```
    /// use voice_chef::speech::RecognitionErrorKind;
    ///
    /// assert_eq!(RecognitionErrorKind::from_code("no-speech"), RecognitionErrorKind::NoSpeech);
    /// assert_eq!(
    ///     RecognitionErrorKind::from_code("weird"),
    ///     RecognitionErrorKind::Other("weird".into())
    /// );
    /// ```
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "network" => Self::Network,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "language-not-supported" => Self::LanguageNotSupported,
            "bad-grammar" => Self::BadGrammar,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::NotAllowed => "not-allowed",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::Network => "network",
            Self::Aborted => "aborted",
            Self::AudioCapture => "audio-capture",
            Self::LanguageNotSupported => "language-not-supported",
            Self::BadGrammar => "bad-grammar",
            Self::Other(code) => code,
        }
    }

    /// Errors the recognizer usually recovers from by ending and restarting.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network | Self::Aborted | Self::AudioCapture)
    }
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Text delivered to the session's result callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub is_final: bool,
}

// ---------------------------------------------------------------------------
// Utterance
// ---------------------------------------------------------------------------

/// Identifies one issued utterance so stale completions can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId(pub u64);

/// One unit of synthesised speech.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::{MockCapability, MockLog, MockSynthesizer, SynthCall};
