//! Terminal stand-in for the host speech engines.
//!
//! The console recognizer confirms `start`/`stop` immediately by sending
//! [`NativeEvent::Started`]/[`NativeEvent::Ended`] and raises a shared
//! "listening" flag; the front end reads that flag to decide whether a typed
//! line is speech. The console synthesizer prints each utterance and reports
//! it finished straight away.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::speech::capability::{
    NativeEvent, Recognizer, RecognizerSettings, SpeechCapability, Synthesizer, Utterance,
    UtteranceId,
};
use crate::speech::error::{RecognizerFault, SpeechError};

pub struct ConsoleCapability {
    native_tx: UnboundedSender<NativeEvent>,
    spoken_tx: UnboundedSender<UtteranceId>,
    listening: Arc<AtomicBool>,
}

impl ConsoleCapability {
    pub fn new(native_tx: UnboundedSender<NativeEvent>, spoken_tx: UnboundedSender<UtteranceId>) -> Self {
        Self {
            native_tx,
            spoken_tx,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Raised between a confirmed start and the matching stop.
    pub fn listening_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.listening)
    }
}

impl SpeechCapability for ConsoleCapability {
    fn is_supported(&self) -> bool {
        true
    }

    fn create_recognizer(&mut self) -> Result<Box<dyn Recognizer>, SpeechError> {
        Ok(Box::new(ConsoleRecognizer {
            native_tx: self.native_tx.clone(),
            listening: Arc::clone(&self.listening),
            language: String::new(),
        }))
    }

    fn create_synthesizer(&mut self) -> Option<Box<dyn Synthesizer>> {
        Some(Box::new(ConsoleSynthesizer {
            spoken_tx: self.spoken_tx.clone(),
        }))
    }
}

struct ConsoleRecognizer {
    native_tx: UnboundedSender<NativeEvent>,
    listening: Arc<AtomicBool>,
    language: String,
}

impl ConsoleRecognizer {
    fn send(&self, event: NativeEvent) {
        if self.native_tx.send(event).is_err() {
            log::debug!("console: event loop gone, dropping recognizer event");
        }
    }
}

impl Recognizer for ConsoleRecognizer {
    fn configure(&mut self, settings: &RecognizerSettings) {
        self.language = settings.language.clone();
    }

    fn start(&mut self) -> Result<(), RecognizerFault> {
        if self.listening.swap(true, Ordering::SeqCst) {
            return Err(RecognizerFault::new("recognition has already started"));
        }
        println!("🎙  listening ({}) - type what you would say", self.language);
        self.send(NativeEvent::Started);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RecognizerFault> {
        self.listening.store(false, Ordering::SeqCst);
        println!("🎙  microphone off");
        self.send(NativeEvent::Ended);
        Ok(())
    }
}

/// Prints `🔊 <text>`.
pub struct ConsoleSynthesizer {
    spoken_tx: UnboundedSender<UtteranceId>,
}

impl Synthesizer for ConsoleSynthesizer {
    fn cancel(&mut self) {}

    fn speak(&mut self, id: UtteranceId, utterance: &Utterance) {
        println!("🔊 {}", utterance.text);
        let _ = self.spoken_tx.send(id);
    }
}
