//! Text-to-speech channel with a queue of one.
//!
//! Every [`speak`](SynthesisChannel::speak) cancels whatever the engine is
//! saying before issuing the new line, so the assistant never talks over
//! itself with a stale response. Completion callbacks are keyed by
//! [`UtteranceId`]: a completion for anything but the current utterance is
//! dropped.

use crate::config::SynthesisConfig;
use crate::speech::capability::{Synthesizer, Utterance, UtteranceId};

/// Runs once when an utterance finishes playing.
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

struct Speaking {
    id: UtteranceId,
    on_complete: Option<CompletionCallback>,
}

pub struct SynthesisChannel {
    synthesizer: Option<Box<dyn Synthesizer>>,
    config: SynthesisConfig,
    next_id: u64,
    speaking: Option<Speaking>,
    last_text: Option<String>,
}

impl SynthesisChannel {
    /// `synthesizer` is `None` on hosts without text-to-speech; the channel
    /// then only logs.
    pub fn new(synthesizer: Option<Box<dyn Synthesizer>>, config: SynthesisConfig) -> Self {
        if synthesizer.is_none() {
            log::warn!("synthesis: text-to-speech is not supported on this host");
        }
        Self {
            synthesizer,
            config,
            next_id: 0,
            speaking: None,
            last_text: None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Cancel the current utterance and speak `text`.
    ///
    /// The previous utterance's callback is discarded without running.
    pub fn speak(&mut self, text: &str, on_complete: Option<CompletionCallback>) -> Option<UtteranceId> {
        let Some(synthesizer) = self.synthesizer.as_mut() else {
            log::error!("synthesis: cannot speak, text-to-speech unsupported");
            return None;
        };

        synthesizer.cancel();
        if let Some(previous) = self.speaking.take() {
            log::debug!("synthesis: utterance {} superseded", previous.id.0);
        }

        self.next_id += 1;
        let id = UtteranceId(self.next_id);
        let utterance = Utterance {
            text: text.to_string(),
            language: self.config.language.clone(),
            rate: self.config.rate,
            pitch: self.config.pitch,
            volume: self.config.volume,
        };
        synthesizer.speak(id, &utterance);

        self.speaking = Some(Speaking { id, on_complete });
        self.last_text = Some(utterance.text);
        Some(id)
    }

    /// Host callback: utterance `id` finished playing.
    pub fn handle_end(&mut self, id: UtteranceId) {
        match self.speaking.take() {
            Some(current) if current.id == id => {
                if let Some(on_complete) = current.on_complete {
                    on_complete();
                }
            }
            other => {
                log::debug!("synthesis: ignoring completion of stale utterance {}", id.0);
                self.speaking = other;
            }
        }
    }

    /// Silence the engine; the pending callback never runs.
    pub fn cancel(&mut self) {
        if let Some(synthesizer) = self.synthesizer.as_mut() {
            synthesizer.cancel();
        }
        self.speaking = None;
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.is_some()
    }

    pub fn last_text(&self) -> Option<&str> {
        self.last_text.as_deref()
    }

    pub fn language(&self) -> &str {
        &self.config.language
    }

    pub fn set_language(&mut self, tag: &str) {
        self.config.language = tag.to_string();
    }
}
