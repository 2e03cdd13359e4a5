//! Shared snapshot of everything a front end shows.
//!
//! [`AssistantState`] is republished by the event loop after every event.
//! Front ends only read it; every change goes through an `AppEvent`.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<AssistantState>>`, cheap to
//! clone and safe to share across threads.

use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::controller::MicStatus;
use crate::recipe::Recipe;

// ---------------------------------------------------------------------------
// Toast
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Short-lived notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AssistantState
// ---------------------------------------------------------------------------

pub struct AssistantState {
    pub listening: bool,
    pub mic_status: MicStatus,
    pub interim_transcript: String,
    pub last_transcript: String,

    pub ingredients: Vec<String>,
    pub search_results: Vec<Recipe>,
    /// A search or recipe lookup is in flight.
    pub loading: bool,

    pub recipe_title: Option<String>,
    pub step_index: usize,
    pub step_count: usize,
    pub step_progress: f32,

    /// `None` when no countdown is running.
    pub timer_remaining: Option<u32>,
    pub timer_paused: bool,
    /// Length of the armed countdown; 0 when none.
    pub timer_initial: u32,
    pub timer_progress: f32,

    pub last_spoken: Option<String>,
    pub toast: Option<Toast>,
    /// Bumped on every new toast so readers can tell repeats apart.
    pub toast_seq: u64,

    pub language: String,
}

impl AssistantState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            listening: false,
            mic_status: MicStatus::Ready,
            interim_transcript: String::new(),
            last_transcript: String::new(),
            ingredients: Vec::new(),
            search_results: Vec::new(),
            loading: false,
            recipe_title: None,
            step_index: 0,
            step_count: 0,
            step_progress: 0.0,
            timer_remaining: None,
            timer_paused: false,
            timer_initial: 0,
            timer_progress: 0.0,
            last_spoken: None,
            toast: None,
            toast_seq: 0,
            language: config.speech.language.clone(),
        }
    }
}

impl Default for AssistantState {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Lock for a short critical section; never hold it across `.await`.
pub type SharedState = Arc<Mutex<AssistantState>>;

pub fn new_shared_state(config: &AppConfig) -> SharedState {
    Arc::new(Mutex::new(AssistantState::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        let state = AssistantState::default();
        assert!(!state.listening);
        assert_eq!(state.mic_status, MicStatus::Ready);
        assert!(state.recipe_title.is_none());
        assert_eq!(state.language, "en-US");
        assert_eq!(state.toast_seq, 0);
    }

    #[test]
    fn shared_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedState>();
    }

    #[test]
    fn shared_state_can_be_cloned_and_mutated() {
        let state = new_shared_state(&AppConfig::default());
        let other = Arc::clone(&state);

        state.lock().unwrap().toast = Some(Toast::error("No microphone detected."));
        assert_eq!(
            other.lock().unwrap().toast.as_ref().map(|t| t.kind),
            Some(ToastKind::Error)
        );
    }
}
