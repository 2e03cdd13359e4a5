//! UI-facing microphone control.
//!
//! [`VoiceInputController`] owns the one [`RecognitionSession`] and bridges it
//! to the rest of the application. It adds what the session deliberately
//! leaves out: toggle debouncing, a throttled microphone probe before every
//! start, and the mapping of session failures onto an error affordance the
//! user can clear.
//!
//! Session callbacks only push [`SessionOutput`]s onto a channel; the owner of
//! the controller drains that channel and feeds the items back through
//! [`on_transcript`](VoiceInputController::on_transcript) and
//! [`on_session_error`](VoiceInputController::on_session_error), so no
//! callback ever re-enters the controller.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

use crate::config::ControllerConfig;
use crate::controller::probe::MicrophoneProbe;
use crate::speech::{
    ErrorCallback, NativeEvent, RecognitionSession, ResultCallback, ScheduledOp, SessionState,
    SpeechError, Transcript,
};

/// Something the session reported through its callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutput {
    Transcript(Transcript),
    Error(SpeechError),
}

/// What a toggle (or an automatic resume) did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Too soon after the previous toggle.
    Debounced,
    /// A pending session error was dismissed; nothing else happened.
    ErrorCleared,
    Stopped,
    Started,
    /// The microphone probe failed with this message.
    PermissionDenied(String),
    /// The session refused to start; the reason arrives as a session error.
    StartRejected,
}

/// State of the microphone affordance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MicStatus {
    Ready,
    Listening,
    Error(String),
}

pub struct VoiceInputController {
    session: RecognitionSession,
    probe: Box<dyn MicrophoneProbe>,
    output_tx: UnboundedSender<SessionOutput>,
    toggle_debounce: Duration,
    probe_throttle: Duration,
    is_listening: bool,
    interim: String,
    last_transcript: String,
    session_error: Option<String>,
    permission_error: Option<String>,
    last_toggle: Option<Instant>,
    last_probe: Option<Instant>,
    resume_after_reset: bool,
}

impl VoiceInputController {
    pub fn new(
        session: RecognitionSession,
        probe: Box<dyn MicrophoneProbe>,
        output_tx: UnboundedSender<SessionOutput>,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            session,
            probe,
            output_tx,
            toggle_debounce: Duration::from_millis(config.toggle_debounce_ms),
            probe_throttle: Duration::from_millis(config.permission_probe_throttle_ms),
            is_listening: false,
            interim: String::new(),
            last_transcript: String::new(),
            session_error: None,
            permission_error: None,
            last_toggle: None,
            last_probe: None,
            resume_after_reset: false,
        }
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    pub fn is_listening(&self) -> bool {
        self.is_listening
    }

    pub fn interim_transcript(&self) -> &str {
        &self.interim
    }

    pub fn last_transcript(&self) -> &str {
        &self.last_transcript
    }

    pub fn session(&self) -> &RecognitionSession {
        &self.session
    }

    pub fn mic_status(&self) -> MicStatus {
        if let Some(msg) = self.session_error.as_ref().or(self.permission_error.as_ref()) {
            MicStatus::Error(msg.clone())
        } else if self.is_listening {
            MicStatus::Listening
        } else {
            MicStatus::Ready
        }
    }

    // -----------------------------------------------------------------------
    // User actions
    // -----------------------------------------------------------------------

    /// The microphone button.
    pub fn toggle_listening(&mut self) -> ToggleOutcome {
        let now = Instant::now();
        if let Some(last) = self.last_toggle {
            if now.duration_since(last) < self.toggle_debounce {
                log::debug!("controller: toggle ignored, debounce active");
                return ToggleOutcome::Debounced;
            }
        }
        self.last_toggle = Some(now);

        if self.session_error.take().is_some() {
            return ToggleOutcome::ErrorCleared;
        }

        if self.is_listening {
            self.stop_listening();
            ToggleOutcome::Stopped
        } else {
            self.start_if_permitted()
        }
    }

    pub fn stop_listening(&mut self) {
        self.is_listening = false;
        self.resume_after_reset = false;
        self.interim.clear();
        self.session.stop_listening();
    }

    /// Last-resort recovery: stop, clear errors, rebuild the recognizer and
    /// resume listening once the rebuild has run.
    pub fn reset_recognition(&mut self) {
        log::info!("controller: resetting voice recognition");
        self.stop_listening();
        self.session_error = None;
        self.session.reset();
        self.resume_after_reset = true;
    }

    pub fn change_language(&mut self, tag: &str) {
        self.session.change_language(tag);
    }

    /// Probe the microphone at most once per throttle window; inside the
    /// window the previous verdict is returned.
    pub fn check_permission(&mut self) -> Result<(), String> {
        let now = Instant::now();
        if let Some(last) = self.last_probe {
            if now.duration_since(last) < self.probe_throttle {
                return match &self.permission_error {
                    Some(msg) => Err(msg.clone()),
                    None => Ok(()),
                };
            }
        }
        self.last_probe = Some(now);

        match self.probe.probe() {
            Ok(()) => {
                self.permission_error = None;
                Ok(())
            }
            Err(e) => {
                log::warn!("controller: microphone probe failed: {e}");
                let msg = e.user_message();
                self.permission_error = Some(msg.clone());
                Err(msg)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Session plumbing
    // -----------------------------------------------------------------------

    pub fn handle_native(&mut self, event: NativeEvent) {
        self.session.handle_native(event);
    }

    pub fn pending_deadline(&self) -> Option<Instant> {
        self.session.pending_deadline()
    }

    /// Run the session's due operation. After a reset's rebuild this also
    /// resumes listening and reports how that went.
    pub fn fire_session_timer(&mut self) -> Option<ToggleOutcome> {
        let op = self.session.pending_op();
        self.session.fire_pending();

        if op == Some(ScheduledOp::Reinitialize) && self.resume_after_reset {
            self.resume_after_reset = false;
            // Force a fresh probe after a reset.
            self.last_probe = None;
            return Some(self.start_if_permitted());
        }
        None
    }

    /// Interim text replaces the previous interim; a final transcript clears
    /// it and is returned for interpretation.
    pub fn on_transcript(&mut self, transcript: Transcript) -> Option<String> {
        if transcript.is_final {
            self.interim.clear();
            let text = transcript.text.trim().to_string();
            if text.is_empty() {
                return None;
            }
            log::info!("controller: heard \"{text}\"");
            self.last_transcript = text.clone();
            Some(text)
        } else {
            self.interim = transcript.text;
            None
        }
    }

    /// Fatal errors switch the affordance to its error state; others are
    /// only logged.
    pub fn on_session_error(&mut self, error: &SpeechError) {
        if error.is_fatal() {
            log::error!("controller: session failed: {error}");
            self.session_error = Some(error.user_message());
            self.is_listening = false;
            self.interim.clear();
        } else {
            log::warn!("controller: session reported: {error}");
        }

        if self.session.state() == SessionState::Inactive && self.session.pending_op().is_none() {
            self.is_listening = false;
        }
    }

    fn start_if_permitted(&mut self) -> ToggleOutcome {
        // Any start also settles a pending reset.
        self.resume_after_reset = false;
        if let Err(msg) = self.check_permission() {
            return ToggleOutcome::PermissionDenied(msg);
        }

        let tx = self.output_tx.clone();
        let on_result: ResultCallback = Box::new(move |t| {
            let _ = tx.send(SessionOutput::Transcript(t));
        });
        let tx = self.output_tx.clone();
        let on_error: ErrorCallback = Box::new(move |e| {
            let _ = tx.send(SessionOutput::Error(e));
        });

        self.is_listening = self.session.start_listening(on_result, on_error);
        if self.is_listening {
            ToggleOutcome::Started
        } else {
            ToggleOutcome::StartRejected
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::config::SpeechConfig;
    use crate::controller::probe::{MicrophoneError, MockProbe};
    use crate::speech::{MockCapability, MockLog};

    struct Harness {
        controller: VoiceInputController,
        outputs: UnboundedReceiver<SessionOutput>,
        probe: MockProbe,
        log: Arc<Mutex<MockLog>>,
    }

    fn harness_with(cap: MockCapability, probe: MockProbe) -> Harness {
        let log = Arc::clone(&cap.log);
        let session = RecognitionSession::new(Box::new(cap), &SpeechConfig::default());
        let (tx, outputs) = mpsc::unbounded_channel();
        let controller =
            VoiceInputController::new(session, Box::new(probe.clone()), tx, &ControllerConfig::default());
        Harness {
            controller,
            outputs,
            probe,
            log,
        }
    }

    fn harness() -> Harness {
        harness_with(MockCapability::supported(), MockProbe::granted())
    }

    async fn wait(ms: u64) {
        tokio::time::advance(Duration::from_millis(ms)).await;
    }

    /// Drain the session outputs the way the event loop does.
    fn pump(h: &mut Harness) -> Vec<String> {
        let mut finals = Vec::new();
        while let Ok(output) = h.outputs.try_recv() {
            match output {
                SessionOutput::Transcript(t) => finals.extend(h.controller.on_transcript(t)),
                SessionOutput::Error(e) => h.controller.on_session_error(&e),
            }
        }
        finals
    }

    // -----------------------------------------------------------------------
    // Toggle
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn toggle_starts_then_stops() {
        let mut h = harness();

        assert_eq!(h.controller.toggle_listening(), ToggleOutcome::Started);
        assert!(h.controller.is_listening());
        assert_eq!(h.controller.mic_status(), MicStatus::Listening);
        assert_eq!(h.controller.session().state(), SessionState::Starting);

        wait(300).await;
        assert_eq!(h.controller.toggle_listening(), ToggleOutcome::Stopped);
        assert!(!h.controller.is_listening());
        assert_eq!(h.controller.session().state(), SessionState::Stopping);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_toggles_are_debounced() {
        let mut h = harness();

        assert_eq!(h.controller.toggle_listening(), ToggleOutcome::Started);
        wait(100).await;
        assert_eq!(h.controller.toggle_listening(), ToggleOutcome::Debounced);
        wait(150).await;
        assert_eq!(h.controller.toggle_listening(), ToggleOutcome::Debounced);
        assert!(h.controller.is_listening());
        assert_eq!(h.log.lock().unwrap().starts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn denied_probe_blocks_start() {
        let mut h = harness_with(MockCapability::supported(), MockProbe::denied());

        let outcome = h.controller.toggle_listening();

        assert_eq!(
            outcome,
            ToggleOutcome::PermissionDenied(MicrophoneError::Denied.user_message())
        );
        assert_eq!(h.log.lock().unwrap().starts, 0);
        assert!(matches!(h.controller.mic_status(), MicStatus::Error(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn probe_is_throttled() {
        let mut h = harness();

        assert!(h.controller.check_permission().is_ok());
        h.probe.set(Err(MicrophoneError::NotFound));
        wait(200).await;
        assert!(h.controller.check_permission().is_ok(), "cached verdict");
        assert_eq!(h.probe.calls(), 1);

        wait(300).await;
        assert!(h.controller.check_permission().is_err());
        assert_eq!(h.probe.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unsupported_capability_is_rejected_and_reported() {
        let mut h = harness_with(MockCapability::unsupported(), MockProbe::granted());

        assert_eq!(h.controller.toggle_listening(), ToggleOutcome::StartRejected);
        pump(&mut h);

        assert!(!h.controller.is_listening());
        assert_eq!(
            h.controller.mic_status(),
            MicStatus::Error(SpeechError::CapabilityUnsupported.user_message())
        );
    }

    // -----------------------------------------------------------------------
    // Transcripts and errors
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn final_transcript_clears_interim() {
        let mut h = harness();
        h.controller.toggle_listening();
        h.controller.handle_native(NativeEvent::Started);

        h.controller.handle_native(NativeEvent::interim_result("add chick"));
        assert!(pump(&mut h).is_empty());
        assert_eq!(h.controller.interim_transcript(), "add chick");

        h.controller.handle_native(NativeEvent::final_result(" add chicken "));
        assert_eq!(pump(&mut h), vec!["add chicken".to_string()]);
        assert_eq!(h.controller.interim_transcript(), "");
        assert_eq!(h.controller.last_transcript(), "add chicken");
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_shows_error_until_toggled_away() {
        let mut h = harness();
        h.controller.toggle_listening();
        h.controller.handle_native(NativeEvent::Started);

        h.controller
            .handle_native(NativeEvent::Error(crate::speech::RecognitionErrorKind::NotAllowed));
        pump(&mut h);
        assert!(!h.controller.is_listening());
        assert!(matches!(h.controller.mic_status(), MicStatus::Error(_)));

        wait(300).await;
        assert_eq!(h.controller.toggle_listening(), ToggleOutcome::ErrorCleared);
        assert_eq!(h.controller.mic_status(), MicStatus::Ready);

        wait(300).await;
        assert_eq!(h.controller.toggle_listening(), ToggleOutcome::Started);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_error_keeps_listening() {
        let mut h = harness();
        h.controller.toggle_listening();
        h.controller.handle_native(NativeEvent::Started);

        h.controller
            .handle_native(NativeEvent::Error(crate::speech::RecognitionErrorKind::Network));
        pump(&mut h);

        assert!(h.controller.is_listening());
        assert_eq!(h.controller.mic_status(), MicStatus::Listening);
    }

    #[tokio::test(start_paused = true)]
    async fn start_timeout_drops_the_listening_flag() {
        let mut h = harness();
        h.controller.toggle_listening();

        assert_eq!(h.controller.fire_session_timer(), None);
        pump(&mut h);

        assert!(!h.controller.is_listening());
        assert_eq!(h.controller.mic_status(), MicStatus::Ready);
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn reset_rebuilds_and_resumes() {
        let mut h = harness();
        h.controller.toggle_listening();
        h.controller.handle_native(NativeEvent::Started);

        h.controller.reset_recognition();
        assert!(!h.controller.is_listening());
        assert_eq!(h.controller.session().pending_op(), Some(ScheduledOp::Reinitialize));

        let resumed = h.controller.fire_session_timer();

        assert_eq!(resumed, Some(ToggleOutcome::Started));
        assert!(h.controller.is_listening());
        assert_eq!(h.log.lock().unwrap().created, 2);
        assert_eq!(h.log.lock().unwrap().starts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_inside_the_reset_window_rebuilds_once() {
        let mut h = harness();
        h.controller.toggle_listening();
        h.controller.handle_native(NativeEvent::Started);

        h.controller.reset_recognition();
        wait(300).await;
        assert_eq!(h.controller.toggle_listening(), ToggleOutcome::Started);
        assert_eq!(h.log.lock().unwrap().created, 2);

        h.controller.handle_native(NativeEvent::Started);
        assert_eq!(h.controller.pending_deadline(), None);
        assert_eq!(h.controller.fire_session_timer(), None);
        assert!(h.controller.is_listening());
        assert_eq!(h.log.lock().unwrap().starts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_rebuild_cancels_the_resume() {
        let mut h = harness();
        h.controller.toggle_listening();
        h.controller.handle_native(NativeEvent::Started);

        h.controller.reset_recognition();
        h.controller.stop_listening();

        assert_eq!(h.controller.fire_session_timer(), None);
        assert!(!h.controller.is_listening());
    }
}
