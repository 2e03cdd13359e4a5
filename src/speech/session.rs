//! Speech-recognition session state machine.
//!
//! [`RecognitionSession`] exclusively owns the native recognizer and turns its
//! unreliable callback stream into a single "listening / not listening"
//! contract.
//!
//! ```text
//! Inactive ──start_listening──▶ Starting ──Started──▶ Active
//!    ▲  ▲                          │                    │
//!    │  └──start timeout / fault───┘                    │ Ended (unexpected)
//!    │                                                  ▼
//!    │                                  Inactive + Restart in restart_delay
//!    │                                  (gives up after max_retries)
//!    │
//!    └──Ended / stop timeout── Stopping ◀──stop_listening── Starting | Active
//! ```
//!
//! All transitions happen on the caller's task: a [`NativeEvent`] handed to
//! [`handle_native`](RecognitionSession::handle_native), a public call, or the
//! single scheduled operation fired through
//! [`fire_pending`](RecognitionSession::fire_pending). The session never owns
//! more than one scheduled operation; arming a new one replaces the old, so a
//! late guard can never act on a state reached by another path.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::{SpeechConfig, SpeechTimings};
use crate::speech::capability::{
    NativeEvent, RecognitionErrorKind, Recognizer, RecognizerSettings, ResultSegment,
    SpeechCapability, Transcript,
};
use crate::speech::error::SpeechError;

/// Receives interim and final transcripts.
pub type ResultCallback = Box<dyn FnMut(Transcript) + Send>;

/// Receives every failure of the session.
pub type ErrorCallback = Box<dyn FnMut(SpeechError) + Send>;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Lifecycle of one recognition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Inactive,
    Starting,
    Active,
    Stopping,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Inactive => "inactive",
            SessionState::Starting => "starting",
            SessionState::Active => "active",
            SessionState::Stopping => "stopping",
        }
    }

    /// `true` while a session is starting or running.
    pub fn is_engaged(&self) -> bool {
        matches!(self, SessionState::Starting | SessionState::Active)
    }
}

// ---------------------------------------------------------------------------
// ScheduledOp
// ---------------------------------------------------------------------------

/// The delayed operations a session can own (at most one at a time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledOp {
    /// Start again after an unexpected end or a start request during a stop.
    Restart,
    /// Give up on a native start that never confirmed.
    StartTimeout,
    /// Give up on a native stop that never confirmed.
    StopTimeout,
    /// Replace the native recognizer after [`RecognitionSession::reset`].
    Reinitialize,
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    op: ScheduledOp,
    due: Instant,
}

// ---------------------------------------------------------------------------
// RecognitionSession
// ---------------------------------------------------------------------------

pub struct RecognitionSession {
    capability: Box<dyn SpeechCapability>,
    recognizer: Option<Box<dyn Recognizer>>,
    supported: bool,
    state: SessionState,
    retry_count: u32,
    max_retries: u32,
    scheduled: Option<Scheduled>,
    /// Time spent re-deferring a start while a stop is still unconfirmed.
    deferred_wait: Duration,
    settings: RecognizerSettings,
    timings: SpeechTimings,
    on_result: Option<ResultCallback>,
    on_error: Option<ErrorCallback>,
}

impl RecognitionSession {
    /// Create the session and its native recognizer.
    ///
    /// A capability that is unsupported, or that fails to produce a
    /// recognizer, leaves the session permanently unsupported: every
    /// [`start_listening`](Self::start_listening) then reports
    /// [`SpeechError::CapabilityUnsupported`].
    pub fn new(capability: Box<dyn SpeechCapability>, config: &SpeechConfig) -> Self {
        let supported = capability.is_supported();
        let mut session = Self {
            capability,
            recognizer: None,
            supported,
            state: SessionState::Inactive,
            retry_count: 0,
            max_retries: config.max_retries,
            scheduled: None,
            deferred_wait: Duration::ZERO,
            settings: RecognizerSettings {
                continuous: config.continuous,
                interim_results: config.interim_results,
                max_alternatives: config.max_alternatives,
                language: config.language.clone(),
            },
            timings: config.timings(),
            on_result: None,
            on_error: None,
        };

        if session.supported {
            if session.init_recognizer() {
                log::info!("session: speech recognition initialised");
            } else {
                session.supported = false;
            }
        } else {
            log::error!("session: speech recognition is not supported on this host");
        }
        session
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn language(&self) -> &str {
        &self.settings.language
    }

    /// The scheduled operation, if any.
    pub fn pending_op(&self) -> Option<ScheduledOp> {
        self.scheduled.map(|s| s.op)
    }

    /// When the scheduled operation is due; the event loop sleeps until then
    /// and calls [`fire_pending`](Self::fire_pending).
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.scheduled.map(|s| s.due)
    }

    // -----------------------------------------------------------------------
    // Public contract
    // -----------------------------------------------------------------------

    /// Register callbacks and begin listening.
    ///
    /// Returns `false` when the capability is unsupported (after calling
    /// `on_error` synchronously) or when the native start is rejected.
    /// Requests made while already starting or active are ignored apart from
    /// replacing the callbacks. A reset still waiting to rebuild the
    /// recognizer is carried out first.
    pub fn start_listening(&mut self, on_result: ResultCallback, mut on_error: ErrorCallback) -> bool {
        if !self.supported {
            on_error(SpeechError::CapabilityUnsupported);
            return false;
        }

        self.on_result = Some(on_result);
        self.on_error = Some(on_error);
        self.retry_count = 0;

        // A start must not swallow the rebuild a reset scheduled.
        if self.pending_op() == Some(ScheduledOp::Reinitialize) {
            log::debug!("session: start requested before the reset ran, rebuilding now");
            self.scheduled = None;
            self.reinitialize();
        }

        match self.state {
            SessionState::Inactive => self.begin_start(),
            SessionState::Starting => {
                log::debug!("session: already starting, ignoring duplicate start");
                true
            }
            SessionState::Active => {
                log::debug!("session: already active, ignoring duplicate start");
                true
            }
            SessionState::Stopping => {
                log::debug!("session: stop in progress, deferring start");
                self.deferred_wait = Duration::ZERO;
                self.arm(ScheduledOp::Restart, self.timings.restart_delay);
                true
            }
        }
    }

    /// Stop listening on purpose; no automatic restart follows.
    pub fn stop_listening(&mut self) {
        match self.state {
            SessionState::Inactive => {
                if self.pending_op() == Some(ScheduledOp::Restart) {
                    log::debug!("session: stop cancels the pending restart");
                    self.scheduled = None;
                }
                self.retry_count = 0;
            }
            SessionState::Stopping => {
                log::debug!("session: already stopping, ignoring stop");
            }
            SessionState::Starting | SessionState::Active => {
                self.transition(SessionState::Stopping);
                self.retry_count = 0;

                let stopped = match self.recognizer.as_mut() {
                    Some(recognizer) => recognizer.stop().map_err(|fault| fault.to_string()),
                    None => Err("no recognizer".to_string()),
                };
                match stopped {
                    Ok(()) => self.arm(ScheduledOp::StopTimeout, self.timings.stop_timeout),
                    Err(reason) => {
                        log::warn!("session: native stop failed ({reason}), forcing inactive");
                        self.scheduled = None;
                        self.transition(SessionState::Inactive);
                    }
                }
            }
        }
    }

    /// Set the language for the next session.
    ///
    /// A session that is already running keeps its language until it is
    /// stopped and started again.
    pub fn change_language(&mut self, tag: &str) {
        self.settings.language = tag.to_string();
        if self.state == SessionState::Inactive {
            if let Some(recognizer) = self.recognizer.as_mut() {
                recognizer.configure(&self.settings);
            }
        } else {
            log::info!(
                "session: language set to {tag}; takes effect on the next start (currently {})",
                self.state.label()
            );
        }
    }

    /// Tear everything down: stop, then after `reset_delay` discard the
    /// native recognizer and build a new one.
    pub fn reset(&mut self) {
        log::info!("session: full reset requested");
        self.stop_listening();
        self.arm(ScheduledOp::Reinitialize, self.timings.reset_delay);
    }

    // -----------------------------------------------------------------------
    // Native events
    // -----------------------------------------------------------------------

    pub fn handle_native(&mut self, event: NativeEvent) {
        match event {
            NativeEvent::Started => self.on_native_started(),
            NativeEvent::Result {
                result_index,
                results,
            } => self.on_native_result(result_index, &results),
            NativeEvent::Error(kind) => self.on_native_error(kind),
            NativeEvent::Ended => self.on_native_end(),
        }
    }

    fn on_native_started(&mut self) {
        if self.state == SessionState::Starting {
            self.disarm(ScheduledOp::StartTimeout);
            self.transition(SessionState::Active);
        } else {
            log::debug!("session: ignoring start confirmation while {}", self.state.label());
        }
    }

    fn on_native_result(&mut self, result_index: usize, results: &[ResultSegment]) {
        match self.state {
            SessionState::Inactive => {
                log::debug!("session: dropping result received while inactive");
                return;
            }
            SessionState::Starting => {
                // A result proves the recognizer is running.
                self.disarm(ScheduledOp::StartTimeout);
                self.transition(SessionState::Active);
            }
            SessionState::Active | SessionState::Stopping => {}
        }

        let Some(transcript) = collect_transcript(result_index, results) else {
            return;
        };
        if transcript.is_final {
            self.retry_count = 0;
        }
        self.emit(transcript);
    }

    fn on_native_error(&mut self, kind: RecognitionErrorKind) {
        if kind == RecognitionErrorKind::NoSpeech {
            log::debug!("session: no speech detected, still listening");
            return;
        }
        if self.state == SessionState::Stopping && kind != RecognitionErrorKind::NotAllowed {
            log::debug!("session: ignoring '{kind}' during an intentional stop");
            return;
        }

        log::warn!("session: recognizer error '{kind}' while {}", self.state.label());
        match kind {
            RecognitionErrorKind::NotAllowed => {
                self.scheduled = None;
                self.retry_count = 0;
                self.transition(SessionState::Inactive);
                self.report(SpeechError::PermissionDenied);
            }
            kind if kind.is_transient() => {
                // The recognizer ends next; the end handler restarts it.
                self.report(SpeechError::Recognition(kind));
            }
            kind => {
                self.scheduled = None;
                self.retry_count = 0;
                self.transition(SessionState::Inactive);
                self.report(SpeechError::Terminal(kind));
            }
        }
    }

    fn on_native_end(&mut self) {
        match self.state {
            SessionState::Stopping => {
                self.disarm(ScheduledOp::StopTimeout);
                self.retry_count = 0;
                self.transition(SessionState::Inactive);
            }
            SessionState::Starting | SessionState::Active => {
                self.disarm(ScheduledOp::StartTimeout);
                self.retry_count += 1;
                self.transition(SessionState::Inactive);

                if self.retry_count <= self.max_retries {
                    log::warn!(
                        "session: recognizer ended unexpectedly, restarting (retry {} of {})",
                        self.retry_count,
                        self.max_retries
                    );
                    self.arm(ScheduledOp::Restart, self.timings.restart_delay);
                } else {
                    log::error!("session: retry limit exceeded, giving up");
                    self.retry_count = 0;
                    self.report(SpeechError::MaxRetriesExceeded);
                }
            }
            SessionState::Inactive => {
                log::debug!("session: recognizer ended while inactive");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Scheduled operation
    // -----------------------------------------------------------------------

    /// Run the scheduled operation now, whatever its deadline.
    pub fn fire_pending(&mut self) {
        let Some(scheduled) = self.scheduled.take() else {
            return;
        };
        log::debug!("session: firing {:?}", scheduled.op);

        match scheduled.op {
            ScheduledOp::Restart => self.run_restart(),
            ScheduledOp::StartTimeout => {
                if self.state == SessionState::Starting {
                    log::warn!("session: start timed out, resetting to inactive");
                    self.transition(SessionState::Inactive);
                    self.report(SpeechError::StartTimeout);
                }
            }
            ScheduledOp::StopTimeout => {
                if self.state == SessionState::Stopping {
                    log::warn!("session: stop timed out, forcing inactive");
                    self.retry_count = 0;
                    self.transition(SessionState::Inactive);
                    self.report(SpeechError::StopTimeout);
                }
            }
            ScheduledOp::Reinitialize => self.reinitialize(),
        }
    }

    fn run_restart(&mut self) {
        match self.state {
            SessionState::Inactive => {
                self.deferred_wait = Duration::ZERO;
                self.begin_start();
            }
            SessionState::Stopping => {
                self.deferred_wait += self.timings.restart_delay;
                if self.deferred_wait >= self.timings.stop_timeout {
                    log::warn!("session: stop never confirmed, forcing inactive before restart");
                    self.deferred_wait = Duration::ZERO;
                    self.transition(SessionState::Inactive);
                    self.report(SpeechError::StopTimeout);
                    self.begin_start();
                } else {
                    self.arm(ScheduledOp::Restart, self.timings.restart_delay);
                }
            }
            SessionState::Starting | SessionState::Active => {
                log::debug!("session: restart skipped, already {}", self.state.label());
            }
        }
    }

    fn reinitialize(&mut self) {
        self.recognizer = None;
        self.retry_count = 0;
        self.deferred_wait = Duration::ZERO;
        self.transition(SessionState::Inactive);
        if self.supported && self.init_recognizer() {
            log::info!("session: recognizer has been reset");
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Issue the native start. Only ever called from `Inactive`, so two
    /// native starts can never overlap.
    fn begin_start(&mut self) -> bool {
        if self.state != SessionState::Inactive {
            log::error!("session: cannot start while {}", self.state.label());
            return false;
        }
        if self.recognizer.is_none() && !self.init_recognizer() {
            self.report(SpeechError::CapabilityUnsupported);
            return false;
        }

        self.transition(SessionState::Starting);
        self.arm(ScheduledOp::StartTimeout, self.timings.start_timeout);

        let started = match self.recognizer.as_mut() {
            Some(recognizer) => {
                recognizer.configure(&self.settings);
                recognizer.start().map_err(|fault| fault.to_string())
            }
            None => Err("no recognizer".to_string()),
        };

        match started {
            Ok(()) => {
                log::debug!("session: native start issued");
                true
            }
            Err(reason) => {
                log::error!("session: native start failed: {reason}");
                self.disarm(ScheduledOp::StartTimeout);
                self.transition(SessionState::Inactive);
                self.report(SpeechError::StartFailed(reason));
                false
            }
        }
    }

    fn init_recognizer(&mut self) -> bool {
        match self.capability.create_recognizer() {
            Ok(mut recognizer) => {
                recognizer.configure(&self.settings);
                self.recognizer = Some(recognizer);
                true
            }
            Err(e) => {
                log::error!("session: could not create recognizer: {e}");
                false
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            log::debug!("session: {} → {}", self.state.label(), next.label());
            self.state = next;
        }
    }

    fn arm(&mut self, op: ScheduledOp, delay: Duration) {
        let next = Scheduled {
            op,
            due: Instant::now() + delay,
        };
        if let Some(previous) = self.scheduled.replace(next) {
            log::debug!("session: {:?} replaces pending {:?}", op, previous.op);
        }
    }

    /// Clear the scheduled operation only if it is `op`.
    fn disarm(&mut self, op: ScheduledOp) {
        if self.pending_op() == Some(op) {
            self.scheduled = None;
        }
    }

    fn emit(&mut self, transcript: Transcript) {
        if let Some(callback) = self.on_result.as_mut() {
            callback(transcript);
        }
    }

    fn report(&mut self, error: SpeechError) {
        match self.on_error.as_mut() {
            Some(callback) => callback(error),
            None => log::warn!("session: unreported error: {error}"),
        }
    }
}

/// Fold the changed segments into one transcript; final text wins over
/// interim text.
fn collect_transcript(result_index: usize, results: &[ResultSegment]) -> Option<Transcript> {
    let mut final_text = String::new();
    let mut interim_text = String::new();

    for segment in results.iter().skip(result_index) {
        if segment.is_final {
            final_text.push_str(&segment.transcript);
        } else {
            interim_text.push_str(&segment.transcript);
        }
    }

    if !final_text.is_empty() {
        Some(Transcript {
            text: final_text,
            is_final: true,
        })
    } else if !interim_text.is_empty() {
        Some(Transcript {
            text: interim_text,
            is_final: false,
        })
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
