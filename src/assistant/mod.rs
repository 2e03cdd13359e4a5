//! The voice cooking assistant: one event loop tying everything together.
//!
//! # Architecture
//!
//! ```text
//! front end (console / UI)
//!        │ AppEvent (mpsc)
//!        ▼
//! Assistant::run()  ← async tokio task
//!        │
//!        ├─ VoiceInputController ── RecognitionSession ── Recognizer (host)
//!        │        │ SessionOutput (final transcript)
//!        │        ▼
//!        ├─ interpret() → Dispatcher → Kitchen
//!        │                    └─ FollowUp::Search → spawned RecipeApi call
//!        │
//!        ├─ CountdownTimer ticks (1 s) → announcements
//!        └─ SynthesisChannel → Synthesizer (host)
//!
//! SharedState (Arc<Mutex<AssistantState>>) ←─── read by the front end
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use voice_chef::assistant::{new_shared_state, AppEvent, Assistant};
//! use voice_chef::config::AppConfig;
//! use voice_chef::controller::CpalProbe;
//! use voice_chef::recipe::SpoonacularClient;
//! use voice_chef::speech::ConsoleCapability;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let state = new_shared_state(&config);
//!     let (events_tx, events_rx) = mpsc::channel(64);
//!     let (native_tx, _native_rx) = mpsc::unbounded_channel();
//!     let (spoken_tx, _spoken_rx) = mpsc::unbounded_channel();
//!
//!     let assistant = Assistant::new(
//!         state.clone(),
//!         config.clone(),
//!         Box::new(ConsoleCapability::new(native_tx, spoken_tx)),
//!         Box::new(CpalProbe::new()),
//!         Arc::new(SpoonacularClient::from_config(&config.recipe_api)),
//!         events_tx.clone(),
//!     );
//!     let handle = tokio::spawn(assistant.run(events_rx));
//!
//!     events_tx.send(AppEvent::ToggleMic).await.unwrap();
//!     events_tx.send(AppEvent::Shutdown).await.unwrap();
//!     handle.await.unwrap();
//! }
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{AppEvent, Assistant};
pub use state::{new_shared_state, AssistantState, SharedState, Toast, ToastKind};
