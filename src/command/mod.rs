//! Voice command interpretation and dispatch.
//!
//! ```text
//! final transcript ──interpret()──▶ Intent ──Dispatcher::dispatch()──▶ Outcome
//!                      (pure)                 (mutates Kitchen)        speech + FollowUp
//! ```

pub mod dispatch;
pub mod intent;
pub mod responses;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use dispatch::{Dispatcher, FollowUp, Outcome};
pub use intent::{interpret, Intent};
