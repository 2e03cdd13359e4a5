//! Recipe API collaborator.
//!
//! [`RecipeApi`] is the seam the assistant depends on; [`SpoonacularClient`]
//! implements it over HTTPS with `reqwest`. Searches and lookups run on
//! spawned tasks and report back to the event loop; failures are turned into
//! spoken messages and toasts there, never propagated further.

pub mod client;
pub mod types;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{RecipeApi, RecipeError, SpoonacularClient};
pub use types::{InstructionBlock, Recipe, RecipeDetail, RecipeIngredient, Step, StepItem, StepLength};

#[cfg(test)]
pub use client::MockRecipeApi;
