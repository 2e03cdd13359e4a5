//! Application state mutated by voice commands and direct actions.
//!
//! [`Kitchen`] owns the ingredient list, the recipe being cooked, the step
//! countdown and the latest search results. It is only touched from the
//! assistant's event loop.

pub mod cooking;
pub mod ingredients;
pub mod timer;

pub use cooking::{CookingSession, Navigation};
pub use ingredients::IngredientList;
pub use timer::{format_clock, CountdownTimer, TimerAnnouncement};

use crate::config::CookingConfig;
use crate::recipe::Recipe;

#[derive(Debug, Clone)]
pub struct Kitchen {
    pub ingredients: IngredientList,
    pub cooking: CookingSession,
    pub timer: CountdownTimer,
    pub search_results: Vec<Recipe>,
    /// A search or recipe lookup is in flight.
    pub loading: bool,
}

impl Kitchen {
    pub fn new(config: &CookingConfig) -> Self {
        Self {
            ingredients: IngredientList::new(),
            cooking: CookingSession::new(),
            timer: CountdownTimer::new(config.timer_max_secs),
            search_results: Vec::new(),
            loading: false,
        }
    }
}

impl Default for Kitchen {
    fn default() -> Self {
        Self::new(&CookingConfig::default())
    }
}
