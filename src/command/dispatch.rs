//! Intent → kitchen action → spoken confirmation.
//!
//! Each intent performs exactly one action on the [`Kitchen`] and yields at
//! most one line to speak. Work that has to leave the event loop (the recipe
//! search) is handed back as a [`FollowUp`].

use crate::command::intent::Intent;
use crate::command::responses;
use crate::kitchen::{Kitchen, Navigation};

/// Asynchronous work requested by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Search recipes using these ingredients.
    Search(Vec<String>),
}

/// What dispatching an intent produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub speech: Option<String>,
    pub follow_up: Option<FollowUp>,
}

impl Outcome {
    fn say(text: impl Into<String>) -> Self {
        Self {
            speech: Some(text.into()),
            follow_up: None,
        }
    }
}

pub struct Dispatcher;

impl Dispatcher {
    pub fn dispatch(intent: &Intent, kitchen: &mut Kitchen) -> Outcome {
        log::info!("command: {}", intent.label());

        match intent {
            Intent::Search => {
                if kitchen.ingredients.is_empty() {
                    return Outcome::say(responses::ADD_INGREDIENTS_FIRST);
                }
                kitchen.loading = true;
                Outcome {
                    speech: Some(responses::searching(&kitchen.ingredients.joined(", "))),
                    follow_up: Some(FollowUp::Search(kitchen.ingredients.as_slice().to_vec())),
                }
            }
            Intent::AddIngredient(name) => {
                let name = name.trim().to_lowercase();
                if !kitchen.ingredients.add(&name) {
                    log::debug!("command: '{name}' already listed");
                }
                Outcome::say(responses::added(&name))
            }
            Intent::ClearIngredients => {
                kitchen.ingredients.clear();
                Outcome::say(responses::INGREDIENTS_CLEARED)
            }
            Intent::NextStep => Self::next_step(kitchen),
            Intent::PreviousStep => match kitchen.cooking.previous() {
                Navigation::Moved { number, step } => {
                    Outcome::say(responses::going_back(number, &step.step))
                }
                Navigation::AtStart => Outcome::say(responses::FIRST_STEP),
                Navigation::NoRecipe | Navigation::AtEnd => Outcome::say(responses::NO_RECIPE),
            },
            Intent::RepeatStep => match kitchen.cooking.current() {
                Some((number, step)) => Outcome::say(responses::step(number, &step.step)),
                None => Outcome::say(responses::NO_RECIPE),
            },
            Intent::PauseTimer => {
                kitchen.timer.pause();
                Outcome::say(responses::TIMER_PAUSED)
            }
            Intent::ResumeTimer => {
                kitchen.timer.resume();
                Outcome::say(responses::TIMER_RESUMED)
            }
            Intent::Help => Outcome::say(responses::HELP),
            Intent::Unrecognized => Outcome::say(responses::UNRECOGNIZED),
        }
    }

    fn next_step(kitchen: &mut Kitchen) -> Outcome {
        match kitchen.cooking.next() {
            Navigation::Moved { number, step } => {
                let mut line = responses::step(number, &step.step);
                match step.length.as_ref().filter(|len| len.as_seconds() > 0) {
                    Some(length) => {
                        kitchen.timer.start(length.as_seconds());
                        // One utterance: a second speak would cancel the step.
                        line.push(' ');
                        line.push_str(&responses::timer_set(length));
                    }
                    None => {
                        kitchen.timer.cancel();
                    }
                }
                Outcome::say(line)
            }
            Navigation::AtEnd => Outcome::say(responses::FINAL_STEP),
            Navigation::NoRecipe | Navigation::AtStart => Outcome::say(responses::NO_RECIPE),
        }
    }
}
