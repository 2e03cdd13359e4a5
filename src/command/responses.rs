//! Everything the assistant says, in one place.

use crate::recipe::{Recipe, RecipeDetail, RecipeError, StepLength};

pub const ADD_INGREDIENTS_FIRST: &str = "Please add some ingredients first.";
pub const NO_RESULTS: &str =
    "I couldn't find any recipes with these ingredients. Try adding more ingredients or try different ones.";
pub const SEARCH_FAILED: &str =
    "Sorry, I encountered an error while searching for recipes. Please check your API key and try again.";
pub const RECIPE_LOAD_FAILED: &str =
    "Sorry, I encountered an error while loading the recipe. Please try again.";
pub const INGREDIENTS_CLEARED: &str = "Ingredients cleared.";
pub const FINAL_STEP: &str = "That was the final step! Your dish is ready. Enjoy your meal!";
pub const FIRST_STEP: &str = "This is the first step.";
pub const NO_RECIPE: &str = "There's no recipe in progress. Pick a recipe to start cooking.";
pub const TIMER_PAUSED: &str = "Timer paused";
pub const TIMER_RESUMED: &str = "Timer resumed";
pub const TIMER_CANCELLED: &str = "Timer cancelled";
pub const HELP: &str =
    "You can say: Add ingredient, find recipes, next step, previous step, repeat, pause timer, or resume timer.";
pub const UNRECOGNIZED: &str =
    "I didn't understand. Try saying 'Add ingredient chicken' or 'Find recipes'.";
pub const RECIPE_FINISHED: &str = "Great job! You've completed the recipe. I hope it's delicious!";
pub const LISTENING: &str = "Listening for your command...";

pub fn searching(what: &str) -> String {
    format!("Searching for recipes with {what}.")
}

/// Spoken once a search returns.
pub fn search_results(results: &[Recipe]) -> String {
    match results.first() {
        Some(top) => format!(
            "I found {} recipes using your ingredients. The top result is {}.",
            results.len(),
            top.title
        ),
        None => NO_RESULTS.to_string(),
    }
}

/// Key problems are named; everything else gets the generic apology.
pub fn search_failed(error: &RecipeError) -> String {
    if error.is_key_problem() {
        error.user_message()
    } else {
        SEARCH_FAILED.to_string()
    }
}

pub fn added(ingredient: &str) -> String {
    format!("Added {ingredient} to your ingredients.")
}

pub fn recipe_intro(recipe: &RecipeDetail) -> String {
    format!(
        "Let's cook {}. This recipe serves {} and takes about {} minutes to prepare.",
        recipe.title, recipe.servings, recipe.ready_in_minutes
    )
}

pub fn step(number: u32, text: &str) -> String {
    format!("Step {number}: {text}")
}

pub fn going_back(number: u32, text: &str) -> String {
    format!("Going back to step {number}: {text}")
}

pub fn timer_set(length: &StepLength) -> String {
    format!("I'll set a timer for {} {}.", length.number, length.unit)
}

pub fn language_changed(name: &str) -> String {
    format!("Language changed to {name}")
}
