use crate::recipe::{RecipeDetail, Step};

/// Result of moving the step cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// No recipe with steps is loaded.
    NoRecipe,
    /// The cursor moved; carries the new step and its 1-based number.
    Moved { number: u32, step: Step },
    /// `next` on the last step.
    AtEnd,
    /// `previous` on the first step.
    AtStart,
}

/// The recipe being cooked and the cursor into its steps.
///
/// While a recipe with steps is loaded, `0 <= current_step_index < step_count`.
#[derive(Debug, Clone, Default)]
pub struct CookingSession {
    recipe: Option<RecipeDetail>,
    current_step: usize,
}

impl CookingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the recipe and rewind to the first step.
    pub fn load(&mut self, recipe: RecipeDetail) {
        log::info!("cooking: loaded '{}' ({} steps)", recipe.title, recipe.steps().len());
        self.recipe = Some(recipe);
        self.current_step = 0;
    }

    /// Unload the recipe. Returns `false` if nothing was loaded.
    pub fn finish(&mut self) -> bool {
        self.current_step = 0;
        self.recipe.take().is_some()
    }

    pub fn recipe(&self) -> Option<&RecipeDetail> {
        self.recipe.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.recipe.is_some()
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step
    }

    pub fn step_count(&self) -> usize {
        self.recipe.as_ref().map_or(0, |r| r.steps().len())
    }

    /// The step under the cursor with its spoken number.
    pub fn current(&self) -> Option<(u32, &Step)> {
        let step = self.steps()?.get(self.current_step)?;
        Some((step_number(self.current_step, step), step))
    }

    pub fn next(&mut self) -> Navigation {
        let Some(steps) = self.steps() else {
            return Navigation::NoRecipe;
        };
        if self.current_step + 1 >= steps.len() {
            return Navigation::AtEnd;
        }
        let index = self.current_step + 1;
        let moved = moved(index, &steps[index]);
        self.current_step = index;
        moved
    }

    pub fn previous(&mut self) -> Navigation {
        let Some(steps) = self.steps() else {
            return Navigation::NoRecipe;
        };
        if self.current_step == 0 {
            return Navigation::AtStart;
        }
        let index = self.current_step - 1;
        let moved = moved(index, &steps[index]);
        self.current_step = index;
        moved
    }

    /// `(current + 1) / count` as a percentage; 0 without steps.
    pub fn progress_percent(&self) -> f32 {
        match self.step_count() {
            0 => 0.0,
            count => (self.current_step + 1) as f32 / count as f32 * 100.0,
        }
    }

    fn steps(&self) -> Option<&[Step]> {
        let steps = self.recipe.as_ref()?.steps();
        (!steps.is_empty()).then_some(steps)
    }
}

fn moved(index: usize, step: &Step) -> Navigation {
    Navigation::Moved {
        number: step_number(index, step),
        step: step.clone(),
    }
}

/// The API's step number, or the position when the API omitted it.
fn step_number(index: usize, step: &Step) -> u32 {
    if step.number > 0 {
        step.number
    } else {
        index as u32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::InstructionBlock;

    fn recipe(steps: &[&str]) -> RecipeDetail {
        RecipeDetail {
            id: 1,
            title: "Fried Rice".into(),
            servings: 2,
            ready_in_minutes: 20,
            analyzed_instructions: vec![InstructionBlock {
                name: String::new(),
                steps: steps
                    .iter()
                    .enumerate()
                    .map(|(i, text)| Step {
                        number: i as u32 + 1,
                        step: text.to_string(),
                        ..Step::default()
                    })
                    .collect(),
            }],
            ..RecipeDetail::default()
        }
    }

    #[test]
    fn next_then_previous_on_three_steps() {
        let mut cooking = CookingSession::new();
        cooking.load(recipe(&["Cook rice.", "Fry egg.", "Mix."]));
        assert_eq!(cooking.current_step_index(), 0);

        assert!(matches!(cooking.next(), Navigation::Moved { number: 2, .. }));
        assert_eq!(cooking.current_step_index(), 1);

        assert!(matches!(cooking.previous(), Navigation::Moved { number: 1, .. }));
        assert_eq!(cooking.current_step_index(), 0);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut cooking = CookingSession::new();
        cooking.load(recipe(&["One.", "Two."]));

        assert_eq!(cooking.previous(), Navigation::AtStart);
        cooking.next();
        assert_eq!(cooking.next(), Navigation::AtEnd);
        assert_eq!(cooking.current_step_index(), 1);
        assert_eq!(cooking.progress_percent(), 100.0);
    }

    #[test]
    fn loading_rewinds_the_cursor() {
        let mut cooking = CookingSession::new();
        cooking.load(recipe(&["a", "b", "c"]));
        cooking.next();
        cooking.next();
        cooking.load(recipe(&["x", "y"]));
        assert_eq!(cooking.current_step_index(), 0);
        assert_eq!(cooking.current().map(|(n, s)| (n, s.step.as_str())), Some((1, "x")));
    }

    #[test]
    fn without_recipe_nothing_moves() {
        let mut cooking = CookingSession::new();
        assert_eq!(cooking.next(), Navigation::NoRecipe);
        assert_eq!(cooking.previous(), Navigation::NoRecipe);
        assert!(cooking.current().is_none());
        assert!(!cooking.finish());
    }

    #[test]
    fn recipe_without_steps_reports_no_recipe() {
        let mut cooking = CookingSession::new();
        cooking.load(recipe(&[]));
        assert!(cooking.is_loaded());
        assert_eq!(cooking.next(), Navigation::NoRecipe);
        assert_eq!(cooking.progress_percent(), 0.0);
    }

    #[test]
    fn finish_unloads() {
        let mut cooking = CookingSession::new();
        cooking.load(recipe(&["a"]));
        assert!(cooking.finish());
        assert!(!cooking.is_loaded());
        assert_eq!(cooking.step_count(), 0);
    }

    #[test]
    fn missing_step_numbers_fall_back_to_position() {
        let mut detail = recipe(&["a", "b"]);
        detail.analyzed_instructions[0].steps[1].number = 0;
        let mut cooking = CookingSession::new();
        cooking.load(detail);
        assert!(matches!(cooking.next(), Navigation::Moved { number: 2, .. }));
    }
}
