//! Wire types of the recipe API (camelCase JSON, missing fields default).

use serde::{Deserialize, Serialize};

/// One hit from an ingredient search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    pub id: u64,
    pub title: String,
    pub image: String,
    pub image_type: String,
    pub used_ingredient_count: u32,
    pub missed_ingredient_count: u32,
    pub used_ingredients: Vec<RecipeIngredient>,
    pub missed_ingredients: Vec<RecipeIngredient>,
    pub likes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeIngredient {
    pub id: u64,
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub original: String,
}

/// Full recipe as returned by the information endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeDetail {
    pub id: u64,
    pub title: String,
    pub servings: u32,
    pub ready_in_minutes: u32,
    pub image: String,
    pub source_url: String,
    pub summary: String,
    pub analyzed_instructions: Vec<InstructionBlock>,
}

impl RecipeDetail {
    /// The steps of the first instruction block; empty when the API has none.
    pub fn steps(&self) -> &[Step] {
        self.analyzed_instructions
            .first()
            .map(|block| block.steps.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstructionBlock {
    pub name: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Step {
    pub number: u32,
    pub step: String,
    pub equipment: Vec<StepItem>,
    pub ingredients: Vec<StepItem>,
    pub length: Option<StepLength>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepItem {
    pub id: u64,
    pub name: String,
    pub localized_name: String,
}

/// Duration attached to a step, e.g. `{ "number": 10, "unit": "minutes" }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepLength {
    pub number: u32,
    pub unit: String,
}

impl StepLength {
    /// Minutes and hours convert; any other unit is taken as seconds.
    pub fn as_seconds(&self) -> u32 {
        let unit = self.unit.to_lowercase();
        let factor = if unit.starts_with("minute") {
            60
        } else if unit.starts_with("hour") {
            3600
        } else {
            1
        };
        self.number.saturating_mul(factor)
    }
}

/// Body of the query-search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct QuerySearchResponse {
    pub results: Vec<Recipe>,
}
