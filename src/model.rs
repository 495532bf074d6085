use serde::{Deserialize, Serialize};

/// A recipe as returned by the extraction model, quantities already scaled
/// to one serving by the instruction prompt.
///
/// Produced once per extraction call and not mutated afterwards, except for
/// user edits in the preview step before publishing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedRecipe {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<ExtractedIngredient>,
    #[serde(default)]
    pub steps: Vec<String>,
}

/// One ingredient line of an extracted recipe.
///
/// `quantity` and `unit` are absent for "to taste" items; only the food name
/// is required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedIngredient {
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    pub food: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl ExtractedRecipe {
    /// Clean up model output quirks in place.
    ///
    /// The prompt tells the model to use 0 for "to taste" quantities and ""
    /// for missing units; both become `None` here so downstream code has a
    /// single representation of absence. Whitespace-only strings are treated
    /// as empty.
    pub fn normalize(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();

        for ingredient in &mut self.ingredients {
            ingredient.food = ingredient.food.trim().to_string();
            ingredient.quantity = ingredient.quantity.filter(|q| *q > 0.0);
            ingredient.unit = ingredient
                .unit
                .take()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty());
            ingredient.note = ingredient
                .note
                .take()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty());
        }

        self.steps = self
            .steps
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        self
    }
}
