//! Publishing a fully extracted recipe to the backend.
//!
//! The backend wants recipes created in three steps: POST the bare name to
//! get a slug, GET the created document, then PUT it back with description,
//! yield, reconciled ingredients and steps merged in. Catalog units/foods
//! created while reconciling are not rolled back if the final PUT fails;
//! they are valid catalog entries either way.

use log::info;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ImportError;
use crate::mealie::MealieClient;
use crate::model::ExtractedRecipe;
use crate::reconcile::{CatalogResolver, ResolvedRef};

pub struct RecipePublisher<'a> {
    client: &'a MealieClient,
}

impl<'a> RecipePublisher<'a> {
    pub fn new(client: &'a MealieClient) -> Self {
        RecipePublisher { client }
    }

    /// Create the recipe in the backend and return its slug.
    ///
    /// Every ingredient is reconciled through one [`CatalogResolver`] scoped
    /// to this call, sequentially and in recipe order; step order is likewise
    /// preserved.
    pub async fn publish(&self, recipe: &ExtractedRecipe) -> Result<String, ImportError> {
        let name = if recipe.name.trim().is_empty() {
            "Untitled recipe"
        } else {
            recipe.name.trim()
        };

        let slug = self.client.create_recipe_stub(name).await?;
        info!("Created recipe '{}' (slug: {})", name, slug);

        let mut document = self.client.get_recipe(&slug).await?;

        let mut resolver = CatalogResolver::new(self.client);
        let mut ingredients = Vec::with_capacity(recipe.ingredients.len());
        for ingredient in &recipe.ingredients {
            let unit = resolver.resolve_unit(ingredient.unit.as_deref()).await?;
            let food = resolver.resolve_food(Some(&ingredient.food)).await?;

            ingredients.push(json!({
                "quantity": ingredient.quantity,
                "unit": as_reference(unit),
                "food": as_reference(food),
                "note": ingredient.note,
            }));
        }

        let steps: Vec<Value> = recipe
            .steps
            .iter()
            .map(|text| json!({ "id": Uuid::new_v4().to_string(), "text": text }))
            .collect();

        let fields = document.as_object_mut().ok_or_else(|| {
            ImportError::ValidationRejected(format!(
                "recipe document for '{slug}' is not a JSON object"
            ))
        })?;
        fields.insert("description".to_string(), json!(recipe.description));
        fields.insert("recipeYield".to_string(), json!("1 serving"));
        fields.insert("recipeIngredient".to_string(), json!(ingredients));
        fields.insert("recipeInstructions".to_string(), json!(steps));

        self.client.update_recipe(&slug, &document).await?;
        info!(
            "Published recipe {} with {} ingredients and {} steps",
            slug,
            recipe.ingredients.len(),
            recipe.steps.len()
        );

        Ok(slug)
    }
}

fn as_reference(resolved: Option<ResolvedRef>) -> Value {
    match resolved {
        Some(r) => json!({ "id": r.id, "name": r.name }),
        None => Value::Null,
    }
}
