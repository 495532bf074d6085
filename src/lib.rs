//! Import recipes into Mealie from PDFs and short cooking videos.
//!
//! The flow is sequential glue: extract text from a PDF (or take the video
//! bytes as-is), hand the content to Gemini with a fixed instruction prompt,
//! get back structured recipe JSON normalized to one serving, reconcile the
//! free-text unit/food names against the Mealie catalog, and create the
//! recipe through the Mealie API.
//!
//! The [`server`] module serves the interactive surface; the functions below
//! expose the same flow as a library API.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mealie;
pub mod model;
pub mod pdf;
pub mod publish;
pub mod reconcile;
pub mod server;

pub use config::AppConfig;
pub use error::ImportError;
pub use gemini::{GeminiClient, RecipeExtractor};
pub use mealie::MealieClient;
pub use model::{ExtractedIngredient, ExtractedRecipe};
pub use publish::RecipePublisher;

/// Extract a recipe from PDF bytes using the given model.
pub async fn extract_recipe_from_pdf(
    config: &AppConfig,
    bytes: &[u8],
    model: &str,
) -> Result<ExtractedRecipe, ImportError> {
    let text = pdf::extract_text(bytes)?;
    let client = GeminiClient::new(config.gemini.clone());
    client.extract_from_text(&text, model).await
}

/// Extract a recipe from a cooking video using the given model.
pub async fn extract_recipe_from_video(
    config: &AppConfig,
    bytes: Vec<u8>,
    filename: &str,
    model: &str,
) -> Result<ExtractedRecipe, ImportError> {
    let client = GeminiClient::new(config.gemini.clone());
    client.extract_from_video(bytes, filename, model).await
}

/// Publish an extracted recipe to Mealie; returns the backend-assigned slug.
pub async fn publish_recipe(
    config: &AppConfig,
    recipe: &ExtractedRecipe,
) -> Result<String, ImportError> {
    let client = MealieClient::new(&config.mealie)?;
    RecipePublisher::new(&client).publish(recipe).await
}
