mod files;
mod prompt;

pub use prompt::{build_text_prompt, RECIPE_TEXT_PROMPT, RECIPE_VIDEO_PROMPT};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::config::GeminiConfig;
use crate::error::ImportError;
use crate::model::ExtractedRecipe;

/// Videos at or below this size are sent inline as base64; larger ones go
/// through the Files API. The provider caps inline requests at 20 MB total,
/// so leave headroom for the prompt and the base64 overhead.
const INLINE_VIDEO_LIMIT: usize = 14 * 1024 * 1024;

/// The seam between the presentation layer and the AI model.
///
/// One extraction call per user action; no retry happens behind this trait.
/// Retrying with a different model is the caller's (i.e. the user's) choice,
/// and each retry is a fresh call carrying the newly selected model id.
#[async_trait]
pub trait RecipeExtractor: Send + Sync {
    /// Extract a recipe from plain text (e.g. PDF content).
    async fn extract_from_text(
        &self,
        text: &str,
        model: &str,
    ) -> Result<ExtractedRecipe, ImportError>;

    /// Extract a recipe from a cooking video.
    async fn extract_from_video(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        model: &str,
    ) -> Result<ExtractedRecipe, ImportError>;
}

/// Client for the Gemini generateContent API
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client from configuration.
    ///
    /// No timeout is set on the generate call; the model call blocks until
    /// the provider responds or errors.
    pub fn new(config: GeminiConfig) -> Self {
        GeminiClient {
            http: Client::new(),
            config,
        }
    }

    /// One generateContent round trip; returns the first candidate's text.
    async fn generate(&self, model: &str, parts: Value) -> Result<String, ImportError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url.trim_end_matches('/'),
            model,
            self.config.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&json!({ "contents": [{ "parts": parts }] }))
            .send()
            .await
            .map_err(|e| ImportError::TransientNetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ImportError::MalformedResponse(e.to_string()))?;
        debug!("{:?}", body);

        let text = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                ImportError::MalformedResponse(
                    "no text candidate in model response".to_string(),
                )
            })?;

        Ok(text.to_string())
    }

    fn mime_type_for(filename: &str) -> &'static str {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mov" => "video/quicktime",
            "avi" => "video/x-msvideo",
            "webm" => "video/webm",
            "mkv" => "video/x-matroska",
            // URL downloads and unknown extensions are treated as mp4
            _ => "video/mp4",
        }
    }
}

#[async_trait]
impl RecipeExtractor for GeminiClient {
    /// Empty text is submitted like any other: sparse input (e.g. an
    /// image-only PDF) is the model's problem, and the answer goes through
    /// the same parse path — valid JSON becomes a (possibly empty) recipe,
    /// anything else is `MalformedResponse`. Deterministic either way.
    async fn extract_from_text(
        &self,
        text: &str,
        model: &str,
    ) -> Result<ExtractedRecipe, ImportError> {
        info!("Extracting recipe from {} characters of text with {}", text.len(), model);

        let parts = json!([{ "text": build_text_prompt(text) }]);
        let answer = self.generate(model, parts).await?;
        let recipe = parse_recipe(&answer)?;

        info!("Extracted recipe: {}", recipe.name);
        Ok(recipe)
    }

    async fn extract_from_video(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        model: &str,
    ) -> Result<ExtractedRecipe, ImportError> {
        let mime_type = Self::mime_type_for(filename);
        info!(
            "Extracting recipe from video {} ({:.1} MB, {}) with {}",
            filename,
            bytes.len() as f64 / 1024.0 / 1024.0,
            mime_type,
            model
        );

        let answer = if bytes.len() <= INLINE_VIDEO_LIMIT {
            let parts = json!([
                { "inline_data": { "mime_type": mime_type, "data": BASE64.encode(&bytes) } },
                { "text": RECIPE_VIDEO_PROMPT },
            ]);
            self.generate(model, parts).await?
        } else {
            let uploaded = files::upload_video(&self.http, &self.config, bytes, mime_type).await?;
            let uploaded = files::wait_until_active(&self.http, &self.config, uploaded).await?;

            let parts = json!([
                { "file_data": { "mime_type": mime_type, "file_uri": uploaded.uri } },
                { "text": RECIPE_VIDEO_PROMPT },
            ]);
            let result = self.generate(model, parts).await;

            files::delete_file(&self.http, &self.config, &uploaded).await;
            result?
        };

        let recipe = parse_recipe(&answer)?;
        info!("Extracted recipe from video: {}", recipe.name);
        Ok(recipe)
    }
}

/// Map a non-success provider status to the extraction error taxonomy.
fn classify_status(status: StatusCode, body: &str) -> ImportError {
    match status.as_u16() {
        429 => ImportError::QuotaExceeded {
            retry_after: parse_retry_seconds(body),
        },
        404 => ImportError::ModelUnavailable("model not found".to_string()),
        400..=499 => ImportError::ModelUnavailable(snippet(body)),
        _ => ImportError::TransientNetworkError(format!("HTTP {}: {}", status, snippet(body))),
    }
}

/// Pull a retry delay in seconds out of a quota error body, if one is there.
/// The provider uses both prose ("retry in 39s") and a structured
/// `"retryDelay": "39s"` field depending on the endpoint.
fn parse_retry_seconds(body: &str) -> Option<u64> {
    for marker in ["retry in ", "\"retryDelay\": \"", "\"retryDelay\":\""] {
        if let Some(idx) = body.find(marker) {
            let digits: String = body[idx + marker.len()..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if let Ok(seconds) = digits.parse() {
                return Some(seconds);
            }
        }
    }
    None
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > 300 {
        let cut: String = trimmed.chars().take(300).collect();
        format!("{cut}…")
    } else {
        trimmed.to_string()
    }
}

/// Parse the model's answer into a recipe.
///
/// Malformed JSON is a distinct failure from transport errors and is never
/// coerced into an empty recipe.
fn parse_recipe(answer: &str) -> Result<ExtractedRecipe, ImportError> {
    let cleaned = clean_json_response(answer);
    let recipe: ExtractedRecipe = serde_json::from_str(&cleaned)
        .map_err(|e| ImportError::MalformedResponse(e.to_string()))?;
    Ok(recipe.normalize())
}

/// Extract the JSON object from a model answer.
///
/// Models wrap answers in markdown fences or chat around the object despite
/// instructions. Strip ```json fences, then take the first brace-balanced
/// object, skipping braces inside string literals.
fn clean_json_response(text: &str) -> String {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let Some(start) = cleaned.find('{') else {
        return cleaned.to_string();
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in cleaned[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return cleaned[start..start + i + 1].to_string();
                }
            }
            _ => {}
        }
    }

    // Unbalanced; hand the tail to serde for a proper parse error
    cleaned[start..].to_string()
}
