/// Instruction prompt for extracting a recipe from plain text (PDF content).
///
/// The prompt is part of the external interface to the model, not internal
/// logic: it fixes the output schema, the target language (English) and the
/// one-serving normalization. Loaded from `prompt_text.txt` at compile time
/// so it can be edited without dealing with Rust string syntax.
pub const RECIPE_TEXT_PROMPT: &str = include_str!("prompt_text.txt");

/// Instruction prompt for extracting a recipe from a video. Same contract as
/// [`RECIPE_TEXT_PROMPT`], phrased for multimodal input.
pub const RECIPE_VIDEO_PROMPT: &str = include_str!("prompt_video.txt");

/// Build the full text-extraction prompt with the recipe text appended.
pub fn build_text_prompt(recipe_text: &str) -> String {
    format!("{RECIPE_TEXT_PROMPT}---\n{recipe_text}\n---")
}
