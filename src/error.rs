use thiserror::Error;

/// Errors that can occur while extracting or publishing a recipe.
///
/// Extraction failures (`QuotaExceeded`, `ModelUnavailable`, `MalformedResponse`,
/// `TransientNetworkError`) and publish failures (`AuthenticationFailed`,
/// `BackendUnreachable`, `ValidationRejected`) are surfaced verbatim to the user;
/// none are retried automatically.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The uploaded bytes are not a parseable PDF
    #[error("Not a valid PDF document: {0}")]
    InvalidDocument(String),

    /// The AI model rejected the request with a quota error (HTTP 429)
    #[error("AI quota exhausted{}. Switch to a different model or try again later.",
        match .retry_after { Some(s) => format!(" (retry in ~{s}s)"), None => String::new() })]
    QuotaExceeded { retry_after: Option<u64> },

    /// The requested model does not exist or refused the request
    #[error("Model unavailable: {0}. Pick a different model from the selector.")]
    ModelUnavailable(String),

    /// The AI model answered, but not with parseable recipe JSON
    #[error("AI returned malformed recipe data: {0}")]
    MalformedResponse(String),

    /// Transport-level failure talking to the AI model
    #[error("Network error talking to the AI model: {0}. Check connectivity and retry.")]
    TransientNetworkError(String),

    /// The backend rejected our API token
    #[error("Mealie rejected the API token. Check MEALIE_IMPORT__MEALIE__API_TOKEN.")]
    AuthenticationFailed,

    /// The backend could not be reached at all
    #[error("Could not reach Mealie: {0}. Is the server up and the URL correct?")]
    BackendUnreachable(String),

    /// The backend refused the recipe payload
    #[error("Mealie rejected the recipe: {0}")]
    ValidationRejected(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_message_includes_retry_hint() {
        let err = ImportError::QuotaExceeded {
            retry_after: Some(42),
        };
        assert!(err.to_string().contains("~42s"));

        let err = ImportError::QuotaExceeded { retry_after: None };
        assert!(!err.to_string().contains("retry in"));
        assert!(err.to_string().contains("different model"));
    }
}
