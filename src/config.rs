use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Top-level application configuration
///
/// Loaded once at process start and handed to each client at construction.
/// Nothing reads ambient global state, so tests can inject fake endpoints
/// and tokens.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Mealie backend connection settings
    #[serde(default)]
    pub mealie: MealieConfig,
    /// Gemini API settings
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Configuration for the Mealie backend API
#[derive(Debug, Deserialize, Clone)]
pub struct MealieConfig {
    /// Base URL of the Mealie instance (trailing slash is stripped)
    #[serde(default = "default_mealie_url")]
    pub base_url: String,
    /// Pre-issued bearer token for the Mealie API
    #[serde(default)]
    pub api_token: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for MealieConfig {
    fn default() -> Self {
        Self {
            base_url: default_mealie_url(),
            api_token: String::new(),
            timeout: default_timeout(),
        }
    }
}

impl MealieConfig {
    /// Base URL without a trailing slash, ready for path concatenation
    pub fn normalized_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.api_token.is_empty()
    }
}

/// Configuration for the Gemini API
#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// API key for authentication
    #[serde(default)]
    pub api_key: String,
    /// API endpoint; overridable so tests can point at a local mock
    #[serde(default = "default_gemini_url")]
    pub base_url: String,
    /// Model used when the request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Models offered in the selector, fastest/cheapest first.
    /// The provider changes this list over time; it is config, not code.
    #[serde(default = "default_models")]
    pub available_models: Vec<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_gemini_url(),
            default_model: default_model(),
            available_models: default_models(),
        }
    }
}

impl GeminiConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Configuration for the serving surface
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

// Default value functions
fn default_mealie_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_models() -> Vec<String> {
    vec![
        "gemini-2.5-flash".to_string(),
        "gemini-2.5-flash-lite".to_string(),
        "gemini-2.0-flash".to_string(),
        "gemini-2.0-flash-lite".to_string(),
        "gemini-2.5-pro".to_string(),
        "gemini-flash-lite-latest".to_string(),
    ]
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with MEALIE_IMPORT__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: MEALIE_IMPORT__MEALIE__API_TOKEN
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("config").required(false))
            // Use double underscore for nested: MEALIE_IMPORT__GEMINI__API_KEY
            .add_source(
                Environment::with_prefix("MEALIE_IMPORT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Returns human-readable messages for every missing credential.
    ///
    /// An incomplete configuration is not fatal; the server still starts and
    /// surfaces these inline so the operator can fix the environment.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.mealie.base_url.is_empty() {
            errors.push("MEALIE_IMPORT__MEALIE__BASE_URL is not configured".to_string());
        }
        if self.mealie.api_token.is_empty() {
            errors.push("MEALIE_IMPORT__MEALIE__API_TOKEN is not configured".to_string());
        }
        if self.gemini.api_key.is_empty() {
            errors.push("MEALIE_IMPORT__GEMINI__API_KEY is not configured".to_string());
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
