//! Client for the Mealie recipe-management API.
//!
//! Consumed operations: list/create measurement units, list/create foods,
//! create a recipe with ingredients and steps, and the about endpoint used
//! as a connectivity probe. Authentication is a pre-issued bearer token
//! passed through from configuration.

use std::time::Duration;

use log::{debug, info};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::MealieConfig;
use crate::error::ImportError;

/// A measurement unit in the backend catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogUnit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
}

/// A food item in the backend catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogFood {
    pub id: String,
    pub name: String,
}

/// Paged list envelope used by the catalog endpoints.
///
/// `items` defaults on the field level, which makes serde require
/// `T: Default`; the catalog types derive it for that reason.
#[derive(Debug, Deserialize)]
struct Paged<T> {
    #[serde(default)]
    items: Vec<T>,
}

pub struct MealieClient {
    http: Client,
    base_url: String,
    api_token: String,
}

impl MealieClient {
    /// Create a new client from configuration.
    ///
    /// The operator-configured timeout applies to every backend request.
    pub fn new(config: &MealieConfig) -> Result<Self, ImportError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| {
                ImportError::ConfigError(config::ConfigError::Message(format!(
                    "failed to build HTTP client: {e}"
                )))
            })?;

        Ok(MealieClient {
            http,
            base_url: config.normalized_url(),
            api_token: config.api_token.clone(),
        })
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, endpoint))
            .bearer_auth(&self.api_token)
    }

    /// Send a request and map transport and auth failures to the taxonomy.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ImportError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ImportError::BackendUnreachable("request timed out".to_string())
            } else {
                ImportError::BackendUnreachable(e.to_string())
            }
        })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ImportError::AuthenticationFailed)
            }
            _ => Ok(response),
        }
    }

    /// Non-2xx bodies become `ValidationRejected` (client errors) or
    /// `BackendUnreachable` (the backend is up but not usable).
    async fn check(&self, response: Response) -> Result<Response, ImportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(ImportError::ValidationRejected(format!(
                "HTTP {}: {}",
                status, body
            )))
        } else {
            Err(ImportError::BackendUnreachable(format!(
                "HTTP {}: {}",
                status, body
            )))
        }
    }

    /// Connectivity probe; returns the backend version string.
    pub async fn about(&self) -> Result<String, ImportError> {
        let response = self.send(self.request(Method::GET, "/api/app/about")).await?;
        let response = self.check(response).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| ImportError::BackendUnreachable(e.to_string()))?;
        Ok(body["version"].as_str().unwrap_or("unknown").to_string())
    }

    /// Search catalog units by name fragment.
    pub async fn search_units(&self, query: &str) -> Result<Vec<CatalogUnit>, ImportError> {
        let response = self
            .send(
                self.request(Method::GET, "/api/units")
                    .query(&[("search", query)]),
            )
            .await?;
        let response = self.check(response).await?;
        let page: Paged<CatalogUnit> = response
            .json()
            .await
            .map_err(|e| ImportError::BackendUnreachable(e.to_string()))?;
        Ok(page.items)
    }

    /// Create a unit; the name doubles as abbreviation, matching how the
    /// extraction model emits units ("g", "tbsp").
    pub async fn create_unit(&self, name: &str) -> Result<CatalogUnit, ImportError> {
        let response = self
            .send(
                self.request(Method::POST, "/api/units")
                    .json(&json!({ "name": name, "abbreviation": name })),
            )
            .await?;
        let response = self.check(response).await?;
        let unit: CatalogUnit = response
            .json()
            .await
            .map_err(|e| ImportError::BackendUnreachable(e.to_string()))?;
        info!("Created unit '{}' ({})", unit.name, unit.id);
        Ok(unit)
    }

    /// Search catalog foods by name fragment.
    pub async fn search_foods(&self, query: &str) -> Result<Vec<CatalogFood>, ImportError> {
        let response = self
            .send(
                self.request(Method::GET, "/api/foods")
                    .query(&[("search", query)]),
            )
            .await?;
        let response = self.check(response).await?;
        let page: Paged<CatalogFood> = response
            .json()
            .await
            .map_err(|e| ImportError::BackendUnreachable(e.to_string()))?;
        Ok(page.items)
    }

    pub async fn create_food(&self, name: &str) -> Result<CatalogFood, ImportError> {
        let response = self
            .send(
                self.request(Method::POST, "/api/foods")
                    .json(&json!({ "name": name })),
            )
            .await?;
        let response = self.check(response).await?;
        let food: CatalogFood = response
            .json()
            .await
            .map_err(|e| ImportError::BackendUnreachable(e.to_string()))?;
        info!("Created food '{}' ({})", food.name, food.id);
        Ok(food)
    }

    /// Create an empty recipe shell; the backend assigns and returns the slug.
    ///
    /// Depending on version the backend answers with a bare string or an
    /// object carrying `slug`/`id`.
    pub async fn create_recipe_stub(&self, name: &str) -> Result<String, ImportError> {
        let response = self
            .send(
                self.request(Method::POST, "/api/recipes")
                    .json(&json!({ "name": name })),
            )
            .await?;
        let response = self.check(response).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| ImportError::BackendUnreachable(e.to_string()))?;

        let slug = match &body {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map
                .get("slug")
                .or_else(|| map.get("id"))
                .and_then(|v| v.as_str())
                .map(String::from),
            _ => None,
        };

        slug.ok_or_else(|| {
            ImportError::ValidationRejected("no slug in recipe creation response".to_string())
        })
    }

    /// Fetch the full recipe document for a slug.
    pub async fn get_recipe(&self, slug: &str) -> Result<Value, ImportError> {
        let response = self
            .send(self.request(Method::GET, &format!("/api/recipes/{slug}")))
            .await?;
        let response = self.check(response).await?;
        response
            .json()
            .await
            .map_err(|e| ImportError::BackendUnreachable(e.to_string()))
    }

    /// Replace the full recipe document for a slug.
    pub async fn update_recipe(&self, slug: &str, recipe: &Value) -> Result<(), ImportError> {
        debug!("Updating recipe {}", slug);
        let response = self
            .send(
                self.request(Method::PUT, &format!("/api/recipes/{slug}"))
                    .json(recipe),
            )
            .await?;
        self.check(response).await?;
        Ok(())
    }
}
