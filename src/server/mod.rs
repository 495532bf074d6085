//! Thin HTTP shell around the extract-then-publish flow.
//!
//! One page, a handful of JSON endpoints, inline error messages. There is no
//! session state: each request carries everything it needs, and the only
//! mutable state in the system is the per-publish resolver cache inside the
//! publisher.

mod routes;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::config::AppConfig;
use crate::gemini::RecipeExtractor;
use crate::mealie::MealieClient;

/// Shared application state; everything is constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub extractor: Arc<dyn RecipeExtractor>,
    pub mealie: Arc<MealieClient>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        extractor: Arc<dyn RecipeExtractor>,
        mealie: MealieClient,
    ) -> Self {
        AppState {
            config: Arc::new(config),
            extractor,
            mealie: Arc::new(mealie),
        }
    }
}

/// Build the router for the served interface.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/api/health", get(routes::health))
        .route("/api/models", get(routes::models))
        .route("/api/extract", post(routes::extract))
        .route("/api/publish", post(routes::publish))
        // Videos easily exceed the 2 MB default request limit
        .layer(DefaultBodyLimit::max(512 * 1024 * 1024))
        .with_state(state)
}
