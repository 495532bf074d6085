use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use log::{error, info, warn};
use serde::Serialize;

use crate::error::ImportError;
use crate::model::ExtractedRecipe;
use crate::pdf;
use crate::publish::RecipePublisher;

use super::AppState;

const INDEX_HTML: &str = include_str!("index.html");

/// Inline error payload shown by the page; no process exit codes here, every
/// failure returns control to the interactive flow.
#[derive(Serialize)]
pub struct ApiError {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for ImportError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            ImportError::InvalidDocument(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_document"),
            ImportError::QuotaExceeded { .. } => (StatusCode::TOO_MANY_REQUESTS, "quota_exceeded"),
            ImportError::ModelUnavailable(_) => (StatusCode::BAD_GATEWAY, "model_unavailable"),
            ImportError::MalformedResponse(_) => (StatusCode::BAD_GATEWAY, "malformed_response"),
            ImportError::TransientNetworkError(_) => (StatusCode::BAD_GATEWAY, "network_error"),
            ImportError::AuthenticationFailed => (StatusCode::UNAUTHORIZED, "authentication_failed"),
            ImportError::BackendUnreachable(_) => (StatusCode::BAD_GATEWAY, "backend_unreachable"),
            ImportError::ValidationRejected(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_rejected"),
            ImportError::ConfigError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
        };
        error!("{}", self);
        let body = ApiError {
            error: kind,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    mealie: MealieHealth,
    configuration: Vec<String>,
}

#[derive(Serialize)]
pub struct MealieHealth {
    connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Connectivity probe against the backend's about endpoint.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mealie = match state.mealie.about().await {
        Ok(version) => MealieHealth {
            connected: true,
            version: Some(version),
            error: None,
        },
        Err(e) => MealieHealth {
            connected: false,
            version: None,
            error: Some(e.to_string()),
        },
    };

    let configuration = state.config.validate();
    let healthy = mealie.connected && configuration.is_empty();
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" },
            mealie,
            configuration,
        }),
    )
}

#[derive(Serialize)]
pub struct ModelsResponse {
    default: String,
    models: Vec<String>,
}

pub async fn models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        default: state.config.gemini.default_model.clone(),
        models: state.config.gemini.available_models.clone(),
    })
}

#[derive(Serialize)]
pub struct ExtractResponse {
    recipe: ExtractedRecipe,
    model: String,
}

/// Multipart upload: a `file` part (PDF or video) and an optional `model`
/// part. PDF is recognized by content type or extension; everything else is
/// treated as video.
pub async fn extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, ImportError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut model = state.config.gemini.default_model.clone();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ImportError::InvalidDocument(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ImportError::InvalidDocument(e.to_string()))?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            Some("model") => {
                let requested = field.text().await.unwrap_or_default();
                if !requested.trim().is_empty() {
                    model = requested.trim().to_string();
                }
            }
            _ => {}
        }
    }

    let Some((filename, content_type, bytes)) = file else {
        return Err(ImportError::InvalidDocument(
            "no file in upload".to_string(),
        ));
    };

    info!("Received {} ({} bytes), model {}", filename, bytes.len(), model);

    let recipe = if is_pdf(&filename, &content_type) {
        let text = pdf::extract_text(&bytes)?;
        if text.is_empty() {
            warn!("No extractable text in {}; submitting anyway", filename);
        }
        state.extractor.extract_from_text(&text, &model).await?
    } else {
        state
            .extractor
            .extract_from_video(bytes, &filename, &model)
            .await?
    };

    Ok(Json(ExtractResponse { recipe, model }))
}

fn is_pdf(filename: &str, content_type: &str) -> bool {
    content_type.eq_ignore_ascii_case("application/pdf")
        || filename.to_ascii_lowercase().ends_with(".pdf")
}

#[derive(Serialize)]
pub struct PublishResponse {
    slug: String,
}

/// Publish the (possibly user-edited) extracted recipe to the backend.
pub async fn publish(
    State(state): State<AppState>,
    Json(recipe): Json<ExtractedRecipe>,
) -> Result<Json<PublishResponse>, ImportError> {
    let recipe = recipe.normalize();
    let publisher = RecipePublisher::new(&state.mealie);
    let slug = publisher.publish(&recipe).await?;
    Ok(Json(PublishResponse { slug }))
}
