use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mealie_import::config::AppConfig;
use mealie_import::gemini::RecipeExtractor;
use mealie_import::mealie::MealieClient;
use mealie_import::model::{ExtractedIngredient, ExtractedRecipe};
use mealie_import::server::{build_app, AppState};
use mealie_import::ImportError;

/// Extractor double: records the model it was called with and answers with a
/// canned result.
struct FakeExtractor {
    last_model: Mutex<Option<String>>,
    quota_exhausted: bool,
}

impl FakeExtractor {
    fn new(quota_exhausted: bool) -> Self {
        FakeExtractor {
            last_model: Mutex::new(None),
            quota_exhausted,
        }
    }

    fn canned_recipe() -> ExtractedRecipe {
        ExtractedRecipe {
            name: "Omelette".to_string(),
            description: "Quick breakfast.".to_string(),
            ingredients: vec![ExtractedIngredient {
                quantity: Some(2.0),
                unit: None,
                food: "egg".to_string(),
                note: None,
            }],
            steps: vec!["Beat eggs.".to_string(), "Cook.".to_string()],
        }
    }

    fn answer(&self, model: &str) -> Result<ExtractedRecipe, ImportError> {
        *self.last_model.lock().unwrap() = Some(model.to_string());
        if self.quota_exhausted {
            Err(ImportError::QuotaExceeded {
                retry_after: Some(30),
            })
        } else {
            Ok(Self::canned_recipe())
        }
    }
}

#[async_trait]
impl RecipeExtractor for FakeExtractor {
    async fn extract_from_text(
        &self,
        _text: &str,
        model: &str,
    ) -> Result<ExtractedRecipe, ImportError> {
        self.answer(model)
    }

    async fn extract_from_video(
        &self,
        _bytes: Vec<u8>,
        _filename: &str,
        model: &str,
    ) -> Result<ExtractedRecipe, ImportError> {
        self.answer(model)
    }
}

async fn spawn_app(extractor: Arc<FakeExtractor>, mealie_url: &str) -> String {
    let mut config = AppConfig::default();
    config.mealie.base_url = mealie_url.to_string();
    config.mealie.api_token = "test-token".to_string();
    config.gemini.api_key = "test-key".to_string();

    let mealie = MealieClient::new(&config.mealie).unwrap();
    let state = AppState::new(config, extractor, mealie);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_app(state)).await.unwrap();
    });

    format!("http://{addr}")
}

fn video_form(model: &str) -> reqwest::multipart::Form {
    let file = reqwest::multipart::Part::bytes(vec![0u8; 64])
        .file_name("clip.mp4")
        .mime_str("video/mp4")
        .unwrap();
    reqwest::multipart::Form::new()
        .part("file", file)
        .text("model", model.to_string())
}

#[tokio::test]
async fn models_endpoint_lists_configured_models() {
    let extractor = Arc::new(FakeExtractor::new(false));
    let base = spawn_app(extractor, "http://127.0.0.1:1").await;

    let body: serde_json::Value = reqwest::get(format!("{base}/api/models"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["default"], "gemini-2.5-flash");
    assert!(body["models"]
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m == "gemini-2.5-pro"));
}

#[tokio::test]
async fn extract_uses_the_selected_model() {
    let extractor = Arc::new(FakeExtractor::new(false));
    let base = spawn_app(extractor.clone(), "http://127.0.0.1:1").await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/extract"))
        .multipart(video_form("gemini-2.5-pro"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["model"], "gemini-2.5-pro");
    assert_eq!(body["recipe"]["name"], "Omelette");
    assert_eq!(body["recipe"]["steps"].as_array().unwrap().len(), 2);
    assert_eq!(
        extractor.last_model.lock().unwrap().as_deref(),
        Some("gemini-2.5-pro")
    );
}

/// Quota errors surface as inline messages with an actionable hint, not as a
/// dead process.
#[tokio::test]
async fn quota_error_surfaces_inline_with_429() {
    let extractor = Arc::new(FakeExtractor::new(true));
    let base = spawn_app(extractor, "http://127.0.0.1:1").await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/extract"))
        .multipart(video_form("gemini-2.5-flash"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 429);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "quota_exceeded");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("different model"));
}

#[tokio::test]
async fn invalid_pdf_is_rejected_inline() {
    let extractor = Arc::new(FakeExtractor::new(false));
    let base = spawn_app(extractor, "http://127.0.0.1:1").await;

    let file = reqwest::multipart::Part::bytes(b"not a pdf".to_vec())
        .file_name("recipe.pdf")
        .mime_str("application/pdf")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", file);

    let response = reqwest::Client::new()
        .post(format!("{base}/api/extract"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid_document");
}

#[tokio::test]
async fn health_reports_backend_version() {
    let mut mealie = mockito::Server::new_async().await;
    let _about = mealie
        .mock("GET", "/api/app/about")
        .with_status(200)
        .with_body(r#"{"version": "v1.12.0"}"#)
        .create_async()
        .await;

    let extractor = Arc::new(FakeExtractor::new(false));
    let base = spawn_app(extractor, &mealie.url()).await;

    let response = reqwest::get(format!("{base}/api/health")).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["mealie"]["connected"], true);
    assert_eq!(body["mealie"]["version"], "v1.12.0");
}

#[tokio::test]
async fn health_degrades_when_backend_is_down() {
    let extractor = Arc::new(FakeExtractor::new(false));
    let base = spawn_app(extractor, "http://127.0.0.1:1").await;

    let response = reqwest::get(format!("{base}/api/health")).await.unwrap();
    assert_eq!(response.status(), 503);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["mealie"]["connected"], false);
}
