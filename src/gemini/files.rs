//! Gemini Files API: resumable upload, processing poll, cleanup.
//!
//! Videos above the inline size limit must be uploaded first and referenced
//! by URI in the generate call. Uploaded files briefly sit in `PROCESSING`
//! state before they become usable.

use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::GeminiConfig;
use crate::error::ImportError;

/// Seconds between processing-state polls
const POLL_INTERVAL_SECS: u64 = 3;
/// Give up waiting after this many polls (~3 minutes)
const MAX_POLLS: u32 = 60;

/// Handle to a file uploaded to the provider
#[derive(Debug, Clone)]
pub(crate) struct UploadedFile {
    /// Resource name, e.g. "files/abc123"
    pub name: String,
    /// URI used to reference the file in generate calls
    pub uri: String,
    pub state: String,
}

fn parse_file_resource(value: &Value) -> Result<UploadedFile, ImportError> {
    // Upload responses wrap the resource in "file"; GET returns it bare.
    let file = value.get("file").unwrap_or(value);
    let name = file["name"]
        .as_str()
        .ok_or_else(|| ImportError::TransientNetworkError("file upload response has no name".to_string()))?;
    let uri = file["uri"].as_str().unwrap_or_default();
    let state = file["state"].as_str().unwrap_or("PROCESSING");

    Ok(UploadedFile {
        name: name.to_string(),
        uri: uri.to_string(),
        state: state.to_string(),
    })
}

/// Upload a video via the resumable upload protocol and return its handle.
pub(crate) async fn upload_video(
    http: &Client,
    config: &GeminiConfig,
    bytes: Vec<u8>,
    mime_type: &str,
) -> Result<UploadedFile, ImportError> {
    let start_url = format!(
        "{}/upload/v1beta/files?key={}",
        config.base_url.trim_end_matches('/'),
        config.api_key
    );

    let start = http
        .post(&start_url)
        .header("X-Goog-Upload-Protocol", "resumable")
        .header("X-Goog-Upload-Command", "start")
        .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
        .header("X-Goog-Upload-Header-Content-Type", mime_type)
        .json(&json!({ "file": { "display_name": "recipe-video" } }))
        .send()
        .await
        .map_err(|e| ImportError::TransientNetworkError(e.to_string()))?;

    if !start.status().is_success() {
        let status = start.status();
        let body = start.text().await.unwrap_or_default();
        return Err(super::classify_status(status, &body));
    }

    let upload_url = start
        .headers()
        .get("x-goog-upload-url")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ImportError::TransientNetworkError("upload start response carried no upload URL".to_string())
        })?
        .to_string();

    debug!("Uploading {} video bytes", bytes.len());

    let finalize = http
        .post(&upload_url)
        .header("X-Goog-Upload-Offset", "0")
        .header("X-Goog-Upload-Command", "upload, finalize")
        .body(bytes)
        .send()
        .await
        .map_err(|e| ImportError::TransientNetworkError(e.to_string()))?;

    if !finalize.status().is_success() {
        let status = finalize.status();
        let body = finalize.text().await.unwrap_or_default();
        return Err(super::classify_status(status, &body));
    }

    let body: Value = finalize
        .json()
        .await
        .map_err(|e| ImportError::TransientNetworkError(e.to_string()))?;

    parse_file_resource(&body)
}

/// Poll the uploaded file until the provider has finished processing it.
///
/// The provider defines what happens to over-long videos (it may reject them
/// outright); our only local bound is the poll cap.
pub(crate) async fn wait_until_active(
    http: &Client,
    config: &GeminiConfig,
    mut file: UploadedFile,
) -> Result<UploadedFile, ImportError> {
    let mut polls = 0;

    while file.state == "PROCESSING" {
        polls += 1;
        if polls > MAX_POLLS {
            return Err(ImportError::TransientNetworkError(format!(
                "video still processing after {}s, giving up",
                MAX_POLLS as u64 * POLL_INTERVAL_SECS
            )));
        }

        tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await;

        let url = format!(
            "{}/v1beta/{}?key={}",
            config.base_url.trim_end_matches('/'),
            file.name,
            config.api_key
        );
        let response = http
            .get(&url)
            .send()
            .await
            .map_err(|e| ImportError::TransientNetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(super::classify_status(status, &body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ImportError::TransientNetworkError(e.to_string()))?;
        file = parse_file_resource(&body)?;
        debug!("Video {} state: {}", file.name, file.state);
    }

    if file.state == "FAILED" {
        return Err(ImportError::TransientNetworkError(
            "provider failed to process the video".to_string(),
        ));
    }

    Ok(file)
}

/// Delete an uploaded file. Best effort; a leftover file expires on its own.
pub(crate) async fn delete_file(http: &Client, config: &GeminiConfig, file: &UploadedFile) {
    let url = format!(
        "{}/v1beta/{}?key={}",
        config.base_url.trim_end_matches('/'),
        file.name,
        config.api_key
    );
    match http.delete(&url).send().await {
        Ok(response) if response.status().is_success() => {
            debug!("Deleted uploaded video {}", file.name)
        }
        Ok(response) => warn!(
            "Could not delete uploaded video {}: HTTP {}",
            file.name,
            response.status()
        ),
        Err(e) => warn!("Could not delete uploaded video {}: {}", file.name, e),
    }
}
