//! HTTP client for a remote object-detection inference server.
//!
//! The server exposes two endpoints:
//!
//! - `POST {base}/detect` -- body is the encoded image; responds with
//!   `{"detections": [{"label", "score", "box": [x1, y1, x2, y2]}]}`.
//! - `POST {base}/annotate` -- multipart with an `image` part and a
//!   `detections` JSON part; responds with the rendered image bytes.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sightline_core::detection::{Detection, Detector, DetectorError};

/// Errors from the inference server HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum RemoteDetectorError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("Inference server error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The detections could not be encoded for the annotate call.
    #[error("Failed to encode detections: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<RemoteDetectorError> for DetectorError {
    fn from(err: RemoteDetectorError) -> Self {
        match err {
            RemoteDetectorError::Request(e) if e.is_decode() => {
                DetectorError::InvalidResponse(e.to_string())
            }
            RemoteDetectorError::Request(e) => DetectorError::Unavailable(e.to_string()),
            e @ RemoteDetectorError::ApiError { .. } => DetectorError::Unavailable(e.to_string()),
            e @ RemoteDetectorError::Encode(_) => DetectorError::InvalidResponse(e.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    detections: Vec<Detection>,
}

#[derive(Serialize)]
struct AnnotateDetections<'a> {
    detections: &'a [Detection],
}

/// [`Detector`] backed by an inference server reachable over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteDetector {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteDetector {
    /// Create a client for the server at `base_url`, e.g. `http://host:8000`.
    ///
    /// Every request is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request_detections(
        &self,
        image: &[u8],
    ) -> Result<Vec<Detection>, RemoteDetectorError> {
        let response = self
            .client
            .post(format!("{}/detect", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await?;

        let parsed: DetectResponse = Self::ensure_success(response).await?.json().await?;
        Ok(parsed.detections)
    }

    async fn request_annotation(
        &self,
        image: &[u8],
        detections: &[Detection],
    ) -> Result<Vec<u8>, RemoteDetectorError> {
        let payload = serde_json::to_string(&AnnotateDetections { detections })?;

        let form = reqwest::multipart::Form::new()
            .part(
                "image",
                reqwest::multipart::Part::bytes(image.to_vec()).file_name("image"),
            )
            .text("detections", payload);

        let response = self
            .client
            .post(format!("{}/annotate", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let bytes = Self::ensure_success(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Return the response unchanged on success, or an
    /// [`RemoteDetectorError::ApiError`] carrying status and body.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RemoteDetectorError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RemoteDetectorError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Detector for RemoteDetector {
    async fn detect(&self, image: &[u8]) -> Result<Vec<Detection>, DetectorError> {
        let detections = self.request_detections(image).await?;
        tracing::debug!(count = detections.len(), "Inference server returned detections");
        Ok(detections)
    }

    async fn annotate(
        &self,
        image: &[u8],
        detections: &[Detection],
    ) -> Result<Vec<u8>, DetectorError> {
        Ok(self.request_annotation(image, detections).await?)
    }
}
