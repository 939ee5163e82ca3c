//! Shared harness for the API integration tests.
//!
//! Builds the production router over a per-test SQLite pool, a temporary
//! image directory and a scripted detector.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_body_util::BodyExt;
use sightline_api::config::ServerConfig;
use sightline_api::router::build_app_router;
use sightline_api::state::AppState;
use sightline_core::detection::{BoundingBox, Detection, Detector, DetectorError};
use sightline_core::storage::LocalImageStore;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

/// Smallest input the upload sniffer accepts as PNG.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRtest-image";

const BOUNDARY: &str = "sightline-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        upload_dir: String::new(),
        detector_url: "http://127.0.0.1:0".to_string(),
        detector_timeout_secs: 5,
        max_upload_bytes: 1024 * 1024,
    }
}

pub fn detection(label: &str, score: f64) -> Detection {
    Detection {
        label: label.to_string(),
        score,
        bbox: BoundingBox {
            xmin: 10.0,
            ymin: 20.0,
            xmax: 110.0,
            ymax: 220.0,
        },
    }
}

/// Detector that answers every image with a fixed list.
pub struct StubDetector {
    pub detections: Vec<Detection>,
}

#[async_trait]
impl Detector for StubDetector {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<Detection>, DetectorError> {
        Ok(self.detections.clone())
    }

    async fn annotate(
        &self,
        image: &[u8],
        _detections: &[Detection],
    ) -> Result<Vec<u8>, DetectorError> {
        Ok(image.to_vec())
    }
}

/// Detector whose backend is down.
pub struct FailingDetector;

#[async_trait]
impl Detector for FailingDetector {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<Detection>, DetectorError> {
        Err(DetectorError::Unavailable("connection refused".into()))
    }

    async fn annotate(
        &self,
        _image: &[u8],
        _detections: &[Detection],
    ) -> Result<Vec<u8>, DetectorError> {
        Err(DetectorError::Unavailable("connection refused".into()))
    }
}

/// Detections produced by the default stub, in order.
pub fn default_detections() -> Vec<Detection> {
    vec![
        detection("person", 0.9),
        detection("car", 0.8),
        detection("person", 0.85),
    ]
}

/// The router plus the image directory it writes to.
///
/// The directory lives as long as this value.
pub struct TestApp {
    router: Router,
    pub images_dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

pub fn build_test_app(pool: SqlitePool) -> TestApp {
    build_test_app_with_detector(
        pool,
        Arc::new(StubDetector {
            detections: default_detections(),
        }),
    )
}

pub fn build_test_app_with_detector(pool: SqlitePool, detector: Arc<dyn Detector>) -> TestApp {
    let images_dir = tempfile::tempdir().expect("temp dir should be created");
    let mut config = test_config();
    config.upload_dir = images_dir.path().display().to_string();

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        images: Arc::new(LocalImageStore::new(images_dir.path())),
        detector,
    };

    TestApp {
        router: build_app_router(state, &config),
        images_dir,
    }
}

/// `Authorization` header value for HTTP Basic credentials.
pub fn basic(username: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{secret}")))
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router should respond")
}

pub async fn get(app: Router, uri: &str, auth: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(AUTHORIZATION, auth);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn delete(app: Router, uri: &str, auth: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(Method::DELETE).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(AUTHORIZATION, auth);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

/// POST `/predict` with `bytes` as the multipart field `field`.
pub async fn upload(
    app: Router,
    field: &str,
    bytes: &[u8],
    auth: Option<&str>,
) -> Response<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"upload.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(auth) = auth {
        builder = builder.header(AUTHORIZATION, auth);
    }
    send(app, builder.body(Body::from(body)).unwrap()).await
}

/// Upload the default PNG and return the new session uid.
pub async fn predict_as(app: Router, auth: Option<&str>) -> String {
    let response = upload(app, "file", PNG_BYTES, auth).await;
    assert_eq!(response.status(), StatusCode::OK, "predict should succeed");
    let json = body_json(response).await;
    json["prediction_uid"]
        .as_str()
        .expect("prediction_uid should be a string")
        .to_string()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
