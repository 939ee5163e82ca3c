//! `RemoteDetector` against a local fake inference server.

use std::net::SocketAddr;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::body::Bytes;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use sightline_core::detection::{BoundingBox, Detection, Detector, DetectorError};
use sightline_detector::RemoteDetector;

/// Serve `router` on an ephemeral port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn detector(base_url: String) -> RemoteDetector {
    RemoteDetector::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn detect_returns_detections_in_server_order() {
    let router = Router::new().route(
        "/detect",
        post(|body: Bytes| async move {
            assert_eq!(&body[..], b"image-bytes");
            Json(json!({
                "detections": [
                    {"label": "person", "score": 0.91, "box": [1.0, 2.0, 3.0, 4.0]},
                    {"label": "car", "score": 0.5, "box": [5, 6, 7, 8]}
                ]
            }))
        }),
    );
    let base = serve(router).await;

    let detections = detector(base).detect(b"image-bytes").await.unwrap();

    assert_eq!(
        detections,
        vec![
            Detection {
                label: "person".into(),
                score: 0.91,
                bbox: BoundingBox::from([1.0, 2.0, 3.0, 4.0]),
            },
            Detection {
                label: "car".into(),
                score: 0.5,
                bbox: BoundingBox::from([5.0, 6.0, 7.0, 8.0]),
            },
        ]
    );
}

#[tokio::test]
async fn server_error_maps_to_unavailable() {
    let router = Router::new().route(
        "/detect",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model loading") }),
    );
    let base = serve(router).await;

    let err = detector(base).detect(b"x").await.unwrap_err();
    assert_matches!(err, DetectorError::Unavailable(msg) if msg.contains("503"));
}

#[tokio::test]
async fn malformed_body_maps_to_invalid_response() {
    let router = Router::new().route("/detect", post(|| async { Json(json!({"nope": true})) }));
    let base = serve(router).await;

    let err = detector(base).detect(b"x").await.unwrap_err();
    assert_matches!(err, DetectorError::InvalidResponse(_));
}

#[tokio::test]
async fn out_of_range_score_is_passed_through_unchanged() {
    let router = Router::new().route(
        "/detect",
        post(|| async {
            Json(json!({"detections": [{"label": "cat", "score": 7.0, "box": [0, 0, 1, 1]}]}))
        }),
    );
    let base = serve(router).await;

    let detections = detector(base).detect(b"x").await.unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].score, 7.0);
}

#[tokio::test]
async fn annotate_sends_image_and_detections() {
    let router = Router::new().route(
        "/annotate",
        post(|mut multipart: Multipart| async move {
            let mut image = Vec::new();
            let mut detections = String::new();
            while let Some(field) = multipart.next_field().await.unwrap() {
                let name = field.name().unwrap_or_default().to_string();
                match name.as_str() {
                    "image" => image = field.bytes().await.unwrap().to_vec(),
                    "detections" => detections = field.text().await.unwrap(),
                    _ => {}
                }
            }
            let parsed: serde_json::Value = serde_json::from_str(&detections).unwrap();
            assert_eq!(parsed["detections"][0]["label"], "dog");
            let mut rendered = b"annotated:".to_vec();
            rendered.extend_from_slice(&image);
            rendered
        }),
    );
    let base = serve(router).await;

    let dog = Detection {
        label: "dog".into(),
        score: 0.7,
        bbox: BoundingBox::from([0.0, 0.0, 10.0, 10.0]),
    };
    let rendered = detector(base).annotate(b"raw", &[dog]).await.unwrap();
    assert_eq!(rendered, b"annotated:raw");
}

#[tokio::test]
async fn unreachable_server_is_unavailable() {
    // Bind then drop a listener to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = detector(format!("http://{addr}")).detect(b"x").await.unwrap_err();
    assert_matches!(err, DetectorError::Unavailable(_));
}

#[test]
fn trailing_slash_is_trimmed() {
    let d = RemoteDetector::with_client(reqwest_client(), "http://model:8000/");
    assert_eq!(d.base_url(), "http://model:8000");
}

fn reqwest_client() -> reqwest::Client {
    reqwest::Client::new()
}
