use std::sync::Arc;

use sightline_core::detection::Detector;
use sightline_core::storage::ImageStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Built once at startup and never mutated afterwards. Cheaply cloneable
/// (everything is behind `Arc` or is already a pool handle).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sightline_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Storage for original and annotated images.
    pub images: Arc<dyn ImageStore>,
    /// Object-detection model.
    pub detector: Arc<dyn Detector>,
}
