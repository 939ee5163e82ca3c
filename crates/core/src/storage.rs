//! Image storage seam and the local filesystem backend.
//!
//! Stored images are addressed by an opaque *reference* string of the form
//! `{kind}/{file_name}`. References are what the database keeps; only the
//! store knows how they map onto bytes.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Image kinds and formats
// ---------------------------------------------------------------------------

/// Which of the two images of a prediction session a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// The upload as received.
    Original,
    /// The upload with detections drawn on it.
    Predicted,
}

impl ImageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Predicted => "predicted",
        }
    }

    /// Parse the kind segment of an image path.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw {
            "original" => Ok(Self::Original),
            "predicted" => Ok(Self::Predicted),
            other => Err(CoreError::Validation(format!(
                "Invalid image type '{other}'. Must be one of: original, predicted"
            ))),
        }
    }

    /// Build the storage reference for `file_name` under this kind.
    pub fn reference(self, file_name: &str) -> String {
        format!("{}/{file_name}", self.as_str())
    }
}

/// Image encodings accepted for upload and served back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Identify the encoding from the leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Result<Self, CoreError> {
        match image::guess_format(bytes) {
            Ok(image::ImageFormat::Png) => Ok(Self::Png),
            Ok(image::ImageFormat::Jpeg) => Ok(Self::Jpeg),
            Ok(other) => Err(CoreError::Validation(format!(
                "Unsupported image format {other:?}. Supported: png, jpeg"
            ))),
            Err(_) => Err(CoreError::Validation(
                "Uploaded file is not a recognizable image".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Errors from an [`ImageStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid image reference '{0}'")]
    InvalidReference(String),

    #[error("Image storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Byte storage for session images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes` as `file_name` under `kind`, returning its reference.
    async fn put(
        &self,
        kind: ImageKind,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError>;

    /// Fetch the bytes behind `reference`, or `None` if nothing is stored.
    async fn get(&self, reference: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Remove `reference`. Removing a missing image succeeds.
    async fn delete(&self, reference: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// Local filesystem backend
// ---------------------------------------------------------------------------

/// [`ImageStore`] rooted at a directory on local disk.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a reference to a path under `root`.
    ///
    /// Only `{kind}/{file_name}` with plain components is accepted, so a
    /// reference can never escape the root directory.
    fn resolve(&self, reference: &str) -> Result<PathBuf, StorageError> {
        let invalid = || StorageError::InvalidReference(reference.to_string());

        let components: Vec<_> = Path::new(reference).components().collect();
        let [Component::Normal(kind), Component::Normal(file_name)] = components.as_slice()
        else {
            return Err(invalid());
        };

        let kind = kind.to_str().ok_or_else(invalid)?;
        ImageKind::parse(kind).map_err(|_| invalid())?;

        Ok(self.root.join(kind).join(file_name))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(
        &self,
        kind: ImageKind,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let reference = kind.reference(file_name);
        let path = self.resolve(&reference)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(%reference, size = bytes.len(), "Stored image");
        Ok(reference)
    }

    async fn get(&self, reference: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.resolve(reference)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, reference: &str) -> Result<(), StorageError> {
        let path = self.resolve(reference)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
