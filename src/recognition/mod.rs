//! Recognition Service Layer
//!
//! Talks to the remote character-recognition service over HTTP. The model
//! itself, preprocessing, and inference all live on the service; this layer
//! only moves images there and text back.

pub mod client;
pub mod protocol;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub use client::RecognitionClient;

/// Model variants the service can switch between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelKind {
    #[default]
    #[serde(rename = "CNN")]
    Cnn,
    #[serde(rename = "SVM")]
    Svm,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Cnn, ModelKind::Svm];

    /// Identifier used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Cnn => "CNN",
            ModelKind::Svm => "SVM",
        }
    }

    /// Short description for the settings view
    pub fn description(&self) -> &'static str {
        match self {
            ModelKind::Cnn => "Convolutional network (2 conv layers + 1 dense)",
            ModelKind::Svm => "SVM over CNN + HOG features",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CNN" => Ok(ModelKind::Cnn),
            "SVM" => Ok(ModelKind::Svm),
            other => Err(format!("Unknown model '{}', expected CNN or SVM", other)),
        }
    }
}

/// Where the submitted image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    #[default]
    Camera,
    Drawing,
}

impl ImageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::Camera => "camera",
            ImageSource::Drawing => "drawing",
        }
    }
}

impl FromStr for ImageSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "camera" => Ok(ImageSource::Camera),
            "drawing" => Ok(ImageSource::Drawing),
            other => Err(format!("Unknown source '{}', expected camera or drawing", other)),
        }
    }
}

/// Per-request options, captured when a request is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    pub enhance_image: bool,
    pub post_process: bool,
    pub model: ModelKind,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            enhance_image: true,
            post_process: true,
            model: ModelKind::Cnn,
        }
    }
}

/// Text returned by the service for one image
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub text: String,
    pub confidence: Option<f32>,
    pub class_index: Option<i64>,
}

/// Result of a health check
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceHealth {
    /// Service answered and reported itself healthy
    pub reachable: bool,
    /// Model the service currently has active
    pub current_model: Option<ModelKind>,
    pub model_loaded: Option<bool>,
}

impl ServiceHealth {
    pub fn unreachable() -> Self {
        Self::default()
    }
}

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not reach recognition service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response from recognition service (HTTP {status}): {body}")]
    MalformedResponse { status: u16, body: String },
    #[error("{0}")]
    Service(String),
}

impl RecognitionError {
    /// Generic message used when the service fails without saying why
    pub const UNKNOWN_FAILURE: &'static str = "Unknown error occurred";

    /// Whether trying again later might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RecognitionError::Transport(_) | RecognitionError::MalformedResponse { .. }
        )
    }
}

/// Operations the UI needs from a recognition backend
#[async_trait]
pub trait RecognitionService: Send + Sync {
    /// Query the status endpoint. Never fails; an unreachable service
    /// reports `reachable: false`.
    async fn health(&self) -> ServiceHealth;

    /// Ask the service to activate `model`, returning the model it reports
    /// as active afterwards
    async fn load_model(&self, model: ModelKind) -> Result<Option<ModelKind>, RecognitionError>;

    /// Recognize the image stored at `image`
    async fn recognize(
        &self,
        image: &Path,
        config: &RecognitionConfig,
        source: ImageSource,
    ) -> Result<Recognition, RecognitionError>;
}
