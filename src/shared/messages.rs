//! Message types for communication between the dashboard and the service coordinator

use std::path::PathBuf;

use crate::recognition::{
    ImageSource, ModelKind, Recognition, RecognitionConfig, RecognitionError, ServiceHealth,
};

/// Work requested by the UI
#[derive(Debug, Clone)]
pub enum ServiceCommand {
    /// Query the service's status endpoint
    CheckHealth,
    /// Activate a model on the service, then re-read health
    SwitchModel(ModelKind),
    /// Send an image for recognition
    Recognize(RecognitionJob),
}

/// One recognition request with the settings captured at dispatch time
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionJob {
    pub image_path: PathBuf,
    pub source: ImageSource,
    pub config: RecognitionConfig,
}

impl RecognitionJob {
    pub fn new(image_path: impl Into<PathBuf>, source: ImageSource, config: RecognitionConfig) -> Self {
        Self {
            image_path: image_path.into(),
            source,
            config,
        }
    }
}

/// Results reported back to the UI
#[derive(Debug)]
pub enum ServiceEvent {
    Health(ServiceHealth),
    ModelSwitched {
        requested: ModelKind,
        result: Result<Option<ModelKind>, RecognitionError>,
    },
    Recognized {
        job: RecognitionJob,
        result: Result<Recognition, RecognitionError>,
    },
}

/// Latest successful recognition, picked up by the scan view
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub scan_id: String,
    pub text: String,
    pub source: ImageSource,
    /// Image the text was recognized from
    pub image_path: PathBuf,
}
