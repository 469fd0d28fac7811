//! Wire types for the recognition service's JSON endpoints

use serde::{Deserialize, Serialize};

use super::{ImageSource, ModelKind, Recognition, RecognitionConfig, RecognitionError, ServiceHealth};

pub const EXTRACT_TEXT_PATH: &str = "/extract-text";
pub const LOAD_MODEL_PATH: &str = "/load-model";
pub const HEALTH_PATH: &str = "/health";

/// Body of `POST /extract-text`
#[derive(Debug, Clone, Serialize)]
pub struct ExtractTextRequest<'a> {
    pub image_base64: &'a str,
    pub config: RequestConfig,
    pub source: ImageSource,
}

/// `config` object of an extract request
///
/// The service reads the origin tag from inside `config`, so it is sent
/// there as well as at the top level.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    pub enhance_image: bool,
    pub post_process: bool,
    pub model: ModelKind,
    pub source: ImageSource,
}

impl<'a> ExtractTextRequest<'a> {
    pub fn new(image_base64: &'a str, config: &RecognitionConfig, source: ImageSource) -> Self {
        Self {
            image_base64,
            config: RequestConfig {
                enhance_image: config.enhance_image,
                post_process: config.post_process,
                model: config.model,
                source,
            },
            source,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrResult {
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub class_index: Option<i64>,
}

/// Response of `POST /extract-text`
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractTextResponse {
    pub success: bool,
    #[serde(default)]
    pub result: Option<OcrResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExtractTextResponse {
    pub fn into_recognition(self) -> Result<Recognition, RecognitionError> {
        match (self.success, self.result) {
            (true, Some(result)) => Ok(Recognition {
                text: result.text,
                confidence: result.confidence,
                class_index: result.class_index,
            }),
            (true, None) => Err(RecognitionError::Service(
                "Service reported success without a result".to_string(),
            )),
            (false, _) => Err(service_failure(self.error)),
        }
    }
}

/// Body of `POST /load-model`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LoadModelRequest {
    pub model: ModelKind,
}

/// Response of `POST /load-model`
#[derive(Debug, Clone, Deserialize)]
pub struct LoadModelResponse {
    pub success: bool,
    #[serde(default)]
    pub current_model: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl LoadModelResponse {
    pub fn into_active_model(self) -> Result<Option<ModelKind>, RecognitionError> {
        if !self.success {
            return Err(service_failure(self.error.or(self.message)));
        }
        Ok(self.current_model.as_deref().and_then(|m| m.parse().ok()))
    }
}

/// Response of `GET /health`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub current_model: Option<String>,
    #[serde(default)]
    pub model_loaded: Option<bool>,
}

impl From<HealthResponse> for ServiceHealth {
    fn from(response: HealthResponse) -> Self {
        Self {
            reachable: response.status == "healthy",
            current_model: response.current_model.as_deref().and_then(|m| m.parse().ok()),
            model_loaded: response.model_loaded,
        }
    }
}

fn service_failure(message: Option<String>) -> RecognitionError {
    RecognitionError::Service(
        message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| RecognitionError::UNKNOWN_FAILURE.to_string()),
    )
}

/// Drop a `data:image/<type>;base64,` prefix if present
pub fn strip_data_uri(payload: &str) -> &str {
    if let Some(rest) = payload.strip_prefix("data:image/") {
        if let Some(idx) = rest.find(";base64,") {
            let kind = &rest[..idx];
            if !kind.is_empty() && kind.chars().all(|c| c.is_ascii_alphabetic()) {
                return &rest[idx + ";base64,".len()..];
            }
        }
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_request_shape() {
        let config = RecognitionConfig { enhance_image: true, post_process: true, model: ModelKind::Cnn };
        let request = ExtractTextRequest::new("aGVsbG8=", &config, ImageSource::Drawing);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "image_base64": "aGVsbG8=",
                "config": {
                    "enhanceImage": true,
                    "postProcess": true,
                    "model": "CNN",
                    "source": "drawing"
                },
                "source": "drawing"
            })
        );
    }

    #[test]
    fn test_extract_response_success() {
        let body = r#"{"success": true, "result": {"text": "A", "confidence": 0.97, "class_index": 10}}"#;
        let response: ExtractTextResponse = serde_json::from_str(body).unwrap();

        let recognition = response.into_recognition().unwrap();
        assert_eq!(recognition.text, "A");
        assert_eq!(recognition.class_index, Some(10));
        assert!((recognition.confidence.unwrap() - 0.97).abs() < 1e-6);
    }

    #[test]
    fn test_extract_response_failure_keeps_service_message() {
        let body = r#"{"success": false, "error": "model not loaded"}"#;
        let response: ExtractTextResponse = serde_json::from_str(body).unwrap();

        match response.into_recognition() {
            Err(RecognitionError::Service(msg)) => assert_eq!(msg, "model not loaded"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_extract_response_failure_without_message() {
        let response: ExtractTextResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();

        let err = response.into_recognition().unwrap_err();
        assert_eq!(err.to_string(), RecognitionError::UNKNOWN_FAILURE);
    }

    #[test]
    fn test_load_model_response() {
        let ok: LoadModelResponse =
            serde_json::from_str(r#"{"success": true, "message": "Model SVM loaded successfully", "current_model": "SVM"}"#)
                .unwrap();
        assert_eq!(ok.into_active_model().unwrap(), Some(ModelKind::Svm));

        let failed: LoadModelResponse =
            serde_json::from_str(r#"{"success": false, "error": "weights missing", "current_model": null}"#).unwrap();
        assert_eq!(failed.into_active_model().unwrap_err().to_string(), "weights missing");
    }

    #[test]
    fn test_health_response() {
        let response: HealthResponse =
            serde_json::from_str(r#"{"status": "healthy", "model_loaded": true, "current_model": "CNN"}"#).unwrap();
        let health = ServiceHealth::from(response);

        assert!(health.reachable);
        assert_eq!(health.current_model, Some(ModelKind::Cnn));
        assert_eq!(health.model_loaded, Some(true));

        let degraded: HealthResponse = serde_json::from_str(r#"{"status": "starting"}"#).unwrap();
        let health = ServiceHealth::from(degraded);
        assert!(!health.reachable);
        assert_eq!(health.current_model, None);
    }

    #[test]
    fn test_strip_data_uri() {
        assert_eq!(strip_data_uri("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_uri("data:image/jpeg;base64,BBBB"), "BBBB");
        assert_eq!(strip_data_uri("AAAA"), "AAAA");
        assert_eq!(strip_data_uri("data:text/plain;base64,CCCC"), "data:text/plain;base64,CCCC");
    }
}
