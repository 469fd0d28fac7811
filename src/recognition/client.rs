//! HTTP client for the recognition service

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

use super::protocol::{
    strip_data_uri, ExtractTextRequest, ExtractTextResponse, HealthResponse, LoadModelRequest,
    LoadModelResponse, EXTRACT_TEXT_PATH, HEALTH_PATH, LOAD_MODEL_PATH,
};
use super::{
    ImageSource, ModelKind, Recognition, RecognitionConfig, RecognitionError, RecognitionService,
    ServiceHealth,
};

/// Subdirectory of the cache that receives diagnostic copies
pub const DIAGNOSTICS_SUBDIR: &str = "resized";

/// Longest response body quoted in a malformed-response error
const MAX_ERROR_BODY: usize = 200;

/// Recognition service client
pub struct RecognitionClient {
    base_url: String,
    http: reqwest::Client,
    diagnostics_dir: Option<PathBuf>,
}

impl RecognitionClient {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self, RecognitionError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("glyphscan/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            diagnostics_dir: None,
        })
    }

    /// Keep a copy of every successfully recognized image under `cache_dir`
    pub fn with_diagnostics(mut self, cache_dir: &Path) -> Self {
        self.diagnostics_dir = Some(cache_dir.join(DIAGNOSTICS_SUBDIR));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Recognize an already-encoded image
    pub async fn extract_text_from_base64(
        &self,
        image_base64: &str,
        config: &RecognitionConfig,
        source: ImageSource,
    ) -> Result<Recognition, RecognitionError> {
        let payload = strip_data_uri(image_base64);
        if payload.is_empty() {
            return Err(RecognitionError::Service("Base64 image is empty".to_string()));
        }

        info!(
            "Requesting recognition (model={}, source={}, enhance={}, post_process={})",
            config.model,
            source.as_str(),
            config.enhance_image,
            config.post_process
        );

        let request = ExtractTextRequest::new(payload, config, source);
        let response = self
            .http
            .post(self.endpoint(EXTRACT_TEXT_PATH))
            .json(&request)
            .send()
            .await?;

        let body: ExtractTextResponse = read_json(response).await?;
        body.into_recognition()
    }

    /// Read, encode, and recognize the image file at `path`
    pub async fn extract_text_from_file(
        &self,
        path: &Path,
        config: &RecognitionConfig,
        source: ImageSource,
    ) -> Result<Recognition, RecognitionError> {
        let bytes = tokio::fs::read(path).await?;
        let encoded = STANDARD.encode(&bytes);
        debug!("Encoded {:?} ({} bytes) for recognition", path, bytes.len());

        let recognition = self.extract_text_from_base64(&encoded, config, source).await?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("png");
        self.save_diagnostic_copy(&bytes, extension).await;

        Ok(recognition)
    }

    /// Best-effort copy of a transmitted image; failures are only logged
    async fn save_diagnostic_copy(&self, bytes: &[u8], extension: &str) {
        let Some(dir) = &self.diagnostics_dir else {
            return;
        };

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let target = dir.join(format!("resized_{}.{}", millis, extension));

        let result = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&target, bytes).await
        }
        .await;

        match result {
            Ok(()) => debug!("Saved diagnostic copy to {:?}", target),
            Err(e) => warn!("Failed to save diagnostic copy to {:?}: {}", target, e),
        }
    }

    /// Query the status endpoint
    pub async fn check_health(&self) -> Result<ServiceHealth, RecognitionError> {
        let response = self.http.get(self.endpoint(HEALTH_PATH)).send().await?;
        let body: HealthResponse = read_json(response).await?;
        Ok(body.into())
    }

    /// Ask the service to activate `model`
    pub async fn request_model(&self, model: ModelKind) -> Result<Option<ModelKind>, RecognitionError> {
        info!("Requesting model switch to {}", model);
        let response = self
            .http
            .post(self.endpoint(LOAD_MODEL_PATH))
            .json(&LoadModelRequest { model })
            .send()
            .await?;

        let body: LoadModelResponse = read_json(response).await?;
        body.into_active_model()
    }
}

#[async_trait]
impl RecognitionService for RecognitionClient {
    async fn health(&self) -> ServiceHealth {
        match self.check_health().await {
            Ok(health) => health,
            Err(e) => {
                error!("Health check failed: {}", e);
                ServiceHealth::unreachable()
            }
        }
    }

    async fn load_model(&self, model: ModelKind) -> Result<Option<ModelKind>, RecognitionError> {
        self.request_model(model).await
    }

    async fn recognize(
        &self,
        image: &Path,
        config: &RecognitionConfig,
        source: ImageSource,
    ) -> Result<Recognition, RecognitionError> {
        self.extract_text_from_file(image, config, source).await
    }
}

/// Decode a JSON body whatever the status code
///
/// The service reports its own failures as HTTP 500 with a JSON body, so
/// the status is only used when the body cannot be parsed.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RecognitionError> {
    let status = response.status().as_u16();
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|e| {
        debug!("Failed to decode response ({}): {}", status, e);
        RecognitionError::MalformedResponse {
            status,
            body: truncate_body(&text),
        }
    })
}

fn truncate_body(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Answer a single request with `status` and `body`, returning the raw
    /// request text from the join handle
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        (url, handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn test_extract_text_round_trip() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"success": true, "result": {"text": "A", "confidence": 0.97, "class_index": 10}}"#,
        )
        .await;
        let dir = tempdir().unwrap();
        let image = dir.path().join("letter.png");
        std::fs::write(&image, b"png-bytes").unwrap();

        let client = RecognitionClient::new(url).unwrap();
        let recognition = client
            .extract_text_from_file(&image, &RecognitionConfig::default(), ImageSource::Drawing)
            .await
            .unwrap();

        assert_eq!(recognition.text, "A");
        assert_eq!(recognition.class_index, Some(10));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /extract-text "));
        assert!(request.contains(&format!(r#""image_base64":"{}""#, STANDARD.encode(b"png-bytes"))));
        assert!(request.contains(r#""source":"drawing""#));
    }

    #[tokio::test]
    async fn test_json_error_body_on_500_is_service_error() {
        let (url, server) =
            serve_once("500 Internal Server Error", r#"{"success": false, "error": "model not loaded"}"#).await;

        let client = RecognitionClient::new(url).unwrap();
        let result = client
            .extract_text_from_base64("aGVsbG8=", &RecognitionConfig::default(), ImageSource::Camera)
            .await;

        match result {
            Err(RecognitionError::Service(msg)) => assert_eq!(msg, "model not loaded"),
            other => panic!("unexpected {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed_response() {
        let (url, server) = serve_once("502 Bad Gateway", "<html>Bad Gateway</html>").await;

        let client = RecognitionClient::new(url).unwrap();
        let result = client
            .extract_text_from_base64("aGVsbG8=", &RecognitionConfig::default(), ImageSource::Camera)
            .await;

        match result {
            Err(RecognitionError::MalformedResponse { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "<html>Bad Gateway</html>");
            }
            other => panic!("unexpected {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_health_round_trip() {
        let (url, server) =
            serve_once("200 OK", r#"{"status": "healthy", "model_loaded": true, "current_model": "SVM"}"#).await;

        let client = RecognitionClient::new(url).unwrap();
        let health = client.check_health().await.unwrap();

        assert!(health.reachable);
        assert_eq!(health.current_model, Some(ModelKind::Svm));
        assert_eq!(health.model_loaded, Some(true));
        assert!(server.await.unwrap().starts_with("GET /health "));
    }

    #[tokio::test]
    async fn test_health_unreachable_when_nothing_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = RecognitionClient::new(url).unwrap();
        assert!(matches!(client.check_health().await, Err(RecognitionError::Transport(_))));
        assert!(!client.health().await.reachable);
    }

    #[tokio::test]
    async fn test_load_model_round_trip() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"success": true, "message": "Model SVM loaded successfully", "current_model": "SVM"}"#,
        )
        .await;

        let client = RecognitionClient::new(url).unwrap();
        let active = client.request_model(ModelKind::Svm).await.unwrap();

        assert_eq!(active, Some(ModelKind::Svm));
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /load-model "));
        assert!(request.contains(r#""model":"SVM""#));
    }

    #[tokio::test]
    async fn test_load_model_failure_on_500() {
        let (url, server) = serve_once(
            "500 Internal Server Error",
            r#"{"success": false, "error": "weights missing", "current_model": null}"#,
        )
        .await;

        let client = RecognitionClient::new(url).unwrap();
        match client.request_model(ModelKind::Cnn).await {
            Err(RecognitionError::Service(msg)) => assert_eq!(msg, "weights missing"),
            other => panic!("unexpected {:?}", other),
        }
        server.await.unwrap();
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = RecognitionClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.endpoint(HEALTH_PATH), "http://localhost:5000/health");
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("  short  "), "short");
        let long = "x".repeat(MAX_ERROR_BODY + 50);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.len(), MAX_ERROR_BODY + 3);
    }

    #[tokio::test]
    async fn test_empty_payload_rejected_locally() {
        let client = RecognitionClient::new("http://127.0.0.1:9").unwrap();
        let result = client
            .extract_text_from_base64("data:image/png;base64,", &RecognitionConfig::default(), ImageSource::Camera)
            .await;

        match result {
            Err(RecognitionError::Service(msg)) => assert_eq!(msg, "Base64 image is empty"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_image_is_io_error() {
        let dir = tempdir().unwrap();
        let client = RecognitionClient::new("http://127.0.0.1:9").unwrap();

        let result = client
            .extract_text_from_file(&dir.path().join("missing.png"), &RecognitionConfig::default(), ImageSource::Camera)
            .await;

        assert!(matches!(result, Err(RecognitionError::Io(_))));
    }

    #[tokio::test]
    async fn test_diagnostic_copy_written_to_cache() {
        let dir = tempdir().unwrap();
        let client = RecognitionClient::new("http://127.0.0.1:9")
            .unwrap()
            .with_diagnostics(dir.path());

        client.save_diagnostic_copy(b"png-bytes", "png").await;

        let copies: Vec<_> = std::fs::read_dir(dir.path().join(DIAGNOSTICS_SUBDIR))
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(copies.len(), 1);
        assert_eq!(std::fs::read(copies[0].path()).unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn test_diagnostic_copy_failure_is_ignored() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let client = RecognitionClient::new("http://127.0.0.1:9")
            .unwrap()
            .with_diagnostics(&blocker);

        // cache dir is a file, so the copy cannot be written; must not panic
        client.save_diagnostic_copy(b"png-bytes", "png").await;
        assert!(blocker.is_file());
    }
}
