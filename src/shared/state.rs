//! Shared application state between the dashboard and the service coordinator

use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::{self, AppConfig};
use crate::recognition::{ModelKind, ServiceHealth};
use crate::shared::messages::{RecognizedText, ServiceCommand};
use crate::storage::ScanHistory;

/// Central shared state
#[derive(Debug)]
pub struct SharedAppState {
    /// Application configuration
    pub config: AppConfig,
    /// Where `config` is persisted, if anywhere
    pub config_path: Option<PathBuf>,
    /// Scan history store
    pub history: ScanHistory,
    /// Runtime state (not persisted)
    pub runtime: RuntimeState,
}

impl Default for SharedAppState {
    fn default() -> Self {
        Self::new(AppConfig::default(), ScanHistory::ephemeral())
    }
}

impl SharedAppState {
    /// Create a new shared state with the given configuration and history
    pub fn new(config: AppConfig, history: ScanHistory) -> Self {
        Self {
            config,
            config_path: None,
            history,
            runtime: RuntimeState::default(),
        }
    }

    /// Persist configuration changes to `path`
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Write the current configuration; failures are logged
    pub fn save_config(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        match config::save_config(&self.config, path) {
            Ok(()) => info!("Saved configuration to {:?}", path),
            Err(e) => warn!("Failed to save configuration to {:?}: {}", path, e),
        }
    }

    /// Re-read the configuration file, keeping the current values if it
    /// cannot be read
    ///
    /// Returns true when the configuration changed.
    pub fn reload_config(&mut self) -> bool {
        let Some(path) = &self.config_path else {
            return false;
        };
        if !path.exists() {
            return false;
        }
        match config::load_config(path) {
            Ok(loaded) if loaded != self.config => {
                info!("Configuration changed on disk, reloading");
                self.config = loaded;
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!("Failed to reload configuration from {:?}: {}", path, e);
                false
            }
        }
    }
}

/// Last known state of the remote service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceStatus {
    /// At least one health check has completed
    pub checked: bool,
    pub reachable: bool,
    /// Model reported by the most recent health check; cleared when a
    /// switch is requested
    pub current_model: Option<ModelKind>,
    pub model_loaded: Option<bool>,
}

impl ServiceStatus {
    pub fn apply(&mut self, health: &ServiceHealth) {
        self.checked = true;
        self.reachable = health.reachable;
        self.current_model = health.current_model;
        self.model_loaded = health.model_loaded;
    }

    /// Whether the service can take recognition requests
    pub fn is_ready(&self) -> bool {
        self.reachable && self.model_loaded != Some(false)
    }
}

/// Runtime state that is not persisted
#[derive(Debug, Clone, Default)]
pub struct RuntimeState {
    /// Remote service status
    pub service: ServiceStatus,
    /// A health check is in flight
    pub is_checking_health: bool,
    /// A model switch is in flight
    pub is_switching_model: bool,
    /// A recognition request is in flight
    pub is_extracting: bool,
    /// Last error message (if any)
    pub last_error: Option<String>,
    /// Last informational message (if any)
    pub last_notice: Option<String>,
    /// Latest recognized text, consumed by the scan view
    pub last_recognition: Option<RecognizedText>,
    /// Commands queued by the UI for the coordinator
    pub pending_commands: Vec<ServiceCommand>,
}

impl RuntimeState {
    /// Clear any error state
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Set an error message
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.last_notice = Some(notice.into());
    }

    pub fn clear_notice(&mut self) {
        self.last_notice = None;
    }

    /// Queue a command for the coordinator
    pub fn request(&mut self, command: ServiceCommand) {
        self.pending_commands.push(command);
    }

    /// Drain queued commands in the order they were requested
    pub fn take_commands(&mut self) -> Vec<ServiceCommand> {
        std::mem::take(&mut self.pending_commands)
    }

    /// Readiness of the service for `selected`, the model the user wants
    pub fn readiness(&self, selected: ModelKind) -> Readiness {
        if self.is_switching_model || (self.is_checking_health && !self.service.checked) {
            Readiness::Loading(selected)
        } else if self.service.is_ready() {
            Readiness::Ready(self.service.current_model.unwrap_or(selected))
        } else {
            Readiness::NotLoaded(selected)
        }
    }
}

/// Model readiness shown in the scan header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Loading(ModelKind),
    Ready(ModelKind),
    NotLoaded(ModelKind),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready(_))
    }
}

impl std::fmt::Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Readiness::Loading(model) => write!(f, "Loading model {}...", model),
            Readiness::Ready(model) => write!(f, "Model {} ready", model),
            Readiness::NotLoaded(model) => write!(f, "Model {} not loaded", model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::ModelKind;
    use tempfile::tempdir;

    #[test]
    fn test_commands_drain_in_order() {
        let mut runtime = RuntimeState::default();
        runtime.request(ServiceCommand::CheckHealth);
        runtime.request(ServiceCommand::SwitchModel(ModelKind::Svm));

        let commands = runtime.take_commands();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], ServiceCommand::CheckHealth));
        assert!(matches!(commands[1], ServiceCommand::SwitchModel(ModelKind::Svm)));
        assert!(runtime.take_commands().is_empty());
    }

    #[test]
    fn test_service_status_from_health() {
        let mut status = ServiceStatus::default();
        assert!(!status.is_ready());

        status.apply(&ServiceHealth {
            reachable: true,
            current_model: Some(ModelKind::Cnn),
            model_loaded: Some(true),
        });
        assert!(status.checked);
        assert!(status.is_ready());

        status.apply(&ServiceHealth {
            reachable: true,
            current_model: None,
            model_loaded: Some(false),
        });
        assert!(!status.is_ready());
    }

    #[test]
    fn test_readiness_text() {
        let mut runtime = RuntimeState::default();
        runtime.is_checking_health = true;
        assert_eq!(runtime.readiness(ModelKind::Cnn).to_string(), "Loading model CNN...");

        runtime.is_checking_health = false;
        runtime.service.apply(&ServiceHealth {
            reachable: true,
            current_model: Some(ModelKind::Svm),
            model_loaded: Some(true),
        });
        let readiness = runtime.readiness(ModelKind::Cnn);
        assert!(readiness.is_ready());
        assert_eq!(readiness.to_string(), "Model SVM ready");

        runtime.service.apply(&ServiceHealth::unreachable());
        assert_eq!(runtime.readiness(ModelKind::Cnn).to_string(), "Model CNN not loaded");

        runtime.is_switching_model = true;
        assert_eq!(runtime.readiness(ModelKind::Svm), Readiness::Loading(ModelKind::Svm));
    }

    #[test]
    fn test_error_and_notice() {
        let mut runtime = RuntimeState::default();
        runtime.set_error("boom");
        runtime.set_notice("saved");
        assert_eq!(runtime.last_error.as_deref(), Some("boom"));
        assert_eq!(runtime.last_notice.as_deref(), Some("saved"));

        runtime.clear_error();
        runtime.clear_notice();
        assert!(runtime.last_error.is_none());
        assert!(runtime.last_notice.is_none());
    }

    #[test]
    fn test_save_and_reload_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut state = SharedAppState::default().with_config_path(path.clone());

        state.config.recognition.selected_model = ModelKind::Svm;
        state.save_config();
        assert!(path.exists());

        // another writer changes the file behind our back
        let mut on_disk = state.config.clone();
        on_disk.recognition.enhance_image = false;
        config::save_config(&on_disk, &path).unwrap();

        assert!(state.reload_config());
        assert!(!state.config.recognition.enhance_image);
        assert!(!state.reload_config());
    }

    #[test]
    fn test_reload_keeps_values_when_file_is_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();
        let mut state = SharedAppState::default().with_config_path(path);
        state.config.recognition.selected_model = ModelKind::Svm;

        assert!(!state.reload_config());
        assert_eq!(state.config.recognition.selected_model, ModelKind::Svm);
    }
}
