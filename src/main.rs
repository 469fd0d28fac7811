//! GlyphScan - handwritten character recognition client
//!
//! Draw or pick an image of a character, send it to a remote recognition
//! service, and keep a history of the results.

mod app;
mod canvas;
mod config;
mod dashboard;
mod recognition;
mod shared;
mod storage;

use anyhow::{bail, Result};
use clap::Parser;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::app::ServiceCoordinator;
use crate::config::{AppConfig, CONFIG_FILE_NAME};
use crate::recognition::{ImageSource, ModelKind, RecognitionClient};
use crate::shared::{RecognitionJob, ServiceCommand, SharedAppState};
use crate::storage::{JsonHistoryFile, ScanHistory};

/// GlyphScan - handwritten character recognition client
#[derive(Parser, Debug)]
#[command(name = "glyphscan")]
#[command(about = "Draw or load a character image and recognize it with a remote OCR service")]
struct Args {
    /// Recognition service URL (overrides the configured one)
    #[arg(long)]
    server_url: Option<String>,

    /// Print the service health and exit
    #[arg(long)]
    health: bool,

    /// Recognize one image file, print the text and exit
    #[arg(long, value_name = "PATH")]
    recognize: Option<PathBuf>,

    /// Origin tag sent with --recognize
    #[arg(long, default_value = "camera")]
    source: ImageSource,

    /// Model to use for --recognize instead of the configured one
    #[arg(long)]
    model: Option<ModelKind>,
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("GlyphScan starting...");

    let config_path = storage::get_config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .map_err(|e| warn!("No configuration directory: {}", e))
        .ok();
    let mut config = load_or_create_config(config_path.as_deref());
    if let Some(url) = &args.server_url {
        info!("Using server URL from command line: {}", url);
        config.general.server_url = url.clone();
    }

    let history = open_history();
    let coordinator = build_coordinator(&config)?;

    let mut state = SharedAppState::new(config, history);
    if let Some(path) = config_path {
        state = state.with_config_path(path);
    }

    if args.health {
        return print_health(&coordinator);
    }

    if let Some(path) = &args.recognize {
        return recognize_once(&mut state, &coordinator, path, args.source, args.model);
    }

    let shared_state = Arc::new(RwLock::new(state));
    if let Err(e) = dashboard::app::run_dashboard(shared_state, coordinator) {
        tracing::error!("Dashboard error: {}", e);
    }

    info!("GlyphScan shutdown complete");

    Ok(())
}

/// Load configuration from file or create default
fn load_or_create_config(config_path: Option<&Path>) -> AppConfig {
    if let Some(config_path) = config_path {
        if config_path.exists() {
            match config::load_config(config_path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", config_path);
                    return config;
                }
                Err(e) => warn!("Ignoring unreadable configuration {:?}: {}", config_path, e),
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

/// Restore scan history from the data directory, or keep it in memory only
///
/// Exported drawing snapshots belong to the history and are deleted with
/// their scans.
fn open_history() -> ScanHistory {
    let history = match storage::get_data_dir() {
        Ok(dir) => ScanHistory::restore(Box::new(JsonHistoryFile::in_dir(&dir))),
        Err(e) => {
            warn!("No data directory, history will not be saved: {}", e);
            ScanHistory::ephemeral()
        }
    };
    match storage::get_snapshot_dir() {
        Ok(dir) => history.with_image_dir(dir),
        Err(_) => history,
    }
}

fn build_coordinator(config: &AppConfig) -> Result<ServiceCoordinator> {
    let mut client = RecognitionClient::new(config.general.server_url.clone())?;
    if config.general.keep_diagnostic_copies {
        match storage::get_cache_dir() {
            Ok(cache) => client = client.with_diagnostics(&cache),
            Err(e) => warn!("Diagnostic copies disabled: {}", e),
        }
    }
    info!("Recognition service at {}", client.base_url());

    ServiceCoordinator::new(Arc::new(client))
}

fn print_health(coordinator: &ServiceCoordinator) -> Result<()> {
    let service = coordinator.service();
    let health = coordinator.block_on(service.health());

    println!("Reachable:     {}", if health.reachable { "yes" } else { "no" });
    println!(
        "Current model: {}",
        health.current_model.map(|m| m.as_str()).unwrap_or("none")
    );
    if let Some(loaded) = health.model_loaded {
        println!("Model loaded:  {}", if loaded { "yes" } else { "no" });
    }

    if !health.reachable {
        bail!("Recognition service is not reachable");
    }
    Ok(())
}

fn recognize_once(
    state: &mut SharedAppState,
    coordinator: &ServiceCoordinator,
    path: &Path,
    source: ImageSource,
    model: Option<ModelKind>,
) -> Result<()> {
    if !path.is_file() {
        bail!("Invalid image path: {}", path.display());
    }

    let mut config = state.config.recognition_config();
    if let Some(model) = model {
        config.model = model;
    }

    state
        .runtime
        .request(ServiceCommand::Recognize(RecognitionJob::new(path, source, config)));
    app::process_commands(state, coordinator);

    while state.runtime.is_extracting {
        match coordinator.next_event(Duration::from_millis(500)) {
            Some(event) => app::apply_event(state, event, app::now_millis()),
            None => continue,
        }
    }

    if let Some(error) = state.runtime.last_error.take() {
        bail!(error);
    }
    if let Some(result) = &state.runtime.last_recognition {
        println!("{}", result.text);
    }
    Ok(())
}
