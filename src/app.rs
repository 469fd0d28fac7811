//! Service Coordinator
//!
//! Runs remote recognition work off the UI thread and applies the results
//! to the shared application state.

use anyhow::{Context as _, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::recognition::{RecognitionError, RecognitionService};
use crate::shared::{RecognizedText, ServiceCommand, ServiceEvent, SharedAppState};
use crate::storage::Scan;

/// Owns the async runtime and the channel results come back on
pub struct ServiceCoordinator {
    runtime: Runtime,
    service: Arc<dyn RecognitionService>,
    events_tx: Sender<ServiceEvent>,
    events_rx: Receiver<ServiceEvent>,
    /// Woken after every event so the UI drains the channel promptly
    repaint: Option<egui::Context>,
}

impl ServiceCoordinator {
    /// Create a coordinator around `service`
    pub fn new(service: Arc<dyn RecognitionService>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("glyphscan-service")
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;
        let (events_tx, events_rx) = unbounded();

        Ok(Self {
            runtime,
            service,
            events_tx,
            events_rx,
            repaint: None,
        })
    }

    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.repaint = Some(ctx);
    }

    pub fn service(&self) -> Arc<dyn RecognitionService> {
        self.service.clone()
    }

    /// Run a future to completion on the coordinator's runtime
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Start `command` in the background
    pub fn dispatch(&self, command: ServiceCommand) {
        let service = self.service.clone();
        let notifier = Notifier {
            tx: self.events_tx.clone(),
            repaint: self.repaint.clone(),
        };

        match command {
            ServiceCommand::CheckHealth => {
                self.runtime.spawn(async move {
                    notifier.send(ServiceEvent::Health(service.health().await));
                });
            }
            ServiceCommand::SwitchModel(requested) => {
                self.runtime.spawn(async move {
                    let result = service.load_model(requested).await;
                    notifier.send(ServiceEvent::ModelSwitched { requested, result });
                    // the service is the source of truth, re-read it either way
                    notifier.send(ServiceEvent::Health(service.health().await));
                });
            }
            ServiceCommand::Recognize(job) => {
                self.runtime.spawn(async move {
                    let result = service.recognize(&job.image_path, &job.config, job.source).await;
                    notifier.send(ServiceEvent::Recognized { job, result });
                });
            }
        }
    }

    /// Events that have arrived since the last call
    pub fn try_events(&self) -> Vec<ServiceEvent> {
        self.events_rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next event
    pub fn next_event(&self, timeout: Duration) -> Option<ServiceEvent> {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

struct Notifier {
    tx: Sender<ServiceEvent>,
    repaint: Option<egui::Context>,
}

impl Notifier {
    fn send(&self, event: ServiceEvent) {
        if self.tx.send(event).is_err() {
            debug!("Event receiver dropped");
            return;
        }
        if let Some(ctx) = &self.repaint {
            ctx.request_repaint();
        }
    }
}

/// Hand the commands queued by the views to the coordinator
pub fn process_commands(state: &mut SharedAppState, coordinator: &ServiceCoordinator) {
    for command in state.runtime.take_commands() {
        match &command {
            ServiceCommand::CheckHealth => {
                state.runtime.is_checking_health = true;
            }
            ServiceCommand::SwitchModel(model) => {
                info!("Switching model to {}", model);
                state.runtime.is_switching_model = true;
                state.runtime.is_checking_health = true;
                state.runtime.service.current_model = None;
            }
            ServiceCommand::Recognize(job) => {
                if state.runtime.is_extracting {
                    warn!("Recognition already in flight, ignoring {:?}", job.image_path);
                    continue;
                }
                state.runtime.is_extracting = true;
                state.runtime.clear_error();
            }
        }
        coordinator.dispatch(command);
    }
}

/// Apply a completed service event to the state
pub fn apply_event(state: &mut SharedAppState, event: ServiceEvent, now_ms: i64) {
    match event {
        ServiceEvent::Health(health) => {
            debug!("Health: {:?}", health);
            state.runtime.is_checking_health = false;
            state.runtime.service.apply(&health);
        }
        ServiceEvent::ModelSwitched { requested, result } => {
            state.runtime.is_switching_model = false;
            match result {
                Ok(active) => {
                    let active = active.unwrap_or(requested);
                    info!("Service reports model {} active", active);
                    state.runtime.set_notice(format!("Model {} loaded", active));
                }
                Err(e) => {
                    warn!("Failed to load model {}: {}", requested, e);
                    state
                        .runtime
                        .set_error(format!("Failed to load {} model: {}", requested, e));
                }
            }
        }
        ServiceEvent::Recognized { job, result } => {
            state.runtime.is_extracting = false;
            match result {
                Ok(recognition) => {
                    let id = state.history.next_id(now_ms);
                    info!("Recognized {:?} as {:?} (scan {})", job.image_path, recognition.text, id);

                    state.history.add(Scan::new(
                        id.clone(),
                        job.image_path.to_string_lossy(),
                        recognition.text.clone(),
                        now_ms,
                    ));
                    state.runtime.last_recognition = Some(RecognizedText {
                        scan_id: id,
                        text: recognition.text,
                        source: job.source,
                        image_path: job.image_path,
                    });
                }
                Err(e) => {
                    warn!("Recognition of {:?} failed: {}", job.image_path, e);
                    state.runtime.set_error(error_message(&e));
                    // exported snapshots that produced no scan
                    state.history.discard_image(&job.image_path);
                }
            }
        }
    }
}

/// User-facing text for a failed recognition
pub fn error_message(error: &RecognitionError) -> String {
    if error.is_retryable() {
        format!("{}. Check the server and try again.", error)
    } else {
        error.to_string()
    }
}

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
