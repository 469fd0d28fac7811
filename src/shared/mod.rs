//! Shared state and messaging between the dashboard and the service layer
//!
//! Views queue commands into the shared runtime state; the coordinator runs
//! them off the UI thread and reports back with events.

pub mod format;
pub mod messages;
pub mod state;

pub use messages::{RecognitionJob, RecognizedText, ServiceCommand, ServiceEvent};
pub use state::{Readiness, RuntimeState, SharedAppState};
