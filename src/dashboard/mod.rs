//! Dashboard UI Module
//!
//! The desktop window: scan (camera and drawing tabs), history, scan
//! details, and settings.

pub mod app;
pub mod components;
pub mod state;
pub mod theme;
pub mod views;
