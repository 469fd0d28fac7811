//! Dashboard views

pub mod canvas;
pub mod details;
pub mod history;
pub mod scan;
pub mod settings;

pub use details::render_details_view;
pub use history::render_history_view;
pub use scan::render_scan_view;
pub use settings::render_settings_view;

/// `egui_extras` file URI for a local image
pub(crate) fn image_uri(path: &std::path::Path) -> String {
    format!("file://{}", path.display())
}
