//! Error and notice banners shown above every view

use egui::RichText;
use crate::dashboard::theme::{color_with_alpha, ThemeColors};
use crate::shared::RuntimeState;

/// Show the pending error and notice, each with a dismiss button
pub fn render_banners(ui: &mut egui::Ui, runtime: &mut RuntimeState) {
    if let Some(error) = runtime.last_error.clone() {
        if banner(ui, "Error:", &error, ThemeColors::ACCENT_ERROR) {
            runtime.clear_error();
        }
        ui.add_space(12.0);
    }

    if let Some(notice) = runtime.last_notice.clone() {
        if banner(ui, "Info:", &notice, ThemeColors::ACCENT_SUCCESS) {
            runtime.clear_notice();
        }
        ui.add_space(12.0);
    }
}

/// Returns true when dismissed
fn banner(ui: &mut egui::Ui, title: &str, message: &str, accent: egui::Color32) -> bool {
    let mut dismissed = false;
    egui::Frame::none()
        .fill(color_with_alpha(accent, 51)) // ~0.2 alpha
        .rounding(egui::Rounding::same(6.0))
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(title).color(accent).strong());
                ui.label(RichText::new(message).color(ThemeColors::TEXT_PRIMARY));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    dismissed = ui.small_button("x").clicked();
                });
            });
        });
    dismissed
}
