//! Details view - one scan in full

use egui::RichText;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::dashboard::state::DashboardView;
use crate::dashboard::theme::{action_button, card_frame, ThemeColors};
use crate::dashboard::views::image_uri;
use crate::shared::format::format_date;
use crate::shared::SharedAppState;

/// Render the details view for the selected scan
///
/// Returns the view to navigate to, if any.
pub fn render_details_view(
    ui: &mut egui::Ui,
    shared_state: &Arc<RwLock<SharedAppState>>,
) -> Option<DashboardView> {
    let mut navigate = None;

    if ui.button("< Back to history").clicked() {
        navigate = Some(DashboardView::History);
    }
    ui.add_space(16.0);

    let Some(scan) = shared_state.read().history.selected().cloned() else {
        ui.add_space(48.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("Scan not found").size(18.0).color(ThemeColors::TEXT_SECONDARY));
        });
        return navigate;
    };

    ui.heading(RichText::new("Scan details").size(24.0).strong());
    ui.add_space(8.0);
    ui.label(
        RichText::new(format_date(scan.created_at))
            .size(14.0)
            .color(ThemeColors::TEXT_SECONDARY),
    );
    ui.add_space(16.0);

    egui::ScrollArea::vertical().show(ui, |ui| {
        card_frame().show(ui, |ui| {
            ui.add(
                egui::Image::new(image_uri(scan.image_path()))
                    .max_height(280.0)
                    .maintain_aspect_ratio(true),
            );
        });
        ui.add_space(16.0);

        card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Extracted text").size(12.0).color(ThemeColors::TEXT_MUTED));
            ui.add_space(8.0);
            ui.label(RichText::new(&scan.extracted_text).size(20.0).color(ThemeColors::TEXT_PRIMARY));
        });
        ui.add_space(16.0);

        ui.horizontal(|ui| {
            if ui.add(action_button("Copy", ThemeColors::ACCENT_PRIMARY)).clicked() {
                ui.ctx().copy_text(scan.extracted_text.clone());
            }
            ui.add_space(8.0);
            if ui.add(action_button("Delete", ThemeColors::ACCENT_ERROR)).clicked() {
                shared_state.write().history.remove(&scan.id);
                navigate = Some(DashboardView::History);
            }
        });
    });

    navigate
}
