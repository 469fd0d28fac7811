//! History view - past scans, newest first

use egui::{RichText, Sense};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::dashboard::state::{DashboardView, HistoryViewState};
use crate::dashboard::theme::{action_button, card_frame, ThemeColors};
use crate::dashboard::views::image_uri;
use crate::shared::format::{format_date, truncate_text, PREVIEW_CHARS};
use crate::shared::SharedAppState;
use crate::storage::Scan;

enum CardAction {
    Open(String),
    Copy(String),
    Delete(String),
}

/// Render the history view
///
/// Returns the view to navigate to, if any.
pub fn render_history_view(
    ui: &mut egui::Ui,
    view_state: &mut HistoryViewState,
    shared_state: &Arc<RwLock<SharedAppState>>,
) -> Option<DashboardView> {
    let (scans, is_empty) = {
        let state = shared_state.read();
        (state.history.scans().to_vec(), state.history.is_empty())
    };

    ui.horizontal(|ui| {
        ui.heading(RichText::new("History").size(24.0).strong());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add_enabled(!is_empty, egui::Button::new("Clear all"))
                .clicked()
            {
                view_state.confirm_clear = true;
            }
        });
    });
    ui.add_space(8.0);
    ui.label(
        RichText::new(format!("{} scans", scans.len()))
            .size(14.0)
            .color(ThemeColors::TEXT_SECONDARY),
    );
    ui.add_space(16.0);

    if view_state.confirm_clear {
        render_clear_confirmation(ui, view_state, shared_state, scans.len());
        ui.add_space(16.0);
    }

    if is_empty {
        ui.add_space(48.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("No scans yet").size(18.0).color(ThemeColors::TEXT_SECONDARY));
            ui.add_space(8.0);
            ui.label(
                RichText::new("Recognized images will show up here")
                    .size(13.0)
                    .color(ThemeColors::TEXT_MUTED),
            );
        });
        return None;
    }

    let mut action = None;
    egui::ScrollArea::vertical().show(ui, |ui| {
        for scan in &scans {
            if let Some(a) = scan_card(ui, scan) {
                action = Some(a);
            }
            ui.add_space(8.0);
        }
    });

    match action? {
        CardAction::Open(id) => {
            shared_state.write().history.select(Some(&id));
            Some(DashboardView::Details)
        }
        CardAction::Copy(text) => {
            ui.ctx().copy_text(text);
            None
        }
        CardAction::Delete(id) => {
            shared_state.write().history.remove(&id);
            None
        }
    }
}

fn scan_card(ui: &mut egui::Ui, scan: &Scan) -> Option<CardAction> {
    let mut action = None;

    let response = card_frame()
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.add(
                    egui::Image::new(image_uri(scan.image_path()))
                        .fit_to_exact_size(egui::vec2(64.0, 64.0))
                        .rounding(egui::Rounding::same(4.0)),
                );
                ui.add_space(12.0);

                ui.vertical(|ui| {
                    ui.label(
                        RichText::new(format_date(scan.created_at))
                            .size(12.0)
                            .color(ThemeColors::TEXT_MUTED),
                    );
                    ui.add_space(4.0);
                    ui.label(
                        RichText::new(truncate_text(&scan.extracted_text, PREVIEW_CHARS))
                            .size(16.0)
                            .color(ThemeColors::TEXT_PRIMARY),
                    );
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("Delete").clicked() {
                        action = Some(CardAction::Delete(scan.id.clone()));
                    }
                    if ui.small_button("Copy").clicked() {
                        action = Some(CardAction::Copy(scan.extracted_text.clone()));
                    }
                });
            });
        })
        .response;

    if action.is_none() && response.interact(Sense::click()).clicked() {
        action = Some(CardAction::Open(scan.id.clone()));
    }
    action
}

fn render_clear_confirmation(
    ui: &mut egui::Ui,
    view_state: &mut HistoryViewState,
    shared_state: &Arc<RwLock<SharedAppState>>,
    count: usize,
) {
    card_frame().show(ui, |ui| {
        ui.label(
            RichText::new(format!("Delete all {} scans? This cannot be undone.", count))
                .color(ThemeColors::TEXT_PRIMARY),
        );
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if ui.add(action_button("Clear all", ThemeColors::ACCENT_ERROR)).clicked() {
                shared_state.write().history.clear_all();
                view_state.confirm_clear = false;
            }
            ui.add_space(8.0);
            if ui.button("Cancel").clicked() {
                view_state.confirm_clear = false;
            }
        });
    });
}
