//! Settings view - recognition options and service status

use egui::RichText;
use parking_lot::RwLock;
use std::cell::Cell;
use std::sync::Arc;

use crate::dashboard::components::{CardStatus, StatusCard};
use crate::dashboard::state::SettingsViewState;
use crate::dashboard::theme::{card_frame, ThemeColors};
use crate::recognition::ModelKind;
use crate::shared::{ServiceCommand, SharedAppState};

/// Render the settings view
pub fn render_settings_view(
    ui: &mut egui::Ui,
    view_state: &mut SettingsViewState,
    shared_state: &Arc<RwLock<SharedAppState>>,
) {
    ui.heading(RichText::new("Settings").size(24.0).strong());
    ui.add_space(8.0);
    ui.label(
        RichText::new("Recognition model, image processing and service connection")
            .size(14.0)
            .color(ThemeColors::TEXT_SECONDARY)
    );

    ui.add_space(24.0);

    // Track changes using Cell to avoid borrow issues
    let changed = Cell::new(false);

    egui::ScrollArea::vertical().show(ui, |ui| {
        render_model_section(ui, shared_state, &changed);
        ui.add_space(16.0);
        render_processing_section(ui, shared_state, &changed);
        ui.add_space(16.0);
        render_server_section(ui, view_state, shared_state, &changed);
        ui.add_space(16.0);
        render_model_info(ui);

        ui.add_space(24.0);
        ui.label(
            RichText::new("Settings are saved automatically")
                .size(12.0)
                .color(ThemeColors::TEXT_MUTED)
        );
    });

    // Picked up by the dashboard app, which writes the config file
    if changed.get() {
        view_state.has_unsaved_changes = true;
    }
}

fn section_title(ui: &mut egui::Ui, title: &str) {
    ui.heading(RichText::new(title).size(16.0));
    ui.add_space(12.0);
    ui.separator();
    ui.add_space(12.0);
}

fn render_model_section(
    ui: &mut egui::Ui,
    shared_state: &Arc<RwLock<SharedAppState>>,
    changed: &Cell<bool>,
) {
    card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        section_title(ui, "Model");

        let mut state = shared_state.write();
        let selected = state.config.recognition.selected_model;
        let readiness = state.runtime.readiness(selected);
        let busy = state.runtime.is_switching_model;

        ui.horizontal(|ui| {
            let active = state
                .runtime
                .service
                .current_model
                .map(|m| m.to_string())
                .unwrap_or_else(|| "None".to_string());
            StatusCard::new("Active model", active, CardStatus::from_runtime(&state.runtime, readiness))
                .show(ui);

            ui.add_space(16.0);
            ui.vertical(|ui| {
                if ui.add_enabled(!busy, egui::Button::new("Reload model")).clicked() {
                    state.runtime.request(ServiceCommand::SwitchModel(selected));
                }
                if ui
                    .add_enabled(!state.runtime.is_checking_health, egui::Button::new("Check status"))
                    .clicked()
                {
                    state.runtime.request(ServiceCommand::CheckHealth);
                }
            });
        });

        ui.add_space(12.0);

        for model in ModelKind::ALL {
            ui.horizontal(|ui| {
                let clicked = ui
                    .add_enabled(!busy, egui::RadioButton::new(selected == model, model.as_str()))
                    .clicked();
                ui.label(
                    RichText::new(model.description())
                        .size(12.0)
                        .color(ThemeColors::TEXT_MUTED)
                );
                if clicked && selected != model {
                    state.config.recognition.selected_model = model;
                    state.runtime.request(ServiceCommand::SwitchModel(model));
                    changed.set(true);
                }
            });
        }
    });
}

fn render_processing_section(
    ui: &mut egui::Ui,
    shared_state: &Arc<RwLock<SharedAppState>>,
    changed: &Cell<bool>,
) {
    card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        section_title(ui, "Image processing");

        let mut state = shared_state.write();
        let recognition = &mut state.config.recognition;

        if ui.checkbox(&mut recognition.enhance_image, "Enhance image").changed() {
            changed.set(true);
        }
        ui.label(
            RichText::new("Improve contrast and clean up noise before recognition")
                .size(11.0)
                .color(ThemeColors::TEXT_MUTED)
        );
        ui.add_space(8.0);

        if ui.checkbox(&mut recognition.post_process, "Post-process text").changed() {
            changed.set(true);
        }
        ui.label(
            RichText::new("Correct common recognition mistakes in the result")
                .size(11.0)
                .color(ThemeColors::TEXT_MUTED)
        );
    });
}

fn render_server_section(
    ui: &mut egui::Ui,
    view_state: &mut SettingsViewState,
    shared_state: &Arc<RwLock<SharedAppState>>,
    changed: &Cell<bool>,
) {
    card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        section_title(ui, "Server");

        let current = shared_state.read().config.general.server_url.clone();
        let input = view_state.server_url_input.get_or_insert_with(|| current.clone());

        ui.horizontal(|ui| {
            ui.label("Server URL:");
            ui.add_space(8.0);
            ui.add(egui::TextEdit::singleline(input).desired_width(280.0));

            let edited = input.trim() != current;
            if ui.add_enabled(edited, egui::Button::new("Save")).clicked() {
                let url = input.trim().to_string();
                let mut state = shared_state.write();
                state.config.general.server_url = url;
                state.runtime.set_notice("Server URL saved. Restart GlyphScan to connect to it.");
                changed.set(true);
            }
        });

        let mut state = shared_state.write();
        if ui
            .checkbox(&mut state.config.general.keep_diagnostic_copies, "Keep a copy of every recognized image")
            .changed()
        {
            changed.set(true);
        }
    });
}

fn render_model_info(ui: &mut egui::Ui) {
    card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        section_title(ui, "Model information");

        egui::Grid::new("model_info")
            .num_columns(2)
            .spacing([40.0, 8.0])
            .show(ui, |ui| {
                for (label, value) in [
                    ("Architecture:", ModelKind::Cnn.description()),
                    ("Input size:", "28x28x1 (grayscale)"),
                    ("Output classes:", "36 (A-Z, 0-9)"),
                ] {
                    ui.label(RichText::new(label).color(ThemeColors::TEXT_MUTED));
                    ui.label(value);
                    ui.end_row();
                }
            });
    });
}
