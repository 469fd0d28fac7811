//! Scan view - pick or draw an image and recognize it

use egui::RichText;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::dashboard::state::{ScanTab, ScanViewState};
use crate::dashboard::theme::{action_button, card_frame, ThemeColors};
use crate::dashboard::views::{canvas::render_canvas, image_uri};
use crate::recognition::ImageSource;
use crate::shared::{Readiness, RecognitionJob, ServiceCommand, SharedAppState};

/// Render the scan view
pub fn render_scan_view(
    ui: &mut egui::Ui,
    view_state: &mut ScanViewState,
    shared_state: &Arc<RwLock<SharedAppState>>,
) {
    let (readiness, is_extracting) = {
        let state = shared_state.read();
        (
            state.runtime.readiness(state.config.recognition.selected_model),
            state.runtime.is_extracting,
        )
    };

    ui.heading(RichText::new("Scan").size(24.0).strong());
    ui.add_space(8.0);
    ui.label(RichText::new(readiness.to_string()).size(14.0).color(readiness_color(readiness)));
    ui.add_space(16.0);

    // Tabs
    ui.horizontal(|ui| {
        for tab in [ScanTab::Camera, ScanTab::Drawing] {
            let label = RichText::new(tab.name()).size(16.0);
            if ui.selectable_label(view_state.tab == tab, label).clicked() {
                view_state.switch_tab(tab);
            }
            ui.add_space(8.0);
        }
    });
    ui.separator();
    ui.add_space(12.0);

    egui::ScrollArea::vertical().show(ui, |ui| {
        match view_state.tab {
            ScanTab::Camera => render_camera_tab(ui, view_state, shared_state, readiness, is_extracting),
            ScanTab::Drawing => render_canvas(ui, view_state, shared_state, is_extracting),
        }

        if is_extracting {
            ui.add_space(16.0);
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Extracting text...").color(ThemeColors::TEXT_SECONDARY));
            });
        }

        render_result(ui, view_state);
    });
}

fn render_camera_tab(
    ui: &mut egui::Ui,
    view_state: &mut ScanViewState,
    shared_state: &Arc<RwLock<SharedAppState>>,
    readiness: Readiness,
    is_extracting: bool,
) {
    // Files dropped anywhere on the window
    let dropped = ui
        .ctx()
        .input(|i| i.raw.dropped_files.iter().find_map(|f| f.path.clone()));
    if let Some(path) = dropped {
        if let Err(e) = view_state.choose_image(&path.to_string_lossy()) {
            shared_state.write().runtime.set_error(e);
        }
    }

    ui.horizontal(|ui| {
        ui.label("Image path:");
        ui.add_space(8.0);
        let response = ui.add(
            egui::TextEdit::singleline(&mut view_state.path_input)
                .hint_text("/path/to/image.png")
                .desired_width(360.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Load").clicked() || submitted {
            let input = view_state.path_input.clone();
            if let Err(e) = view_state.choose_image(&input) {
                shared_state.write().runtime.set_error(e);
            }
        }
    });
    ui.label(
        RichText::new("Or drop an image file onto the window")
            .size(12.0)
            .color(ThemeColors::TEXT_MUTED),
    );
    ui.add_space(12.0);

    let Some(image) = view_state.selected_image.clone() else {
        return;
    };

    card_frame().show(ui, |ui| {
        ui.add(
            egui::Image::new(image_uri(&image))
                .max_height(240.0)
                .maintain_aspect_ratio(true),
        );
    });
    ui.add_space(12.0);

    let can_submit = !is_extracting;
    if ui
        .add_enabled(can_submit, action_button("Extract text", ThemeColors::ACCENT_SUCCESS))
        .clicked()
    {
        let mut state = shared_state.write();
        if !readiness.is_ready() {
            state.runtime.set_error("Model not ready");
            return;
        }
        let config = state.config.recognition_config();
        state.runtime.request(ServiceCommand::Recognize(RecognitionJob::new(
            image,
            ImageSource::Camera,
            config,
        )));
    }
}

fn render_result(ui: &mut egui::Ui, view_state: &mut ScanViewState) {
    let Some(result) = &view_state.result else {
        return;
    };
    let text = result.text.clone();

    ui.add_space(16.0);
    let mut new_scan = false;
    card_frame().show(ui, |ui| {
        ui.label(RichText::new("Recognized text").size(12.0).color(ThemeColors::TEXT_MUTED));
        ui.add_space(8.0);
        ui.label(RichText::new(&text).size(32.0).color(ThemeColors::TEXT_PRIMARY).strong());
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if ui.button("Copy").clicked() {
                ui.ctx().copy_text(text.clone());
            }
            if ui.button("New scan").clicked() {
                new_scan = true;
            }
        });
    });

    if new_scan {
        view_state.new_scan();
    }
}

fn readiness_color(readiness: Readiness) -> egui::Color32 {
    match readiness {
        Readiness::Ready(_) => ThemeColors::ACCENT_SUCCESS,
        Readiness::Loading(_) => ThemeColors::ACCENT_WARNING,
        Readiness::NotLoaded(_) => ThemeColors::ACCENT_ERROR,
    }
}
