//! Drawing canvas - freehand strokes exported straight to recognition

use egui::{Pos2, Rect, RichText, Rounding, Sense, Shape, Stroke};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::canvas::{CanvasSize, ExportError, Point, Snapshot, SnapshotExporter};
use crate::dashboard::state::ScanViewState;
use crate::dashboard::theme::{action_button, ThemeColors};
use crate::recognition::ImageSource;
use crate::shared::{RecognitionJob, ServiceCommand, SharedAppState};
use crate::storage;

/// Render the drawing canvas and its actions
pub fn render_canvas(
    ui: &mut egui::Ui,
    view_state: &mut ScanViewState,
    shared_state: &Arc<RwLock<SharedAppState>>,
    is_extracting: bool,
) {
    let canvas_settings = shared_state.read().config.canvas.clone();
    view_state.renderer.set_every_n_points(canvas_settings.render_every_n_points);

    let desired = egui::vec2(ui.available_width(), canvas_settings.height);
    let (rect, response) = ui.allocate_exact_size(desired, Sense::drag());
    view_state.canvas_size = (rect.width(), rect.height());

    // Pointer positions are recorded relative to the canvas origin
    let local = |pos: Pos2| Point::new(pos.x - rect.min.x, pos.y - rect.min.y);
    let pointer = response.interact_pointer_pos();

    if response.drag_started() {
        if let Some(pos) = pointer {
            view_state.drawing.begin_stroke(local(pos));
        }
    } else if response.dragged() {
        if let Some(pos) = pointer {
            view_state.drawing.extend_stroke(local(pos));
        }
    }
    if response.drag_stopped() && view_state.drawing.end_stroke() {
        // a new drawing invalidates the previous snapshot
        view_state.drawing_image = None;
    }

    if view_state.renderer.update(&view_state.drawing, view_state.canvas_size) {
        debug!("Canvas geometry rebuilt ({} full redraws)", view_state.renderer.full_redraws());
    }

    paint_canvas(ui, rect, view_state, canvas_settings.stroke_width);

    ui.add_space(12.0);

    ui.horizontal(|ui| {
        let has_strokes = !view_state.drawing.is_empty();

        if ui
            .add_enabled(!is_extracting, action_button("Extract", ThemeColors::ACCENT_SUCCESS))
            .clicked()
        {
            let mut state = shared_state.write();
            match export_snapshot(view_state, &state) {
                Ok(snapshot) => {
                    debug!(
                        "Snapshot {}x{} ({:?}) at {:?}",
                        snapshot.width, snapshot.height, snapshot.plan, snapshot.path
                    );
                    let config = state.config.recognition_config();
                    view_state.drawing_image = Some(snapshot.path.clone());
                    state.runtime.request(ServiceCommand::Recognize(RecognitionJob::new(
                        snapshot.path,
                        ImageSource::Drawing,
                        config,
                    )));
                }
                Err(e) => {
                    warn!("Snapshot export failed: {}", e);
                    state.runtime.set_error(e.to_string());
                }
            }
        }

        ui.add_space(8.0);

        if ui.add_enabled(has_strokes, egui::Button::new("Clear")).clicked() {
            view_state.new_scan();
        }

        ui.add_space(16.0);
        ui.label(
            RichText::new(format!("{} strokes", view_state.drawing.strokes().len()))
                .size(12.0)
                .color(ThemeColors::TEXT_MUTED),
        );
    });
}

fn paint_canvas(ui: &egui::Ui, rect: Rect, view_state: &ScanViewState, stroke_width: f32) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, Rounding::same(8.0), ThemeColors::CANVAS_BG);

    let to_screen = |p: &Point| Pos2::new(rect.min.x + p.x, rect.min.y + p.y);
    let ink = Stroke::new(stroke_width, ThemeColors::INK);

    for polyline in view_state.renderer.polylines() {
        let points: Vec<Pos2> = polyline.iter().map(to_screen).collect();
        painter.add(Shape::line(points, ink));
    }

    if view_state.drawing.is_empty() && !view_state.drawing.is_drawing() {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "Draw a character here",
            egui::FontId::proportional(16.0),
            ThemeColors::TEXT_MUTED,
        );
    }
}

/// Write the drawing to the snapshot directory
fn export_snapshot(view_state: &ScanViewState, state: &SharedAppState) -> Result<Snapshot, ExportError> {
    if view_state.drawing.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    let dir = storage::get_snapshot_dir()
        .map_err(|e| ExportError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string())))?;

    let (width, height) = view_state.canvas_size;
    SnapshotExporter::new(dir, state.config.canvas.export_options())
        .export(&view_state.drawing, CanvasSize::from_f32(width, height))
}
