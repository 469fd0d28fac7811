//! Snapshot export
//!
//! Rasterizes the drawing to a PNG and crops it to a square around the ink.
//! The crop is planned from stroke coordinates alone, so the geometry can be
//! checked without touching the filesystem.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::path::smoothed_polyline;
use super::{DrawingSession, Point, Stroke};

/// Margin added around the ink before cropping
pub const DEFAULT_CROP_PADDING: f32 = 20.0;
/// Padded boxes narrower or shorter than this export the full canvas
pub const DEFAULT_MIN_CROP_SIZE: f32 = 10.0;
pub const DEFAULT_STROKE_WIDTH: f32 = 5.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Draw something first")]
    NothingToExport,
    #[error("Canvas has no area ({width}x{height})")]
    EmptyCanvas { width: u32, height: u32 },
    #[error("Failed to encode snapshot: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to write snapshot: {0}")]
    Io(#[from] std::io::Error),
}

/// Canvas dimensions in whole pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Round a floating-point canvas size to whole pixels
    pub fn from_f32(width: f32, height: f32) -> Self {
        Self::new(width.max(0.0).round() as u32, height.max(0.0).round() as u32)
    }
}

/// Axis-aligned bounds in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    /// Smallest box containing every point, or None for no points
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self { min_x: p.x, min_y: p.y, max_x: p.x, max_y: p.y },
                Some(b) => Self {
                    min_x: b.min_x.min(p.x),
                    min_y: b.min_y.min(p.y),
                    max_x: b.max_x.max(p.x),
                    max_y: b.max_y.max(p.y),
                },
            })
        })
    }

    /// Grow by `padding` on every side, clamped to the canvas
    pub fn padded(&self, padding: f32, canvas: CanvasSize) -> Self {
        Self {
            min_x: (self.min_x - padding).max(0.0),
            min_y: (self.min_y - padding).max(0.0),
            max_x: (self.max_x + padding).min(canvas.width as f32),
            max_y: (self.max_y + padding).min(canvas.height as f32),
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// Square crop in whole pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// What the exporter will write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPlan {
    /// Ink region too small to crop; send the whole canvas
    FullCanvas,
    Crop(CropRegion),
}

/// Export tuning
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub padding: f32,
    pub min_crop_size: f32,
    pub stroke_width: f32,
    pub background: [u8; 4],
    pub ink: [u8; 4],
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_CROP_PADDING,
            min_crop_size: DEFAULT_MIN_CROP_SIZE,
            stroke_width: DEFAULT_STROKE_WIDTH,
            background: [240, 240, 240, 255],
            ink: [0, 0, 0, 255],
        }
    }
}

/// Decide how to export the given strokes
///
/// The square side is `max(padded width, padded height)` rounded to a pixel.
/// When the square would overflow an edge the offset is shifted back inside.
/// A square larger than the canvas's short side is capped to that side.
pub fn plan_export(
    strokes: &[Stroke],
    canvas: CanvasSize,
    options: &ExportOptions,
) -> Result<ExportPlan, ExportError> {
    if strokes.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    if canvas.width == 0 || canvas.height == 0 {
        return Err(ExportError::EmptyCanvas { width: canvas.width, height: canvas.height });
    }

    let bounds = BoundingBox::from_points(strokes.iter().flat_map(|s| s.points().iter().copied()))
        .ok_or(ExportError::NothingToExport)?;
    let padded = bounds.padded(options.padding, canvas);

    if padded.width() < options.min_crop_size || padded.height() < options.min_crop_size {
        debug!("Ink region {:?} below minimum crop size, exporting full canvas", padded);
        return Ok(ExportPlan::FullCanvas);
    }

    let side = padded.width().max(padded.height()).round() as u32;
    let size = side.min(canvas.width).min(canvas.height).max(1);
    let center = padded.center();
    let half = size as f32 / 2.0;

    let x = clamp_offset(center.x - half, canvas.width - size);
    let y = clamp_offset(center.y - half, canvas.height - size);

    Ok(ExportPlan::Crop(CropRegion { x, y, size }))
}

fn clamp_offset(offset: f32, max: u32) -> u32 {
    (offset.round().max(0.0) as u32).min(max)
}

/// Draw every drawable stroke onto a fresh canvas-sized image
pub fn rasterize(strokes: &[Stroke], canvas: CanvasSize, options: &ExportOptions) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(canvas.width, canvas.height, Rgba(options.background));
    let ink = Rgba(options.ink);
    let radius = ((options.stroke_width / 2.0).round() as i32).max(1);
    let spacing = (radius as f32 / 2.0).max(0.5);

    for stroke in strokes.iter().filter(|s| s.is_drawable()) {
        let polyline = smoothed_polyline(stroke.points());
        if let Some(first) = polyline.first() {
            stamp(&mut image, *first, radius, ink);
        }
        for pair in polyline.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let steps = (a.distance(b) / spacing).ceil().max(1.0) as usize;
            for i in 1..=steps {
                let t = i as f32 / steps as f32;
                let p = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
                stamp(&mut image, p, radius, ink);
            }
        }
    }

    image
}

fn stamp(image: &mut RgbaImage, p: Point, radius: i32, ink: Rgba<u8>) {
    draw_filled_circle_mut(image, (p.x.round() as i32, p.y.round() as i32), radius, ink);
}

/// A written snapshot file
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub path: PathBuf,
    pub plan: ExportPlan,
    pub width: u32,
    pub height: u32,
}

/// Writes drawing snapshots into a directory
#[derive(Debug, Clone)]
pub struct SnapshotExporter {
    output_dir: PathBuf,
    options: ExportOptions,
}

impl SnapshotExporter {
    pub fn new(output_dir: impl Into<PathBuf>, options: ExportOptions) -> Self {
        Self { output_dir: output_dir.into(), options }
    }

    /// Export the session's completed strokes
    ///
    /// Fails with `NothingToExport` before touching the filesystem when the
    /// session has no strokes.
    pub fn export(&self, session: &DrawingSession, canvas: CanvasSize) -> Result<Snapshot, ExportError> {
        let plan = plan_export(session.strokes(), canvas, &self.options)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let id = Uuid::new_v4().simple().to_string();
        let full_path = self.output_dir.join(format!("canvas_{}.png", id));

        rasterize(session.strokes(), canvas, &self.options).save(&full_path)?;

        match plan {
            ExportPlan::FullCanvas => {
                debug!("Exported full canvas to {:?}", full_path);
                Ok(Snapshot { path: full_path, plan, width: canvas.width, height: canvas.height })
            }
            ExportPlan::Crop(region) => {
                let cropped_path = self.output_dir.join(format!("snapshot_{}.png", id));
                let result = crop_file(&full_path, &cropped_path, region);
                let _ = std::fs::remove_file(&full_path);
                result?;

                debug!("Exported {}px crop at ({}, {}) to {:?}", region.size, region.x, region.y, cropped_path);
                Ok(Snapshot { path: cropped_path, plan, width: region.size, height: region.size })
            }
        }
    }
}

fn crop_file(source: &Path, target: &Path, region: CropRegion) -> Result<(), ExportError> {
    let full: DynamicImage = image::open(source)?;
    full.crop_imm(region.x, region.y, region.size, region.size).save(target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn stroke(raw: &[(f32, f32)]) -> Stroke {
        Stroke::from_points(raw.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    fn session_with(strokes: &[&[(f32, f32)]]) -> DrawingSession {
        let mut session = DrawingSession::new();
        for raw in strokes {
            let mut iter = raw.iter();
            if let Some(&(x, y)) = iter.next() {
                session.begin_stroke(Point::new(x, y));
            }
            for &(x, y) in iter {
                session.extend_stroke(Point::new(x, y));
            }
            session.end_stroke();
        }
        session
    }

    const CANVAS: CanvasSize = CanvasSize::new(300, 300);

    #[test]
    fn test_no_strokes_is_input_error() {
        let result = plan_export(&[], CANVAS, &ExportOptions::default());
        assert!(matches!(result, Err(ExportError::NothingToExport)));
    }

    #[test]
    fn test_bounding_box_spans_all_strokes() {
        let strokes = [stroke(&[(10.0, 40.0), (30.0, 20.0)]), stroke(&[(70.0, 90.0), (50.0, 60.0)])];
        let bounds = BoundingBox::from_points(strokes.iter().flat_map(|s| s.points().iter().copied()));

        assert_eq!(
            bounds,
            Some(BoundingBox { min_x: 10.0, min_y: 20.0, max_x: 70.0, max_y: 90.0 })
        );
    }

    #[test]
    fn test_crop_is_square_of_larger_padded_side() {
        let strokes = [stroke(&[(100.0, 100.0), (150.0, 200.0)])];
        let plan = plan_export(&strokes, CANVAS, &ExportOptions::default()).unwrap();

        // padded box 80..170 x 80..220 -> 90 x 140, centered at (125, 150)
        assert_eq!(plan, ExportPlan::Crop(CropRegion { x: 55, y: 80, size: 140 }));
    }

    #[test]
    fn test_crop_shifted_inside_canvas_edges() {
        let strokes = [stroke(&[(5.0, 5.0), (15.0, 120.0)])];
        let plan = plan_export(&strokes, CANVAS, &ExportOptions::default()).unwrap();

        // padded box 0..35 x 0..140 -> side 140, centered square would start at x < 0
        let ExportPlan::Crop(region) = plan else {
            panic!("expected crop, got {:?}", plan);
        };
        assert_eq!(region.size, 140);
        assert_eq!(region.x, 0);
        assert_eq!(region.y, 0);

        let strokes = [stroke(&[(290.0, 250.0), (295.0, 299.0)])];
        let ExportPlan::Crop(region) = plan_export(&strokes, CANVAS, &ExportOptions::default()).unwrap() else {
            panic!("expected crop");
        };
        assert!(region.x + region.size <= CANVAS.width);
        assert!(region.y + region.size <= CANVAS.height);
    }

    #[test]
    fn test_crop_always_within_canvas() {
        let options = ExportOptions::default();
        let samples: &[&[(f32, f32)]] = &[
            &[(0.0, 0.0), (299.0, 299.0)],
            &[(150.0, 10.0), (160.0, 290.0)],
            &[(1.0, 150.0), (298.0, 151.0)],
            &[(200.0, 200.0), (260.0, 210.0)],
        ];

        for raw in samples {
            let plan = plan_export(&[stroke(raw)], CanvasSize::new(300, 200), &options).unwrap();
            if let ExportPlan::Crop(r) = plan {
                assert!(r.x + r.size <= 300, "{:?} overflows width", r);
                assert!(r.y + r.size <= 200, "{:?} overflows height", r);
            }
        }
    }

    #[test]
    fn test_small_region_falls_back_to_full_canvas() {
        let options = ExportOptions { padding: 2.0, ..ExportOptions::default() };
        let strokes = [stroke(&[(100.0, 100.0), (101.0, 101.0)])];

        let plan = plan_export(&strokes, CANVAS, &options).unwrap();
        assert_eq!(plan, ExportPlan::FullCanvas);
    }

    #[test]
    fn test_off_canvas_ink_falls_back_to_full_canvas() {
        let strokes = [stroke(&[(-100.0, -100.0), (-90.0, -95.0)])];
        let plan = plan_export(&strokes, CANVAS, &ExportOptions::default()).unwrap();
        assert_eq!(plan, ExportPlan::FullCanvas);
    }

    #[test]
    fn test_rasterize_draws_ink() {
        let strokes = [stroke(&[(10.0, 10.0), (50.0, 10.0)])];
        let image = rasterize(&strokes, CanvasSize::new(64, 32), &ExportOptions::default());

        assert_eq!(image.dimensions(), (64, 32));
        assert_eq!(image.get_pixel(30, 10).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(30, 28).0, [240, 240, 240, 255]);
    }

    #[test]
    fn test_export_writes_square_png() {
        let dir = tempdir().unwrap();
        let exporter = SnapshotExporter::new(dir.path(), ExportOptions::default());
        let session = session_with(&[&[(100.0, 100.0), (120.0, 140.0), (150.0, 200.0)]]);

        let snapshot = exporter.export(&session, CANVAS).unwrap();

        assert_eq!(snapshot.width, snapshot.height);
        let written = image::open(&snapshot.path).unwrap();
        assert_eq!(written.width(), 140);
        assert_eq!(written.height(), 140);

        // only the cropped file is left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_export_without_strokes_writes_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("snapshots");
        let exporter = SnapshotExporter::new(&out, ExportOptions::default());

        let result = exporter.export(&DrawingSession::new(), CANVAS);

        assert!(matches!(result, Err(ExportError::NothingToExport)));
        assert!(!out.exists());
    }

    #[test]
    fn test_export_full_canvas_keeps_canvas_size() {
        let dir = tempdir().unwrap();
        let options = ExportOptions { padding: 0.0, ..ExportOptions::default() };
        let exporter = SnapshotExporter::new(dir.path(), options);
        let session = session_with(&[&[(40.0, 40.0), (42.0, 41.0)]]);

        let snapshot = exporter.export(&session, CanvasSize::new(120, 80)).unwrap();

        assert_eq!(snapshot.plan, ExportPlan::FullCanvas);
        let written = image::open(&snapshot.path).unwrap();
        assert_eq!((written.width(), written.height()), (120, 80));
    }
}
