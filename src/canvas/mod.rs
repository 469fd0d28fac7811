//! Drawing Canvas Layer
//!
//! Freehand stroke capture for the drawing tab. Strokes are recorded in the
//! canvas's local coordinate space, smoothed for display, and exported to a
//! square image for recognition.

pub mod path;
pub mod render;
pub mod snapshot;

pub use render::CanvasRenderer;
pub use snapshot::{CanvasSize, ExportError, ExportOptions, Snapshot, SnapshotExporter};

/// A sampled pointer location relative to the canvas origin
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point halfway between `self` and `other`
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Euclidean distance to `other`
    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// One continuous drag gesture, in the order points were sampled
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    /// Start a stroke anchored at `origin`
    pub fn starting_at(origin: Point) -> Self {
        Self { points: vec![origin] }
    }

    #[cfg(test)]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Whether the stroke has enough points to be smoothed and drawn
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= MIN_STROKE_POINTS
    }
}

/// Strokes shorter than this are discarded on release
pub const MIN_STROKE_POINTS: usize = 2;

/// Completed strokes plus the stroke currently being dragged
///
/// The in-progress stroke only joins the completed list on pointer release.
/// `revision` changes whenever the completed list changes so renderers can
/// tell when cached geometry is stale.
#[derive(Debug, Clone, Default)]
pub struct DrawingSession {
    strokes: Vec<Stroke>,
    current: Option<Stroke>,
    revision: u64,
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer down: begin a new stroke at `point`
    ///
    /// A stroke left open by a missed release is dropped first.
    pub fn begin_stroke(&mut self, point: Point) {
        self.current = Some(Stroke::starting_at(point));
    }

    /// Pointer move: append to the in-progress stroke
    ///
    /// Returns false when no stroke is in progress or the pointer has not
    /// moved since the last sample.
    pub fn extend_stroke(&mut self, point: Point) -> bool {
        match self.current.as_mut() {
            Some(stroke) if stroke.last() != Some(point) => {
                stroke.push(point);
                true
            }
            _ => false,
        }
    }

    /// Pointer up: commit the in-progress stroke
    ///
    /// Returns true when the stroke was long enough to keep.
    pub fn end_stroke(&mut self) -> bool {
        match self.current.take() {
            Some(stroke) if stroke.is_drawable() => {
                self.strokes.push(stroke);
                self.revision += 1;
                true
            }
            _ => false,
        }
    }

    /// Remove every stroke, including one being dragged
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.current = None;
        self.revision += 1;
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn in_progress(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    /// True when nothing has been committed yet
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(session: &mut DrawingSession, points: &[(f32, f32)]) -> bool {
        let mut iter = points.iter();
        if let Some(&(x, y)) = iter.next() {
            session.begin_stroke(Point::new(x, y));
        }
        for &(x, y) in iter {
            session.extend_stroke(Point::new(x, y));
        }
        session.end_stroke()
    }

    #[test]
    fn test_stroke_committed_on_release() {
        let mut session = DrawingSession::new();
        assert!(drag(&mut session, &[(1.0, 1.0), (2.0, 3.0), (4.0, 5.0)]));

        assert_eq!(session.strokes().len(), 1);
        assert_eq!(session.strokes()[0].len(), 3);
        assert!(session.in_progress().is_none());
        assert!(!session.is_drawing());
    }

    #[test]
    fn test_in_progress_not_completed_until_release() {
        let mut session = DrawingSession::new();
        session.begin_stroke(Point::new(0.0, 0.0));
        session.extend_stroke(Point::new(5.0, 5.0));

        assert!(session.is_empty());
        assert_eq!(session.in_progress().map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_single_point_stroke_discarded() {
        let mut session = DrawingSession::new();
        assert!(!drag(&mut session, &[(10.0, 10.0)]));

        assert!(session.is_empty());
        assert!(session.in_progress().is_none());
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn test_tap_without_movement_leaves_canvas_empty() {
        let mut session = DrawingSession::new();
        session.begin_stroke(Point::new(192.0, 92.0));
        assert!(!session.extend_stroke(Point::new(192.0, 92.0)));
        assert!(!session.end_stroke());

        assert!(session.is_empty());
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn test_repeated_sample_not_duplicated() {
        let mut session = DrawingSession::new();
        assert!(drag(&mut session, &[(0.0, 0.0), (0.0, 0.0), (4.0, 4.0), (4.0, 4.0)]));

        assert_eq!(
            session.strokes()[0].points(),
            &[Point::new(0.0, 0.0), Point::new(4.0, 4.0)]
        );
    }

    #[test]
    fn test_release_without_stroke_is_noop() {
        let mut session = DrawingSession::new();
        assert!(!session.end_stroke());
        assert!(!session.extend_stroke(Point::new(1.0, 1.0)));
        assert!(session.is_empty());
    }

    #[test]
    fn test_out_of_bounds_points_accepted() {
        let mut session = DrawingSession::new();
        drag(&mut session, &[(-50.0, -10.0), (9000.0, 12.5)]);

        let points = session.strokes()[0].points().to_vec();
        assert_eq!(points, vec![Point::new(-50.0, -10.0), Point::new(9000.0, 12.5)]);
    }

    #[test]
    fn test_strokes_kept_in_completion_order() {
        let mut session = DrawingSession::new();
        drag(&mut session, &[(0.0, 0.0), (1.0, 1.0)]);
        drag(&mut session, &[(5.0, 5.0), (6.0, 6.0)]);

        assert_eq!(session.strokes()[0].points()[0], Point::new(0.0, 0.0));
        assert_eq!(session.strokes()[1].points()[0], Point::new(5.0, 5.0));
        assert_eq!(session.revision(), 2);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = DrawingSession::new();
        drag(&mut session, &[(0.0, 0.0), (1.0, 1.0)]);
        session.begin_stroke(Point::new(3.0, 3.0));

        session.clear();

        assert!(session.is_empty());
        assert!(!session.is_drawing());
        assert!(session.in_progress().is_none());
    }

    #[test]
    fn test_point_midpoint_and_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(6.0, 8.0);
        assert_eq!(a.midpoint(b), Point::new(3.0, 4.0));
        assert!((a.distance(b) - 10.0).abs() < 1e-6);
    }
}
