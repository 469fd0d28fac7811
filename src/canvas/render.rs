//! Canvas render cache
//!
//! Keeps the flattened, smoothed geometry of every stroke so the UI only
//! re-smooths when something actually changed. Completed strokes are rebuilt
//! when the stroke list or the canvas size changes. The in-progress stroke
//! is rebuilt every `every_n_points` samples while dragging.

use super::path::smoothed_polyline;
use super::{DrawingSession, Point};

/// Default sampling interval for in-progress redraws
pub const DEFAULT_RENDER_EVERY_N_POINTS: usize = 4;

#[derive(Debug, Clone)]
pub struct CanvasRenderer {
    every_n_points: usize,
    completed: Vec<Vec<Point>>,
    current: Vec<Point>,
    cached_revision: Option<u64>,
    cached_size: Option<(f32, f32)>,
    rendered_current_len: usize,
    full_redraws: u64,
}

impl Default for CanvasRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_EVERY_N_POINTS)
    }
}

impl CanvasRenderer {
    pub fn new(every_n_points: usize) -> Self {
        Self {
            every_n_points: every_n_points.max(1),
            completed: Vec::new(),
            current: Vec::new(),
            cached_revision: None,
            cached_size: None,
            rendered_current_len: 0,
            full_redraws: 0,
        }
    }

    pub fn set_every_n_points(&mut self, every_n_points: usize) {
        self.every_n_points = every_n_points.max(1);
    }

    /// Bring cached geometry up to date with the session
    ///
    /// Returns true when any geometry was recomputed. Stroke coordinates are
    /// never rescaled when `size` changes.
    pub fn update(&mut self, session: &DrawingSession, size: (f32, f32)) -> bool {
        let mut redrawn = false;

        if self.cached_size != Some(size) || self.cached_revision != Some(session.revision()) {
            self.completed = session
                .strokes()
                .iter()
                .filter(|s| s.is_drawable())
                .map(|s| smoothed_polyline(s.points()))
                .collect();
            self.cached_size = Some(size);
            self.cached_revision = Some(session.revision());
            self.full_redraws += 1;
            redrawn = true;
        }

        let current_len = session.in_progress().map_or(0, |s| s.len());
        let current_due = redrawn
            || current_len < self.rendered_current_len
            || current_len >= self.rendered_current_len + self.every_n_points;

        if current_due {
            self.current = session
                .in_progress()
                .map(|s| smoothed_polyline(s.points()))
                .unwrap_or_default();
            self.rendered_current_len = current_len;
            redrawn = true;
        }

        redrawn
    }

    #[cfg(test)]
    /// Smoothed polylines of completed strokes, in completion order
    pub fn completed(&self) -> &[Vec<Point>] {
        &self.completed
    }

    #[cfg(test)]
    /// Smoothed polyline of the stroke being dragged (may lag by a few samples)
    pub fn in_progress(&self) -> &[Point] {
        &self.current
    }

    /// Everything to paint, completed strokes first
    pub fn polylines(&self) -> impl Iterator<Item = &[Point]> {
        self.completed
            .iter()
            .map(Vec::as_slice)
            .chain(std::iter::once(self.current.as_slice()))
            .filter(|p| p.len() >= 2)
    }

    /// Number of times completed geometry was rebuilt
    pub fn full_redraws(&self) -> u64 {
        self.full_redraws
    }
}
