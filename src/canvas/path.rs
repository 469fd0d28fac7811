//! Stroke smoothing
//!
//! Consecutive samples are joined with quadratic curves whose control point
//! is the earlier sample and whose end point is the midpoint of the pair.
//! The path then runs straight to the final sample, so it always starts on
//! the first sample and ends on the last one.

use super::Point;

/// Number of line segments used to approximate one quadratic curve
pub const CURVE_STEPS: usize = 8;

/// A single drawing instruction in a smoothed path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    QuadTo { ctrl: Point, to: Point },
    LineTo(Point),
}

/// Build the smoothed path for a stroke
///
/// Returns an empty path for fewer than two points.
pub fn smooth_path(points: &[Point]) -> Vec<PathSegment> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut segments = Vec::with_capacity(points.len() + 1);
    segments.push(PathSegment::MoveTo(points[0]));

    for pair in points.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        segments.push(PathSegment::QuadTo {
            ctrl: prev,
            to: prev.midpoint(cur),
        });
    }

    segments.push(PathSegment::LineTo(points[points.len() - 1]));
    segments
}

/// Evaluate a quadratic Bezier at `t` in [0, 1]
pub fn quadratic_point(start: Point, ctrl: Point, end: Point, t: f32) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * start.x + 2.0 * u * t * ctrl.x + t * t * end.x,
        u * u * start.y + 2.0 * u * t * ctrl.y + t * t * end.y,
    )
}

/// Flatten a path into a polyline
pub fn flatten(segments: &[PathSegment], steps_per_curve: usize) -> Vec<Point> {
    let steps = steps_per_curve.max(1);
    let mut polyline: Vec<Point> = Vec::new();
    let mut pen: Option<Point> = None;

    for segment in segments {
        match *segment {
            PathSegment::MoveTo(p) => {
                polyline.push(p);
                pen = Some(p);
            }
            PathSegment::QuadTo { ctrl, to } => {
                let start = pen.unwrap_or(ctrl);
                for i in 1..=steps {
                    let t = i as f32 / steps as f32;
                    push_distinct(&mut polyline, quadratic_point(start, ctrl, to, t));
                }
                pen = Some(to);
            }
            PathSegment::LineTo(p) => {
                push_distinct(&mut polyline, p);
                pen = Some(p);
            }
        }
    }

    polyline
}

/// Smoothed polyline for a raw list of samples
pub fn smoothed_polyline(points: &[Point]) -> Vec<Point> {
    flatten(&smooth_path(points), CURVE_STEPS)
}

fn push_distinct(polyline: &mut Vec<Point>, p: Point) {
    if polyline.last() != Some(&p) {
        polyline.push(p);
    }
}
