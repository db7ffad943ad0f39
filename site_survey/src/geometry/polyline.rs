//! Polyline entity stored in the drawing.

use super::{Bounds, Line, Point};
use crate::styles::Color;

/// Ordered vertex list, optionally closed, tagged with a layer and colour.
///
/// A closed polyline has an implicit edge from the last vertex back to the
/// first; it is never stored as a repeated vertex.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
    pub layer: String,
    pub color: Color,
}

impl Polyline {
    /// Creates an open polyline on `layer`.
    pub fn new(points: Vec<Point>, layer: &str, color: Color) -> Self {
        Self {
            points,
            closed: false,
            layer: layer.to_string(),
            color,
        }
    }

    /// Creates a closed polyline on `layer`.
    pub fn closed(points: Vec<Point>, layer: &str, color: Color) -> Self {
        Self {
            closed: true,
            ..Self::new(points, layer, color)
        }
    }

    /// Whether the polyline has any geometry (two or more vertices).
    pub fn has_geometry(&self) -> bool {
        self.points.len() >= 2
    }

    /// Number of edges including the closing edge of a closed polyline.
    pub fn segment_count(&self) -> usize {
        match self.points.len() {
            0 | 1 => 0,
            2 => 1,
            n if self.closed => n,
            n => n - 1,
        }
    }

    /// Edge `i`, wrapping to the first vertex for the closing edge.
    pub fn segment(&self, i: usize) -> Line {
        let n = self.points.len();
        Line::new(self.points[i], self.points[(i + 1) % n])
    }

    /// Iterates every edge, including the closing edge when closed.
    pub fn segments(&self) -> impl Iterator<Item = Line> + '_ {
        (0..self.segment_count()).map(move |i| self.segment(i))
    }

    /// Total length including the closing edge.
    pub fn length(&self) -> f64 {
        self.segments().map(|s| s.length()).sum()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points.iter().copied())
    }

    /// Reverses vertex order in place.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Index of the edge nearest to `p` with the clamped projection onto it.
    pub fn nearest_segment(&self, p: Point) -> Option<(usize, Point, f64)> {
        self.segments()
            .enumerate()
            .map(|(i, seg)| {
                let q = seg.nearest_point(p);
                (i, q, q.distance_to(p))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
    }

    /// Index of the first vertex within `tolerance` of `p`.
    pub fn vertex_near(&self, p: Point, tolerance: f64) -> Option<usize> {
        self.points
            .iter()
            .position(|v| v.distance_to(p) <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(closed: bool) -> Polyline {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        if closed {
            Polyline::closed(pts, "0", Color::WHITE)
        } else {
            Polyline::new(pts, "0", Color::WHITE)
        }
    }

    #[test]
    fn closing_edge_counts_toward_length() {
        assert!((square(false).length() - 12.0).abs() < 1e-9);
        assert!((square(true).length() - 16.0).abs() < 1e-9);
        assert_eq!(square(true).segment_count(), 4);
    }

    #[test]
    fn nearest_segment_picks_closing_edge() {
        let (idx, q, d) = square(true).nearest_segment(Point::new(-1.0, 2.0)).unwrap();
        assert_eq!(idx, 3);
        assert_eq!(q, Point::new(0.0, 2.0));
        assert!((d - 1.0).abs() < 1e-12);
    }

    #[test]
    fn short_polylines_have_no_geometry() {
        let p = Polyline::new(vec![Point::new(1.0, 1.0)], "0", Color::WHITE);
        assert!(!p.has_geometry());
        assert_eq!(p.segment_count(), 0);
        assert_eq!(p.length(), 0.0);
    }
}
