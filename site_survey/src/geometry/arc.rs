//! Circular arcs and their polyline approximations.

use std::f64::consts::TAU;

use super::Point;

/// Circular arc swept from `start_angle` by `sweep` radians
/// (positive counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

impl Arc {
    pub fn new(center: Point, radius: f64, start_angle: f64, sweep: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            sweep,
        }
    }

    /// Arc from `start` through `through` to `end`; `None` for collinear points.
    pub fn through(start: Point, through: Point, end: Point) -> Option<Self> {
        let d = 2.0 * (start.x * (through.y - end.y) + through.x * (end.y - start.y) + end.x * (start.y - through.y));
        if d.abs() < 1e-12 {
            return None;
        }
        let sq = |p: Point| p.x * p.x + p.y * p.y;
        let cx = (sq(start) * (through.y - end.y) + sq(through) * (end.y - start.y) + sq(end) * (start.y - through.y)) / d;
        let cy = (sq(start) * (end.x - through.x) + sq(through) * (start.x - end.x) + sq(end) * (through.x - start.x)) / d;
        let center = Point::new(cx, cy);
        let angle = |p: Point| (p.y - cy).atan2(p.x - cx);
        let a0 = angle(start);
        let ccw_to_end = (angle(end) - a0).rem_euclid(TAU);
        let ccw_to_mid = (angle(through) - a0).rem_euclid(TAU);
        let sweep = if ccw_to_mid <= ccw_to_end {
            ccw_to_end
        } else {
            ccw_to_end - TAU
        };
        Some(Self::new(center, center.distance_to(start), a0, sweep))
    }

    /// Returns the length of the arc.
    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }

    pub fn point_at(&self, angle: f64) -> Point {
        Point::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    /// `segments + 1` points from start to end.
    pub fn sample(&self, segments: usize) -> Vec<Point> {
        let n = segments.max(1);
        (0..=n)
            .map(|i| self.point_at(self.start_angle + self.sweep * i as f64 / n as f64))
            .collect()
    }
}

/// Vertices of a closed regular polygon approximating a circle.
pub fn circle_points(center: Point, radius: f64, segments: usize) -> Vec<Point> {
    let n = segments.max(3);
    (0..n)
        .map(|i| {
            let a = TAU * i as f64 / n as f64;
            Point::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_through_three_points() {
        let arc = Arc::through(Point::new(1.0, 0.0), Point::new(0.0, 1.0), Point::new(-1.0, 0.0)).unwrap();
        assert!(arc.center.distance_to(Point::new(0.0, 0.0)) < 1e-12);
        assert!((arc.radius - 1.0).abs() < 1e-12);
        assert!((arc.sweep - std::f64::consts::PI).abs() < 1e-12);
        let pts = arc.sample(4);
        assert_eq!(pts.len(), 5);
        assert!(pts[2].distance_to(Point::new(0.0, 1.0)) < 1e-12);
    }

    #[test]
    fn clockwise_arc_keeps_through_point() {
        let arc = Arc::through(Point::new(-1.0, 0.0), Point::new(0.0, 1.0), Point::new(1.0, 0.0)).unwrap();
        assert!(arc.sweep < 0.0);
        assert!(arc.sample(2)[1].distance_to(Point::new(0.0, 1.0)) < 1e-12);
    }

    #[test]
    fn collinear_points_have_no_arc() {
        assert!(Arc::through(Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 2.0)).is_none());
    }

    #[test]
    fn circle_has_requested_vertices() {
        let pts = circle_points(Point::new(2.0, 2.0), 3.0, 16);
        assert_eq!(pts.len(), 16);
        assert!(pts.iter().all(|p| (p.distance_to(Point::new(2.0, 2.0)) - 3.0).abs() < 1e-12));
    }
}
