//! Basic geometry primitives for CAD operations.

mod arc;
pub mod library;
mod line;
mod point;
mod point3;
mod polyline;

pub use arc::{circle_points, Arc};
pub use library::{DefaultGeometry, GeometryError, GeometryLibrary};
pub use line::{line_intersection, segment_intersection, Bounds, Line, DEGENERATE_LENGTH_SQ};
pub use point::Point;
pub use point3::Point3;
pub use polyline::Polyline;

/// Cross products below this magnitude treat two unit directions as parallel.
pub const PARALLEL_EPSILON: f64 = 1e-9;

/// Calculates the Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Signed shoelace area, positive for counter-clockwise rings.
pub fn signed_area(vertices: &[Point]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..vertices.len() {
        let j = (i + 1) % vertices.len();
        sum += vertices[i].x * vertices[j].y - vertices[j].x * vertices[i].y;
    }
    sum * 0.5
}

/// Calculates the area of a simple polygon using the shoelace formula.
pub fn polygon_area(vertices: &[Point]) -> f64 {
    signed_area(vertices).abs()
}

/// Returns `true` if point `p` is inside the polygon defined by `poly` using
/// the ray casting algorithm.
pub fn point_in_polygon(p: Point, poly: &[Point]) -> bool {
    let mut inside = false;
    if poly.is_empty() {
        return inside;
    }
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let pi = poly[i];
        let pj = poly[j];
        if ((pi.y > p.y) != (pj.y > p.y))
            && (p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Removes consecutive vertices closer than `tolerance`, including a closing
/// duplicate of the first vertex when `closed`.
pub fn dedup_points(points: &[Point], closed: bool, tolerance: f64) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().map_or(true, |q| q.distance_to(p) >= tolerance) {
            out.push(p);
        }
    }
    if closed && out.len() > 1 && out[0].distance_to(out[out.len() - 1]) < tolerance {
        out.pop();
    }
    out
}

/// Translates every edge along its left normal by `signed_distance` and
/// reconnects consecutive edges at their intersection.
///
/// Open chains keep the raw offset end points. Parallel neighbours fall back
/// to the midpoint of the two coincident offset endpoints. Zero-length edges
/// must be removed beforehand; `None` is returned if any remain.
pub fn parallel_offset(points: &[Point], closed: bool, signed_distance: f64) -> Option<Vec<Point>> {
    let n = points.len();
    if n < 2 {
        return None;
    }
    let edge_count = if closed && n > 2 { n } else { n - 1 };
    let mut edges = Vec::with_capacity(edge_count);
    for i in 0..edge_count {
        let a = points[i];
        let b = points[(i + 1) % n];
        let normal = (b - a).normalized()?.perp();
        let shift = normal * signed_distance;
        edges.push(Line::new(a + shift, b + shift));
    }

    let join = |prev: &Line, next: &Line| -> Point {
        let d1 = prev.direction().normalized();
        let d2 = next.direction().normalized();
        let parallel = match (d1, d2) {
            (Some(u), Some(v)) => u.cross(v).abs() < PARALLEL_EPSILON,
            _ => true,
        };
        if parallel {
            return prev.end.midpoint(next.start);
        }
        line_intersection(prev, next).unwrap_or_else(|| prev.end.midpoint(next.start))
    };

    let mut out = Vec::with_capacity(n);
    if closed && n > 2 {
        for i in 0..edge_count {
            let prev = &edges[(i + edge_count - 1) % edge_count];
            out.push(join(prev, &edges[i]));
        }
    } else {
        out.push(edges[0].start);
        for i in 1..edge_count {
            out.push(join(&edges[i - 1], &edges[i]));
        }
        out.push(edges[edge_count - 1].end);
    }
    if out.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return None;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_area_square() {
        let square = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        assert!((polygon_area(&square) - 1.0).abs() < 1e-6);
        assert!(signed_area(&square) > 0.0);
    }

    #[test]
    fn ray_casting_containment() {
        let tri = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)];
        assert!(point_in_polygon(Point::new(2.0, 2.0), &tri));
        assert!(!point_in_polygon(Point::new(8.0, 8.0), &tri));
        assert!(!point_in_polygon(Point::new(1.0, 1.0), &[]));
    }

    #[test]
    fn dedup_drops_close_neighbours() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(0.0004, 0.0),
            Point::new(5.0, 0.0),
            Point::new(0.0, 0.0002),
        ];
        let out = dedup_points(&pts, true, 1e-3);
        assert_eq!(out, vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)]);
    }

    #[test]
    fn offset_open_line_keeps_raw_ends() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        let out = parallel_offset(&pts, false, 1.0).unwrap();
        assert_eq!(out.len(), 3);
        assert!((out[0].y - 1.0).abs() < 1e-12);
        assert!((out[1].x - 9.0).abs() < 1e-12 && (out[1].y - 1.0).abs() < 1e-12);
        assert!((out[2].x - 9.0).abs() < 1e-12 && (out[2].y - 10.0).abs() < 1e-12);
    }

    #[test]
    fn offset_collinear_vertex_uses_midpoint() {
        let pts = [Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(10.0, 0.0)];
        let out = parallel_offset(&pts, false, -2.0).unwrap();
        assert!((out[1].x - 5.0).abs() < 1e-12 && (out[1].y + 2.0).abs() < 1e-12);
    }
}
