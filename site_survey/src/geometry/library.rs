//! Geometry library boundary used by terrain and polygon tools.
//!
//! The editor only talks to [`GeometryLibrary`]; [`DefaultGeometry`] is the
//! in-crate implementation backed by `delaunator`.

use std::cell::RefCell;

use super::{dedup_points, parallel_offset, segment_intersection, signed_area, Line, Point};

/// Failures reported by a geometry library.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("need at least {required} points, got {found}")]
    TooFewPoints { required: usize, found: usize },
    #[error("triangulation failed: {0}")]
    Triangulation(String),
    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),
    #[error("polygon could not be repaired")]
    Unrepairable,
    #[error("buffer produced an empty polygon")]
    EmptyBuffer,
}

/// Operations the editor consumes from an external geometry engine.
pub trait GeometryLibrary {
    /// Delaunay triangulation of the plan points, as index triples.
    fn triangulate(&self, points: &[Point]) -> Result<Vec<[usize; 3]>, GeometryError>;

    /// Whether the ring is a valid simple polygon.
    fn is_valid(&self, polygon: &[Point]) -> bool;

    /// Repaired ring, or an error when no valid polygon remains.
    fn make_valid(&self, polygon: &[Point]) -> Result<Vec<Point>, GeometryError>;

    fn point_in_polygon(&self, point: Point, polygon: &[Point]) -> bool;

    /// Grows (positive) or shrinks (negative) a ring by `distance`.
    fn buffer_polygon(&self, polygon: &[Point], distance: f64) -> Result<Vec<Point>, GeometryError>;

    /// Message of the most recent failure, if any.
    fn last_error(&self) -> Option<String>;
}

const COINCIDENT: f64 = 1e-9;

/// Built-in geometry library.
#[derive(Debug, Default)]
pub struct DefaultGeometry {
    last_error: RefCell<Option<String>>,
}

impl DefaultGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&self, err: GeometryError) -> GeometryError {
        log::warn!("geometry library: {}", err);
        *self.last_error.borrow_mut() = Some(err.to_string());
        err
    }

    /// Reason the ring is invalid, `None` when it is a valid simple polygon.
    fn invalid_reason(polygon: &[Point]) -> Option<String> {
        let ring = dedup_points(polygon, true, COINCIDENT);
        if ring.len() < 3 {
            return Some(format!("ring has {} distinct vertices", ring.len()));
        }
        if signed_area(&ring).abs() < COINCIDENT {
            return Some("ring has zero area".to_string());
        }
        let n = ring.len();
        let edge = |i: usize| Line::new(ring[i], ring[(i + 1) % n]);
        for i in 0..n {
            for j in (i + 1)..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if adjacent {
                    continue;
                }
                if let Some(p) = segment_intersection(&edge(i), &edge(j)) {
                    return Some(format!(
                        "self-intersection between edges {} and {} at ({:.3}, {:.3})",
                        i, j, p.x, p.y
                    ));
                }
            }
        }
        None
    }
}

/// Drops vertices whose neighbours are collinear with them.
fn remove_collinear(ring: &[Point]) -> Vec<Point> {
    let mut out = ring.to_vec();
    let mut i = 0;
    while out.len() > 3 && i < out.len() {
        let n = out.len();
        let prev = out[(i + n - 1) % n];
        let next = out[(i + 1) % n];
        if (out[i] - prev).cross(next - out[i]).abs() < COINCIDENT {
            out.remove(i);
        } else {
            i += 1;
        }
    }
    out
}

impl GeometryLibrary for DefaultGeometry {
    fn triangulate(&self, points: &[Point]) -> Result<Vec<[usize; 3]>, GeometryError> {
        if points.len() < 3 {
            return Err(self.fail(GeometryError::TooFewPoints {
                required: 3,
                found: points.len(),
            }));
        }
        let coords: Vec<delaunator::Point> = points
            .iter()
            .map(|p| delaunator::Point { x: p.x, y: p.y })
            .collect();
        let triangulation = delaunator::triangulate(&coords);
        if triangulation.triangles.is_empty() {
            return Err(self.fail(GeometryError::Triangulation(
                "input points are collinear".to_string(),
            )));
        }
        Ok(triangulation
            .triangles
            .chunks(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect())
    }

    fn is_valid(&self, polygon: &[Point]) -> bool {
        match Self::invalid_reason(polygon) {
            Some(reason) => {
                self.fail(GeometryError::InvalidPolygon(reason));
                false
            }
            None => true,
        }
    }

    fn make_valid(&self, polygon: &[Point]) -> Result<Vec<Point>, GeometryError> {
        let ring = remove_collinear(&dedup_points(polygon, true, COINCIDENT));
        if Self::invalid_reason(&ring).is_some() {
            return Err(self.fail(GeometryError::Unrepairable));
        }
        Ok(ring)
    }

    fn point_in_polygon(&self, point: Point, polygon: &[Point]) -> bool {
        super::point_in_polygon(point, polygon)
    }

    fn buffer_polygon(&self, polygon: &[Point], distance: f64) -> Result<Vec<Point>, GeometryError> {
        let ring = dedup_points(polygon, true, COINCIDENT);
        if ring.len() < 3 {
            return Err(self.fail(GeometryError::TooFewPoints {
                required: 3,
                found: ring.len(),
            }));
        }
        let area = signed_area(&ring);
        if area.abs() < COINCIDENT {
            return Err(self.fail(GeometryError::InvalidPolygon(
                "ring has zero area".to_string(),
            )));
        }
        // Outward is to the right of a counter-clockwise ring.
        let signed = if area > 0.0 { -distance } else { distance };
        let out = parallel_offset(&ring, true, signed).ok_or_else(|| self.fail(GeometryError::EmptyBuffer))?;
        let n = ring.len();
        let flipped = (0..n).any(|i| {
            let src = ring[(i + 1) % n] - ring[i];
            let dst = out[(i + 1) % n] - out[i];
            src.dot(dst) <= 0.0
        });
        let new_area = signed_area(&out);
        if flipped || new_area.abs() < COINCIDENT || new_area.signum() != area.signum() {
            return Err(self.fail(GeometryError::EmptyBuffer));
        }
        Ok(out)
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon_area;

    fn square(size: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ]
    }

    #[test]
    fn triangulates_square() {
        let lib = DefaultGeometry::new();
        let tris = lib.triangulate(&square(1.0)).unwrap();
        assert_eq!(tris.len(), 2);
        assert!(tris.iter().flatten().all(|&i| i < 4));
    }

    #[test]
    fn collinear_points_record_last_error() {
        let lib = DefaultGeometry::new();
        let pts = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
        assert!(lib.triangulate(&pts).is_err());
        assert!(lib.last_error().unwrap().contains("collinear"));
    }

    #[test]
    fn bow_tie_is_invalid() {
        let lib = DefaultGeometry::new();
        let bow = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 0.0),
            Point::new(0.0, 2.0),
        ];
        assert!(!lib.is_valid(&bow));
        assert!(lib.last_error().unwrap().contains("self-intersection"));
        assert!(lib.make_valid(&bow).is_err());
        assert!(lib.is_valid(&square(2.0)));
    }

    #[test]
    fn make_valid_strips_redundant_vertices() {
        let lib = DefaultGeometry::new();
        let ring = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ];
        let fixed = lib.make_valid(&ring).unwrap();
        assert_eq!(fixed.len(), 4);
    }

    #[test]
    fn buffer_grows_either_orientation() {
        let lib = DefaultGeometry::new();
        let mut cw = square(10.0);
        cw.reverse();
        for ring in [square(10.0), cw] {
            let grown = lib.buffer_polygon(&ring, 1.0).unwrap();
            assert!((polygon_area(&grown) - 144.0).abs() < 1e-9);
        }
        assert!(lib.buffer_polygon(&square(10.0), -6.0).is_err());
    }
}
