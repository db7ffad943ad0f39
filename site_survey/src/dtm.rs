//! Digital terrain model built from elevation-tagged survey points.
//!
//! The surface is a triangulated irregular network ([`Tin`]). Contours are
//! extracted per triangle and kept as independent segment pairs; volumes are
//! integrated per triangle against a flat design level.

use std::fmt;

use crate::geometry::{GeometryError, GeometryLibrary, Point, Point3};

/// Elevation differences below this are treated as a flat edge.
pub const CONTOUR_EDGE_EPSILON: f64 = 1e-4;

/// Tolerance used when deciding whether a level falls on a major interval.
pub const MAJOR_EPSILON: f64 = 1e-3;

/// Contour segments shorter than this are dropped.
const MIN_SEGMENT_LENGTH: f64 = 1e-9;

/// Failures raised while building or querying a surface.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TinError {
    #[error("need at least 3 points with elevation, got {0}")]
    TooFewPoints(usize),
    #[error(transparent)]
    Triangulation(#[from] GeometryError),
    #[error("triangle {triangle} references point {index} of {len}")]
    BadIndex {
        triangle: usize,
        index: usize,
        len: usize,
    },
    #[error("boundary needs at least 3 points")]
    DegenerateBoundary,
    #[error("contour interval must be positive")]
    InvalidInterval,
}

fn barycentric(p: Point, a: Point3, b: Point3, c: Point3) -> Option<(f64, f64, f64)> {
    let det = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
    if det.abs() < f64::EPSILON {
        return None;
    }
    let u = ((b.y - c.y) * (p.x - c.x) + (c.x - b.x) * (p.y - c.y)) / det;
    let v = ((c.y - a.y) * (p.x - c.x) + (a.x - c.x) * (p.y - c.y)) / det;
    let w = 1.0 - u - v;
    Some((u, v, w))
}

/// Triangulated Irregular Network constructed from 3D points.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tin {
    /// Vertices of the TIN.
    pub points: Vec<Point3>,
    /// Indices into `points` forming triangles.
    pub triangles: Vec<[usize; 3]>,
    pub min_z: f64,
    pub max_z: f64,
    pub design_level: f64,
    pub visible: bool,
}

impl Tin {
    /// Triangulates `points` in plan through the geometry library.
    pub fn build(points: Vec<Point3>, geometry: &dyn GeometryLibrary) -> Result<Self, TinError> {
        if points.len() < 3 {
            return Err(TinError::TooFewPoints(points.len()));
        }
        let plan: Vec<Point> = points.iter().map(Point3::xy).collect();
        let triangles = geometry.triangulate(&plan)?;
        Self::from_parts(points, triangles)
    }

    /// Assembles a surface from precomputed triangles, checking every index.
    pub fn from_parts(points: Vec<Point3>, triangles: Vec<[usize; 3]>) -> Result<Self, TinError> {
        for (t, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i >= points.len()) {
                return Err(TinError::BadIndex {
                    triangle: t,
                    index,
                    len: points.len(),
                });
            }
        }
        let (min_z, max_z) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.z), hi.max(p.z))
            });
        log::debug!(
            "surface with {} points, {} triangles, z {:.3}..{:.3}",
            points.len(),
            triangles.len(),
            min_z,
            max_z
        );
        Ok(Self {
            points,
            triangles,
            min_z,
            max_z,
            design_level: min_z,
            visible: true,
        })
    }

    fn corners(&self, tri: &[usize; 3]) -> (Point3, Point3, Point3) {
        (self.points[tri[0]], self.points[tri[1]], self.points[tri[2]])
    }

    /// Interpolated elevation at a plan position inside the surface.
    pub fn elevation_at(&self, p: Point) -> Option<f64> {
        for tri in &self.triangles {
            let (a, b, c) = self.corners(tri);
            if let Some((u, v, w)) = barycentric(p, a, b, c) {
                if u >= -1e-12 && v >= -1e-12 && w >= -1e-12 {
                    return Some(u * a.z + v * b.z + w * c.z);
                }
            }
        }
        None
    }

    /// Contour levels between the lowest and highest vertex.
    ///
    /// Levels are every multiple of `interval` from `floor(min_z / interval)`
    /// to `ceil(max_z / interval)`. Only levels that produced at least one
    /// segment are returned.
    pub fn contours(&self, interval: f64, major_factor: u32) -> Result<Vec<ContourLine>, TinError> {
        if !(interval > 0.0) || !interval.is_finite() {
            return Err(TinError::InvalidInterval);
        }
        let major_interval = interval * f64::from(major_factor.max(1));
        let first = (self.min_z / interval).floor() as i64;
        let last = (self.max_z / interval).ceil() as i64;
        let mut out = Vec::new();
        for k in first..=last {
            let elevation = k as f64 * interval;
            let points = self.level_segments(elevation);
            if points.is_empty() {
                continue;
            }
            out.push(ContourLine {
                elevation,
                is_major: is_major_level(elevation, major_interval),
                points,
            });
        }
        log::debug!("{}", ContourSummary::of(&out));
        Ok(out)
    }

    fn level_segments(&self, level: f64) -> Vec<Point> {
        let mut points = Vec::new();
        for tri in &self.triangles {
            let (a, b, c) = self.corners(tri);
            let crossings: Vec<Point> = [(a, b), (b, c), (c, a)]
                .into_iter()
                .filter_map(|(p, q)| edge_crossing(p, q, level))
                .collect();
            if let [s, e] = crossings.as_slice() {
                if s.distance_to(*e) > MIN_SEGMENT_LENGTH {
                    points.push(*s);
                    points.push(*e);
                }
            }
        }
        points
    }

    /// Cut and fill against `design_level`, optionally limited to triangles
    /// whose centroid lies inside `boundary`.
    pub fn cut_fill(
        &self,
        design_level: f64,
        boundary: Option<&[Point]>,
        geometry: &dyn GeometryLibrary,
    ) -> Result<VolumeReport, TinError> {
        if let Some(ring) = boundary {
            if ring.len() < 3 {
                return Err(TinError::DegenerateBoundary);
            }
        }
        let mut report = VolumeReport {
            design_level,
            ..VolumeReport::default()
        };
        for tri in &self.triangles {
            let (a, b, c) = self.corners(tri);
            let centroid = Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
            if let Some(ring) = boundary {
                if !geometry.point_in_polygon(centroid, ring) {
                    continue;
                }
            }
            let area = ((a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y)) / 2.0).abs();
            let dz = (a.z + b.z + c.z) / 3.0 - design_level;
            if dz > 0.0 {
                report.cut += area * dz;
            } else if dz < 0.0 {
                report.fill += area * -dz;
            }
            report.area += area;
            report.triangles += 1;
        }
        report.net = report.cut - report.fill;
        Ok(report)
    }
}

fn is_major_level(elevation: f64, major_interval: f64) -> bool {
    let r = elevation.rem_euclid(major_interval);
    r < MAJOR_EPSILON || (major_interval - r) < MAJOR_EPSILON
}

/// Plan position where the edge `p`-`q` reaches `level`, if it does.
fn edge_crossing(p: Point3, q: Point3, level: f64) -> Option<Point> {
    let spans = (p.z <= level && level <= q.z) || (p.z >= level && level >= q.z);
    if !spans || (q.z - p.z).abs() <= CONTOUR_EDGE_EPSILON {
        return None;
    }
    let t = (level - p.z) / (q.z - p.z);
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    Some(Point::new(p.x + t * (q.x - p.x), p.y + t * (q.y - p.y)))
}

/// Contour level made of independent segments `(points[2k], points[2k + 1])`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    pub elevation: f64,
    pub is_major: bool,
    pub points: Vec<Point>,
}

impl ContourLine {
    pub fn segment_count(&self) -> usize {
        self.points.len() / 2
    }

    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.chunks_exact(2).map(|c| (c[0], c[1]))
    }

    /// Joins segments sharing endpoints into connected paths.
    pub fn chained(&self, tolerance: f64) -> Vec<Vec<Point>> {
        segments_to_polylines(&self.segments().collect::<Vec<_>>(), tolerance)
    }
}

/// Counts describing a contour run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContourSummary {
    pub levels: usize,
    pub major: usize,
    pub segments: usize,
}

impl ContourSummary {
    pub fn of(contours: &[ContourLine]) -> Self {
        Self {
            levels: contours.len(),
            major: contours.iter().filter(|c| c.is_major).count(),
            segments: contours.iter().map(ContourLine::segment_count).sum(),
        }
    }
}

impl fmt::Display for ContourSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generated {} contour levels ({} major), {} segments",
            self.levels, self.major, self.segments
        )
    }
}

/// Result of a cut/fill integration.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct VolumeReport {
    pub design_level: f64,
    pub cut: f64,
    /// Stored as a positive magnitude.
    pub fill: f64,
    pub net: f64,
    pub area: f64,
    pub triangles: usize,
}

impl fmt::Display for VolumeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cut: {:.3} m³, Fill: {:.3} m³, Net: {:.3} m³ over {:.3} m² ({} triangles)",
            self.cut, self.fill, self.net, self.area, self.triangles
        )
    }
}

fn segments_to_polylines(segs: &[(Point, Point)], tol: f64) -> Vec<Vec<Point>> {
    let mut remaining: Vec<(Point, Point)> = segs.to_vec();
    let mut out = Vec::new();
    while let Some((a, b)) = remaining.pop() {
        let mut line = vec![a, b];
        loop {
            let tail = line[line.len() - 1];
            let head = line[0];
            let found = remaining.iter().enumerate().find_map(|(i, &(s, e))| {
                if s.distance_to(tail) <= tol {
                    Some((i, e, true))
                } else if e.distance_to(tail) <= tol {
                    Some((i, s, true))
                } else if e.distance_to(head) <= tol {
                    Some((i, s, false))
                } else if s.distance_to(head) <= tol {
                    Some((i, e, false))
                } else {
                    None
                }
            });
            match found {
                Some((i, next, at_tail)) => {
                    remaining.swap_remove(i);
                    if at_tail {
                        line.push(next);
                    } else {
                        line.insert(0, next);
                    }
                }
                None => break,
            }
        }
        out.push(line);
    }
    out
}
