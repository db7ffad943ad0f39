//! Object snapping against the visible polylines of a drawing.
//!
//! Candidates are ranked by kind first and distance second, so an endpoint
//! inside the tolerance always beats a closer midpoint. Segments are looked
//! up through a uniform grid so the cost of a query depends on the geometry
//! around the cursor rather than on the size of the drawing.

use std::collections::HashMap;

use crate::geometry::{segment_intersection, Bounds, Line, Point, Polyline};

/// Kind of feature a snap landed on, in descending priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapKind {
    #[default]
    None,
    Endpoint,
    Midpoint,
    Intersection,
    Edge,
}

/// Outcome of a snap query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnapResult {
    pub kind: SnapKind,
    pub position: Point,
}

impl SnapResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.kind == SnapKind::None
    }

    /// Snapped position, or `fallback` when nothing was hit.
    pub fn position_or(&self, fallback: Point) -> Point {
        if self.is_none() {
            fallback
        } else {
            self.position
        }
    }
}

/// Which snap kinds are active.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    pub enabled: bool,
    pub endpoints: bool,
    pub midpoints: bool,
    pub intersections: bool,
    pub edges: bool,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoints: true,
            midpoints: true,
            intersections: true,
            edges: true,
        }
    }
}

/// Location of a segment inside the drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentRef {
    pub polyline: usize,
    pub segment: usize,
}

/// Segments wider than this many cells are kept in a list scanned on every query.
const MAX_CELLS_PER_SEGMENT: i64 = 256;

/// Uniform grid over polyline segments.
#[derive(Debug, Clone, Default)]
pub struct SegmentGrid {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
    oversized: Vec<usize>,
    segments: Vec<(SegmentRef, Line)>,
}

impl SegmentGrid {
    /// Indexes every edge of the given polylines.
    pub fn build<'a, I>(polylines: I) -> Self
    where
        I: IntoIterator<Item = (usize, &'a Polyline)>,
    {
        let mut segments = Vec::new();
        for (pi, poly) in polylines {
            for (si, line) in poly.segments().enumerate() {
                segments.push((
                    SegmentRef {
                        polyline: pi,
                        segment: si,
                    },
                    line,
                ));
            }
        }
        let extent = segments
            .iter()
            .map(|(_, l)| l.bounds())
            .reduce(|a, b| a.union(&b));
        let cell_size = match extent {
            Some(b) => {
                let span = b.width().max(b.height());
                let per_axis = (segments.len() as f64).sqrt().max(1.0);
                (span / per_axis).max(1e-6)
            }
            None => 1.0,
        };
        let mut grid = Self {
            cell_size,
            cells: HashMap::new(),
            oversized: Vec::new(),
            segments,
        };
        for idx in 0..grid.segments.len() {
            let (lo, hi) = grid.cell_range(&grid.segments[idx].1.bounds());
            let count = (hi.0 - lo.0 + 1) * (hi.1 - lo.1 + 1);
            if count > MAX_CELLS_PER_SEGMENT {
                grid.oversized.push(idx);
                continue;
            }
            for cx in lo.0..=hi.0 {
                for cy in lo.1..=hi.1 {
                    grid.cells.entry((cx, cy)).or_default().push(idx);
                }
            }
        }
        grid
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn cell_of(&self, p: Point) -> (i64, i64) {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    fn cell_range(&self, b: &Bounds) -> ((i64, i64), (i64, i64)) {
        (self.cell_of(b.min), self.cell_of(b.max))
    }

    /// Segments whose bounds come within `tolerance` of `p`.
    pub fn query(&self, p: Point, tolerance: f64) -> Vec<(SegmentRef, Line)> {
        let window = Bounds::point(p).expanded(tolerance);
        let (lo, hi) = self.cell_range(&window);
        let span = (hi.0 - lo.0 + 1).saturating_mul(hi.1 - lo.1 + 1);
        let mut hits: Vec<usize> = if span as usize > self.cells.len() {
            self.cells.values().flatten().copied().collect()
        } else {
            let mut v = Vec::new();
            for cx in lo.0..=hi.0 {
                for cy in lo.1..=hi.1 {
                    if let Some(ids) = self.cells.get(&(cx, cy)) {
                        v.extend_from_slice(ids);
                    }
                }
            }
            v
        };
        hits.extend_from_slice(&self.oversized);
        hits.sort_unstable();
        hits.dedup();
        hits.into_iter()
            .map(|i| self.segments[i])
            .filter(|(_, l)| l.bounds().expanded(tolerance).contains(p))
            .collect()
    }
}

/// Stateful snap engine holding the most recent result.
#[derive(Debug, Clone, Default)]
pub struct Snapper {
    pub settings: SnapSettings,
    current: SnapResult,
}

impl Snapper {
    pub fn new(settings: SnapSettings) -> Self {
        Self {
            settings,
            current: SnapResult::none(),
        }
    }

    pub fn current(&self) -> SnapResult {
        self.current
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.settings.enabled = enabled;
        if !enabled {
            self.current = SnapResult::none();
        }
    }

    pub fn clear(&mut self) {
        self.current = SnapResult::none();
    }

    /// Re-evaluates the snap at `cursor`; returns `true` when the result changed.
    pub fn update(&mut self, cursor: Point, tolerance: f64, grid: &SegmentGrid) -> bool {
        let next = if self.settings.enabled {
            find_snap(cursor, tolerance, grid, &self.settings)
        } else {
            SnapResult::none()
        };
        let changed = next != self.current;
        self.current = next;
        changed
    }
}

fn nearest_within(cursor: Point, tolerance: f64, candidates: impl Iterator<Item = Point>) -> Option<Point> {
    candidates
        .map(|c| (c, c.distance_to(cursor)))
        .filter(|&(_, d)| d <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

/// Finds the best snap for `cursor` among the indexed segments.
pub fn find_snap(cursor: Point, tolerance: f64, grid: &SegmentGrid, settings: &SnapSettings) -> SnapResult {
    if !settings.enabled || tolerance <= 0.0 {
        return SnapResult::none();
    }
    let nearby = grid.query(cursor, tolerance);
    if nearby.is_empty() {
        return SnapResult::none();
    }
    let found = |kind: SnapKind, p: Option<Point>| p.map(|position| SnapResult { kind, position });

    if settings.endpoints {
        let ends = nearby.iter().flat_map(|(_, l)| [l.start, l.end]);
        if let Some(r) = found(SnapKind::Endpoint, nearest_within(cursor, tolerance, ends)) {
            return r;
        }
    }
    if settings.midpoints {
        let mids = nearby.iter().map(|(_, l)| l.midpoint());
        if let Some(r) = found(SnapKind::Midpoint, nearest_within(cursor, tolerance, mids)) {
            return r;
        }
    }
    if settings.intersections {
        let mut crossings = Vec::new();
        for i in 0..nearby.len() {
            for j in (i + 1)..nearby.len() {
                if let Some(p) = segment_intersection(&nearby[i].1, &nearby[j].1) {
                    crossings.push(p);
                }
            }
        }
        if let Some(r) = found(
            SnapKind::Intersection,
            nearest_within(cursor, tolerance, crossings.into_iter()),
        ) {
            return r;
        }
    }
    if settings.edges {
        let feet = nearby.iter().map(|(_, l)| l.nearest_point(cursor));
        if let Some(r) = found(SnapKind::Edge, nearest_within(cursor, tolerance, feet)) {
            return r;
        }
    }
    SnapResult::none()
}
