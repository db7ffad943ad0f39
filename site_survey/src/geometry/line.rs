//! Segment helpers shared by snapping, hit-testing and topology.

use super::Point;

/// Squared length below which a segment is treated as a single point.
pub const DEGENERATE_LENGTH_SQ: f64 = 1e-12;

/// Representation of a 2D line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    /// Creates a new line segment.
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Returns the length of the line segment.
    pub fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }

    /// Returns the midpoint of the line segment.
    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Direction vector from start to end (not normalized).
    pub fn direction(&self) -> Point {
        self.end - self.start
    }

    pub fn is_degenerate(&self) -> bool {
        let d = self.direction();
        d.dot(d) < DEGENERATE_LENGTH_SQ
    }

    /// Parameter of the perpendicular projection of `p`, clamped to `[0, 1]`.
    pub fn project_clamped(&self, p: Point) -> f64 {
        let d = self.direction();
        let len_sq = d.dot(d);
        if len_sq < DEGENERATE_LENGTH_SQ {
            return 0.0;
        }
        ((p - self.start).dot(d) / len_sq).clamp(0.0, 1.0)
    }

    /// Nearest point on the segment to `p`.
    pub fn nearest_point(&self, p: Point) -> Point {
        self.start.lerp(self.end, self.project_clamped(p))
    }

    /// Distance from `p` to the closest point of the segment.
    pub fn distance_to_point(&self, p: Point) -> f64 {
        p.distance_to(self.nearest_point(p))
    }

    /// Perpendicular distance from `p` to the infinite line through the segment.
    pub fn line_distance(&self, p: Point) -> f64 {
        let d = self.direction();
        let len = d.length();
        if len < f64::EPSILON {
            return p.distance_to(self.start);
        }
        d.cross(p - self.start).abs() / len
    }

    /// Whether `p` lies strictly to the left of the directed segment.
    pub fn is_left(&self, p: Point) -> bool {
        self.direction().cross(p - self.start) > 0.0
    }

    /// Axis-aligned bounds of the segment.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points([self.start, self.end]).unwrap_or_else(|| Bounds::point(self.start))
    }
}

/// Intersection of two bounded segments, `None` when parallel or disjoint.
pub fn segment_intersection(a: &Line, b: &Line) -> Option<Point> {
    let r = a.direction();
    let s = b.direction();
    let denom = r.cross(s);
    if denom.abs() < DEGENERATE_LENGTH_SQ {
        return None;
    }
    let qp = b.start - a.start;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a.start + r * t)
    } else {
        None
    }
}

/// Intersection of the infinite lines through `a` and `b`.
pub fn line_intersection(a: &Line, b: &Line) -> Option<Point> {
    let r = a.direction();
    let s = b.direction();
    let denom = r.cross(s);
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let t = (b.start - a.start).cross(s) / denom;
    Some(a.start + r * t)
}

/// Axis-aligned bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn point(p: Point) -> Self {
        Self { min: p, max: p }
    }

    /// Bounds enclosing every point, `None` when the iterator is empty.
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = Bounds::point(first);
        for p in iter {
            b.include(p);
        }
        Some(b)
    }

    pub fn include(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let mut b = *self;
        b.include(other.min);
        b.include(other.max);
        b
    }

    /// Returns the bounds grown by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Bounds {
        Bounds {
            min: Point::new(self.min.x - margin, self.min.y - margin),
            max: Point::new(self.max.x + margin, self.max.y + margin),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Whether `other` lies entirely within these bounds.
    pub fn encloses(&self, other: &Bounds) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        self.min.midpoint(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments_intersect() {
        let a = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let b = Line::new(Point::new(0.0, 10.0), Point::new(10.0, 0.0));
        let p = segment_intersection(&a, &b).unwrap();
        assert!((p.x - 5.0).abs() < 1e-9 && (p.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        let a = Line::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        let b = Line::new(Point::new(2.0, -1.0), Point::new(2.0, 1.0));
        assert!(segment_intersection(&a, &b).is_none());
        assert!(line_intersection(&a, &b).is_some());
    }

    #[test]
    fn projection_is_clamped() {
        let l = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(l.nearest_point(Point::new(-5.0, 3.0)), Point::new(0.0, 0.0));
        assert_eq!(l.nearest_point(Point::new(4.0, 3.0)), Point::new(4.0, 0.0));
        assert!((l.line_distance(Point::new(40.0, -3.0)) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn left_side_test() {
        let l = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!(l.is_left(Point::new(5.0, 1.0)));
        assert!(!l.is_left(Point::new(5.0, -1.0)));
    }
}
