use crate::geometry::{dedup_points, Point, Polyline};

use super::{COLLINEAR_DEGREES, DUPLICATE_TOLERANCE};

/// Angle in degrees between two direction vectors, in `[0, 180]`.
fn turn_angle(d1: Point, d2: Point) -> f64 {
    d1.cross(d2).abs().atan2(d1.dot(d2)).to_degrees()
}

fn is_segment(p: &Polyline) -> bool {
    p.points.len() == 2 && !p.closed
}

/// Joins two collinear, overlapping or touching 2-point segments into the
/// segment spanning both, measured along `a`'s direction.
pub fn merge_collinear(a: &Polyline, b: &Polyline, tolerance: f64) -> Option<Polyline> {
    if !is_segment(a) || !is_segment(b) {
        return None;
    }
    let (a0, a1) = (a.points[0], a.points[1]);
    let (b0, b1) = (b.points[0], b.points[1]);
    let u = (a1 - a0).normalized()?;
    let v = (b1 - b0).normalized()?;
    let angle = turn_angle(u, v);
    if angle.min(180.0 - angle) > COLLINEAR_DEGREES {
        return None;
    }
    let seg_a = a.segment(0);
    let seg_b = b.segment(0);
    let on_line = seg_a.line_distance(b0) <= tolerance
        && seg_a.line_distance(b1) <= tolerance
        && seg_b.line_distance(a0) <= tolerance
        && seg_b.line_distance(a1) <= tolerance;
    if !on_line {
        return None;
    }
    let t = |p: Point| (p - a0).dot(u);
    let (ta0, ta1) = (0.0, t(a1));
    let (tb0, tb1) = (t(b0), t(b1));
    let (b_lo, b_hi) = (tb0.min(tb1), tb0.max(tb1));
    if b_lo > ta1 + tolerance || b_hi < ta0 - tolerance {
        return None;
    }
    let lo = ta0.min(b_lo);
    let hi = ta1.max(b_hi);
    Some(Polyline::new(vec![a0 + u * lo, a0 + u * hi], &a.layer, a.color))
}

/// Concatenates two open polylines sharing an endpoint within `tolerance`.
///
/// Tries end-start, end-end, start-start and start-end in that order. The
/// result stays open even when its two ends meet.
pub fn chain_endpoints(a: &Polyline, b: &Polyline, tolerance: f64) -> Option<Polyline> {
    if a.closed || b.closed || !a.has_geometry() || !b.has_geometry() {
        return None;
    }
    let (a_start, a_end) = (a.first()?, a.last()?);
    let (b_start, b_end) = (b.first()?, b.last()?);
    let near = |p: Point, q: Point| p.distance_to(q) <= tolerance;
    let reversed = |pts: &[Point]| pts.iter().rev().copied().collect::<Vec<_>>();

    let points = if near(a_end, b_start) {
        let mut pts = a.points.clone();
        pts.extend_from_slice(&b.points[1..]);
        pts
    } else if near(a_end, b_end) {
        let mut pts = a.points.clone();
        pts.extend(reversed(&b.points).into_iter().skip(1));
        pts
    } else if near(a_start, b_start) {
        let mut pts = reversed(&a.points);
        pts.extend_from_slice(&b.points[1..]);
        pts
    } else if near(a_start, b_end) {
        let mut pts = b.points.clone();
        pts.extend_from_slice(&a.points[1..]);
        pts
    } else {
        return None;
    };

    Some(Polyline::new(points, &a.layer, a.color))
}

/// Merges one pair, preferring the collinear-overlap rule for segments.
pub fn merge_pair(a: &Polyline, b: &Polyline, tolerance: f64) -> Option<Polyline> {
    merge_collinear(a, b, tolerance).or_else(|| chain_endpoints(a, b, tolerance))
}

/// Repeatedly merges pairs until none merge, then simplifies every result.
///
/// Merging is pairwise and greedy in collection order, so the outcome for
/// three or more mutually overlapping inputs depends on their order.
pub fn merge_polylines(mut polylines: Vec<Polyline>, tolerance: f64) -> Vec<Polyline> {
    'search: loop {
        for i in 0..polylines.len() {
            for j in (i + 1)..polylines.len() {
                if let Some(joined) = merge_pair(&polylines[i], &polylines[j], tolerance) {
                    log::debug!("joined polylines {} and {}", i, j);
                    polylines[i] = joined;
                    polylines.remove(j);
                    continue 'search;
                }
            }
        }
        break;
    }
    for p in &mut polylines {
        simplify(p);
    }
    polylines
}

/// Drops duplicate consecutive points and vertices deviating less than one
/// degree from the line through their neighbours.
pub fn simplify(polyline: &mut Polyline) {
    let mut pts = dedup_points(&polyline.points, polyline.closed, DUPLICATE_TOLERANCE);
    let min_len = if polyline.closed { 3 } else { 2 };
    let mut i = if polyline.closed { 0 } else { 1 };
    while pts.len() > min_len {
        let n = pts.len();
        let last_interior = if polyline.closed { n } else { n - 1 };
        if i >= last_interior {
            break;
        }
        let prev = pts[(i + n - 1) % n];
        let next = pts[(i + 1) % n];
        let angle = turn_angle(pts[i] - prev, next - pts[i]);
        if angle < COLLINEAR_DEGREES {
            pts.remove(i);
            if i > 0 && polyline.closed {
                i -= 1;
            }
        } else {
            i += 1;
        }
    }
    polyline.points = pts;
}
