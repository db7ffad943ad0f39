use crate::geometry::{dedup_points, Point, Polyline};

use super::TopologyError;

const COINCIDENT: f64 = 1e-9;

/// Splits `polyline` at the projection of `at` onto its nearest edge.
///
/// Both halves are open and share the split point. The closing edge of a
/// closed polyline is materialized in the second half.
pub fn split_polyline(polyline: &Polyline, at: Point) -> Result<(Polyline, Polyline), TopologyError> {
    if !polyline.has_geometry() {
        return Err(TopologyError::Degenerate(2));
    }
    let (seg, split, _) = polyline
        .nearest_segment(at)
        .ok_or(TopologyError::Degenerate(2))?;

    let mut first: Vec<Point> = polyline.points[..=seg].to_vec();
    first.push(split);
    let mut second = vec![split];
    second.extend_from_slice(&polyline.points[seg + 1..]);
    if polyline.closed && polyline.points.len() > 2 {
        second.push(polyline.points[0]);
    }

    let first = dedup_points(&first, false, COINCIDENT);
    let second = dedup_points(&second, false, COINCIDENT);
    if first.len() < 2 || second.len() < 2 {
        return Err(TopologyError::SplitAtEnd);
    }
    Ok((
        Polyline::new(first, &polyline.layer, polyline.color),
        Polyline::new(second, &polyline.layer, polyline.color),
    ))
}

/// One open two-point polyline per non-degenerate edge, closing edge included.
pub fn explode(polyline: &Polyline) -> Vec<Polyline> {
    polyline
        .segments()
        .filter(|s| !s.is_degenerate())
        .map(|s| Polyline::new(vec![s.start, s.end], &polyline.layer, polyline.color))
        .collect()
}
