use crate::drawing::Peg;
use crate::geometry::{dedup_points, parallel_offset, Line, Point, Polyline};
use crate::styles::Color;

use super::TopologyError;

/// Name prefix of the pegs placed on offset vertices.
pub const OFFSET_PEG_PREFIX: &str = "PEG";

const COINCIDENT: f64 = 1e-9;

/// Layer that receives offsets of polylines on `layer`.
pub fn offset_layer_name(layer: &str) -> String {
    format!("{}_offset", layer)
}

/// Whether `side` lies left of the first edge that survives duplicate
/// removal. `None` when no edge is left.
pub fn offset_side_is_left(polyline: &Polyline, side: Point) -> Option<bool> {
    let points = dedup_points(&polyline.points, polyline.closed, COINCIDENT);
    match points.as_slice() {
        [a, b, ..] => Some(Line::new(*a, *b).is_left(side)),
        _ => None,
    }
}

/// Parallel copy of `polyline` at `distance`, on the side of `side`.
///
/// A side point to the left of the first edge offsets to the left.
pub fn offset_polyline(polyline: &Polyline, distance: f64, side: Point) -> Result<Polyline, TopologyError> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(TopologyError::InvalidDistance);
    }
    let points = dedup_points(&polyline.points, polyline.closed, COINCIDENT);
    let left = offset_side_is_left(polyline, side).ok_or(TopologyError::Degenerate(2))?;
    let signed = if left { distance } else { -distance };
    let shifted = parallel_offset(&points, polyline.closed, signed)
        .ok_or_else(|| TopologyError::OffsetFailed("edges could not be reconnected".to_string()))?;
    let mut out = Polyline::new(shifted, &offset_layer_name(&polyline.layer), Color::OFFSET);
    out.closed = polyline.closed && points.len() > 2;
    Ok(out)
}

/// One peg per vertex, named `PREFIX1..n` on the polyline's layer.
pub fn vertex_pegs(polyline: &Polyline, prefix: &str) -> Vec<Peg> {
    polyline
        .points
        .iter()
        .enumerate()
        .map(|(i, &p)| Peg::new(&format!("{}{}", prefix, i + 1), p, &polyline.layer))
        .collect()
}

/// Intersections of the infinite lines through each edge of `partition`
/// with the bounded edges of `targets`.
pub fn project_onto(partition: &Polyline, targets: &[&Polyline]) -> Vec<Point> {
    let mut hits = Vec::new();
    for w in partition.points.windows(2) {
        let d = w[1] - w[0];
        if d.dot(d) < COINCIDENT {
            continue;
        }
        for target in targets {
            for edge in target.segments() {
                let a = edge.direction();
                let cross = d.cross(a);
                if cross.abs() < 1e-12 {
                    continue;
                }
                let diff = edge.start - w[0];
                let t1 = diff.cross(a) / cross;
                let t2 = diff.cross(d) / cross;
                if (0.0..=1.0).contains(&t2) {
                    hits.push(w[0] + d * t1);
                }
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polyline {
        Polyline::closed(
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
            "Boundary",
            Color::WHITE,
        )
    }

    #[test]
    fn inside_point_of_ccw_square_offsets_inward() {
        let out = offset_polyline(&square(), 1.0, Point::new(5.0, 5.0)).unwrap();
        assert!(out.closed);
        assert_eq!(out.layer, "Boundary_offset");
        assert_eq!(out.color, Color::OFFSET);
        let expected = [(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0)];
        for (p, e) in out.points.iter().zip(expected) {
            assert!((p.x - e.0).abs() < 1e-9 && (p.y - e.1).abs() < 1e-9);
        }
    }

    #[test]
    fn outside_point_offsets_outward() {
        let out = offset_polyline(&square(), 2.0, Point::new(5.0, -3.0)).unwrap();
        assert!((out.points[0].x + 2.0).abs() < 1e-9 && (out.points[0].y + 2.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            offset_polyline(&square(), 0.0, Point::new(1.0, 1.0)),
            Err(TopologyError::InvalidDistance)
        );
        let dot = Polyline::new(vec![Point::new(1.0, 1.0), Point::new(1.0, 1.0)], "0", Color::WHITE);
        assert_eq!(
            offset_polyline(&dot, 1.0, Point::new(0.0, 0.0)),
            Err(TopologyError::Degenerate(2))
        );
    }

    #[test]
    fn side_uses_first_edge_after_dedup() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(0.0, 5e-7), Point::new(10.0, 5e-7)];
        let bent = Polyline::new(pts, "0", Color::WHITE);
        assert_eq!(offset_side_is_left(&bent, Point::new(5.0, 5.0)), Some(false));
        let out = offset_polyline(&bent, 1.0, Point::new(5.0, 5.0)).unwrap();
        assert!((out.points[0].x - 1.0).abs() < 1e-9);

        let dot = Polyline::new(vec![Point::new(1.0, 1.0); 3], "0", Color::WHITE);
        assert_eq!(offset_side_is_left(&dot, Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn pegs_are_numbered_from_one() {
        let pegs = vertex_pegs(&square(), OFFSET_PEG_PREFIX);
        let names: Vec<&str> = pegs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["PEG1", "PEG2", "PEG3", "PEG4"]);
        assert_eq!(pegs[2].position, Point::new(10.0, 10.0));
    }

    #[test]
    fn partition_lines_are_extended() {
        let partition = Polyline::new(vec![Point::new(5.0, 4.0), Point::new(5.0, 6.0)], "Partition", Color::CYAN);
        let sq = square();
        let hits = project_onto(&partition, &[&sq]);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().any(|p| p.distance_to(Point::new(5.0, 0.0)) < 1e-9));
        assert!(hits.iter().any(|p| p.distance_to(Point::new(5.0, 10.0)) < 1e-9));
    }
}
