use site_survey::geometry::{Line, Point, Polyline};
use site_survey::styles::Color;
use site_survey::topology::{explode, merge_polylines, offset_polyline, split_polyline, TopologyError};

fn open(points: &[(f64, f64)]) -> Polyline {
    Polyline::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect(), "Boundary", Color::WHITE)
}

#[test]
fn overlapping_collinear_segments_join() {
    let merged = merge_polylines(vec![open(&[(0.0, 0.0), (10.0, 0.0)]), open(&[(5.0, 0.0), (15.0, 0.0)])], 0.01);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].points, vec![Point::new(0.0, 0.0), Point::new(15.0, 0.0)]);
}

#[test]
fn three_edges_chain_without_closing() {
    let merged = merge_polylines(
        vec![
            open(&[(0.0, 0.0), (10.0, 0.0)]),
            open(&[(10.0, 0.0), (10.0, 10.0)]),
            open(&[(10.0, 10.0), (0.0, 0.0)]),
        ],
        0.01,
    );
    assert_eq!(merged.len(), 1);
    assert!(!merged[0].closed);
    assert_eq!(
        merged[0].points,
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 0.0)
        ]
    );
}

#[test]
fn split_halves_merge_back_into_the_original() {
    let original = open(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (20.0, 10.0)]);
    for at in [Point::new(10.0, 4.0), Point::new(3.0, 0.2), Point::new(15.0, 10.0)] {
        let (a, b) = split_polyline(&original, at).unwrap();
        let merged = merge_polylines(vec![a, b], 0.01);
        assert_eq!(merged.len(), 1);
        let mut points = merged[0].points.clone();
        if points[0] != original.points[0] {
            points.reverse();
        }
        assert_eq!(points, original.points);
    }
}

#[test]
fn offset_vertices_keep_the_distance_to_their_edges() {
    let mut pentagon = open(&[(0.0, 0.0), (10.0, 0.0), (14.0, 6.0), (6.0, 12.0), (-2.0, 6.0)]);
    pentagon.closed = true;
    let n = pentagon.points.len();
    let edges: Vec<Line> = pentagon.segments().collect();
    for d in [0.5, 1.0, 2.0, 4.0] {
        for side in [Point::new(5.0, 3.0), Point::new(5.0, -3.0)] {
            let out = offset_polyline(&pentagon, d, side).unwrap();
            assert_eq!(out.points.len(), n);
            for (i, p) in out.points.iter().enumerate() {
                for edge in [&edges[i], &edges[(i + n - 1) % n]] {
                    assert!((edge.line_distance(*p) - d).abs() < 1e-9, "d={} vertex {}", d, i);
                }
            }
        }
    }
}

#[test]
fn exploded_lengths_add_up_to_the_perimeter() {
    let path = open(&[(0.0, 0.0), (3.0, 4.0), (3.0, 10.0)]);
    let pieces = explode(&path);
    let total: f64 = pieces.iter().map(|p| p.length()).sum();
    assert!((total - 11.0).abs() < 1e-9);
    assert!((total - path.length()).abs() < 1e-9);

    let mut ring = open(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
    ring.closed = true;
    let total: f64 = explode(&ring).iter().map(|p| p.length()).sum();
    assert!((total - 40.0).abs() < 1e-9);
    assert!((total - ring.length()).abs() < 1e-9);
}

#[test]
fn distant_polylines_stay_apart() {
    let merged = merge_polylines(vec![open(&[(0.0, 0.0), (1.0, 0.0)]), open(&[(5.0, 5.0), (6.0, 5.0)])], 0.01);
    assert_eq!(merged.len(), 2);
}

#[test]
fn split_then_explode() {
    let line = open(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
    let (a, b) = split_polyline(&line, Point::new(4.0, 0.5)).unwrap();
    assert_eq!(a.points, vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0)]);
    assert_eq!(b.points.len(), 3);
    assert_eq!(explode(&b).len(), 2);
    assert_eq!(split_polyline(&line, Point::new(0.0, 0.0)), Err(TopologyError::SplitAtEnd));
}

#[test]
fn closed_square_explodes_into_four_edges() {
    let mut sq = open(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
    sq.closed = true;
    let edges = explode(&sq);
    assert_eq!(edges.len(), 4);
    assert_eq!(edges[3].points, vec![Point::new(0.0, 10.0), Point::new(0.0, 0.0)]);
}

#[test]
fn offset_follows_the_side_point() {
    let line = open(&[(0.0, 0.0), (10.0, 0.0)]);
    let right = offset_polyline(&line, 2.0, Point::new(5.0, -1.0)).unwrap();
    assert!(right.points.iter().all(|p| (p.y + 2.0).abs() < 1e-9));
    assert_eq!(right.layer, "Boundary_offset");
}
