use site_survey::dtm::{ContourSummary, Tin, TinError};
use site_survey::geometry::{DefaultGeometry, Point, Point3};

fn ramp() -> Tin {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 0.0, 0.0),
        Point3::new(10.0, 10.0, 10.0),
        Point3::new(0.0, 10.0, 10.0),
    ];
    Tin::from_parts(points, vec![[0, 1, 2], [0, 2, 3]]).unwrap()
}

#[test]
fn contours_on_a_ramp() {
    let contours = ramp().contours(5.0, 2).unwrap();
    let levels: Vec<f64> = contours.iter().map(|c| c.elevation).collect();
    assert_eq!(levels, vec![0.0, 5.0, 10.0]);
    assert_eq!(contours.iter().filter(|c| c.is_major).count(), 2);
    assert!(!contours[1].is_major);
    assert_eq!(
        ContourSummary::of(&contours).to_string(),
        "Generated 3 contour levels (2 major), 4 segments"
    );

    let paths = contours[1].chained(1e-6);
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].len(), 3);
    assert!(paths[0].iter().all(|p| (p.y - 5.0).abs() < 1e-9));
}

#[test]
fn balanced_cut_and_fill() {
    let tin = ramp();
    let report = tin.cut_fill(5.0, None, &DefaultGeometry::new()).unwrap();
    assert!((report.cut - 250.0 / 3.0).abs() < 1e-9);
    assert!((report.fill - 250.0 / 3.0).abs() < 1e-9);
    assert!(report.net.abs() < 1e-9);
    assert_eq!(report.triangles, 2);
}

#[test]
fn boundary_keeps_triangles_by_centroid() {
    let ring = [
        Point::new(5.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 5.0),
        Point::new(5.0, 5.0),
    ];
    let report = ramp().cut_fill(5.0, Some(&ring), &DefaultGeometry::new()).unwrap();
    assert_eq!(report.triangles, 1);
    assert!((report.area - 50.0).abs() < 1e-9);
    assert_eq!(report.cut, 0.0);
    assert!(report.fill > 0.0);
}

#[test]
fn interpolates_inside_and_rejects_outside() {
    let tin = ramp();
    assert!((tin.elevation_at(Point::new(7.0, 3.0)).unwrap() - 3.0).abs() < 1e-9);
    assert_eq!(tin.elevation_at(Point::new(-1.0, 3.0)), None);
}

#[test]
fn triangulation_needs_spread_points() {
    let geometry = DefaultGeometry::new();
    let few = Tin::build(vec![Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 0.0, 1.0)], &geometry);
    assert_eq!(few, Err(TinError::TooFewPoints(2)));

    let collinear = Tin::build(
        vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(2.0, 0.0, 3.0),
        ],
        &geometry,
    );
    assert!(matches!(collinear, Err(TinError::Triangulation(_))));

    let tin = Tin::build(
        vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(4.0, 0.0, 2.0),
            Point3::new(0.0, 4.0, 3.0),
            Point3::new(4.0, 4.0, 4.0),
        ],
        &geometry,
    )
    .unwrap();
    assert_eq!(tin.triangles.len(), 2);
    assert_eq!((tin.min_z, tin.max_z), (1.0, 4.0));
}
