use assert_fs::prelude::*;
use predicates::prelude::*;
use site_survey::drawing::{Drawing, Peg};
use site_survey::geometry::{Point, Polyline};
use site_survey::io::project::{read_project_json, write_project_json, ProjectFile, PROJECT_FORMAT};
use site_survey::io::{read_points_csv_3d, read_to_string};
use site_survey::styles::Color;
use site_survey::surveying::Station;

#[test]
fn project_file_round_trip() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = dir.child("site.json");
    let path = file.path().to_str().unwrap();

    let mut drawing = Drawing::with_survey_layers();
    drawing.push_polyline(Polyline::closed(
        vec![Point::new(0.0, 0.0), Point::new(20.0, 0.0), Point::new(20.0, 15.0)],
        "Boundary",
        Color::WHITE,
    ));
    drawing.push_peg(Peg::new("BM1", Point::new(1.5, 2.5), "Pegs").with_elevation(101.25));
    drawing.setup.set_station(Station::new("BM1", Point::new(1.5, 2.5)));

    write_project_json(path, &ProjectFile::from_drawing(&drawing)).unwrap();
    let text = read_to_string(path).unwrap();
    assert!(predicate::str::contains(PROJECT_FORMAT).eval(&text));

    let restored = read_project_json(path).unwrap().to_drawing();
    assert_eq!(restored.polylines(), drawing.polylines());
    assert_eq!(restored.pegs(), drawing.pegs());
    assert_eq!(restored.setup.station, drawing.setup.station);
    assert_eq!(restored.layers.names().collect::<Vec<_>>(), drawing.layers.names().collect::<Vec<_>>());
}

#[test]
fn foreign_json_is_rejected() {
    let file = assert_fs::NamedTempFile::new("other.json").unwrap();
    file.write_str(r#"{"format": "Something Else", "version": "1.0"}"#).unwrap();
    assert!(read_project_json(file.path().to_str().unwrap()).is_err());
}

#[test]
fn elevation_csv_requires_three_columns() {
    let file = assert_fs::NamedTempFile::new("pts.csv").unwrap();
    file.write_str("0,0,10\n5,0,12.5\n\n0,5,11\n").unwrap();
    let pts = read_points_csv_3d(file.path().to_str().unwrap()).unwrap();
    assert_eq!(pts.len(), 3);
    assert_eq!(pts[1].z, 12.5);

    file.write_str("0,0,10\n5,0\n").unwrap();
    assert!(read_points_csv_3d(file.path().to_str().unwrap()).is_err());
}
