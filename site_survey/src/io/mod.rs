//! File input and output helpers for project data.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::geometry::{Point, Point3};

pub mod project;

/// Reads a file to string.
pub fn read_to_string(path: &str) -> io::Result<String> {
    let mut buffer = String::new();
    File::open(path)?.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Writes `contents` to `path`, replacing any existing file.
pub fn write_string(path: &str, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())
}

/// Writes through a temporary file in the same directory, then renames it
/// over `path` so readers never observe a half-written file.
pub fn write_string_atomic(path: &str, contents: &str) -> io::Result<()> {
    let target = Path::new(path);
    let dir = match target.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// One `x,y[,z]` record of a point file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    pub position: Point,
    pub elevation: Option<f64>,
}

fn invalid(line: usize, msg: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("line {}: {}", line, msg))
}

/// Parses `x,y[,z]` lines; blank lines are skipped.
pub fn parse_point_records(text: &str) -> io::Result<Vec<PointRecord>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        if parts.len() < 2 {
            return Err(invalid(idx + 1, "expected at least two comma-separated values"));
        }
        let mut values = Vec::with_capacity(3);
        for part in parts.iter().take(3) {
            values.push(part.parse::<f64>().map_err(|e| invalid(idx + 1, e))?);
        }
        out.push(PointRecord {
            position: Point::new(values[0], values[1]),
            elevation: values.get(2).copied(),
        });
    }
    Ok(out)
}

pub fn read_point_records(path: &str) -> io::Result<Vec<PointRecord>> {
    parse_point_records(&read_to_string(path)?)
}

/// Reads a CSV file of `x,y` pairs into [`Point`]s. Extra columns are ignored.
pub fn read_points_csv(path: &str) -> io::Result<Vec<Point>> {
    Ok(read_point_records(path)?
        .into_iter()
        .map(|r| r.position)
        .collect())
}

/// Reads a CSV file of `x,y,z` triples; every row must carry an elevation.
pub fn read_points_csv_3d(path: &str) -> io::Result<Vec<Point3>> {
    let text = read_to_string(path)?;
    let records = parse_point_records(&text)?;
    let mut pts = Vec::with_capacity(records.len());
    for (idx, r) in records.iter().enumerate() {
        let z = r
            .elevation
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("point {}: expected three comma-separated values", idx + 1),
                )
            })?;
        pts.push(Point3::new(r.position.x, r.position.y, z));
    }
    Ok(pts)
}
