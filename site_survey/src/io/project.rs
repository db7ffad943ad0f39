//! JSON project document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::drawing::{Drawing, Peg};
use crate::geometry::{Point, Polyline};
use crate::layers::{Layer, LayerManager};
use crate::styles::Color;
use crate::surveying::{Station, StationSetup};

pub const PROJECT_VERSION: &str = "1.0";
pub const PROJECT_FORMAT: &str = "SiteSurveyor Project";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineRecord {
    pub points: Vec<Point>,
    #[serde(default)]
    pub closed: bool,
    pub layer: String,
    #[serde(default)]
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PegRecord {
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    pub layer: String,
    #[serde(default = "default_peg_color")]
    pub color: Color,
}

fn default_peg_color() -> Color {
    Color::RED
}

/// On-disk form of a drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: String,
    pub format: String,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub polylines: Vec<PolylineRecord>,
    #[serde(default)]
    pub pegs: Vec<PegRecord>,
    #[serde(default)]
    pub station: Option<Station>,
    #[serde(default)]
    pub backsight: Option<Station>,
}

impl ProjectFile {
    /// Captures the current state of `drawing`.
    pub fn from_drawing(drawing: &Drawing) -> Self {
        Self {
            version: PROJECT_VERSION.to_string(),
            format: PROJECT_FORMAT.to_string(),
            saved_at: Utc::now(),
            layers: drawing.layers.iter().cloned().collect(),
            polylines: drawing
                .polylines()
                .iter()
                .map(|p| PolylineRecord {
                    points: p.points.clone(),
                    closed: p.closed,
                    layer: p.layer.clone(),
                    color: p.color,
                })
                .collect(),
            pegs: drawing
                .pegs()
                .iter()
                .map(|p| PegRecord {
                    name: p.name.clone(),
                    x: p.position.x,
                    y: p.position.y,
                    z: p.elevation,
                    layer: p.layer.clone(),
                    color: p.color,
                })
                .collect(),
            station: drawing.setup.station.clone(),
            backsight: drawing.setup.backsight.clone(),
        }
    }

    /// Rebuilds a drawing. Layers referenced by entities but missing from the
    /// layer table are created with default colours.
    pub fn to_drawing(&self) -> Drawing {
        let mut layers = LayerManager::new();
        let mut ordered = self.layers.clone();
        ordered.sort_by_key(|l| l.order);
        for layer in ordered {
            layers.add_layer(layer);
        }
        let polylines: Vec<Polyline> = self
            .polylines
            .iter()
            .map(|r| Polyline {
                points: r.points.clone(),
                closed: r.closed,
                layer: r.layer.clone(),
                color: r.color,
            })
            .collect();
        let pegs: Vec<Peg> = self
            .pegs
            .iter()
            .map(|r| Peg {
                name: r.name.clone(),
                position: Point::new(r.x, r.y),
                elevation: r.z,
                layer: r.layer.clone(),
                color: r.color,
            })
            .collect();
        for name in polylines.iter().map(|p| &p.layer).chain(pegs.iter().map(|p| &p.layer)) {
            layers.ensure_layer(name, Color::WHITE);
        }
        let mut drawing = Drawing::new();
        drawing.layers = layers;
        drawing.setup = StationSetup {
            station: self.station.clone(),
            backsight: self.station.as_ref().and(self.backsight.clone()),
        };
        drawing.replace_contents(polylines, pegs);
        drawing
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a project, rejecting documents of another format.
    pub fn from_json(text: &str) -> std::io::Result<Self> {
        let proj: ProjectFile = serde_json::from_str(text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        if proj.format != PROJECT_FORMAT {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unsupported project format '{}'", proj.format),
            ));
        }
        if proj.version != PROJECT_VERSION {
            log::warn!("reading project version {} as {}", proj.version, PROJECT_VERSION);
        }
        Ok(proj)
    }
}

pub fn read_project_json(path: &str) -> std::io::Result<ProjectFile> {
    let contents = crate::io::read_to_string(path)?;
    ProjectFile::from_json(&contents)
}

pub fn write_project_json(path: &str, project: &ProjectFile) -> std::io::Result<()> {
    let json = project.to_json().map_err(std::io::Error::other)?;
    crate::io::write_string_atomic(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Drawing {
        let mut d = Drawing::with_survey_layers();
        d.push_polyline(Polyline::closed(
            vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(4.0, 3.0)],
            "Boundary",
            Color::WHITE,
        ));
        d.push_peg(Peg::new("P1", Point::new(1.0, 2.0), "Pegs").with_elevation(12.5));
        d.push_peg(Peg::new("P2", Point::new(5.0, 2.0), "Pegs"));
        d.setup.set_station(Station::new("P1", Point::new(1.0, 2.0)));
        d
    }

    #[test]
    fn drawing_survives_round_trip() {
        let drawing = sample();
        let json = ProjectFile::from_drawing(&drawing).to_json().unwrap();
        let restored = ProjectFile::from_json(&json).unwrap().to_drawing();
        assert_eq!(restored, drawing);
    }

    #[test]
    fn header_fields_are_written() {
        let json = ProjectFile::from_drawing(&sample()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["format"], "SiteSurveyor Project");
        assert_eq!(value["pegs"][0]["z"], 12.5);
        assert!(value["pegs"][1].get("z").is_none());
        assert_eq!(value["polylines"][0]["color"], "#ffffff");
    }

    #[test]
    fn foreign_format_is_rejected() {
        let json = r#"{"version":"1.0","format":"Other","saved_at":"2024-01-01T00:00:00Z"}"#;
        let err = ProjectFile::from_json(json).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn missing_layers_are_recreated() {
        let json = r#"{"version":"1.0","format":"SiteSurveyor Project","saved_at":"2024-01-01T00:00:00Z",
            "pegs":[{"name":"A","x":1,"y":2,"layer":"Control"}]}"#;
        let drawing = ProjectFile::from_json(json).unwrap().to_drawing();
        assert!(drawing.layers.layer("Control").is_some());
        assert_eq!(drawing.pegs()[0].color, Color::RED);
    }
}
