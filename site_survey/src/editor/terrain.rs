use crate::dtm::{ContourSummary, Tin, VolumeReport};
use crate::geometry::{Point, Polyline};
use crate::history::UndoCommand;
use crate::styles::Color;

use super::{Editor, Notification};

/// Layers receiving contour polylines.
pub const MAJOR_CONTOUR_LAYER: &str = "Contours_Major";
pub const MINOR_CONTOUR_LAYER: &str = "Contours_Minor";

const MAJOR_COLOR: Color = Color([139, 69, 19]);
const MINOR_COLOR: Color = Color([205, 133, 63]);

/// Endpoint gap bridged when chaining contour segments.
const CHAIN_TOLERANCE: f64 = 1e-6;

impl Editor {
    /// Triangulates every peg that carries an elevation.
    pub fn generate_tin(&mut self) -> bool {
        let points = self.drawing.elevated_pegs();
        if points.len() < 3 {
            self.warn(format!(
                "Need at least 3 pegs with elevation to build a surface, found {}",
                points.len()
            ));
            return false;
        }
        match Tin::build(points, self.geometry.as_ref()) {
            Ok(tin) => {
                self.status(format!(
                    "Surface built from {} points, {} triangles",
                    tin.points.len(),
                    tin.triangles.len()
                ));
                self.tin = Some(tin);
                self.contours.clear();
                true
            }
            Err(e) => {
                self.warn(format!("Surface failed: {}", e));
                false
            }
        }
    }

    /// Uses a surface built elsewhere, e.g. from a point file.
    pub fn set_tin(&mut self, tin: Tin) {
        self.tin = Some(tin);
        self.contours.clear();
    }

    pub fn clear_tin(&mut self) {
        self.tin = None;
        self.contours.clear();
    }

    pub fn elevation_at(&self, p: Point) -> Option<f64> {
        self.tin.as_ref()?.elevation_at(p)
    }

    /// Computes contour segments on the current surface and reports a summary.
    pub fn generate_contours(&mut self, interval: f64, major_factor: u32) -> Option<ContourSummary> {
        let Some(tin) = self.tin.as_ref() else {
            self.warn("Build a surface first");
            return None;
        };
        match tin.contours(interval, major_factor) {
            Ok(contours) => {
                let summary = ContourSummary::of(&contours);
                self.contours = contours;
                self.config.contour.interval = interval;
                self.config.contour.major_factor = major_factor;
                self.status(summary.to_string());
                Some(summary)
            }
            Err(e) => {
                self.warn(e.to_string());
                None
            }
        }
    }

    /// Turns the computed contours into polylines, undoable as one step.
    pub fn apply_contours(&mut self) -> usize {
        if self.contours.is_empty() {
            self.warn("Generate contours first");
            return 0;
        }
        let mut added = Vec::new();
        for contour in &self.contours {
            let (layer, color) = if contour.is_major {
                (MAJOR_CONTOUR_LAYER, MAJOR_COLOR)
            } else {
                (MINOR_CONTOUR_LAYER, MINOR_COLOR)
            };
            for path in contour.chained(CHAIN_TOLERANCE) {
                if path.len() >= 2 {
                    added.push(Polyline::new(path, layer, color));
                }
            }
        }
        for (layer, color) in [(MAJOR_CONTOUR_LAYER, MAJOR_COLOR), (MINOR_CONTOUR_LAYER, MINOR_COLOR)] {
            if added.iter().any(|p| p.layer == layer) && self.drawing.layers.ensure_layer(layer, color) {
                self.notify(Notification::LayersChanged);
            }
        }
        let base = self.drawing.polylines().len();
        let count = added.len();
        let entries = added.into_iter().enumerate().map(|(k, p)| (base + k, p)).collect();
        self.execute(UndoCommand::Group {
            label: "Add contours".to_string(),
            commands: vec![UndoCommand::AddMultiple { entries }],
        });
        self.status(format!("Added {} contour polylines", count));
        count
    }

    /// Cut and fill between the surface and a flat design level.
    pub fn compute_volume(&mut self, design_level: f64, boundary: Option<&[Point]>) -> Option<VolumeReport> {
        let Some(tin) = self.tin.as_mut() else {
            self.warn("Build a surface first");
            return None;
        };
        tin.design_level = design_level;
        match tin.cut_fill(design_level, boundary, self.geometry.as_ref()) {
            Ok(report) => {
                self.status(report.to_string());
                Some(report)
            }
            Err(e) => {
                self.warn(format!("Volume failed: {}", e));
                None
            }
        }
    }

    /// Volume limited to the selected closed polyline.
    pub fn compute_volume_in_selection(&mut self, design_level: f64) -> Option<VolumeReport> {
        let ring = match self.drawing.selected_polyline() {
            Some(p) if p.closed => p.points.clone(),
            _ => {
                self.warn("Select a closed polyline as the volume boundary");
                return None;
            }
        };
        self.compute_volume(design_level, Some(&ring))
    }
}
