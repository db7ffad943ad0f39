use crate::drawing::Peg;
use crate::geometry::{circle_points, Arc, GeometryError, Point, Polyline};
use crate::history::UndoCommand;
use crate::layers::Layer;
use crate::styles::Color;
use crate::surveying::{format_dms, CheckPoint, CheckPointResiduals, Join, StakeoutInfo, Station};
use crate::topology::{
    explode, merge_polylines, offset_layer_name, offset_polyline, offset_side_is_left, project_onto, split_polyline,
    vertex_pegs, TopologyError, OFFSET_PEG_PREFIX,
};

use super::{Editor, Notification, PEG_LAYER};

impl Editor {
    fn layer_color(&self, layer: &str) -> Color {
        self.drawing.layers.layer(layer).map_or(Color::WHITE, |l| l.color)
    }

    fn ensure_layer(&mut self, name: &str, color: Color) {
        if self.drawing.layers.ensure_layer(name, color) {
            self.notify(Notification::LayersChanged);
        }
    }

    fn topology_failed(&mut self, err: TopologyError) {
        self.warn(err.to_string());
    }

    fn geometry_failed(&mut self, context: &str, err: GeometryError) {
        let detail = self.geometry.last_error().unwrap_or_else(|| err.to_string());
        self.warn(format!("{}: {}", context, detail));
    }

    /// Index and copy of the primary selected polyline.
    fn primary(&mut self) -> Option<(usize, Polyline)> {
        let found = self
            .drawing
            .selection()
            .primary()
            .and_then(|i| self.drawing.polyline(i).map(|p| (i, p.clone())));
        if found.is_none() {
            self.topology_failed(TopologyError::NoSelection);
        }
        found
    }

    /// Adds a polyline on the current layer and selects it.
    pub fn add_polyline(&mut self, points: Vec<Point>, closed: bool) -> Option<usize> {
        let min = if closed { 3 } else { 2 };
        if points.len() < min {
            self.topology_failed(TopologyError::Degenerate(min));
            return None;
        }
        let layer = self.current_layer.clone();
        self.ensure_layer(&layer, Color::WHITE);
        let mut polyline = Polyline::new(points, &layer, self.layer_color(&layer));
        polyline.closed = closed;
        let index = self.drawing.polylines().len();
        self.execute(UndoCommand::AddPolyline { index, polyline });
        self.drawing.select_polyline(Some(index));
        self.selection_changed();
        Some(index)
    }

    pub(super) fn create_polyline(&mut self, points: Vec<Point>, closed: bool) {
        let n = points.len();
        if self.add_polyline(points, closed).is_some() {
            let kind = if closed { "Closed polyline" } else { "Polyline" };
            self.status(format!("{} created with {} points", kind, n));
        }
    }

    pub(super) fn create_circle(&mut self, center: Point, radius: f64) {
        let points = circle_points(center, radius, self.config.circle_segments);
        if self.add_polyline(points, true).is_some() {
            self.status(format!("Circle created, radius {:.3}", radius));
        }
    }

    pub(super) fn create_arc(&mut self, start: Point, through: Point, end: Point) {
        let Some(arc) = Arc::through(start, through, end) else {
            self.warn("Arc points are collinear");
            return;
        };
        let mut points = arc.sample(self.config.arc_segments);
        if let Some(last) = points.last_mut() {
            *last = end;
        }
        if self.add_polyline(points, false).is_some() {
            self.status(format!("Arc created, radius {:.3}, length {:.3}", arc.radius, arc.length()));
        }
    }

    /// Joins the selected polylines into as few as possible.
    pub fn merge_selected(&mut self) {
        let indices = self.drawing.selected_indices();
        if indices.len() < 2 {
            self.topology_failed(TopologyError::TooFewToMerge);
            return;
        }
        let originals: Vec<(usize, Polyline)> = indices
            .iter()
            .filter_map(|&i| self.drawing.polyline(i).map(|p| (i, p.clone())))
            .collect();
        let merged = merge_polylines(
            originals.iter().map(|(_, p)| p.clone()).collect(),
            self.tolerance(),
        );
        if merged.len() == originals.len() {
            self.topology_failed(TopologyError::NothingMerged);
            return;
        }
        let base = self.drawing.polylines().len() - originals.len();
        let added: Vec<(usize, Polyline)> = merged.into_iter().enumerate().map(|(k, p)| (base + k, p)).collect();
        let new_indices: Vec<usize> = added.iter().map(|(i, _)| *i).collect();
        let (before, after) = (originals.len(), added.len());
        self.execute(UndoCommand::Group {
            label: "Join polylines".to_string(),
            commands: vec![
                UndoCommand::DeleteMultiple { entries: originals },
                UndoCommand::AddMultiple { entries: added },
            ],
        });
        self.drawing.select_polylines(&new_indices);
        self.selection_changed();
        self.status(format!("Joined {} polylines into {}", before, after));
    }

    pub(super) fn split_selected(&mut self, at: Point) {
        let Some((index, original)) = self.primary() else {
            return;
        };
        let (a, b) = match split_polyline(&original, at) {
            Ok(halves) => halves,
            Err(e) => return self.topology_failed(e),
        };
        self.execute(UndoCommand::Group {
            label: "Split polyline".to_string(),
            commands: vec![
                UndoCommand::DeletePolyline {
                    index,
                    polyline: original,
                },
                UndoCommand::AddMultiple {
                    entries: vec![(index, a), (index + 1, b)],
                },
            ],
        });
        self.drawing.select_polyline(Some(index));
        self.selection_changed();
        self.status("Polyline split into 2 parts");
    }

    /// Replaces each selected polyline by its individual edges.
    pub fn explode_selected(&mut self) {
        let indices = self.drawing.selected_indices();
        if indices.is_empty() {
            return self.topology_failed(TopologyError::NoSelection);
        }
        let originals: Vec<(usize, Polyline)> = indices
            .iter()
            .filter_map(|&i| self.drawing.polyline(i).map(|p| (i, p.clone())))
            .collect();
        let pieces: Vec<Polyline> = originals.iter().flat_map(|(_, p)| explode(p)).collect();
        if pieces.is_empty() {
            return self.topology_failed(TopologyError::Degenerate(2));
        }
        let base = self.drawing.polylines().len() - originals.len();
        let added: Vec<(usize, Polyline)> = pieces.into_iter().enumerate().map(|(k, p)| (base + k, p)).collect();
        let new_indices: Vec<usize> = added.iter().map(|(i, _)| *i).collect();
        self.execute(UndoCommand::Group {
            label: "Explode".to_string(),
            commands: vec![
                UndoCommand::DeleteMultiple { entries: originals },
                UndoCommand::AddMultiple { entries: added },
            ],
        });
        self.drawing.select_polylines(&new_indices);
        self.selection_changed();
        self.status(format!("Exploded into {} segments", new_indices.len()));
    }

    pub(super) fn offset_selected(&mut self, distance: f64, side: Point) {
        let Some((_, original)) = self.primary() else {
            return;
        };
        let offset = match offset_polyline(&original, distance, side) {
            Ok(p) => p,
            Err(e) => return self.topology_failed(e),
        };
        let left = offset_side_is_left(&original, side).unwrap_or(true);
        self.ensure_layer(&offset_layer_name(&original.layer), Color::OFFSET);
        let pegs = vertex_pegs(&offset, OFFSET_PEG_PREFIX);
        let peg_count = pegs.len();
        let index = self.drawing.polylines().len();
        let first_peg = self.drawing.pegs().len();
        let mut commands = vec![UndoCommand::AddPolyline { index, polyline: offset }];
        commands.extend(pegs.into_iter().enumerate().map(|(k, peg)| UndoCommand::AddPeg {
            index: first_peg + k,
            peg,
        }));
        self.execute(UndoCommand::Group {
            label: "Offset polyline".to_string(),
            commands,
        });
        self.status(format!(
            "Offset created at distance {:.3} ({} side) with {} pegs",
            distance,
            if left { "left" } else { "right" },
            peg_count
        ));
    }

    /// Opens a closed polyline or closes an open one.
    pub fn toggle_closed_selected(&mut self) {
        let Some((index, before)) = self.primary() else {
            return;
        };
        if !before.closed && before.points.len() < 3 {
            return self.topology_failed(TopologyError::Degenerate(3));
        }
        let mut after = before.clone();
        after.closed = !before.closed;
        let msg = if after.closed { "Polyline closed" } else { "Polyline opened" };
        self.execute(UndoCommand::ModifyPolyline { index, before, after });
        self.status(msg);
    }

    pub fn reverse_selected(&mut self) {
        let Some((index, before)) = self.primary() else {
            return;
        };
        let mut after = before.clone();
        after.reverse();
        self.execute(UndoCommand::ModifyPolyline { index, before, after });
        self.status("Polyline direction reversed");
    }

    /// Deletes the selected peg, or else the selected polylines.
    pub fn delete_selection(&mut self) {
        if let Some(index) = self.drawing.selection().peg() {
            if let Some(peg) = self.drawing.peg(index).cloned() {
                let name = peg.name.clone();
                self.execute(UndoCommand::DeletePeg { index, peg });
                self.status(format!("Peg {} deleted", name));
            }
            return;
        }
        let indices = self.drawing.selected_indices();
        let mut entries: Vec<(usize, Polyline)> = indices
            .iter()
            .filter_map(|&i| self.drawing.polyline(i).map(|p| (i, p.clone())))
            .collect();
        match entries.len() {
            0 => {}
            1 => {
                let (index, polyline) = entries.remove(0);
                self.execute(UndoCommand::DeletePolyline { index, polyline });
                self.status("Polyline deleted");
            }
            n => {
                self.execute(UndoCommand::DeleteMultiple { entries });
                self.status(format!("{} polylines deleted", n));
            }
        }
    }

    pub fn select_polyline(&mut self, index: Option<usize>) {
        self.drawing.select_polyline(index);
        self.selection_changed();
    }

    pub fn select_polylines(&mut self, indices: &[usize]) {
        self.drawing.select_polylines(indices);
        self.selection_changed();
    }

    pub fn select_peg(&mut self, index: Option<usize>) {
        self.drawing.select_peg(index);
    }

    /// Places a named peg on the peg layer and returns its index. Names
    /// need not be unique.
    pub fn add_peg(&mut self, name: &str, at: Point, elevation: Option<f64>) -> usize {
        self.ensure_layer(PEG_LAYER, Color::RED);
        let mut peg = Peg::new(name, at, PEG_LAYER);
        peg.color = self.layer_color(PEG_LAYER);
        peg.elevation = elevation;
        let index = self.drawing.pegs().len();
        self.execute(UndoCommand::AddPeg { index, peg });
        let at = self.config.display.format_point(at);
        self.status(format!("Peg {} added at {}", name, at));
        index
    }

    /// Changes the position and elevation of an existing peg.
    pub fn modify_peg(&mut self, index: usize, position: Point, elevation: Option<f64>) {
        let Some(before) = self.drawing.peg(index).cloned() else {
            return;
        };
        let mut after = before.clone();
        after.position = position;
        after.elevation = elevation;
        let name = after.name.clone();
        self.execute(UndoCommand::ModifyPeg { index, before, after });
        self.status(format!("Peg {} updated", name));
    }

    /// Adds one peg per `x,y[,z]` record, named from the running sequence.
    pub fn import_pegs_csv(&mut self, path: &str) -> std::io::Result<usize> {
        let records = match crate::io::read_point_records(path) {
            Ok(r) => r,
            Err(e) => {
                self.warn(format!("Failed to import {}: {}", path, e));
                return Err(e);
            }
        };
        self.ensure_layer(PEG_LAYER, Color::RED);
        let color = self.layer_color(PEG_LAYER);
        let first = self.drawing.pegs().len();
        let mut commands = Vec::with_capacity(records.len());
        for (k, r) in records.iter().enumerate() {
            let mut peg = Peg::new(&self.next_peg_name, r.position, PEG_LAYER);
            peg.elevation = r.elevation;
            peg.color = color;
            self.next_peg_name = crate::naming::next_peg_name(&self.next_peg_name);
            commands.push(UndoCommand::AddPeg { index: first + k, peg });
        }
        let count = commands.len();
        if count > 0 {
            self.execute(UndoCommand::Group {
                label: "Import pegs".to_string(),
                commands,
            });
        }
        self.status(format!("Imported {} pegs from {}", count, path));
        Ok(count)
    }

    pub(super) fn report_measure(&mut self, from: Point, to: Point) {
        let join = Join::between(from, to, &self.config.display);
        self.status(format!(
            "Distance: {:.*} m, Bearing: {}",
            self.config.display.decimals,
            join.distance,
            format_dms(join.bearing)
        ));
    }

    /// Inverse between two points formatted with the display preferences.
    pub fn join_report(&self, from: Point, to: Point) -> String {
        Join::between(from, to, &self.config.display).report(&self.config.display)
    }

    fn peg_station(&self, index: usize) -> Option<Station> {
        self.drawing
            .peg(index)
            .map(|p| Station::new(p.name.clone(), p.position))
    }

    pub(super) fn set_station_peg(&mut self, index: usize) {
        let Some(station) = self.peg_station(index) else {
            return;
        };
        let msg = format!(
            "Station set at {} {}",
            station.name,
            self.config.display.format_point(station.position)
        );
        self.drawing.setup.set_station(station);
        self.status(msg);
    }

    pub(super) fn set_backsight_peg(&mut self, index: usize) {
        let Some(backsight) = self.peg_station(index) else {
            return;
        };
        let name = backsight.name.clone();
        if let Err(e) = self.drawing.setup.set_backsight(backsight) {
            return self.warn(e.to_string());
        }
        let bearing = self.drawing.setup.backsight_bearing().unwrap_or_default();
        self.status(format!("Backsight set at {}, bearing {}", name, format_dms(bearing)));
    }

    pub(super) fn check_point_peg(&mut self, index: usize) {
        let Some(peg) = self.drawing.peg(index).cloned() else {
            return;
        };
        let Some(check) = CheckPoint::compute(&self.drawing.setup, &peg.name, peg.position) else {
            return self.warn("Set station point first");
        };
        let station = self
            .drawing
            .setup
            .station
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let msg = check.summary(&station);
        self.last_check = Some(check);
        self.status(msg);
    }

    /// Compares an observation with the last check point.
    pub fn check_point_residuals(&mut self, observed_bearing: f64, observed_distance: f64) -> Option<CheckPointResiduals> {
        let check = self.last_check.as_ref()?;
        let r = check.residuals(observed_bearing, observed_distance, self.config.check_point_tolerance);
        let verdict = if r.within_tolerance { "OK" } else { "OUT OF TOLERANCE" };
        self.status(format!(
            "Check {}: dAngle {:.4}\u{00B0}, dDist {:.3}, dE {:.3}, dN {:.3}",
            verdict, r.angle, r.distance, r.delta_e, r.delta_n
        ));
        Some(r)
    }

    pub(super) fn stakeout_peg(&mut self, index: usize) {
        let Some(peg) = self.drawing.peg(index).cloned() else {
            return;
        };
        match StakeoutInfo::compute(&self.drawing.setup, &peg.name, peg.position, &self.config.display) {
            Some(info) => {
                let msg = info.summary(&self.config.display);
                self.status(msg);
            }
            None => self.warn("Set station point first"),
        }
    }

    /// Pegs where the selected partition line, extended, meets offset lines.
    pub fn project_partition(&mut self, prefix: &str) {
        let Some((_, partition)) = self.primary() else {
            return;
        };
        let targets: Vec<Polyline> = self
            .drawing
            .visible_polylines()
            .filter(|(_, p)| p.layer.ends_with("_offset"))
            .map(|(_, p)| p.clone())
            .collect();
        let refs: Vec<&Polyline> = targets.iter().collect();
        let hits = project_onto(&partition, &refs);
        if hits.is_empty() {
            return self.warn("Partition does not meet any offset line");
        }
        let layer = format!("{}_projection", partition.layer);
        self.ensure_layer(&layer, Color::MAGENTA);
        let color = self.layer_color(&layer);
        let first = self.drawing.pegs().len();
        let commands: Vec<UndoCommand> = hits
            .iter()
            .enumerate()
            .map(|(k, &p)| {
                let mut peg = Peg::new(&format!("{}{}", prefix, k + 1), p, &layer);
                peg.color = color;
                UndoCommand::AddPeg { index: first + k, peg }
            })
            .collect();
        self.execute(UndoCommand::Group {
            label: "Project partition".to_string(),
            commands,
        });
        self.status(format!("Projected {} pegs onto {}", hits.len(), layer));
    }

    fn selected_ring(&mut self) -> Option<(usize, Polyline)> {
        let (index, poly) = self.primary()?;
        if !poly.closed {
            self.warn("Select a closed polyline");
            return None;
        }
        Some((index, poly))
    }

    /// Reports whether the selected closed polyline is a valid polygon.
    pub fn check_selected_geometry(&mut self) -> Option<bool> {
        let (_, poly) = self.selected_ring()?;
        let valid = self.geometry.is_valid(&poly.points);
        if valid {
            self.status("Polygon is valid");
        } else {
            let reason = self.geometry.last_error().unwrap_or_default();
            self.warn(format!("Polygon is invalid: {}", reason));
        }
        Some(valid)
    }

    pub fn repair_selected_geometry(&mut self) {
        let Some((index, before)) = self.selected_ring() else {
            return;
        };
        match self.geometry.make_valid(&before.points) {
            Ok(points) if points == before.points => self.status("Polygon is already valid"),
            Ok(points) => {
                let mut after = before.clone();
                after.points = points;
                let removed = before.points.len().saturating_sub(after.points.len());
                self.execute(UndoCommand::ModifyPolyline { index, before, after });
                self.status(format!("Polygon repaired, {} vertices removed", removed));
            }
            Err(e) => self.geometry_failed("Repair failed", e),
        }
    }

    /// Buffers the selected closed polyline onto `<layer>_buffer`.
    pub fn buffer_selected(&mut self, distance: f64) {
        let Some((_, ring)) = self.selected_ring() else {
            return;
        };
        let points = match self.geometry.buffer_polygon(&ring.points, distance) {
            Ok(p) => p,
            Err(e) => return self.geometry_failed("Buffer failed", e),
        };
        let layer = format!("{}_buffer", ring.layer);
        self.ensure_layer(&layer, Color::CYAN);
        let polyline = Polyline::closed(points, &layer, self.layer_color(&layer));
        let index = self.drawing.polylines().len();
        self.execute(UndoCommand::AddPolyline { index, polyline });
        self.status(format!("Buffer of {:.3} created on {}", distance, layer));
    }

    pub fn set_current_layer(&mut self, name: &str) {
        if self.drawing.layers.layer(name).is_none() {
            return self.warn(format!("No layer named {}", name));
        }
        self.current_layer = name.to_string();
    }

    pub fn add_layer(&mut self, name: &str, color: Color) -> bool {
        if name.trim().is_empty() || !self.drawing.layers.add_layer(Layer::new(name, color)) {
            self.warn(format!("Layer {} already exists", name));
            return false;
        }
        self.notify(Notification::LayersChanged);
        self.status(format!("Layer {} added", name));
        true
    }

    /// Removes a layer. Entities on it are kept; the removal cannot be undone.
    pub fn remove_layer(&mut self, name: &str) -> bool {
        if self.drawing.layers.layer(name).is_none() {
            self.warn(format!("No layer named {}", name));
            return false;
        }
        self.execute(UndoCommand::DeleteLayer { name: name.to_string() });
        if self.current_layer == name {
            self.current_layer = self
                .drawing
                .layers
                .names()
                .next()
                .unwrap_or(super::DEFAULT_LAYER)
                .to_string();
        }
        self.notify(Notification::LayersChanged);
        self.status(format!("Layer {} deleted", name));
        true
    }

    /// Renames a layer and moves its entities along.
    pub fn rename_layer(&mut self, old: &str, new: &str) -> bool {
        if !self.drawing.layers.rename_layer(old, new) {
            self.warn(format!("Cannot rename layer {} to {}", old, new));
            return false;
        }
        self.drawing.retag_layer(old, new);
        if self.current_layer == old {
            self.current_layer = new.to_string();
        }
        self.invalidate();
        self.notify(Notification::LayersChanged);
        self.status(format!("Layer {} renamed to {}", old, new));
        true
    }

    fn update_layer(&mut self, name: &str, f: impl FnOnce(&mut Layer)) -> bool {
        match self.drawing.layers.layer_mut(name) {
            Some(layer) => {
                f(layer);
                self.invalidate();
                self.notify(Notification::LayersChanged);
                true
            }
            None => {
                self.warn(format!("No layer named {}", name));
                false
            }
        }
    }

    /// Hidden layers take no part in snapping or picking.
    pub fn set_layer_visible(&mut self, name: &str, visible: bool) -> bool {
        self.update_layer(name, |l| l.visible = visible)
    }

    pub fn set_layer_locked(&mut self, name: &str, locked: bool) -> bool {
        self.update_layer(name, |l| l.locked = locked)
    }

    pub fn set_layer_color(&mut self, name: &str, color: Color) -> bool {
        self.update_layer(name, |l| l.color = color)
    }
}
