//! Entity collections owned by the editor.
//!
//! All entities live in contiguous vectors and are referred to by index.
//! Every structural insert or removal goes through [`Drawing`] so selection
//! indices stay in step with the collections.

use std::collections::BTreeSet;

use crate::geometry::{Bounds, Point, Point3, Polyline};
use crate::layers::LayerManager;
use crate::styles::Color;
use crate::surveying::StationSetup;

/// Named survey point.
#[derive(Debug, Clone, PartialEq)]
pub struct Peg {
    pub name: String,
    pub position: Point,
    pub elevation: Option<f64>,
    pub layer: String,
    pub color: Color,
}

impl Peg {
    pub fn new(name: &str, position: Point, layer: &str) -> Self {
        Self {
            name: name.to_string(),
            position,
            elevation: None,
            layer: layer.to_string(),
            color: Color::RED,
        }
    }

    pub fn with_elevation(mut self, z: f64) -> Self {
        self.elevation = Some(z);
        self
    }
}

/// Polyline selection plus an independently selected peg.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    primary: Option<usize>,
    polylines: BTreeSet<usize>,
    peg: Option<usize>,
}

impl Selection {
    /// Most recently selected polyline.
    pub fn primary(&self) -> Option<usize> {
        self.primary
    }

    pub fn polylines(&self) -> impl Iterator<Item = usize> + '_ {
        self.polylines.iter().copied()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.polylines.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.polylines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    pub fn peg(&self) -> Option<usize> {
        self.peg
    }

    fn shift_after_insert(set: &mut BTreeSet<usize>, index: usize) {
        *set = set.iter().map(|&i| if i >= index { i + 1 } else { i }).collect();
    }

    fn shift_after_remove(set: &mut BTreeSet<usize>, index: usize) {
        *set = set
            .iter()
            .filter(|&&i| i != index)
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
    }

    fn adjust_insert(slot: &mut Option<usize>, index: usize) {
        if let Some(i) = slot {
            if *i >= index {
                *i += 1;
            }
        }
    }

    fn adjust_remove(slot: &mut Option<usize>, index: usize) {
        match *slot {
            Some(i) if i == index => *slot = None,
            Some(i) if i > index => *slot = Some(i - 1),
            _ => {}
        }
    }
}

/// Layers, entities, instrument setup and selection of one drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    pub layers: LayerManager,
    pub setup: StationSetup,
    polylines: Vec<Polyline>,
    pegs: Vec<Peg>,
    selection: Selection,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty drawing with the standard survey layers.
    pub fn with_survey_layers() -> Self {
        Self {
            layers: LayerManager::with_survey_defaults(),
            ..Self::default()
        }
    }

    pub fn polylines(&self) -> &[Polyline] {
        &self.polylines
    }

    pub fn polyline(&self, index: usize) -> Option<&Polyline> {
        self.polylines.get(index)
    }

    pub fn pegs(&self) -> &[Peg] {
        &self.pegs
    }

    pub fn peg(&self, index: usize) -> Option<&Peg> {
        self.pegs.get(index)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Inserts at `index` (clamped to the end) and returns the final index.
    pub fn insert_polyline(&mut self, index: usize, polyline: Polyline) -> usize {
        let index = index.min(self.polylines.len());
        self.polylines.insert(index, polyline);
        Selection::adjust_insert(&mut self.selection.primary, index);
        Selection::shift_after_insert(&mut self.selection.polylines, index);
        index
    }

    pub fn push_polyline(&mut self, polyline: Polyline) -> usize {
        self.insert_polyline(self.polylines.len(), polyline)
    }

    pub fn remove_polyline(&mut self, index: usize) -> Option<Polyline> {
        if index >= self.polylines.len() {
            return None;
        }
        let removed = self.polylines.remove(index);
        Selection::adjust_remove(&mut self.selection.primary, index);
        Selection::shift_after_remove(&mut self.selection.polylines, index);
        if self.selection.primary.is_none() {
            self.selection.primary = self.selection.polylines.iter().next_back().copied();
        }
        Some(removed)
    }

    /// Replaces the polyline at `index`, returning the previous value.
    pub fn replace_polyline(&mut self, index: usize, polyline: Polyline) -> Option<Polyline> {
        let slot = self.polylines.get_mut(index)?;
        Some(std::mem::replace(slot, polyline))
    }

    pub fn insert_peg(&mut self, index: usize, peg: Peg) -> usize {
        let index = index.min(self.pegs.len());
        self.pegs.insert(index, peg);
        Selection::adjust_insert(&mut self.selection.peg, index);
        index
    }

    pub fn push_peg(&mut self, peg: Peg) -> usize {
        self.insert_peg(self.pegs.len(), peg)
    }

    pub fn remove_peg(&mut self, index: usize) -> Option<Peg> {
        if index >= self.pegs.len() {
            return None;
        }
        Selection::adjust_remove(&mut self.selection.peg, index);
        Some(self.pegs.remove(index))
    }

    pub fn replace_peg(&mut self, index: usize, peg: Peg) -> Option<Peg> {
        let slot = self.pegs.get_mut(index)?;
        Some(std::mem::replace(slot, peg))
    }

    /// Selects a single polyline, or clears the polyline selection.
    pub fn select_polyline(&mut self, index: Option<usize>) {
        self.selection.polylines.clear();
        self.selection.primary = index.filter(|&i| i < self.polylines.len());
        if let Some(i) = self.selection.primary {
            self.selection.polylines.insert(i);
        }
    }

    /// Adds or removes a polyline from a multi-selection.
    pub fn toggle_polyline(&mut self, index: usize) {
        if index >= self.polylines.len() {
            return;
        }
        if self.selection.polylines.remove(&index) {
            if self.selection.primary == Some(index) {
                self.selection.primary = self.selection.polylines.iter().next_back().copied();
            }
        } else {
            self.selection.polylines.insert(index);
            self.selection.primary = Some(index);
        }
    }

    /// Replaces the polyline selection with `indices`; the last becomes primary.
    pub fn select_polylines(&mut self, indices: &[usize]) {
        self.selection.polylines.clear();
        self.selection.primary = None;
        for &i in indices.iter().filter(|&&i| i < self.polylines.len()) {
            self.selection.polylines.insert(i);
            self.selection.primary = Some(i);
        }
    }

    pub fn select_peg(&mut self, index: Option<usize>) {
        self.selection.peg = index.filter(|&i| i < self.pegs.len());
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
    }

    /// Selected polylines in ascending index order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selection.polylines().collect()
    }

    pub fn selected_polyline(&self) -> Option<&Polyline> {
        self.selection.primary.and_then(|i| self.polylines.get(i))
    }

    /// Removes every entity, layer and the station setup.
    pub fn clear_all(&mut self) {
        self.polylines.clear();
        self.pegs.clear();
        self.layers.clear();
        self.setup.clear();
        self.selection = Selection::default();
    }

    pub fn is_polyline_visible(&self, index: usize) -> bool {
        self.polylines
            .get(index)
            .map_or(false, |p| self.layers.is_visible(&p.layer))
    }

    /// Visible polylines with their indices.
    pub fn visible_polylines(&self) -> impl Iterator<Item = (usize, &Polyline)> {
        self.polylines
            .iter()
            .enumerate()
            .filter(move |(_, p)| self.layers.is_visible(&p.layer))
    }

    /// Nearest visible polyline whose edges pass within `tolerance` of `p`.
    pub fn hit_test_polyline(&self, p: Point, tolerance: f64) -> Option<usize> {
        self.visible_polylines()
            .filter_map(|(i, poly)| poly.nearest_segment(p).map(|(_, _, d)| (i, d)))
            .filter(|&(_, d)| d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Nearest visible peg within `tolerance` of `p`.
    pub fn hit_test_peg(&self, p: Point, tolerance: f64) -> Option<usize> {
        self.pegs
            .iter()
            .enumerate()
            .filter(|(_, peg)| self.layers.is_visible(&peg.layer))
            .map(|(i, peg)| (i, peg.position.distance_to(p)))
            .filter(|&(_, d)| d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Bounds of all visible polylines and pegs.
    pub fn visible_bounds(&self) -> Option<Bounds> {
        let poly_points = self
            .visible_polylines()
            .flat_map(|(_, p)| p.points.iter().copied());
        let peg_points = self
            .pegs
            .iter()
            .filter(|peg| self.layers.is_visible(&peg.layer))
            .map(|peg| peg.position);
        Bounds::from_points(poly_points.chain(peg_points))
    }

    /// Pegs that carry an elevation, as 3D points.
    pub fn elevated_pegs(&self) -> Vec<Point3> {
        self.pegs
            .iter()
            .filter_map(|peg| {
                peg.elevation
                    .map(|z| Point3::new(peg.position.x, peg.position.y, z))
            })
            .collect()
    }

    pub fn find_peg(&self, name: &str) -> Option<usize> {
        self.pegs.iter().position(|p| p.name == name)
    }

    /// Moves every entity on `old` to `new`.
    pub fn retag_layer(&mut self, old: &str, new: &str) {
        for p in self.polylines.iter_mut().filter(|p| p.layer == old) {
            p.layer = new.to_string();
        }
        for peg in self.pegs.iter_mut().filter(|p| p.layer == old) {
            peg.layer = new.to_string();
        }
    }

    /// Restores collections wholesale, e.g. after loading a project.
    pub fn replace_contents(&mut self, polylines: Vec<Polyline>, pegs: Vec<Peg>) {
        self.polylines = polylines;
        self.pegs = pegs;
        self.selection = Selection::default();
    }
}
