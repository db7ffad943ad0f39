//! Editor settings persisted as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::snap::SnapSettings;
use crate::surveying::DisplayPrefs;

/// Contour generation defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourSettings {
    pub interval: f64,
    /// Every `major_factor`-th level is major.
    pub major_factor: u32,
}

impl Default for ContourSettings {
    fn default() -> Self {
        Self {
            interval: 1.0,
            major_factor: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Pick and snap radius in screen pixels.
    pub snap_tolerance_px: f64,
    pub zoom_step: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub circle_segments: usize,
    pub arc_segments: usize,
    pub peg_marker_size: f64,
    pub default_peg_name: String,
    pub snap: SnapSettings,
    pub display: DisplayPrefs,
    pub contour: ContourSettings,
    pub check_point_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_tolerance_px: 10.0,
            zoom_step: 1.15,
            zoom_min: 1e-4,
            zoom_max: 1e6,
            circle_segments: 64,
            arc_segments: 32,
            peg_marker_size: 0.5,
            default_peg_name: "P1".to_string(),
            snap: SnapSettings::default(),
            display: DisplayPrefs::default(),
            contour: ContourSettings::default(),
            check_point_tolerance: 0.05,
        }
    }
}

impl EditorConfig {
    /// Saves the settings as pretty JSON.
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        crate::io::write_string_atomic(path, &json)
    }

    /// Loads settings from a JSON file; absent fields take their defaults.
    pub fn load(path: &str) -> std::io::Result<Self> {
        let data = crate::io::read_to_string(path)?;
        let mut config: EditorConfig = serde_json::from_str(&data)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        config.validate_and_clamp();
        log::info!("Loaded editor settings from {}", path);
        Ok(config)
    }

    /// Like [`EditorConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &str) -> std::io::Result<Self> {
        if !Path::new(path).exists() {
            log::info!("Settings file {} not found, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn validate_and_clamp(&mut self) {
        let defaults = Self::default();
        if !(self.snap_tolerance_px > 0.0) {
            log::warn!("snap_tolerance_px {} is not positive, using default", self.snap_tolerance_px);
            self.snap_tolerance_px = defaults.snap_tolerance_px;
        }
        if !(self.zoom_step > 1.0) {
            log::warn!("zoom_step {} must exceed 1, using default", self.zoom_step);
            self.zoom_step = defaults.zoom_step;
        }
        if !(self.zoom_min > 0.0 && self.zoom_min < self.zoom_max) {
            log::warn!("zoom range {}..{} is invalid, using default", self.zoom_min, self.zoom_max);
            self.zoom_min = defaults.zoom_min;
            self.zoom_max = defaults.zoom_max;
        }
        self.circle_segments = self.circle_segments.max(8);
        self.arc_segments = self.arc_segments.max(2);
        if !(self.contour.interval > 0.0) {
            self.contour.interval = defaults.contour.interval;
        }
        self.contour.major_factor = self.contour.major_factor.max(1);
        if self.default_peg_name.trim().is_empty() {
            self.default_peg_name = defaults.default_peg_name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = assert_fs::TempDir::new().unwrap();
        let path = dir.child("settings.json");
        let cfg = EditorConfig::load_or_default(path.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg, EditorConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = assert_fs::NamedTempFile::new("settings.json").unwrap();
        file.write_str(r#"{"snap_tolerance_px": 6, "display": {"swap_xy": true}}"#)
            .unwrap();
        let cfg = EditorConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.snap_tolerance_px, 6.0);
        assert!(cfg.display.swap_xy);
        assert_eq!(cfg.display.decimals, 3);
        assert_eq!(cfg.contour.major_factor, 5);
    }

    #[test]
    fn out_of_range_values_are_reset() {
        let file = assert_fs::NamedTempFile::new("settings.json").unwrap();
        file.write_str(r#"{"zoom_step": 0.5, "zoom_min": 10, "zoom_max": 1}"#)
            .unwrap();
        let cfg = EditorConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.zoom_step, 1.15);
        assert_eq!(cfg.zoom_min, 1e-4);
    }

    #[test]
    fn save_then_load() {
        let dir = assert_fs::TempDir::new().unwrap();
        let path = dir.child("settings.json");
        let p = path.path().to_str().unwrap();
        let mut cfg = EditorConfig::default();
        cfg.default_peg_name = "BM01".into();
        cfg.save(p).unwrap();
        assert_eq!(EditorConfig::load(p).unwrap(), cfg);
    }
}
