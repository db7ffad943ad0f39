//! Surveying specific utilities.

use crate::geometry::{self, Point};

pub mod cogo;
pub use cogo::{bearing, display_bearing, format_dms, forward, normalize_degrees, wrap_180, Join};

pub mod stakeout;
pub use stakeout::{CheckPoint, CheckPointResiduals, StakeoutInfo};

/// Immutable presentation settings threaded through formatting code.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DisplayPrefs {
    /// Present coordinates as (N, E) instead of (E, N).
    pub swap_xy: bool,
    /// Report bearings from south instead of north.
    pub south_azimuth: bool,
    /// Decimal places for distances and coordinates.
    pub decimals: usize,
}

impl Default for DisplayPrefs {
    fn default() -> Self {
        Self {
            swap_xy: false,
            south_azimuth: false,
            decimals: 3,
        }
    }
}

impl DisplayPrefs {
    /// Formats a plan position in the configured axis order.
    pub fn format_point(&self, p: Point) -> String {
        let (a, b) = if self.swap_xy { (p.y, p.x) } else { (p.x, p.y) };
        format!("({:.*}, {:.*})", self.decimals, a, self.decimals, b)
    }
}

/// Representation of a simple survey station.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Station {
    pub name: String,
    pub position: Point,
}

impl Station {
    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// Calculates the horizontal distance between two survey stations.
pub fn station_distance(a: &Station, b: &Station) -> f64 {
    geometry::distance(a.position, b.position)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("Set station point first")]
    NoStation,
}

/// Instrument setup: the occupied station and its orientation reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationSetup {
    pub station: Option<Station>,
    pub backsight: Option<Station>,
}

impl StationSetup {
    pub fn has_station(&self) -> bool {
        self.station.is_some()
    }

    pub fn has_backsight(&self) -> bool {
        self.backsight.is_some()
    }

    /// Occupies a new station. Any previous backsight no longer applies.
    pub fn set_station(&mut self, station: Station) {
        self.station = Some(station);
        self.backsight = None;
    }

    /// Sets the backsight; rejected until a station exists.
    pub fn set_backsight(&mut self, backsight: Station) -> Result<(), SetupError> {
        if self.station.is_none() {
            return Err(SetupError::NoStation);
        }
        self.backsight = Some(backsight);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.station = None;
        self.backsight = None;
    }

    /// Orientation bearing from the station to the backsight.
    pub fn backsight_bearing(&self) -> Option<f64> {
        let stn = self.station.as_ref()?;
        let bs = self.backsight.as_ref()?;
        Some(bearing(stn.position, bs.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_distance_works() {
        let s1 = Station::new("A", Point::new(0.0, 0.0));
        let s2 = Station::new("B", Point::new(3.0, 4.0));
        assert_eq!(station_distance(&s1, &s2), 5.0);
    }

    #[test]
    fn backsight_requires_station() {
        let mut setup = StationSetup::default();
        let bs = Station::new("BS", Point::new(0.0, 10.0));
        assert_eq!(setup.set_backsight(bs.clone()), Err(SetupError::NoStation));
        setup.set_station(Station::new("STN", Point::new(0.0, 0.0)));
        setup.set_backsight(bs).unwrap();
        assert!(setup.backsight_bearing().unwrap().abs() < 1e-9);
        setup.set_station(Station::new("STN2", Point::new(5.0, 5.0)));
        assert!(!setup.has_backsight());
    }

    #[test]
    fn swapped_point_format() {
        let prefs = DisplayPrefs {
            swap_xy: true,
            decimals: 2,
            ..DisplayPrefs::default()
        };
        assert_eq!(prefs.format_point(Point::new(1.0, 2.0)), "(2.00, 1.00)");
    }
}
