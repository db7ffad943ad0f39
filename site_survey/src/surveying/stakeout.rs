//! Stakeout and check-point computations from an instrument station.

use crate::geometry::Point;

use super::cogo::{bearing, display_bearing, format_dms, forward, normalize_degrees, wrap_180};
use super::{DisplayPrefs, StationSetup};

/// Bearing and distance from the station to a target.
#[derive(Debug, Clone, PartialEq)]
pub struct StakeoutInfo {
    pub target: String,
    pub bearing: f64,
    pub distance: f64,
}

impl StakeoutInfo {
    /// Returns `None` when no station has been set up.
    pub fn compute(setup: &StationSetup, target: &str, position: Point, prefs: &DisplayPrefs) -> Option<Self> {
        let station = setup.station.as_ref()?;
        Some(Self {
            target: target.to_string(),
            bearing: display_bearing(station.position, position, prefs),
            distance: station.position.distance_to(position),
        })
    }

    pub fn summary(&self, prefs: &DisplayPrefs) -> String {
        format!(
            "{}: Bearing {}, Distance {:.*}",
            self.target,
            format_dms(self.bearing),
            prefs.decimals,
            self.distance
        )
    }
}

/// Theoretical observation of a check point from the current setup.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckPoint {
    pub name: String,
    pub position: Point,
    pub station: Point,
    pub bearing: f64,
    pub distance: f64,
    pub backsight_bearing: f64,
    /// Horizontal angle turned from the backsight, `[0, 360)`.
    pub turn_angle: f64,
}

impl CheckPoint {
    /// Returns `None` when no station has been set up. Without a backsight the
    /// turn angle is measured from north.
    pub fn compute(setup: &StationSetup, name: &str, position: Point) -> Option<Self> {
        let station = setup.station.as_ref()?;
        let brg = bearing(station.position, position);
        let backsight_bearing = setup
            .backsight
            .as_ref()
            .map_or(0.0, |bs| bearing(station.position, bs.position));
        Some(Self {
            name: name.to_string(),
            position,
            station: station.position,
            bearing: brg,
            distance: station.position.distance_to(position),
            backsight_bearing,
            turn_angle: normalize_degrees(brg - backsight_bearing),
        })
    }

    /// Compares an observed bearing and distance with the theoretical values.
    pub fn residuals(&self, observed_bearing: f64, observed_distance: f64, tolerance: f64) -> CheckPointResiduals {
        let observed = forward(self.station, observed_bearing, observed_distance);
        let delta_e = observed.x - self.position.x;
        let delta_n = observed.y - self.position.y;
        CheckPointResiduals {
            angle: wrap_180(observed_bearing - self.bearing),
            distance: observed_distance - self.distance,
            delta_e,
            delta_n,
            within_tolerance: delta_e.abs() <= tolerance && delta_n.abs() <= tolerance,
        }
    }

    pub fn summary(&self, station_name: &str) -> String {
        format!(
            "Checking {} from {}: Bearing {:.4}\u{00B0}, Distance {:.3} m, Turn Angle {:.4}\u{00B0}",
            self.name, station_name, self.bearing, self.distance, self.turn_angle
        )
    }
}

/// Differences between an observation and the theoretical check values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckPointResiduals {
    /// Angular residual in degrees, wrapped to `(-180, 180]`.
    pub angle: f64,
    pub distance: f64,
    pub delta_e: f64,
    pub delta_n: f64,
    pub within_tolerance: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surveying::Station;

    fn setup() -> StationSetup {
        let mut s = StationSetup::default();
        s.set_station(Station::new("STN", Point::new(100.0, 100.0)));
        s
    }

    #[test]
    fn stakeout_needs_station() {
        let prefs = DisplayPrefs::default();
        assert!(StakeoutInfo::compute(&StationSetup::default(), "P1", Point::new(0.0, 0.0), &prefs).is_none());
        let info = StakeoutInfo::compute(&setup(), "P1", Point::new(100.0, 110.0), &prefs).unwrap();
        assert!(info.bearing.abs() < 1e-9);
        assert_eq!(info.summary(&prefs), "P1: Bearing 000\u{00B0} 00' 00.00\", Distance 10.000");
    }

    #[test]
    fn turn_angle_from_backsight() {
        let mut s = setup();
        s.set_backsight(Station::new("BS", Point::new(110.0, 100.0))).unwrap();
        let cp = CheckPoint::compute(&s, "C1", Point::new(100.0, 90.0)).unwrap();
        assert!((cp.bearing - 180.0).abs() < 1e-9);
        assert!((cp.backsight_bearing - 90.0).abs() < 1e-9);
        assert!((cp.turn_angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn residuals_flag_large_errors() {
        let cp = CheckPoint::compute(&setup(), "C1", Point::new(100.0, 110.0)).unwrap();
        let exact = cp.residuals(0.0, 10.0, 0.05);
        assert!(exact.within_tolerance);
        assert!(exact.delta_e.abs() < 1e-9 && exact.delta_n.abs() < 1e-9);

        let off = cp.residuals(359.0, 10.1, 0.05);
        assert!((off.angle + 1.0).abs() < 1e-9);
        assert!((off.distance - 0.1).abs() < 1e-9);
        assert!(!off.within_tolerance);
    }
}
