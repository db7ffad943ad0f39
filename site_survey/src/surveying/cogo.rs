//! Basic coordinate geometry (COGO) utilities used in surveying operations.
//!
//! Bearings are whole-circle angles in degrees, clockwise from grid north.

use crate::geometry::Point;

use super::DisplayPrefs;

/// Normalizes an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Wraps an angle difference in degrees to `(-180, 180]`.
pub fn wrap_180(angle: f64) -> f64 {
    let a = normalize_degrees(angle);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}

/// Computes the bearing in degrees from point `a` to point `b`, clockwise
/// from north.
pub fn bearing(a: Point, b: Point) -> f64 {
    normalize_degrees((b.x - a.x).atan2(b.y - a.y).to_degrees())
}

/// Bearing as presented to the user, rotated 180° for south azimuths.
pub fn display_bearing(a: Point, b: Point, prefs: &DisplayPrefs) -> f64 {
    let brg = bearing(a, b);
    if prefs.south_azimuth {
        normalize_degrees(brg + 180.0)
    } else {
        brg
    }
}

/// Computes a new point from a starting point, a bearing (degrees from north)
/// and a distance.
pub fn forward(start: Point, bearing: f64, distance: f64) -> Point {
    let rad = bearing.to_radians();
    Point::new(
        start.x + distance * rad.sin(),
        start.y + distance * rad.cos(),
    )
}

/// Formats a bearing as `DDD° MM' SS.SS"`.
pub fn format_dms(degrees: f64) -> String {
    let sign = if degrees < 0.0 { "-" } else { "" };
    let total_hundredths = (degrees.abs() * 360_000.0).round() as u64;
    let d = total_hundredths / 360_000;
    let m = (total_hundredths / 6_000) % 60;
    let s = (total_hundredths % 6_000) as f64 / 100.0;
    format!("{}{:03}\u{00B0} {:02}' {:05.2}\"", sign, d, m, s)
}

/// Result of an inverse (join) between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Join {
    pub delta_e: f64,
    pub delta_n: f64,
    pub distance: f64,
    /// Display bearing in degrees.
    pub bearing: f64,
}

impl Join {
    pub fn between(from: Point, to: Point, prefs: &DisplayPrefs) -> Self {
        Self {
            delta_e: to.x - from.x,
            delta_n: to.y - from.y,
            distance: from.distance_to(to),
            bearing: display_bearing(from, to, prefs),
        }
    }

    /// Multi-line report honouring the axis order in `prefs`.
    pub fn report(&self, prefs: &DisplayPrefs) -> String {
        let p = prefs.decimals;
        let e = format!("\u{0394}E: {:.*}", p, self.delta_e);
        let n = format!("\u{0394}N: {:.*}", p, self.delta_n);
        let (first, second) = if prefs.swap_xy { (n, e) } else { (e, n) };
        format!(
            "{}\n{}\nDistance: {:.*}\nBearing: {}",
            first,
            second,
            p,
            self.distance,
            format_dms(self.bearing)
        )
    }
}
