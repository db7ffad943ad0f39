//! Screen/world transform with cursor-anchored zoom.

use crate::geometry::{Bounds, Point};

/// Maps screen pixels (y down, origin top-left) to world units (y up).
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
    /// World translation applied before scaling.
    pub offset: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            zoom: 1.0,
            offset: Point::new(0.0, 0.0),
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        let wx = (p.x - self.width / 2.0) / self.zoom - self.offset.x;
        let wy = -((p.y - self.height / 2.0) / self.zoom) - self.offset.y;
        Point::new(wx, wy)
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(
            (p.x + self.offset.x) * self.zoom + self.width / 2.0,
            self.height / 2.0 - (p.y + self.offset.y) * self.zoom,
        )
    }

    /// World radius covered by `pixels` at the current zoom.
    pub fn world_tolerance(&self, pixels: f64) -> f64 {
        pixels / self.zoom
    }

    /// Pans by a screen-space drag delta.
    pub fn pan_pixels(&mut self, dx: f64, dy: f64) {
        self.offset.x += dx / self.zoom;
        self.offset.y -= dy / self.zoom;
    }

    /// Sets the zoom, clamped, keeping the world point under `anchor` fixed.
    /// Returns `true` if the zoom changed.
    pub fn zoom_at(&mut self, new_zoom: f64, anchor: Point, min: f64, max: f64) -> bool {
        let clamped = new_zoom.clamp(min, max);
        if (clamped - self.zoom).abs() < f64::EPSILON * self.zoom {
            return false;
        }
        let before = self.screen_to_world(anchor);
        self.zoom = clamped;
        let after = self.screen_to_world(anchor);
        self.offset.x += after.x - before.x;
        self.offset.y += after.y - before.y;
        true
    }

    /// Centres `bounds` with a small margin.
    pub fn fit(&mut self, bounds: &Bounds, min: f64, max: f64) {
        let w = bounds.width().max(1e-9);
        let h = bounds.height().max(1e-9);
        let zoom = (self.width / w).min(self.height / h) * 0.9;
        self.zoom = zoom.clamp(min, max);
        let c = bounds.center();
        self.offset = Point::new(-c.x, -c.y);
    }
}
