//! Viewport onto the scene.
//!
//! Pointer positions and hit slop arrive in screen pixels. The camera maps
//! them into scene units and supplies the zoom that binding thresholds use.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{MAX_ZOOM, MIN_ZOOM};
use crate::geometry::Point;

/// Pan in screen pixels and a zoom factor (1.0 shows the scene at scale).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    #[must_use]
    pub fn with_zoom(zoom: f64) -> Self {
        Self { zoom, ..Self::default() }
    }

    fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        (screen - self.pan()) * self.zoom.recip()
    }

    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        world * self.zoom + self.pan()
    }

    /// Scene length covered by `screen_dist` pixels.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Zoom used by binding thresholds. Zooming in never shrinks them.
    #[must_use]
    pub fn binding_zoom(&self) -> f64 {
        if self.zoom > 0.0 && self.zoom < 1.0 { self.zoom } else { 1.0 }
    }

    /// Change the zoom, clamped to `MIN_ZOOM..=MAX_ZOOM`, keeping the scene
    /// point under the screen point `anchor` in place.
    pub fn zoom_at(&mut self, anchor: Point, zoom: f64) {
        let fixed = self.screen_to_world(anchor);
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let pan = anchor - fixed * self.zoom;
        self.pan_x = pan.x;
        self.pan_y = pan.y;
    }
}
