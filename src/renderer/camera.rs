//! Player-centered camera
//!
//! No smoothing or bounds: the player is always exactly at the viewport center.

use glam::Vec2;

/// Logical drawing area, re-derived on every resize
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Logical (CSS) pixels
    pub width: f32,
    pub height: f32,
    /// Device pixels per logical pixel
    pub scale: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            scale: if scale > 0.0 { scale } else { 1.0 },
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Backing-store size in device pixels
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width * self.scale).floor() as u32,
            (self.height * self.scale).floor() as u32,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(720.0, 480.0, 1.0)
    }
}

/// Camera for one frame
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// World position shown at the viewport center
    pub focus: Vec2,
    pub viewport: Viewport,
}

impl Camera {
    pub fn follow(focus: Vec2, viewport: Viewport) -> Self {
        Self { focus, viewport }
    }

    /// World pixels to screen pixels, rounded to whole pixels
    ///
    /// Halves round toward +inf (`floor(v + 0.5)`), also for negative values.
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.focus + self.viewport.center() + Vec2::splat(0.5)).floor()
    }

    /// Whether a world-space rect touches the viewport
    pub fn is_visible(&self, min: Vec2, size: Vec2) -> bool {
        let s = self.world_to_screen(min);
        s.x < self.viewport.width && s.y < self.viewport.height && s.x + size.x > 0.0 && s.y + size.y > 0.0
    }
}
