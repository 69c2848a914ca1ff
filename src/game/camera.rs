//! Fitting an orthographic camera around the grid.
//!
//! The game only needs two things from whoever renders it: to be told where
//! the grid is, and to know where "just above the screen" is so new pieces can
//! drop in from out of view.

use bevy::math::Vec2;
use tracing::debug;

/// Extra space around the grid, as a fraction of its size.
pub const VIEW_PADDING: f32 = 0.05;

/// Viewport Y (0 = bottom, 1 = top) new pieces are spawned at.
const SPAWN_VIEWPORT_Y: f32 = 1.1;

/// The presentation side of the game's view.
pub trait Viewport: Send + Sync {
    /// Called once the grid exists, with its center and half size in world units.
    fn set_grid_bounds(&mut self, center: Vec2, extents: Vec2);

    /// World Y slightly above the visible area.
    fn top_y(&self) -> f32;
}

/// A 2D orthographic camera that keeps the whole grid visible.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthoCamera {
    /// Screen size in pixels.
    screen: Vec2,
    grid_center: Vec2,
    grid_extents: Vec2,
    /// Camera center in world units.
    pub position: Vec2,
    /// Half the visible height in world units.
    pub orthographic_size: f32,
}

impl OrthoCamera {
    pub fn new(screen_width: f32, screen_height: f32) -> Self {
        Self {
            screen: Vec2::new(screen_width, screen_height),
            grid_center: Vec2::ZERO,
            grid_extents: Vec2::ONE,
            position: Vec2::ZERO,
            orthographic_size: 1.0,
        }
    }

    /// The window was resized or rotated.
    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        self.screen = Vec2::new(width, height);
        self.fit();
    }

    pub fn screen_aspect(&self) -> f32 {
        if self.screen.y > 0.0 {
            self.screen.x / self.screen.y
        } else {
            1.0
        }
    }

    /// Convert a pixel position (origin top-left, Y down) to world units.
    pub fn screen_to_world(&self, pixel: Vec2) -> Vec2 {
        let screen = self.screen.max(Vec2::ONE);
        let ndc = Vec2::new(pixel.x / screen.x * 2.0 - 1.0, 1.0 - pixel.y / screen.y * 2.0);
        let half = Vec2::new(self.orthographic_size * self.screen_aspect(), self.orthographic_size);
        self.position + ndc * half
    }

    /// Center on the grid and pick the smallest size that shows all of it.
    fn fit(&mut self) {
        let extents = self.grid_extents * (1.0 + VIEW_PADDING);
        let level_aspect = extents.x / extents.y;
        let screen_aspect = self.screen_aspect();

        self.position = self.grid_center;
        self.orthographic_size = if screen_aspect >= level_aspect {
            // Wider than the level: height is the limit
            extents.y
        } else {
            extents.x / screen_aspect
        };
        debug!(
            "Camera fit: center {:?}, size {:.3}, aspect {:.3}",
            self.position, self.orthographic_size, screen_aspect
        );
    }
}

impl Viewport for OrthoCamera {
    fn set_grid_bounds(&mut self, center: Vec2, extents: Vec2) {
        self.grid_center = center;
        self.grid_extents = extents;
        self.fit();
    }

    fn top_y(&self) -> f32 {
        self.position.y + self.orthographic_size * (SPAWN_VIEWPORT_Y * 2.0 - 1.0)
    }
}
