//! Pieces - the hexagons that live on the grid.
//!
//! A piece is pooled: its color and cell change over its lifetime, its
//! [`PieceId`] does not while it is on the grid or mid-animation.

use bevy::math::Vec2;

use super::{hex::CellCoord, pool::Handle};

/// Stable identity of a piece (its pool slot).
pub type PieceId = Handle<Piece>;

/// Default draw order of a piece at rest.
pub const DRAW_ORDER_RESTING: i32 = 0;
/// Draw order of the selected tuple so it rotates above its neighbors.
pub const DRAW_ORDER_SELECTED: i32 = 1;
/// Draw order of pieces being blown away.
pub const DRAW_ORDER_BLOWING: i32 = 2;

/// A single hexagon piece.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    /// Color index in `0..color_count`.
    pub color: u8,
    /// Logical cell on the grid. Kept in sync by `HexGrid::set_piece_at`.
    pub cell: CellCoord,
    /// Rendered position, driven by the animation scheduler.
    pub position: Vec2,
    /// Rendered scale (1.0 = piece width).
    pub scale: f32,
    pub draw_order: i32,
}

impl Default for Piece {
    fn default() -> Self {
        Self {
            color: 0,
            cell: CellCoord::default(),
            position: Vec2::ZERO,
            scale: 1.0,
            draw_order: DRAW_ORDER_RESTING,
        }
    }
}

impl Piece {
    /// Pool reset: a recycled piece comes back at rest.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
