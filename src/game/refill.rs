//! Refilling the grid after a match was removed.
//!
//! Survivors fall down to close the gaps, then new pieces drop in from above the
//! visible area. Cells are updated immediately; the fall itself is left to the
//! animation scheduler.

use bevy::math::Vec2;
use rand::Rng;
use tracing::debug;

use super::{
    animation::AnimationScheduler,
    grid::HexGrid,
    hex::{self, CellCoord, PIECE_DELTA_Y, PIECE_HEIGHT},
    piece::PieceId,
};

/// What a refill did, for the presentation layer.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RefillReport {
    /// Survivors pulled down: piece, old cell, new cell.
    pub moved: Vec<(PieceId, CellCoord, CellCoord)>,
    /// New pieces: piece, cell, position it drops in from.
    pub spawned: Vec<(PieceId, CellCoord, Vec2)>,
}

/// Fill every blank cell. `top_y` is the world Y just above the visible area.
pub fn fill_blank_slots<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    animations: &mut AnimationScheduler,
    rng: &mut R,
    top_y: f32,
) -> RefillReport {
    let mut report = RefillReport::default();
    let height = grid.height();

    for column in 0..grid.width() {
        let cell = |row| CellCoord::new(column, row);

        let blanks = (0..height).filter(|&row| grid.piece_at(cell(row)).is_none()).count();
        let Some(first_blank) = (0..height).find(|&row| grid.piece_at(cell(row)).is_none()) else {
            continue;
        };

        // Pull survivors down, keeping their order
        for row in first_blank..height - blanks {
            let target = cell(row);
            if grid.piece_at(target).is_some() {
                continue;
            }
            let Some(source) = (row + 1..height).map(cell).find(|&c| grid.piece_at(c).is_some())
            else {
                break;
            };
            let Some(piece) = grid.take_piece_at(source) else {
                continue;
            };

            grid.set_piece_at(target, Some(piece));
            animations.move_piece(grid.pieces(), piece, target.to_world());
            report.moved.push((piece, source, target));
        }

        // Drop new pieces in from above, one row apart
        let mut spawn_y = top_y + if column % 2 == 0 { PIECE_HEIGHT * 0.5 } else { 0.0 };
        for row in height - blanks..height {
            let target = cell(row);
            let color = grid.random_color(target, false, rng);
            let piece = grid.acquire_piece(color);
            let start = Vec2::new(hex::column_bottom(column).x, spawn_y);

            grid.set_piece_at(target, Some(piece));
            grid.piece_mut(piece).position = start;
            animations.move_piece(grid.pieces(), piece, target.to_world());
            report.spawned.push((piece, target, start));

            spawn_y += PIECE_DELTA_Y;
        }
    }

    debug!(
        "Refill: {} piece(s) moved, {} spawned",
        report.moved.len(),
        report.spawned.len()
    );
    report
}
