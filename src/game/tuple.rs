//! Tuples - three mutually adjacent pieces that rotate as one unit.

use bevy::math::Vec2;

use super::{
    grid::HexGrid,
    hex::CellCoord,
    piece::{DRAW_ORDER_RESTING, DRAW_ORDER_SELECTED, PieceId},
};

/// Three adjacent pieces, stored in clockwise order.
///
/// Rotating a tuple only rewrites which cell each piece occupies. Rendered
/// positions are left alone, so a rotation can be tried, tested for a match and
/// undone without any visible effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tuple {
    pub pieces: [PieceId; 3],
}

impl Tuple {
    pub const fn new(first: PieceId, second: PieceId, third: PieceId) -> Self {
        Self {
            pieces: [first, second, third],
        }
    }

    /// All three pieces share a color.
    pub fn is_matching(&self, grid: &HexGrid) -> bool {
        let [a, b, c] = self.pieces.map(|id| grid.piece(id).color);
        a == b && b == c
    }

    /// Every piece is checked out and still sits in the cell it records.
    ///
    /// False for a tuple kept from an earlier turn once any of its pieces has
    /// been removed or recycled.
    pub fn is_on_grid(&self, grid: &HexGrid) -> bool {
        self.pieces.iter().all(|&id| {
            grid.pieces().is_active(id) && grid.piece_at(grid.piece(id).cell) == Some(id)
        })
    }

    /// Current cells of the three pieces.
    pub fn cells(&self, grid: &HexGrid) -> [CellCoord; 3] {
        self.pieces.map(|id| grid.piece(id).cell)
    }

    /// Rotate clockwise by `count` steps of 120 degrees. Negative counts rotate
    /// counter-clockwise, multiples of 3 do nothing.
    pub fn rotate_clockwise(&self, grid: &mut HexGrid, count: i32) {
        let [p1, p2, p3] = self.pieces;
        let [c1, c2, c3] = self.cells(grid);

        match count.rem_euclid(3) {
            1 => {
                grid.set_piece_at(c2, Some(p1));
                grid.set_piece_at(c3, Some(p2));
                grid.set_piece_at(c1, Some(p3));
            }
            2 => {
                grid.set_piece_at(c3, Some(p1));
                grid.set_piece_at(c2, Some(p3));
                grid.set_piece_at(c1, Some(p2));
            }
            _ => {}
        }
    }

    pub fn rotate_counter_clockwise(&self, grid: &mut HexGrid, count: i32) {
        self.rotate_clockwise(grid, -count);
    }

    /// Average of the three rendered positions.
    pub fn center(&self, grid: &HexGrid) -> Vec2 {
        self.pieces
            .iter()
            .map(|&id| grid.piece(id).position)
            .fold(Vec2::ZERO, |acc, pos| acc + pos)
            / 3.0
    }

    /// A tuple always has two pieces stacked in one column and a lone piece
    /// beside them. Returns true when the lone piece is on the right.
    pub fn is_right_oriented(&self, grid: &HexGrid) -> bool {
        let [c1, c2, c3] = self.cells(grid);
        if c1.column == c2.column {
            c3.column > c1.column
        } else if c2.column == c3.column {
            c1.column > c3.column
        } else {
            c2.column > c1.column
        }
    }

    /// Selected pieces are drawn above the others so they don't fall behind
    /// their neighbors while rotating.
    pub fn set_selected(&self, grid: &mut HexGrid, selected: bool) {
        let order = if selected {
            DRAW_ORDER_SELECTED
        } else {
            DRAW_ORDER_RESTING
        };
        for id in self.pieces {
            grid.piece_mut(id).draw_order = order;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{grid::tests::striped, hex::Corner};

    fn center_tuple(grid: &HexGrid) -> Tuple {
        grid.tuple_at_corner(CellCoord::new(1, 1), Corner::Right).unwrap()
    }

    #[test]
    fn test_rotate_once_moves_pieces_clockwise() {
        let mut grid = striped(3, 3, 5);
        let tuple = center_tuple(&grid);
        let [c1, c2, c3] = tuple.cells(&grid);

        tuple.rotate_clockwise(&mut grid, 1);

        let [p1, p2, p3] = tuple.pieces;
        assert_eq!(grid.piece(p1).cell, c2);
        assert_eq!(grid.piece(p2).cell, c3);
        assert_eq!(grid.piece(p3).cell, c1);
        assert_eq!(grid.piece_at(c2), Some(p1));
    }

    #[test]
    fn test_rotate_three_restores() {
        let mut grid = striped(3, 3, 5);
        let tuple = center_tuple(&grid);
        let before = tuple.cells(&grid);

        tuple.rotate_clockwise(&mut grid, 3);
        assert_eq!(tuple.cells(&grid), before);

        for _ in 0..3 {
            tuple.rotate_clockwise(&mut grid, 1);
        }
        assert_eq!(tuple.cells(&grid), before);
    }

    #[test]
    fn test_counter_clockwise_undoes_clockwise() {
        let mut grid = striped(3, 3, 5);
        let tuple = center_tuple(&grid);
        let before = tuple.cells(&grid);

        tuple.rotate_clockwise(&mut grid, 2);
        assert_ne!(tuple.cells(&grid), before);
        tuple.rotate_counter_clockwise(&mut grid, 2);
        assert_eq!(tuple.cells(&grid), before);

        // -1 is the same as +2
        tuple.rotate_clockwise(&mut grid, -1);
        let after_minus_one = tuple.cells(&grid);
        tuple.rotate_clockwise(&mut grid, 1);
        tuple.rotate_clockwise(&mut grid, 2);
        assert_eq!(tuple.cells(&grid), after_minus_one);
    }

    #[test]
    fn test_rotation_leaves_rendered_positions() {
        let mut grid = striped(3, 3, 5);
        let tuple = center_tuple(&grid);
        let positions = tuple.pieces.map(|id| grid.piece(id).position);

        tuple.rotate_clockwise(&mut grid, 1);
        assert_eq!(tuple.pieces.map(|id| grid.piece(id).position), positions);
    }

    #[test]
    fn test_removed_piece_leaves_tuple_off_grid() {
        let mut grid = striped(3, 3, 5);
        let tuple = center_tuple(&grid);
        assert!(tuple.is_on_grid(&grid));

        let [first, ..] = tuple.pieces;
        let cell = grid.piece(first).cell;
        grid.take_piece_at(cell);
        assert!(!tuple.is_on_grid(&grid));

        grid.pieces_mut().release(first);
        assert!(!tuple.is_on_grid(&grid));
    }

    #[test]
    fn test_orientation() {
        let grid = striped(3, 3, 5);
        // Pivot alone on the left, the pair in column 2
        let pair_right = grid.tuple_at_corner(CellCoord::new(1, 1), Corner::Right).unwrap();
        // Pivot alone on the right, the pair in column 0
        let pair_left = grid.tuple_at_corner(CellCoord::new(1, 1), Corner::Left).unwrap();
        assert!(!pair_right.is_right_oriented(&grid));
        assert!(pair_left.is_right_oriented(&grid));
    }
}
