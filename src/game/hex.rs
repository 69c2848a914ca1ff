//! Hexagonal coordinate system using offset columns ("brick" layout).
//!
//! Flat-top hexagons are stacked in columns. Row 0 is at the bottom and rows grow
//! upward. Odd columns are shifted up by half a hex height, so the bottom-left
//! corner of the grid sits at (0, 0) in world units.
//!
//! All sizes are derived from the piece width (1 world unit).

use bevy::math::Vec2;

/// The width of a piece, from its left vertex to its right vertex.
pub const PIECE_WIDTH: f32 = 1.0;

/// The height of a piece: sqrt(3)/2 of its width.
pub const PIECE_HEIGHT: f32 = PIECE_WIDTH * 0.866_025_4;

/// Horizontal distance between the centers of adjacent columns.
pub const PIECE_DELTA_X: f32 = PIECE_WIDTH * 0.75;

/// Vertical distance between the centers of adjacent rows.
pub const PIECE_DELTA_Y: f32 = PIECE_HEIGHT;

/// How much two adjacent columns overlap horizontally.
pub const PIECES_INTERSECTION_WIDTH: f32 = PIECE_WIDTH * 0.25;

/// A cell on the grid.
///
/// - `column` increases to the right
/// - `row` increases upward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellCoord {
    pub column: usize,
    pub row: usize,
}

impl CellCoord {
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    /// Even columns sit half a cell lower than odd columns.
    #[inline]
    pub const fn is_even_column(&self) -> bool {
        self.column % 2 == 0
    }

    /// World position of this cell's center.
    pub fn to_world(&self) -> Vec2 {
        column_bottom(self.column) + Vec2::new(0.0, self.row as f32 * PIECE_DELTA_Y)
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// World position of the center of row 0 in `column`.
///
/// Offset by half a piece so the bottom-left point of the grid resides at (0, 0).
pub fn column_bottom(column: usize) -> Vec2 {
    let y = if column % 2 == 0 {
        PIECE_HEIGHT * 0.5
    } else {
        PIECE_HEIGHT
    };
    Vec2::new(PIECE_WIDTH * 0.5 + column as f32 * PIECE_DELTA_X, y)
}

/// Total size of a `width` x `height` grid in world units.
pub fn grid_world_size(width: usize, height: usize) -> Vec2 {
    Vec2::new(
        width as f32 * PIECE_WIDTH - (width.saturating_sub(1)) as f32 * PIECES_INTERSECTION_WIDTH,
        height as f32 * PIECE_HEIGHT + PIECE_HEIGHT * 0.5,
    )
}

/// Convert a world position to the cell it falls in, clamped to the grid.
///
/// The column is rounded to the nearest center; the row is then found inside
/// that column, accounting for the column's vertical offset.
pub fn cell_from_world(point: Vec2, width: usize, height: usize) -> CellCoord {
    let column = ((point.x - PIECE_WIDTH * 0.5) / PIECE_DELTA_X).round();
    let column = (column.max(0.0) as usize).min(width - 1);

    let y = if column % 2 == 0 {
        point.y
    } else {
        point.y - PIECE_HEIGHT * 0.5
    };
    // Truncation, not flooring: matches the cell spans of row 0
    let row = (y / PIECE_HEIGHT) as i64;
    let row = (row.max(0) as usize).min(height - 1);

    CellCoord { column, row }
}

/// One of the 6 vertices of a piece. Each vertex is shared with (at most) two
/// neighboring pieces, and those three pieces form a tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    BottomLeft,
    Left,
    TopLeft,
    TopRight,
    Right,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 6] = [
        Corner::BottomLeft,
        Corner::Left,
        Corner::TopLeft,
        Corner::TopRight,
        Corner::Right,
        Corner::BottomRight,
    ];

    /// Find the corner closest to a point given relative to the piece center.
    ///
    /// Only the three vertices on the point's side are candidates.
    pub fn closest_to(local: Vec2) -> Self {
        let left_side = local.x < 0.0;
        let side = if left_side { -1.0 } else { 1.0 };

        let bottom = Vec2::new(PIECE_WIDTH * 0.25 * side, PIECE_HEIGHT * -0.5);
        let middle = Vec2::new(PIECE_WIDTH * 0.5 * side, 0.0);
        let top = Vec2::new(PIECE_WIDTH * 0.25 * side, PIECE_HEIGHT * 0.5);

        let d_bottom = bottom.distance_squared(local);
        let d_middle = middle.distance_squared(local);
        let d_top = top.distance_squared(local);

        let (bottom_corner, middle_corner, top_corner) = if left_side {
            (Corner::BottomLeft, Corner::Left, Corner::TopLeft)
        } else {
            (Corner::BottomRight, Corner::Right, Corner::TopRight)
        };

        if d_bottom < d_middle {
            if d_bottom < d_top {
                bottom_corner
            } else {
                top_corner
            }
        } else if d_middle < d_top {
            middle_corner
        } else {
            top_corner
        }
    }
}
