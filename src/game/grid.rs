//! The hexagonal grid that holds all pieces.
//!
//! Uses a dense column-major array: every cell exists for the whole level and is
//! `None` only while a match is being removed and refilled. The grid also owns
//! the piece pool, so every write can keep the piece's own cell in sync.

use bevy::math::Vec2;
use rand::Rng;
use tracing::{debug, info, warn};

use super::{
    cluster::MatchFinder,
    deadlock::check_deadlock,
    hex::{self, CellCoord, Corner},
    piece::{Piece, PieceId},
    pool::Pool,
    tuple::Tuple,
};
use crate::{config::validate_dimensions, error::ConfigError};

/// Rejection-sampling budget for a non-matching color before falling back.
const MAX_COLOR_ATTEMPTS: u32 = 32;

/// Fresh fills tried before a deadlocked grid is accepted.
const MAX_GENERATE_ATTEMPTS: u32 = 1000;

/// The main grid holding all pieces.
#[derive(Debug)]
pub struct HexGrid {
    width: usize,
    height: usize,
    color_count: u8,
    /// `columns[column][row]`, row 0 at the bottom.
    columns: Vec<Vec<Option<PieceId>>>,
    pieces: Pool<Piece>,
}

impl HexGrid {
    /// Create an empty grid (every cell blank).
    fn empty(width: usize, height: usize, color_count: u8) -> Self {
        let mut pieces = Pool::new("piece", Piece::default, Piece::reset);
        pieces.populate(width * height);
        Self {
            width,
            height,
            color_count,
            columns: vec![vec![None; height]; width],
            pieces,
        }
    }

    /// Create a randomly filled grid.
    ///
    /// The fill never contains a ready-made match, and it is regenerated until at
    /// least one rotation somewhere on the grid produces a match. Grids too small
    /// to ever allow one are kept after a bounded number of attempts.
    pub fn generate<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        color_count: usize,
        rng: &mut R,
        finder: &mut MatchFinder,
    ) -> Result<Self, ConfigError> {
        validate_dimensions(width, height, color_count)?;

        let mut grid = Self::empty(width, height, color_count as u8);
        grid.regenerate(rng, finder);
        Ok(grid)
    }

    /// Return every piece to the pool and fill the grid from scratch.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R, finder: &mut MatchFinder) {
        self.release_all();

        let mut attempts = 1u32;
        loop {
            self.fill_non_matching(rng);
            if !check_deadlock(self, finder) {
                break;
            }
            if attempts == MAX_GENERATE_ATTEMPTS {
                warn!(
                    "No playable {}x{} grid after {} attempts, keeping a deadlocked one",
                    self.width, self.height, attempts
                );
                break;
            }
            debug!("Generated grid is deadlocked, starting over");
            self.release_all();
            attempts += 1;
        }

        info!(
            "Grid created: {}x{} with {} colors ({} attempt(s))",
            self.width, self.height, self.color_count, attempts
        );
    }

    /// Create a grid from explicit colors, `columns[column][row]`.
    ///
    /// Used for authored layouts. No match/deadlock filtering is applied.
    pub fn from_colors(columns: &[Vec<u8>], color_count: usize) -> Result<Self, ConfigError> {
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        validate_dimensions(width, height, color_count)?;

        for (column, rows) in columns.iter().enumerate() {
            if rows.len() != height {
                return Err(ConfigError::RaggedColumns {
                    column,
                    len: rows.len(),
                    expected: height,
                });
            }
            for (row, &color) in rows.iter().enumerate() {
                if color as usize >= color_count {
                    return Err(ConfigError::ColorOutOfRange {
                        column,
                        row,
                        color,
                        color_count: color_count as u8,
                    });
                }
            }
        }

        let mut grid = Self::empty(width, height, color_count as u8);
        for (column, rows) in columns.iter().enumerate() {
            for (row, &color) in rows.iter().enumerate() {
                let cell = CellCoord::new(column, row);
                let id = grid.acquire_piece(color);
                grid.set_piece_at(cell, Some(id));
                grid.pieces.get_mut(id).position = cell.to_world();
            }
        }
        Ok(grid)
    }

    /// Fill every cell column by column, bottom row first.
    fn fill_non_matching<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for column in 0..self.width {
            for row in 0..self.height {
                let cell = CellCoord::new(column, row);
                let color = self.random_color(cell, true, rng);
                let id = self.acquire_piece(color);
                self.set_piece_at(cell, Some(id));
                self.pieces.get_mut(id).position = cell.to_world();
            }
        }
    }

    /// Pick a random color for a piece at `cell`.
    ///
    /// With `ensure_non_matching`, colors that would complete a tuple with
    /// already placed neighbors are rejected. The resampling is bounded; after
    /// that the first safe color wins, or any color other than the last pick.
    pub fn random_color<R: Rng + ?Sized>(
        &self,
        cell: CellCoord,
        ensure_non_matching: bool,
        rng: &mut R,
    ) -> u8 {
        let count = self.color_count;
        let mut color = rng.random_range(0..count);
        if !ensure_non_matching {
            return color;
        }

        let mut attempts = 0;
        while self.created_piece_check_match(cell, color) {
            attempts += 1;
            if attempts >= MAX_COLOR_ATTEMPTS {
                return (0..count)
                    .find(|&c| !self.created_piece_check_match(cell, c))
                    .unwrap_or((color + 1) % count);
            }

            // Uniform over every color except the rejected one
            let mut next = rng.random_range(0..count - 1);
            if next >= color {
                next += 1;
            }
            color = next;
        }
        color
    }

    /// Would giving `color` to the piece at `cell` complete a match?
    ///
    /// Only neighbors placed before `cell` in fill order are inspected: the
    /// previous column, and lower rows of the same column.
    fn created_piece_check_match(&self, cell: CellCoord, color: u8) -> bool {
        let CellCoord { column: x, row: y } = cell;
        if x == 0 {
            return false;
        }

        let is =
            |column: usize, row: usize| self.color_at(CellCoord::new(column, row)) == Some(color);

        if x % 2 == 0 {
            y > 0 && ((is(x, y - 1) && is(x - 1, y - 1)) || (is(x - 1, y - 1) && is(x - 1, y)))
        } else {
            (y > 0 && is(x, y - 1) && is(x - 1, y))
                || (y + 1 < self.height && is(x - 1, y) && is(x - 1, y + 1))
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn color_count(&self) -> u8 {
        self.color_count
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column < self.width && cell.row < self.height
    }

    /// Bounds-checked accessor. `None` for blank or off-grid cells.
    pub fn piece_at(&self, cell: CellCoord) -> Option<PieceId> {
        self.columns
            .get(cell.column)
            .and_then(|rows| rows.get(cell.row))
            .copied()
            .flatten()
    }

    /// Same as [`Self::piece_at`] for coordinates that may be negative.
    fn piece_at_signed(&self, column: isize, row: isize) -> Option<PieceId> {
        if column < 0 || row < 0 {
            return None;
        }
        self.piece_at(CellCoord::new(column as usize, row as usize))
    }

    /// Write a cell. A written piece has its own cell updated to match.
    pub fn set_piece_at(&mut self, cell: CellCoord, piece: Option<PieceId>) {
        debug_assert!(self.contains(cell), "cell {} is off the grid", cell);
        self.columns[cell.column][cell.row] = piece;
        if let Some(id) = piece {
            self.pieces.get_mut(id).cell = cell;
        }
    }

    /// Blank a cell and return what was there.
    pub fn take_piece_at(&mut self, cell: CellCoord) -> Option<PieceId> {
        self.columns
            .get_mut(cell.column)
            .and_then(|rows| rows.get_mut(cell.row))
            .and_then(Option::take)
    }

    pub fn color_at(&self, cell: CellCoord) -> Option<u8> {
        self.piece_at(cell).map(|id| self.pieces.get(id).color)
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        self.pieces.get(id)
    }

    pub fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        self.pieces.get_mut(id)
    }

    pub fn pieces(&self) -> &Pool<Piece> {
        &self.pieces
    }

    pub fn pieces_mut(&mut self) -> &mut Pool<Piece> {
        &mut self.pieces
    }

    /// Take a fresh piece out of the pool (not placed on the grid yet).
    pub fn acquire_piece(&mut self, color: u8) -> PieceId {
        let id = self.pieces.acquire();
        self.pieces.get_mut(id).color = color;
        id
    }

    /// Blank every cell and return all pieces to the pool.
    pub fn release_all(&mut self) {
        for column in &mut self.columns {
            for slot in column.iter_mut() {
                if let Some(id) = slot.take() {
                    self.pieces.release(id);
                }
            }
        }
    }

    /// Number of pieces currently out of the pool (on the grid or animating).
    pub fn live_piece_count(&self) -> usize {
        self.pieces.active_count()
    }

    /// Every cell, column by column, bottom row first.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.width)
            .flat_map(move |column| (0..self.height).map(move |row| CellCoord::new(column, row)))
    }

    /// True when no cell is blank.
    pub fn is_full(&self) -> bool {
        self.columns.iter().flatten().all(Option::is_some)
    }

    /// Center of the grid's world rectangle and its half size.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let size = self.world_size();
        (size * 0.5, size * 0.5)
    }

    pub fn world_size(&self) -> Vec2 {
        hex::grid_world_size(self.width, self.height)
    }

    /// Map a corner to one that has two neighbors on the grid.
    ///
    /// Pieces on the edges lose the corners facing outward; the corner is
    /// mirrored (left/right edges) or moved up/down (bottom/top rows). On the
    /// bottom row even columns also lose their side corners, on the top row odd
    /// columns do.
    pub fn pickable_corner(&self, cell: CellCoord, corner: Corner) -> Corner {
        let mut corner = corner;

        if cell.column == 0 {
            corner = match corner {
                Corner::BottomLeft => Corner::BottomRight,
                Corner::Left => Corner::Right,
                Corner::TopLeft => Corner::TopRight,
                other => other,
            };
        } else if cell.column == self.width - 1 {
            corner = match corner {
                Corner::BottomRight => Corner::BottomLeft,
                Corner::Right => Corner::Left,
                Corner::TopRight => Corner::TopLeft,
                other => other,
            };
        }

        if cell.row == 0 {
            corner = match corner {
                Corner::BottomLeft => Corner::Left,
                Corner::BottomRight => Corner::Right,
                other => other,
            };
            if cell.is_even_column() {
                corner = match corner {
                    Corner::Left => Corner::TopLeft,
                    Corner::Right => Corner::TopRight,
                    other => other,
                };
            }
        } else if cell.row == self.height - 1 {
            corner = match corner {
                Corner::TopLeft => Corner::Left,
                Corner::TopRight => Corner::Right,
                other => other,
            };
            if !cell.is_even_column() {
                corner = match corner {
                    Corner::Left => Corner::BottomLeft,
                    Corner::Right => Corner::BottomRight,
                    other => other,
                };
            }
        }

        corner
    }

    /// The tuple formed at `corner` of the piece at `cell`, pieces in clockwise order.
    ///
    /// `None` if the corner faces the edge of the grid or a cell is blank.
    pub fn tuple_at_corner(&self, cell: CellCoord, corner: Corner) -> Option<Tuple> {
        if self.pickable_corner(cell, corner) != corner {
            return None;
        }

        let x = cell.column as isize;
        let y = cell.row as isize;
        // Odd columns are half a cell higher, so their side neighbors start one row up
        let y2 = if cell.is_even_column() { y } else { y + 1 };

        let [(ax, ay), (bx, by)] = match corner {
            Corner::BottomLeft => [(x, y - 1), (x - 1, y2 - 1)],
            Corner::BottomRight => [(x + 1, y2 - 1), (x, y - 1)],
            Corner::Left => [(x - 1, y2 - 1), (x - 1, y2)],
            Corner::Right => [(x + 1, y2), (x + 1, y2 - 1)],
            Corner::TopLeft => [(x - 1, y2), (x, y + 1)],
            Corner::TopRight => [(x, y + 1), (x + 1, y2)],
        };

        Some(Tuple::new(
            self.piece_at(cell)?,
            self.piece_at_signed(ax, ay)?,
            self.piece_at_signed(bx, by)?,
        ))
    }

    /// Locate the tuple closest to a world point, if the point is on the grid.
    pub fn locate_tuple_at_point(&self, point: Vec2) -> Option<Tuple> {
        let size = self.world_size();
        if point.x <= 0.0 || point.x >= size.x || point.y <= 0.0 || point.y >= size.y {
            return None;
        }

        let cell = hex::cell_from_world(point, self.width, self.height);
        let local = point - cell.to_world();
        let corner = self.pickable_corner(cell, Corner::closest_to(local));
        self.tuple_at_corner(cell, corner)
    }
}
