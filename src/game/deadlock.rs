//! Deadlock detection - is there any move left that produces a match?

use tracing::debug;

use super::{
    cluster::MatchFinder,
    grid::HexGrid,
    hex::{CellCoord, Corner},
};

/// Returns true if no single tuple rotation anywhere on the grid results in a match.
///
/// Every tuple is rotated once and twice and tested, then put back the way it
/// was. Odd columns are skipped: every tuple is also a corner of an even column piece.
pub fn check_deadlock(grid: &mut HexGrid, finder: &mut MatchFinder) -> bool {
    for column in (0..grid.width()).step_by(2) {
        for row in 0..grid.height() {
            let cell = CellCoord::new(column, row);
            for corner in Corner::ALL {
                let Some(tuple) = grid.tuple_at_corner(cell, corner) else {
                    continue;
                };

                for turn in 0..2 {
                    tuple.rotate_clockwise(grid, 1);
                    if let Some(found) = finder.find_match_at(grid, &tuple) {
                        finder.release(found);
                        // Complete the full turn to restore the tuple
                        tuple.rotate_clockwise(grid, 2 - turn);
                        debug!("Possible move at {} {:?}", cell, corner);
                        return false;
                    }
                }

                // Third rotation brings the tuple back to where it started
                tuple.rotate_clockwise(grid, 1);
            }
        }
    }

    true
}
