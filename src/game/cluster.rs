//! Match detection - finding connected groups of same-colored pieces.
//!
//! Uses flood fill through matching tuples: two pieces belong to the same match
//! when they are linked by a chain of tuples whose three pieces share a color.
//! A piece that is only adjacent to same-colored pieces (without completing a
//! tuple) does not match.

use std::collections::{HashSet, VecDeque};

use super::{
    grid::HexGrid,
    hex::{CellCoord, Corner},
    piece::PieceId,
    pool::{Handle, Pool},
    tuple::Tuple,
};

/// A group of same-colored, tuple-connected pieces.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Match {
    pieces: Vec<PieceId>,
}

impl Match {
    pub fn pieces(&self) -> &[PieceId] {
        &self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn contains(&self, piece: PieceId) -> bool {
        self.pieces.contains(&piece)
    }

    fn clear(&mut self) {
        self.pieces.clear();
    }
}

pub type MatchId = Handle<Match>;

/// Finds matches on a grid. Owns the match pool and the visited set of the
/// current matching pass.
#[derive(Debug)]
pub struct MatchFinder {
    matches: Pool<Match>,
    visited: HashSet<PieceId>,
    queue: VecDeque<PieceId>,
}

impl Default for MatchFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchFinder {
    pub fn new() -> Self {
        Self {
            matches: Pool::new("match", Match::default, Match::clear),
            visited: HashSet::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn get(&self, id: MatchId) -> &Match {
        self.matches.get(id)
    }

    /// Return a match to the pool once it has been processed.
    pub fn release(&mut self, id: MatchId) {
        self.matches.release(id);
    }

    /// Number of matches handed out and not yet released.
    pub fn outstanding(&self) -> usize {
        self.matches.active_count()
    }

    /// Find the match that includes at least one piece of this tuple.
    pub fn find_match_at(&mut self, grid: &HexGrid, tuple: &Tuple) -> Option<MatchId> {
        self.visited.clear();
        tuple
            .pieces
            .iter()
            .find_map(|&piece| self.find_match_containing(grid, piece))
    }

    /// Find every match on the grid.
    ///
    /// Odd columns are skipped: every tuple has pieces in an even column, so any
    /// match is reached from one.
    pub fn find_all_matches(&mut self, grid: &HexGrid) -> Vec<MatchId> {
        self.visited.clear();
        let mut found = Vec::new();
        for column in (0..grid.width()).step_by(2) {
            for row in 0..grid.height() {
                let Some(piece) = grid.piece_at(CellCoord::new(column, row)) else {
                    continue;
                };
                if let Some(id) = self.find_match_containing(grid, piece) {
                    found.push(id);
                }
            }
        }
        found
    }

    /// Find the match that this piece is part of.
    ///
    /// Returns `None` if the piece was already searched during this pass, or if
    /// it is not part of any matching tuple.
    pub fn find_match_containing(&mut self, grid: &HexGrid, piece: PieceId) -> Option<MatchId> {
        if !self.visited.insert(piece) {
            return None;
        }

        let id = self.matches.acquire();
        self.queue.clear();
        self.queue.push_back(piece);

        while let Some(current) = self.queue.pop_front() {
            let cell = grid.piece(current).cell;
            let mut added = false;

            for corner in Corner::ALL {
                let Some(tuple) = grid.tuple_at_corner(cell, corner) else {
                    continue;
                };
                if !tuple.is_matching(grid) {
                    continue;
                }

                if !added {
                    self.matches.get_mut(id).pieces.push(current);
                    added = true;
                }

                // Explore tuple members we haven't seen yet
                for member in tuple.pieces {
                    if self.visited.insert(member) {
                        self.queue.push_back(member);
                    }
                }
            }
        }

        if self.matches.get(id).is_empty() {
            self.matches.release(id);
            return None;
        }
        Some(id)
    }
}
