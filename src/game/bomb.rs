//! Bombs - countdowns attached to pieces.
//!
//! A bomb ticks down once per resolved turn. Matching its piece defuses it;
//! letting it reach zero ends the game.

use tracing::debug;

use super::{
    piece::PieceId,
    pool::{Handle, Pool},
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Bomb {
    pub piece: Option<PieceId>,
    /// Turns left before it goes off.
    pub remaining: u32,
}

impl Bomb {
    /// Count down one turn. Returns true once the counter hits zero.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

pub type BombId = Handle<Bomb>;

/// Result of ticking one bomb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BombTick {
    pub piece: PieceId,
    pub remaining: u32,
}

/// Every live bomb, in the order they were placed.
#[derive(Debug)]
pub struct Bombs {
    pool: Pool<Bomb>,
    live: Vec<BombId>,
}

impl Default for Bombs {
    fn default() -> Self {
        Self::new()
    }
}

impl Bombs {
    pub fn new() -> Self {
        Self {
            pool: Pool::new("bomb", Bomb::default, Bomb::reset),
            live: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Remaining turns of the bomb on `piece`, if any.
    pub fn remaining_on(&self, piece: PieceId) -> Option<u32> {
        self.find(piece).map(|id| self.pool.get(id).remaining)
    }

    /// Attach a bomb to `piece`. A piece carries at most one bomb, so an
    /// existing one just gets its counter replaced.
    pub fn attach(&mut self, piece: PieceId, turns: u32) -> BombId {
        if let Some(id) = self.find(piece) {
            self.pool.get_mut(id).remaining = turns;
            return id;
        }

        let id = self.pool.acquire();
        *self.pool.get_mut(id) = Bomb {
            piece: Some(piece),
            remaining: turns,
        };
        self.live.push(id);
        debug!("Bomb attached to piece {:?} ({} turns)", piece, turns);
        id
    }

    /// Remove the bomb on `piece`. Returns true if there was one.
    pub fn defuse(&mut self, piece: PieceId) -> bool {
        let Some(index) = self
            .live
            .iter()
            .position(|&id| self.pool.get(id).piece == Some(piece))
        else {
            return false;
        };

        let id = self.live.remove(index);
        self.pool.release(id);
        debug!("Bomb on piece {:?} defused", piece);
        true
    }

    /// Count every bomb down one turn.
    ///
    /// Returns the new state of each bomb and whether any of them went off.
    pub fn tick_all(&mut self) -> (Vec<BombTick>, bool) {
        let mut exploded = false;
        let ticks = self
            .live
            .iter()
            .filter_map(|&id| {
                let bomb = self.pool.get_mut(id);
                exploded |= bomb.tick();
                bomb.piece.map(|piece| BombTick {
                    piece,
                    remaining: bomb.remaining,
                })
            })
            .collect();
        (ticks, exploded)
    }

    /// Release every bomb.
    pub fn clear(&mut self) {
        for id in self.live.drain(..) {
            self.pool.release(id);
        }
    }

    fn find(&self, piece: PieceId) -> Option<BombId> {
        self.live
            .iter()
            .copied()
            .find(|&id| self.pool.get(id).piece == Some(piece))
    }
}
