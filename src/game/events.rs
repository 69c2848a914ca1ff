//! Events emitted by the game for the presentation layer.

use bevy::math::Vec2;

use super::{hex::CellCoord, piece::PieceId};

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOverReason {
    /// No rotation anywhere can produce a match.
    Deadlock,
    /// A bomb counter reached zero.
    BombExploded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A match is about to be removed. `points` were added to the score.
    MatchFound { pieces: Vec<PieceId>, points: u32 },
    /// A matched piece left the grid and is being blown away.
    PieceRemoved { piece: PieceId, cell: CellCoord },
    /// A survivor fell down to fill a gap.
    PieceMoved {
        piece: PieceId,
        from: CellCoord,
        to: CellCoord,
    },
    /// A new piece drops in from `position`.
    PieceSpawned {
        piece: PieceId,
        cell: CellCoord,
        color: u8,
        position: Vec2,
    },
    BombSpawned { piece: PieceId, remaining: u32 },
    BombTicked { piece: PieceId, remaining: u32 },
    BombDefused { piece: PieceId },
    ScoreChanged { score: u32 },
    GameOver {
        score: u32,
        high_score: u32,
        reason: GameOverReason,
    },
}
