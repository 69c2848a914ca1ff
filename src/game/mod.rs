//! The game core for the hexagon match-3.
//!
//! This module contains all the gameplay logic including:
//! - Hexagonal grid system (offset columns) and the tuples formed at its corners
//! - Match detection, refilling and deadlock detection
//! - Animations that play out between turns
//! - Bombs, score and game over

pub mod animation;
pub mod bomb;
pub mod camera;
pub mod cluster;
pub mod deadlock;
pub mod events;
pub mod grid;
pub mod hex;
pub mod highscore;
pub mod piece;
pub mod pool;
pub mod refill;
pub mod state;
pub mod tuple;

pub use camera::{OrthoCamera, Viewport};
pub use cluster::{Match, MatchFinder, MatchId};
pub use events::{GameEvent, GameOverReason};
pub use grid::HexGrid;
pub use hex::{CellCoord, Corner};
pub use highscore::{HighScoreStore, HighScores, ScoreEntry};
pub use piece::{Piece, PieceId};
pub use state::{Game, GameScore, Phase, ResolveStep, Selection, is_clockwise_swipe};
pub use tuple::Tuple;
