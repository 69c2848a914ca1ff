//! Hexagon match-3 engine.
//!
//! Rotate three adjacent hexagons to line up colors. The game core in [`game`]
//! is plain Rust driven by [`game::Game::tick`]; [`plugin`] hosts it in a Bevy app.

pub mod config;
pub mod error;
pub mod game;
pub mod plugin;

pub use config::GameConfig;
pub use error::ConfigError;
pub use game::Game;
