//! Game state management - turns, score and game over.
//!
//! A turn is: select a tuple, rotate it, and if the rotation made a match,
//! resolve it (remove, refill, repeat while new matches appear). Then bombs
//! count down and the grid is checked for a deadlock.
//!
//! Waiting (for animations or the short pause that lets the player see a match)
//! is part of the [`Phase`], so the whole game advances through [`Game::tick`].

use bevy::math::Vec2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use super::{
    animation::AnimationScheduler,
    bomb::Bombs,
    camera::Viewport,
    cluster::{MatchFinder, MatchId},
    deadlock::check_deadlock,
    events::{GameEvent, GameOverReason},
    grid::HexGrid,
    hex::CellCoord,
    highscore::{HighScoreStore, ScoreEntry},
    piece::PieceId,
    refill::fill_blank_slots,
    tuple::Tuple,
};
use crate::{config::GameConfig, error::ConfigError};

/// Where the game is in the current turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Waiting for input.
    Idle,
    /// The selection is turning. `found` is the match the rotation produced.
    Rotating {
        found: Option<MatchId>,
        clockwise: bool,
        steps: u32,
    },
    /// Removing matches and refilling.
    Resolving(ResolveStep),
    GameOver(GameOverReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveStep {
    /// Short pause before `matches` are removed.
    MatchPause {
        timer: f32,
        matches: Vec<MatchId>,
        first_round: bool,
    },
    /// Waiting for the fallen and spawned pieces to land.
    Refilling { first_round: bool },
}

/// The tuple the player is about to rotate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub tuple: Tuple,
    /// Rotation pivot: the average position of the three pieces.
    pub center: Vec2,
    /// True when the lone piece of the tuple is on the right.
    pub right_oriented: bool,
    /// Hidden while a match is being resolved.
    pub visible: bool,
}

/// Score and statistics of the current game.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GameScore {
    pub score: u32,
    pub pieces_removed: u32,
    pub matches: u32,
    /// Rotations that produced a match.
    pub turns: u32,
    /// Score at which the next bomb is placed.
    pub next_bomb_score: u32,
}

impl GameScore {
    fn new(bomb_interval: u32) -> Self {
        Self {
            next_bomb_score: bomb_interval,
            ..Default::default()
        }
    }
}

/// Is a swipe from `press` to `release` around `center` clockwise?
pub fn is_clockwise_swipe(center: Vec2, press: Vec2, release: Vec2) -> bool {
    (press - center).angle_to(release - center) < 0.0
}

/// One running game.
pub struct Game {
    config: GameConfig,
    rng: StdRng,
    grid: HexGrid,
    finder: MatchFinder,
    animations: AnimationScheduler,
    bombs: Bombs,
    viewport: Box<dyn Viewport>,
    high_scores: Box<dyn HighScoreStore>,

    phase: Phase,
    selection: Option<Selection>,
    score: GameScore,
    events: Vec<GameEvent>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.phase)
            .field("selection", &self.selection)
            .field("score", &self.score)
            .field("bombs", &self.bombs.len())
            .finish()
    }
}

impl Game {
    /// Start a game on a freshly generated grid.
    pub fn new(
        config: GameConfig,
        viewport: impl Viewport + 'static,
        high_scores: impl HighScoreStore + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut finder = MatchFinder::new();
        let grid = HexGrid::generate(
            config.width,
            config.height,
            config.color_count,
            &mut rng,
            &mut finder,
        )?;

        Ok(Self::assemble(config, rng, grid, finder, viewport, high_scores))
    }

    /// Start a game on an authored grid. The grid's size and palette override
    /// the ones in `config`.
    pub fn with_grid(
        mut config: GameConfig,
        grid: HexGrid,
        viewport: impl Viewport + 'static,
        high_scores: impl HighScoreStore + 'static,
    ) -> Result<Self, ConfigError> {
        config.width = grid.width();
        config.height = grid.height();
        config.color_count = grid.color_count() as usize;
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self::assemble(
            config,
            rng,
            grid,
            MatchFinder::new(),
            viewport,
            high_scores,
        ))
    }

    fn assemble(
        config: GameConfig,
        rng: StdRng,
        grid: HexGrid,
        finder: MatchFinder,
        viewport: impl Viewport + 'static,
        high_scores: impl HighScoreStore + 'static,
    ) -> Self {
        let mut viewport: Box<dyn Viewport> = Box::new(viewport);
        let (center, extents) = grid.bounds();
        viewport.set_grid_bounds(center, extents);

        info!(
            "Game started: {}x{} grid, {} colors",
            config.width, config.height, config.color_count
        );

        Self {
            animations: AnimationScheduler::new(&config),
            score: GameScore::new(config.bomb_interval),
            config,
            rng,
            grid,
            finder,
            bombs: Bombs::new(),
            viewport,
            high_scores: Box::new(high_scores),
            phase: Phase::Idle,
            selection: None,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver(_))
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn score(&self) -> &GameScore {
        &self.score
    }

    pub fn bombs(&self) -> &Bombs {
        &self.bombs
    }

    pub fn high_score(&self) -> u32 {
        self.high_scores.high_score()
    }

    pub fn viewport(&self) -> &dyn Viewport {
        self.viewport.as_ref()
    }

    /// True while pieces are falling into place.
    pub fn is_animating(&self) -> bool {
        self.animations.is_animating()
    }

    /// Hand every queued event over to the caller.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn locate_tuple_at_point(&self, point: Vec2) -> Option<Tuple> {
        self.grid.locate_tuple_at_point(point)
    }

    // =========================================================================
    // INPUT
    // =========================================================================

    /// Select the tuple closest to a world point. Ignored unless idle.
    pub fn select_tuple_at(&mut self, point: Vec2) -> Option<Tuple> {
        if !self.is_idle() {
            warn!("Selection ignored: game is busy ({:?})", self.phase);
            return None;
        }

        let tuple = self.grid.locate_tuple_at_point(point)?;
        self.select(tuple);
        Some(tuple)
    }

    /// Rotate the current selection. Returns false if nothing happened.
    pub fn rotate_selection(&mut self, clockwise: bool) -> bool {
        let Some(selection) = self.selection.filter(|s| s.visible) else {
            warn!("Rotation ignored: nothing selected");
            return false;
        };
        self.rotate_and_resolve(selection.tuple, clockwise)
    }

    /// Rotate the selection in the direction of a swipe (world coordinates).
    pub fn swipe(&mut self, press: Vec2, release: Vec2) -> bool {
        let Some(selection) = self.selection.filter(|s| s.visible) else {
            warn!("Swipe ignored: nothing selected");
            return false;
        };
        let clockwise = is_clockwise_swipe(selection.center, press, release);
        self.rotate_and_resolve(selection.tuple, clockwise)
    }

    /// Rotate `tuple` until it makes a match, at most twice; without a match it
    /// turns all the way around. The turn then plays out over the next ticks.
    pub fn rotate_and_resolve(&mut self, tuple: Tuple, clockwise: bool) -> bool {
        if !self.is_idle() {
            warn!("Rotation ignored: game is busy ({:?})", self.phase);
            return false;
        }
        if !tuple.is_on_grid(&self.grid) {
            warn!("Rotation ignored: tuple is no longer on the grid");
            return false;
        }
        if self.selection.map(|s| s.tuple) != Some(tuple) {
            self.select(tuple);
        }
        let center = self.selection.map_or_else(|| tuple.center(&self.grid), |s| s.center);

        let mut found = None;
        let mut steps = 0;
        for step in 1..=2 {
            self.rotate_once(&tuple, clockwise);
            steps = step;
            found = self.finder.find_match_at(&self.grid, &tuple);
            if found.is_some() {
                break;
            }
        }
        if found.is_none() {
            // Back where it started: a full turn
            self.rotate_once(&tuple, clockwise);
            steps = 3;
        }

        debug!(
            "Rotating {} step(s) {}, match: {}",
            steps,
            if clockwise { "clockwise" } else { "counter-clockwise" },
            found.is_some()
        );
        self.animations
            .rotate_tuple(self.grid.pieces_mut(), &tuple, center, steps, clockwise);
        self.phase = Phase::Rotating {
            found,
            clockwise,
            steps,
        };
        true
    }

    /// Put a bomb on a piece by hand.
    pub fn attach_bomb(&mut self, piece: PieceId, turns: u32) {
        self.bombs.attach(piece, turns);
        self.events.push(GameEvent::BombSpawned {
            piece,
            remaining: turns,
        });
    }

    /// Throw the current game away and start over on a new grid.
    pub fn restart(&mut self) {
        self.release_pending_matches();
        self.animations.clear(self.grid.pieces_mut());
        self.bombs.clear();
        self.grid.regenerate(&mut self.rng, &mut self.finder);

        self.phase = Phase::Idle;
        self.selection = None;
        self.score = GameScore::new(self.config.bomb_interval);
        self.events.clear();
        info!("Game restarted");
    }

    // =========================================================================
    // TURN
    // =========================================================================

    /// Advance animations and the turn by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        self.animations.tick(dt, self.grid.pieces_mut());

        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        self.phase = match phase {
            Phase::Rotating { found, .. } if !self.animations.is_rotating() => match found {
                None => Phase::Idle,
                Some(found) => {
                    self.score.turns += 1;
                    self.hide_selection();
                    Phase::Resolving(ResolveStep::MatchPause {
                        timer: self.config.match_delay,
                        matches: vec![found],
                        first_round: true,
                    })
                }
            },
            Phase::Resolving(ResolveStep::MatchPause {
                timer,
                matches,
                first_round,
            }) => {
                let timer = timer - dt;
                if timer > 0.0 {
                    Phase::Resolving(ResolveStep::MatchPause {
                        timer,
                        matches,
                        first_round,
                    })
                } else {
                    self.remove_matches(matches, first_round)
                }
            }
            Phase::Resolving(ResolveStep::Refilling { first_round })
                if !self.animations.is_animating() =>
            {
                self.after_refill(first_round)
            }
            other => other,
        };
    }

    /// Tick with a fixed step until the turn is over. Returns false if it is
    /// still running after `max_ticks`.
    pub fn settle(&mut self, dt: f32, max_ticks: usize) -> bool {
        for _ in 0..max_ticks {
            if self.is_idle() || self.is_game_over() {
                return true;
            }
            self.tick(dt);
        }
        self.is_idle() || self.is_game_over()
    }

    fn remove_matches(&mut self, matches: Vec<MatchId>, first_round: bool) -> Phase {
        // Pick the bomb column before the matched pieces are gone
        let bomb_column = matches.first().and_then(|&id| {
            let pieces = self.finder.get(id).pieces();
            if pieces.is_empty() {
                return None;
            }
            let piece = pieces[self.rng.random_range(0..pieces.len())];
            Some(self.grid.piece(piece).cell.column)
        });

        for id in matches {
            self.process_match(id);
        }

        let report = fill_blank_slots(
            &mut self.grid,
            &mut self.animations,
            &mut self.rng,
            self.viewport.top_y(),
        );
        for (piece, from, to) in report.moved {
            self.events.push(GameEvent::PieceMoved { piece, from, to });
        }
        for (piece, cell, position) in report.spawned {
            self.events.push(GameEvent::PieceSpawned {
                piece,
                cell,
                color: self.grid.piece(piece).color,
                position,
            });
        }

        if first_round && self.score.score >= self.score.next_bomb_score {
            self.score.next_bomb_score += self.config.bomb_interval;
            let top = CellCoord::new(bomb_column.unwrap_or(0), self.grid.height() - 1);
            if let Some(piece) = self.grid.piece_at(top) {
                // It ticks once at the end of this turn
                self.attach_bomb(piece, self.config.bomb_counter + 1);
            }
        }

        Phase::Resolving(ResolveStep::Refilling { first_round })
    }

    fn process_match(&mut self, id: MatchId) {
        let pieces = self.finder.get(id).pieces().to_vec();
        self.finder.release(id);

        let points = self.config.score_multiplier * pieces.len() as u32;
        self.score.score += points;
        self.score.pieces_removed += pieces.len() as u32;
        self.score.matches += 1;
        debug!(
            "Match of {} piece(s), +{} points (total: {})",
            pieces.len(),
            points,
            self.score.score
        );
        self.events.push(GameEvent::MatchFound {
            pieces: pieces.clone(),
            points,
        });

        for &piece in pieces.iter().rev() {
            let cell = self.grid.piece(piece).cell;
            self.grid.take_piece_at(cell);
            self.animations
                .blow_piece(self.grid.pieces_mut(), piece, &mut self.rng);
            self.events.push(GameEvent::PieceRemoved { piece, cell });

            if self.bombs.defuse(piece) {
                self.events.push(GameEvent::BombDefused { piece });
            }
        }

        self.events.push(GameEvent::ScoreChanged {
            score: self.score.score,
        });
    }

    fn after_refill(&mut self, first_round: bool) -> Phase {
        let matches = self.finder.find_all_matches(&self.grid);
        if !matches.is_empty() {
            debug!("Cascade: {} new match(es)", matches.len());
            return Phase::Resolving(ResolveStep::MatchPause {
                timer: self.config.match_delay,
                matches,
                first_round: false,
            });
        }
        if !first_round {
            debug!("Cascade settled");
        }

        let (ticks, exploded) = self.bombs.tick_all();
        for tick in ticks {
            self.events.push(GameEvent::BombTicked {
                piece: tick.piece,
                remaining: tick.remaining,
            });
        }
        if exploded {
            return self.game_over(GameOverReason::BombExploded);
        }

        if let Some(center) = self.selection.map(|s| s.center) {
            self.selection = None;
            if let Some(tuple) = self.grid.locate_tuple_at_point(center) {
                self.select(tuple);
            }
        }

        if check_deadlock(&mut self.grid, &mut self.finder) {
            return self.game_over(GameOverReason::Deadlock);
        }
        Phase::Idle
    }

    fn game_over(&mut self, reason: GameOverReason) -> Phase {
        let score = self.score.score;
        let previous = self.high_scores.high_score();
        self.high_scores.record(ScoreEntry::new(
            score,
            self.score.pieces_removed,
            self.score.turns,
        ));
        let high_score = previous.max(score);

        info!(
            "GAME OVER ({:?})! Final score: {}, high score: {}",
            reason, score, high_score
        );
        if score > previous {
            info!("New high score!");
        }

        self.events.push(GameEvent::GameOver {
            score,
            high_score,
            reason,
        });
        Phase::GameOver(reason)
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn rotate_once(&mut self, tuple: &Tuple, clockwise: bool) {
        if clockwise {
            tuple.rotate_clockwise(&mut self.grid, 1);
        } else {
            tuple.rotate_counter_clockwise(&mut self.grid, 1);
        }
    }

    fn select(&mut self, tuple: Tuple) {
        self.hide_selection();
        tuple.set_selected(&mut self.grid, true);
        self.selection = Some(Selection {
            tuple,
            center: tuple.center(&self.grid),
            right_oriented: tuple.is_right_oriented(&self.grid),
            visible: true,
        });
    }

    fn hide_selection(&mut self) {
        if let Some(selection) = &mut self.selection
            && selection.visible
        {
            selection.tuple.set_selected(&mut self.grid, false);
            selection.visible = false;
        }
    }

    /// Matches held by the phase go back to their pool.
    fn release_pending_matches(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Rotating {
                found: Some(id), ..
            } => self.finder.release(id),
            Phase::Resolving(ResolveStep::MatchPause { matches, .. }) => {
                for id in matches {
                    self.finder.release(id);
                }
            }
            _ => {}
        }
    }
}
