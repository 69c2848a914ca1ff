//! Whole turns played through the public API.

use bevy::math::Vec2;
use hexmatch::{
    ConfigError, GameConfig,
    game::{
        CellCoord, Corner, Game, GameEvent, GameOverReason, HexGrid, HighScoreStore, HighScores,
        OrthoCamera, Phase,
    },
};

const DT: f32 = 1.0 / 60.0;

/// Columns colored 0, 1, 0. Turning the tuple right of (1, 1) clockwise once
/// drops a 0 into (1, 1) and completes the tuple on its left.
fn striped_grid(color_count: usize) -> HexGrid {
    let columns = vec![vec![0; 3], vec![1; 3], vec![0; 3]];
    HexGrid::from_colors(&columns, color_count).unwrap()
}

fn game_on(grid: HexGrid, config: GameConfig) -> Game {
    Game::with_grid(
        config,
        grid,
        OrthoCamera::new(720.0, 1280.0),
        HighScores::default(),
    )
    .unwrap()
}

fn select_center(game: &mut Game) {
    let point = CellCoord::new(1, 1).to_world() + Vec2::new(0.3, 0.0);
    let tuple = game.select_tuple_at(point).unwrap();
    assert_eq!(
        Some(tuple),
        game.grid().tuple_at_corner(CellCoord::new(1, 1), Corner::Right)
    );
}

#[test]
fn test_single_rotation_resolves_one_match() {
    let config = GameConfig {
        seed: Some(11),
        ..Default::default()
    };
    let mut game = game_on(striped_grid(2), config);
    select_center(&mut game);

    assert!(game.rotate_selection(true));
    assert!(game.settle(DT, 100_000));

    let events = game.drain_events();
    let GameEvent::MatchFound { pieces, points } = &events[0] else {
        panic!("first event should be the match, got {:?}", events[0]);
    };
    assert_eq!(pieces.len(), 3);
    assert_eq!(*points, 15);

    let round_end = events
        .iter()
        .skip(1)
        .position(|e| matches!(e, GameEvent::MatchFound { .. }))
        .map_or(events.len(), |i| i + 1);
    let round = &events[..round_end];
    let count = |pred: fn(&GameEvent) -> bool| round.iter().filter(|e| pred(e)).count();
    assert_eq!(count(|e| matches!(e, GameEvent::PieceRemoved { .. })), 3);
    assert_eq!(count(|e| matches!(e, GameEvent::PieceSpawned { .. })), 3);
    // The survivor above the gap in the middle column falls one row
    assert_eq!(count(|e| matches!(e, GameEvent::PieceMoved { .. })), 1);

    assert!(matches!(
        game.phase(),
        Phase::Idle | Phase::GameOver(GameOverReason::Deadlock)
    ));
    assert!(game.grid().is_full());
    assert!(game.score().score >= 15);
}

#[test]
fn test_bomb_with_one_turn_left_ends_the_game() {
    // Many colors: new pieces are unlikely to match anything
    let config = GameConfig {
        seed: Some(5),
        ..Default::default()
    };
    let mut game = game_on(striped_grid(60), config);
    let bomb_piece = game.grid().piece_at(CellCoord::new(2, 0)).unwrap();
    game.attach_bomb(bomb_piece, 1);

    select_center(&mut game);
    assert!(game.rotate_selection(true));
    assert!(game.settle(DT, 100_000));

    let events = game.drain_events();
    let defused = events
        .iter()
        .any(|e| matches!(e, GameEvent::BombDefused { piece } if *piece == bomb_piece));
    let game_overs: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::GameOver { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect();
    assert!(game_overs.len() <= 1);

    // The bomb sits in column 2, away from the match
    assert!(!defused);
    assert_eq!(game_overs, vec![GameOverReason::BombExploded]);
    let zero_ticks = events
        .iter()
        .filter(|e| matches!(e, GameEvent::BombTicked { remaining: 0, .. }))
        .count();
    assert_eq!(zero_ticks, 1);
    assert_eq!(game.phase(), &Phase::GameOver(GameOverReason::BombExploded));

    // Once over, the game ignores input
    let tuple = game
        .grid()
        .tuple_at_corner(CellCoord::new(1, 1), Corner::Right)
        .unwrap();
    assert!(!game.rotate_and_resolve(tuple, true));
}

#[test]
fn test_game_over_records_high_score() {
    let config = GameConfig {
        seed: Some(2),
        ..Default::default()
    };
    let mut game = game_on(striped_grid(60), config);
    let bomb_piece = game.grid().piece_at(CellCoord::new(2, 0)).unwrap();
    game.attach_bomb(bomb_piece, 1);
    select_center(&mut game);
    game.rotate_selection(true);
    assert!(game.settle(DT, 100_000));

    assert!(game.is_game_over());
    let score = game.score().score;
    assert_eq!(game.high_score(), score);
    let over = game
        .drain_events()
        .into_iter()
        .find_map(|e| match e {
            GameEvent::GameOver {
                score, high_score, ..
            } => Some((score, high_score)),
            _ => None,
        })
        .unwrap();
    assert_eq!(over, (score, score));
}

#[test]
fn test_generated_game_plays_a_turn() {
    let config = GameConfig {
        seed: Some(99),
        ..Default::default()
    };
    let mut game =
        Game::new(config, OrthoCamera::new(1080.0, 1920.0), HighScores::default()).unwrap();
    assert!(game.viewport().top_y() > game.grid().world_size().y);

    let (center, _) = game.grid().bounds();
    assert!(game.select_tuple_at(center).is_some());
    assert!(game.rotate_selection(false));
    assert!(game.settle(DT, 100_000));
    assert!(game.grid().is_full());
    assert!(game.grid().live_piece_count() >= 72);
}

#[test]
fn test_config_from_json() {
    let config = GameConfig::from_json_str(
        r#"{ "width": 5, "height": 6, "color_count": 4, "seed": 8 }"#,
    )
    .unwrap();
    let game = Game::new(config, OrthoCamera::new(600.0, 800.0), HighScores::default()).unwrap();
    assert_eq!(game.grid().width(), 5);
    assert_eq!(game.grid().height(), 6);

    let err = GameConfig::from_json_str(r#"{ "color_count": 300 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::TooManyColors(300)));
}

#[test]
fn test_high_score_table_as_store() {
    let mut scores = HighScores::default();
    scores.set_high_score(40);
    scores.set_high_score(25);
    assert_eq!(scores.high_score(), 40);
    assert_eq!(scores.entries.len(), 2);
}
