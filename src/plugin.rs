//! Bevy host for the game core.
//!
//! Insert a [`GameHost`] resource and add [`plugin`]. Input arrives as
//! [`GameCommand`] messages and is applied once per frame, before the game is
//! ticked. Everything the game reports comes back out as [`GameMessage`]s.

use bevy::prelude::*;

use crate::game::{Game, GameEvent};

pub fn plugin(app: &mut App) {
    app.add_message::<GameCommand>();
    app.add_message::<GameMessage>();

    app.add_systems(
        Update,
        (apply_commands, tick_game, forward_events)
            .chain()
            .run_if(resource_exists::<GameHost>),
    );
}

/// The hosted game.
#[derive(Resource, Debug)]
pub struct GameHost(pub Game);

/// Player input, in world coordinates.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum GameCommand {
    /// Select the tuple closest to a point.
    Select(Vec2),
    /// Rotate the current selection.
    Rotate { clockwise: bool },
    /// Rotate the current selection the way a swipe goes around it.
    Swipe { press: Vec2, release: Vec2 },
    Restart,
}

/// Message wrapping every event the game emits.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct GameMessage(pub GameEvent);

fn apply_commands(mut host: ResMut<GameHost>, mut input: MessageReader<GameCommand>) {
    let game = &mut host.0;
    for command in input.read() {
        match *command {
            GameCommand::Select(point) => {
                game.select_tuple_at(point);
            }
            GameCommand::Rotate { clockwise } => {
                game.rotate_selection(clockwise);
            }
            GameCommand::Swipe { press, release } => {
                game.swipe(press, release);
            }
            GameCommand::Restart => game.restart(),
        }
    }
}

fn tick_game(time: Res<Time>, mut host: ResMut<GameHost>) {
    host.0.tick(time.delta_secs());
}

fn forward_events(mut host: ResMut<GameHost>, mut messages: MessageWriter<GameMessage>) {
    for event in host.0.drain_events() {
        messages.write(GameMessage(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GameConfig,
        game::{CellCoord, HexGrid, HighScores, OrthoCamera},
    };
    use bevy::ecs::message::Messages;

    fn app_with_game() -> App {
        let columns = vec![vec![0; 3], vec![1; 3], vec![0; 3]];
        let grid = HexGrid::from_colors(&columns, 2).unwrap();
        let game = Game::with_grid(
            GameConfig::default(),
            grid,
            OrthoCamera::new(800.0, 600.0),
            HighScores::default(),
        )
        .unwrap();

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(plugin);
        app.insert_resource(GameHost(game));
        app
    }

    #[test]
    fn test_select_command_selects_tuple() {
        let mut app = app_with_game();
        let point = CellCoord::new(1, 1).to_world() + Vec2::new(0.3, 0.0);
        app.world_mut().write_message(GameCommand::Select(point));
        app.update();

        let host = app.world().resource::<GameHost>();
        let selection = host.0.selection().unwrap();
        assert!(selection.visible);
    }

    #[test]
    fn test_rotate_command_starts_turn() {
        let mut app = app_with_game();
        let point = CellCoord::new(1, 1).to_world() + Vec2::new(0.3, 0.0);
        app.world_mut().write_message(GameCommand::Select(point));
        app.update();
        app.world_mut()
            .write_message(GameCommand::Rotate { clockwise: true });
        app.update();

        let host = app.world().resource::<GameHost>();
        assert!(!host.0.is_idle());
    }

    #[test]
    fn test_events_are_forwarded() {
        let mut app = app_with_game();
        let piece = {
            let mut host = app.world_mut().resource_mut::<GameHost>();
            let piece = host.0.grid().piece_at(CellCoord::new(2, 2)).unwrap();
            host.0.attach_bomb(piece, 3);
            piece
        };
        app.update();

        let messages = app.world().resource::<Messages<GameMessage>>();
        let mut cursor = messages.get_cursor();
        let received: Vec<_> = cursor.read(messages).cloned().collect();
        assert_eq!(
            received,
            vec![GameMessage(GameEvent::BombSpawned {
                piece,
                remaining: 3
            })]
        );
    }

    #[test]
    fn test_without_host_nothing_runs() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(plugin);
        app.world_mut().write_message(GameCommand::Restart);
        app.update();
        assert!(app.world().get_resource::<GameHost>().is_none());
    }
}
