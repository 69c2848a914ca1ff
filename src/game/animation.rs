//! Piece animations - falling, blowing away and tuple rotation.
//!
//! Animations never touch grid cells. They only drive the rendered position,
//! scale and draw order of pieces, so the game logic can run ahead and wait
//! for the scheduler to become idle.

use bevy::math::Vec2;
use rand::Rng;
use tracing::debug;

use super::{
    hex::{PIECE_HEIGHT, PIECE_WIDTH},
    piece::{DRAW_ORDER_BLOWING, DRAW_ORDER_RESTING, Piece, PieceId},
    pool::{Handle, Pool},
    tuple::Tuple,
};
use crate::config::GameConfig;

/// Upward kick added to the random blow direction.
const BLOW_UPWARD_BIAS: f32 = 0.15;
/// Blow velocity per grid column.
const BLOW_SPREAD: f32 = 1.2;
/// Gravity on blown pieces per grid row.
const BLOW_GRAVITY: f32 = 2.5;
/// One rotation step turns a tuple by this many degrees.
pub const DEGREES_PER_STEP: f32 = 120.0;

// =============================================================================
// MOVE
// =============================================================================

/// Linear move of a piece towards a target position.
#[derive(Debug, Default, Clone)]
pub struct MoveAnimation {
    piece: Option<PieceId>,
    from: Vec2,
    to: Vec2,
    /// Progress from 0.0 to 1.0.
    t: f32,
}

impl MoveAnimation {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

type MoveId = Handle<MoveAnimation>;

// =============================================================================
// BLOW
// =============================================================================

/// A removed piece flying off under gravity while shrinking.
#[derive(Debug, Default, Clone)]
pub struct BlowAnimation {
    piece: Option<PieceId>,
    velocity: Vec2,
    t: f32,
}

impl BlowAnimation {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

type BlowId = Handle<BlowAnimation>;

// =============================================================================
// ROTATION
// =============================================================================

/// Rendered rotation of the selected tuple around its center.
#[derive(Debug, Clone)]
struct RotationAnimation {
    pieces: [PieceId; 3],
    starts: [Vec2; 3],
    center: Vec2,
    /// Total angle, negative is clockwise.
    degrees: f32,
    t: f32,
}

// =============================================================================
// SCHEDULER
// =============================================================================

/// Runs every in-flight animation, one `tick` per frame.
#[derive(Debug)]
pub struct AnimationScheduler {
    moves: Pool<MoveAnimation>,
    blows: Pool<BlowAnimation>,
    running_moves: Vec<MoveId>,
    running_blows: Vec<BlowId>,
    rotation: Option<RotationAnimation>,

    move_speed: f32,
    blow_speed: f32,
    rotate_speed: f32,
    blow_spread: f32,
    blow_gravity: f32,
}

impl AnimationScheduler {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            moves: Pool::new("move animation", MoveAnimation::default, MoveAnimation::reset),
            blows: Pool::new("blow animation", BlowAnimation::default, BlowAnimation::reset),
            running_moves: Vec::new(),
            running_blows: Vec::new(),
            rotation: None,
            move_speed: config.move_speed,
            blow_speed: config.blow_speed,
            rotate_speed: config.rotate_speed,
            blow_spread: config.width as f32 * BLOW_SPREAD * PIECE_WIDTH,
            blow_gravity: BLOW_GRAVITY * PIECE_HEIGHT * config.height as f32,
        }
    }

    /// True while at least one piece is moving. Blows and rotation don't count.
    pub fn is_animating(&self) -> bool {
        !self.running_moves.is_empty()
    }

    pub fn is_rotating(&self) -> bool {
        self.rotation.is_some()
    }

    /// Number of pieces currently being blown away.
    pub fn blowing_count(&self) -> usize {
        self.running_blows.len()
    }

    /// Move a piece from where it is drawn now to `target`.
    ///
    /// A move already running for the same piece is replaced.
    pub fn move_piece(&mut self, pieces: &Pool<Piece>, piece: PieceId, target: Vec2) {
        self.cancel_move(piece);

        let id = self.moves.acquire();
        *self.moves.get_mut(id) = MoveAnimation {
            piece: Some(piece),
            from: pieces.get(piece).position,
            to: target,
            t: 0.0,
        };
        self.running_moves.push(id);
    }

    /// Blow a piece off the board. The piece goes back to its pool when done.
    pub fn blow_piece<R: Rng + ?Sized>(
        &mut self,
        pieces: &mut Pool<Piece>,
        piece: PieceId,
        rng: &mut R,
    ) {
        self.cancel_move(piece);

        let direction = random_in_unit_circle(rng) + Vec2::new(0.0, BLOW_UPWARD_BIAS);
        let id = self.blows.acquire();
        *self.blows.get_mut(id) = BlowAnimation {
            piece: Some(piece),
            velocity: direction * self.blow_spread,
            t: 0.0,
        };
        pieces.get_mut(piece).draw_order = DRAW_ORDER_BLOWING;
        self.running_blows.push(id);
    }

    /// Animate a tuple whose pieces already sit in their new cells.
    ///
    /// The pieces turn `steps × 120` degrees around `center` and end up drawn at
    /// their cells.
    pub fn rotate_tuple(
        &mut self,
        pieces: &mut Pool<Piece>,
        tuple: &Tuple,
        center: Vec2,
        steps: u32,
        clockwise: bool,
    ) {
        self.finish_rotation(pieces);

        let sign = if clockwise { -1.0 } else { 1.0 };
        let degrees = sign * steps as f32 * DEGREES_PER_STEP;
        if degrees == 0.0 {
            return;
        }

        self.rotation = Some(RotationAnimation {
            pieces: tuple.pieces,
            starts: tuple.pieces.map(|id| pieces.get(id).position),
            center,
            degrees,
            t: 0.0,
        });
    }

    /// Advance every animation by `dt` seconds.
    pub fn tick(&mut self, dt: f32, pieces: &mut Pool<Piece>) {
        if dt <= 0.0 {
            return;
        }

        self.tick_moves(dt, pieces);
        self.tick_blows(dt, pieces);
        self.tick_rotation(dt, pieces);
    }

    fn tick_moves(&mut self, dt: f32, pieces: &mut Pool<Piece>) {
        let moves = &mut self.moves;
        let speed = self.move_speed;

        self.running_moves.retain(|&id| {
            let anim = moves.get_mut(id);
            let Some(piece) = anim.piece else {
                moves.release(id);
                return false;
            };

            let distance = anim.from.distance(anim.to);
            if distance <= f32::EPSILON {
                anim.t = 1.0;
            } else {
                anim.t += dt * speed / distance;
            }

            if anim.t >= 1.0 {
                pieces.get_mut(piece).position = anim.to;
                moves.release(id);
                false
            } else {
                pieces.get_mut(piece).position = anim.from.lerp(anim.to, anim.t);
                true
            }
        });
    }

    fn tick_blows(&mut self, dt: f32, pieces: &mut Pool<Piece>) {
        let blows = &mut self.blows;
        let speed = self.blow_speed;
        let gravity = self.blow_gravity;

        self.running_blows.retain(|&id| {
            let anim = blows.get_mut(id);
            let Some(piece) = anim.piece else {
                blows.release(id);
                return false;
            };

            anim.velocity.y -= dt * gravity;
            anim.t += dt * speed;

            if anim.t < 1.0 {
                let state = pieces.get_mut(piece);
                state.position += anim.velocity * dt;
                state.scale = (1.0 - anim.t) * PIECE_WIDTH;
                true
            } else {
                let state = pieces.get_mut(piece);
                state.scale = PIECE_WIDTH;
                state.draw_order = DRAW_ORDER_RESTING;
                blows.release(id);
                pieces.release(piece);
                false
            }
        });
    }

    fn tick_rotation(&mut self, dt: f32, pieces: &mut Pool<Piece>) {
        let Some(rotation) = &mut self.rotation else {
            return;
        };

        rotation.t += dt * self.rotate_speed / rotation.degrees.abs();
        if rotation.t >= 1.0 {
            self.finish_rotation(pieces);
            return;
        }

        let turn = Vec2::from_angle((rotation.degrees * rotation.t).to_radians());
        for (id, start) in rotation.pieces.iter().zip(rotation.starts) {
            pieces.get_mut(*id).position = rotation.center + turn.rotate(start - rotation.center);
        }
    }

    /// Snap a running rotation to its end.
    fn finish_rotation(&mut self, pieces: &mut Pool<Piece>) {
        if let Some(rotation) = self.rotation.take() {
            for id in rotation.pieces {
                let piece = pieces.get_mut(id);
                piece.position = piece.cell.to_world();
            }
        }
    }

    fn cancel_move(&mut self, piece: PieceId) {
        let moves = &self.moves;
        let running = self
            .running_moves
            .iter()
            .position(|&id| moves.get(id).piece == Some(piece));
        if let Some(index) = running {
            let id = self.running_moves.swap_remove(index);
            self.moves.release(id);
        }
    }

    /// Drop every animation. Blowing pieces are returned to their pool.
    pub fn clear(&mut self, pieces: &mut Pool<Piece>) {
        for id in self.running_moves.drain(..) {
            self.moves.release(id);
        }
        for id in self.running_blows.drain(..) {
            if let Some(piece) = self.blows.get(id).piece {
                pieces.release(piece);
            }
            self.blows.release(id);
        }
        if self.rotation.take().is_some() {
            debug!("Rotation animation dropped");
        }
    }
}

/// Uniform random point inside the unit circle.
fn random_in_unit_circle<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    loop {
        let point = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
        if point.length_squared() <= 1.0 {
            return point;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        grid::tests::striped,
        hex::{CellCoord, Corner},
    };
    use rand::{SeedableRng, rngs::StdRng};

    fn piece_pool() -> Pool<Piece> {
        Pool::new("piece", Piece::default, Piece::reset)
    }

    fn scheduler() -> AnimationScheduler {
        AnimationScheduler::new(&GameConfig::default())
    }

    #[test]
    fn test_move_reaches_target() {
        let mut pieces = piece_pool();
        let mut anims = scheduler();
        let piece = pieces.acquire();

        // 3 units at 7.5 units/s: 0.4 s
        anims.move_piece(&pieces, piece, Vec2::new(0.0, 3.0));
        assert!(anims.is_animating());

        anims.tick(0.2, &mut pieces);
        assert!(anims.is_animating());
        assert!((pieces.get(piece).position.y - 1.5).abs() < 1e-4);

        anims.tick(0.3, &mut pieces);
        assert!(!anims.is_animating());
        assert_eq!(pieces.get(piece).position, Vec2::new(0.0, 3.0));
    }

    #[test]
    fn test_zero_dt_is_a_no_op() {
        let mut pieces = piece_pool();
        let mut anims = scheduler();
        let piece = pieces.acquire();

        anims.move_piece(&pieces, piece, Vec2::new(2.0, 0.0));
        anims.tick(0.0, &mut pieces);
        anims.tick(-1.0, &mut pieces);
        assert!(anims.is_animating());
        assert_eq!(pieces.get(piece).position, Vec2::ZERO);
    }

    #[test]
    fn test_new_move_replaces_old_one() {
        let mut pieces = piece_pool();
        let mut anims = scheduler();
        let piece = pieces.acquire();

        anims.move_piece(&pieces, piece, Vec2::new(0.0, 5.0));
        anims.move_piece(&pieces, piece, Vec2::new(0.0, 1.0));
        anims.tick(1.0, &mut pieces);
        assert!(!anims.is_animating());
        assert_eq!(pieces.get(piece).position, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_blow_shrinks_then_releases_piece() {
        let mut pieces = piece_pool();
        let mut rng = StdRng::seed_from_u64(3);
        let mut anims = scheduler();
        let piece = pieces.acquire();

        anims.blow_piece(&mut pieces, piece, &mut rng);
        assert_eq!(pieces.get(piece).draw_order, DRAW_ORDER_BLOWING);
        // Blows don't hold up the game
        assert!(!anims.is_animating());

        // Blow speed 2.0: half way after 0.25 s
        anims.tick(0.25, &mut pieces);
        assert!((pieces.get(piece).scale - 0.5).abs() < 1e-4);
        assert_eq!(anims.blowing_count(), 1);

        anims.tick(0.25, &mut pieces);
        assert_eq!(anims.blowing_count(), 0);
        assert!(!pieces.is_active(piece));
        assert_eq!(pieces.get(piece).scale, PIECE_WIDTH);
        assert_eq!(pieces.get(piece).draw_order, DRAW_ORDER_RESTING);
    }

    #[test]
    fn test_rotation_keeps_radius_and_snaps_to_cells() {
        let mut grid = striped(3, 3, 5);
        let mut anims = scheduler();
        let tuple = grid.tuple_at_corner(CellCoord::new(1, 1), Corner::Right).unwrap();
        let center = tuple.center(&grid);
        let radius = grid.piece(tuple.pieces[0]).position.distance(center);

        tuple.rotate_clockwise(&mut grid, 1);
        anims.rotate_tuple(grid.pieces_mut(), &tuple, center, 1, true);
        assert!(anims.is_rotating());

        // 120 degrees at 700 degrees/s takes ~0.17 s
        anims.tick(0.05, grid.pieces_mut());
        assert!(anims.is_rotating());
        let moved = grid.piece(tuple.pieces[0]).position;
        assert!((moved.distance(center) - radius).abs() < 1e-4);

        anims.tick(0.2, grid.pieces_mut());
        assert!(!anims.is_rotating());
        for id in tuple.pieces {
            let piece = grid.piece(id);
            assert!(piece.position.distance(piece.cell.to_world()) < 1e-5);
        }
    }

    #[test]
    fn test_clear_returns_blowing_pieces() {
        let mut pieces = piece_pool();
        let mut rng = StdRng::seed_from_u64(0);
        let mut anims = scheduler();
        let moving = pieces.acquire();
        let blowing = pieces.acquire();

        anims.move_piece(&pieces, moving, Vec2::ONE);
        anims.blow_piece(&mut pieces, blowing, &mut rng);
        anims.clear(&mut pieces);

        assert!(!anims.is_animating());
        assert_eq!(anims.blowing_count(), 0);
        assert!(pieces.is_active(moving));
        assert!(!pieces.is_active(blowing));
    }
}
