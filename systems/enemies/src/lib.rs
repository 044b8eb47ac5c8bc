#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy placement at level setup and per-frame enemy behaviour.

use gate_runner_core::{CellCoord, Enemy, EnemyKind, EntityPool};
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tuning knobs that shape enemy placement and movement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Probability that an eligible floor cell spawns an enemy.
    pub spawn_chance: f64,
    /// Frames an enemy waits between moves.
    pub move_frames: u32,
    /// Horizontal patrol speed expressed in tiles per move.
    pub patrol_speed: f32,
    /// Half-width of the square aggro zone around the player, in tiles.
    pub chase_radius_tiles: f32,
    /// Pixels a chaser closes per axis on each move.
    pub chase_step: f32,
    /// Pixels a faller drops on each move.
    pub fall_step: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            spawn_chance: 0.1,
            move_frames: 10,
            patrol_speed: 0.5,
            chase_radius_tiles: 3.0,
            chase_step: 2.0,
            fall_step: 5.0,
        }
    }
}

/// Read-only context enemies react to while moving.
#[derive(Clone, Copy, Debug)]
pub struct Surroundings<F> {
    /// Edge length of a tile in pixels.
    pub tile_size: f32,
    /// Number of map columns.
    pub columns: u32,
    /// Number of map rows.
    pub rows: u32,
    /// Width and height of the visible play area in pixels.
    pub viewport: Vec2,
    /// Pixel-space centre of the player.
    pub player_center: Vec2,
    /// Reports whether the map cell blocks movement.
    pub is_wall: F,
}

/// Places enemies on `candidates`, returning how many were spawned.
///
/// Each candidate cell rolls once against [`EnemyTuning::spawn_chance`];
/// placement stops when the pool is full. A NaN chance places nothing.
pub fn spawn_enemies<I, R>(
    candidates: I,
    tile_size: f32,
    tuning: &EnemyTuning,
    rng: &mut R,
    pool: &mut EntityPool<Enemy>,
) -> usize
where
    I: IntoIterator<Item = CellCoord>,
    R: Rng + ?Sized,
{
    let chance = if tuning.spawn_chance.is_nan() {
        0.0
    } else {
        tuning.spawn_chance.clamp(0.0, 1.0)
    };
    let mut spawned = 0;

    for cell in candidates {
        if pool.active_count() >= pool.capacity() {
            break;
        }
        if !rng.gen_bool(chance) {
            continue;
        }

        let kind = match rng.gen_range(0..3) {
            0 => EnemyKind::Patrol,
            1 => EnemyKind::Chaser,
            _ => EnemyKind::Faller,
        };
        let velocity = match kind {
            EnemyKind::Patrol => {
                let heading = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                Vec2::new(heading * tuning.patrol_speed, 0.0)
            }
            EnemyKind::Chaser => Vec2::ZERO,
            EnemyKind::Faller => Vec2::new(0.0, 1.0),
        };

        let enemy = Enemy::spawn(kind, cell.pixel_center(tile_size), velocity);
        if pool.spawn(enemy).is_some() {
            spawned += 1;
        }
    }

    spawned
}

/// Advances every live enemy by one frame, returning how many left the play area.
pub fn advance_enemies<F>(
    pool: &mut EntityPool<Enemy>,
    surroundings: &Surroundings<F>,
    tuning: &EnemyTuning,
) -> usize
where
    F: Fn(CellCoord) -> bool,
{
    let mut departed = 0;

    for (_, enemy) in pool.iter_active_mut() {
        enemy.move_timer = enemy.move_timer.saturating_add(1);
        if enemy.move_timer < tuning.move_frames {
            continue;
        }
        enemy.move_timer = 0;

        match enemy.kind {
            EnemyKind::Patrol => patrol(enemy, surroundings),
            EnemyKind::Chaser => chase(enemy, surroundings, tuning),
            EnemyKind::Faller => {
                enemy.position.y += enemy.velocity.y * tuning.fall_step;
                if enemy.position.y > surroundings.viewport.y {
                    enemy.active = false;
                    departed += 1;
                }
            }
        }
    }

    departed
}

fn patrol<F>(enemy: &mut Enemy, surroundings: &Surroundings<F>)
where
    F: Fn(CellCoord) -> bool,
{
    let tile = surroundings.tile_size;
    let candidate_x = enemy.position.x + enemy.velocity.x * tile;
    let column = (candidate_x / tile).floor();
    let row = (enemy.position.y / tile).floor();

    let outside = column <= 0.0
        || column >= surroundings.columns as f32 - 1.0
        || row < 0.0
        || row >= surroundings.rows as f32;
    let blocked = outside || (surroundings.is_wall)(CellCoord::new(column as u32, row as u32));

    if blocked {
        enemy.velocity.x = -enemy.velocity.x;
    } else {
        enemy.position.x = candidate_x;
    }
}

fn chase<F>(enemy: &mut Enemy, surroundings: &Surroundings<F>, tuning: &EnemyTuning) {
    let tile = surroundings.tile_size;
    let reach = tuning.chase_radius_tiles * tile;
    let target = surroundings.player_center;
    let delta = target - enemy.position;
    if delta.x.abs() >= reach || delta.y.abs() >= reach {
        return;
    }

    let viewport = surroundings.viewport;
    let position = &mut enemy.position;
    if position.x < target.x && position.x + tile < viewport.x {
        position.x += tuning.chase_step;
    } else if position.x > target.x && position.x > 0.0 {
        position.x -= tuning.chase_step;
    }

    if position.y < target.y && position.y + tile < viewport.y {
        position.y += tuning.chase_step;
    } else if position.y > target.y && position.y > 0.0 {
        position.y -= tuning.chase_step;
    }
}
