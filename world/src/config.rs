//! Tunable parameters for a Gate Runner session.

use std::time::Duration;

use gate_runner_system_combat::CombatTuning;
use gate_runner_system_enemies::EnemyTuning;
use gate_runner_system_gates::GateTuning;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Values a deserialised configuration may not hold.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Spawn probability outside `0..=1`, NaN included.
    #[error("enemies.spawn_chance must lie in 0..=1, found {value}")]
    SpawnChance {
        /// Offending probability.
        value: f64,
    },
    /// Geometry that is zero, negative or not finite.
    #[error("{field} must be a finite positive number, found {value}")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
}

/// Aggregated configuration consumed by the world.
///
/// Every field has a default, so a partial TOML document only needs to name
/// the values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Milliseconds between forced upward steps.
    pub auto_step_ms: u64,
    /// Milliseconds between wall rises.
    pub rise_ms: u64,
    /// Minimum milliseconds between two volleys.
    pub shot_cooldown_ms: u64,
    /// Army size at the start of every level.
    pub start_army: i64,
    /// Capacity of the projectile pool.
    pub projectile_pool: usize,
    /// Capacity of the enemy pool.
    pub enemy_pool: usize,
    /// Capacity of the soldier pool.
    pub soldier_pool: usize,
    /// Edge length of a tile in pixels.
    pub tile_size: f32,
    /// Width of the play area in pixels.
    pub viewport_width: f32,
    /// Height of the play area in pixels.
    pub viewport_height: f32,
    /// Soldiers needed per extra projectile in a volley.
    pub soldiers_per_shot: i64,
    /// Upper bound on projectiles per volley.
    pub max_volley: u32,
    /// Upward projectile speed in pixels per tick.
    pub projectile_speed: f32,
    /// Horizontal speed between neighbouring projectiles of a volley.
    pub projectile_spread: f32,
    /// Seed for gate operands and enemy placement.
    pub rng_seed: u64,
    /// Operand ranges for math gates.
    pub gates: GateTuning,
    /// Enemy placement and behaviour.
    pub enemies: EnemyTuning,
    /// Collision radii and penalties.
    pub combat: CombatTuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            auto_step_ms: 500,
            rise_ms: 1_200,
            shot_cooldown_ms: 200,
            start_army: 30,
            projectile_pool: 100,
            enemy_pool: 50,
            soldier_pool: 50,
            tile_size: 40.0,
            viewport_width: 1_000.0,
            viewport_height: 800.0,
            soldiers_per_shot: 10,
            max_volley: 7,
            projectile_speed: 8.0,
            projectile_spread: 0.3,
            rng_seed: 0x6a7e_2f11_c0de_5eed,
            gates: GateTuning::default(),
            enemies: EnemyTuning::default(),
            combat: CombatTuning::default(),
        }
    }
}

impl GameConfig {
    /// Rejects values that would make the simulation meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chance = self.enemies.spawn_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(ConfigError::SpawnChance { value: chance });
        }
        for (field, value) in [
            ("tile_size", self.tile_size),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }

    /// Interval of the auto-step timer.
    #[must_use]
    pub fn auto_step_interval(&self) -> Duration {
        Duration::from_millis(self.auto_step_ms)
    }

    /// Interval of the wall-rise timer.
    #[must_use]
    pub fn rise_interval(&self) -> Duration {
        Duration::from_millis(self.rise_ms)
    }

    /// Cooldown enforced between volleys.
    #[must_use]
    pub fn shot_cooldown(&self) -> Duration {
        Duration::from_millis(self.shot_cooldown_ms)
    }

    /// Size of the play area in pixels.
    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height)
    }

    /// Projectiles fired by a volley for the given army size.
    #[must_use]
    pub fn volley_size(&self, army: i64) -> u32 {
        let per_shot = self.soldiers_per_shot.max(1);
        let extra = army.max(0) / per_shot;
        let size = u32::try_from(extra.saturating_add(1)).unwrap_or(u32::MAX);
        size.min(self.max_volley)
    }
}
