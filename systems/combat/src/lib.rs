#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Circular collision resolution between projectiles, enemies and the player.

use gate_runner_core::{
    DefeatReason, Enemy, EnemyId, EntityPool, Event, PoolSlot, Projectile,
};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Radii and penalties used when resolving contacts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Distance under which a projectile hits an enemy, in pixels.
    pub hit_radius: f32,
    /// Distance under which an enemy reaches the player, in pixels.
    pub contact_radius: f32,
    /// Soldiers lost when an enemy reaches the player.
    pub contact_penalty: i64,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            hit_radius: 20.0,
            contact_radius: 25.0,
            contact_penalty: 5,
        }
    }
}

/// Resolves every contact for the current frame.
///
/// Each projectile damages at most one enemy, the first live one in slot
/// order. Enemies that reach the player cost `contact_penalty` soldiers and
/// are removed. Returns the defeat reason when a contact ends the run; no
/// further contacts are processed after that.
pub fn resolve(
    projectiles: &mut EntityPool<Projectile>,
    enemies: &mut EntityPool<Enemy>,
    player_center: Vec2,
    army: &mut i64,
    tuning: &CombatTuning,
    out: &mut Vec<Event>,
) -> Option<DefeatReason> {
    for (_, projectile) in projectiles.iter_active_mut() {
        let struck = enemies
            .iter_active_mut()
            .find(|(_, enemy)| projectile.position.distance(enemy.position) < tuning.hit_radius);
        let Some((index, enemy)) = struck else {
            continue;
        };

        projectile.deactivate();
        enemy.hp -= 1;
        let id = enemy_id(index);
        if enemy.hp <= 0 {
            enemy.deactivate();
            out.push(Event::EnemyDestroyed { enemy: id });
        } else {
            out.push(Event::EnemyHit {
                enemy: id,
                remaining_hp: enemy.hp,
            });
        }
    }

    for (index, enemy) in enemies.iter_active_mut() {
        if enemy.position.distance(player_center) >= tuning.contact_radius {
            continue;
        }

        if *army <= 0 {
            return Some(DefeatReason::EnemyCollision);
        }

        *army = army.saturating_sub(tuning.contact_penalty).max(0);
        enemy.deactivate();
        out.push(Event::PlayerStruck {
            enemy: enemy_id(index),
            army_after: *army,
        });

        if *army <= 0 {
            return Some(DefeatReason::ArmyDestroyed);
        }
    }

    None
}

fn enemy_id(index: usize) -> EnemyId {
    EnemyId::new(u32::try_from(index).unwrap_or(u32::MAX))
}
