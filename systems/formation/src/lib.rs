#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Soldier formation that visualises the army around the player.

use std::{f32::consts::TAU, time::Duration};

use gate_runner_core::{EntityPool, Soldier};
use glam::Vec2;

const BASE_RADIUS: f32 = 30.0;
const RING_SPACING: f32 = 15.0;
const SOLDIERS_PER_RING: usize = 10;
const EASING: f32 = 0.1;

/// Places soldiers directly on their ring slots, used when a level starts.
pub fn muster(soldiers: &mut EntityPool<Soldier>, army: i64, center: Vec2) {
    let count = displayed(soldiers, army);
    for (slot, soldier) in soldiers.slots_mut().iter_mut().enumerate() {
        if slot >= count {
            soldier.active = false;
            continue;
        }
        let target = ring_position(slot, count, center, Duration::ZERO);
        *soldier = recruit(slot, target);
    }
}

/// Rotates the formation around `center` and eases every soldier toward its slot.
///
/// Soldiers beyond the current army size are hidden; newly displayed soldiers
/// appear directly on their slot.
pub fn arrange(soldiers: &mut EntityPool<Soldier>, army: i64, center: Vec2, now: Duration) {
    let count = displayed(soldiers, army);
    for (slot, soldier) in soldiers.slots_mut().iter_mut().enumerate() {
        if slot >= count {
            soldier.active = false;
            continue;
        }

        let target = ring_position(slot, count, center, now);
        if !soldier.active {
            *soldier = recruit(slot, target);
            continue;
        }

        soldier.target = target;
        soldier.position += (target - soldier.position) * EASING;
    }
}

fn displayed(soldiers: &EntityPool<Soldier>, army: i64) -> usize {
    usize::try_from(army.max(0))
        .unwrap_or(usize::MAX)
        .min(soldiers.capacity())
}

fn recruit(slot: usize, target: Vec2) -> Soldier {
    Soldier {
        position: target,
        target,
        slot: u32::try_from(slot).unwrap_or(u32::MAX),
        active: true,
    }
}

fn ring_position(slot: usize, count: usize, center: Vec2, now: Duration) -> Vec2 {
    let ring = (slot / SOLDIERS_PER_RING) as f32;
    let radius = BASE_RADIUS + ring * RING_SPACING;
    let angle = TAU * slot as f32 / count as f32 + now.as_secs_f32();
    center + Vec2::new(angle.cos(), angle.sin()) * radius
}
