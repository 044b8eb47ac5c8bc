#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gate Runner engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then reports [`Event`] values describing what
//! actually changed. Systems operate on the entity records defined here and
//! never own game state themselves.

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Gate Runner.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests a manual single-cell move of the player.
    Move {
        /// Direction of travel for the attempted move.
        direction: Direction,
    },
    /// Requests a projectile volley from the player's position.
    Shoot {
        /// Host clock reading used to enforce the shot cooldown.
        now: Duration,
    },
    /// Advances the simulation by one frame.
    Tick {
        /// Host clock reading measured from an arbitrary but fixed origin.
        now: Duration,
    },
    /// Reloads the current level, clearing any terminal outcome.
    Restart,
    /// Loads the next campaign level after a victory.
    NextLevel,
    /// Records that the host should stop driving the simulation.
    Quit,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that a running simulation processed a frame.
    TimeAdvanced {
        /// Host clock reading supplied with the tick.
        now: Duration,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after the move.
        to: CellCoord,
        /// Whether the move was requested by input or forced by the auto-step timer.
        cause: StepCause,
    },
    /// Reports that a math gate was collected and applied to the army.
    GateApplied {
        /// Stable identifier of the collected gate.
        gate: GateId,
        /// Cell that carried the gate.
        cell: CellCoord,
        /// Arithmetic operation applied.
        operation: GateOp,
        /// Operand of the operation.
        value: i64,
        /// Army size before the gate was applied.
        army_before: i64,
        /// Army size after the gate was applied and clamped.
        army_after: i64,
    },
    /// Reports that the player stood on the exit before collecting every gate.
    ExitLocked {
        /// Number of gates collected so far.
        collected: u32,
        /// Number of gates present on the level.
        total: u32,
    },
    /// Announces that the rising wall claimed another row.
    WallRose {
        /// Row index of the wall front after the rise.
        wall_level: u32,
    },
    /// Confirms that a volley was spawned.
    ProjectilesFired {
        /// Number of projectiles that found a free slot.
        count: u32,
    },
    /// Reports that a projectile damaged an enemy without destroying it.
    EnemyHit {
        /// Slot of the enemy that was hit.
        enemy: EnemyId,
        /// Hit points left on the enemy.
        remaining_hp: i32,
    },
    /// Reports that an enemy was removed from play by a projectile.
    EnemyDestroyed {
        /// Slot of the destroyed enemy.
        enemy: EnemyId,
    },
    /// Reports that an enemy reached the player and cost soldiers.
    PlayerStruck {
        /// Slot of the enemy that struck.
        enemy: EnemyId,
        /// Army size after the penalty was applied.
        army_after: i64,
    },
    /// Announces a change in the game outcome.
    OutcomeChanged {
        /// Outcome that became active.
        outcome: Outcome,
    },
    /// Announces that a level was (re)loaded.
    LevelStarted {
        /// Zero-based position of the level within the campaign.
        index: usize,
        /// Human readable level name.
        name: String,
    },
    /// Confirms that the host asked the simulation to stop.
    QuitRequested,
}

/// Distinguishes player-initiated moves from timer-driven ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepCause {
    /// Move requested through input.
    Manual,
    /// Move forced by the auto-step timer.
    Auto,
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// All four directions in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the neighbouring cell in `direction`, or `None` when it would
    /// leave a grid of `columns` x `rows` cells.
    #[must_use]
    pub fn step(self, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
        let (column, row) = match direction {
            Direction::Up => (Some(self.column), self.row.checked_sub(1)),
            Direction::Down => (Some(self.column), self.row.checked_add(1)),
            Direction::Left => (self.column.checked_sub(1), Some(self.row)),
            Direction::Right => (self.column.checked_add(1), Some(self.row)),
        };
        let (column, row) = (column?, row?);
        (column < columns && row < rows).then_some(CellCoord::new(column, row))
    }

    /// Pixel-space centre of the cell for the provided tile edge length.
    #[must_use]
    pub fn pixel_center(self, tile_size: f32) -> Vec2 {
        Vec2::new(
            self.column as f32 * tile_size + tile_size / 2.0,
            self.row as f32 * tile_size + tile_size / 2.0,
        )
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Terrain stored in a single map cell once the level has been parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Impassable cell.
    Wall,
    /// Open ground.
    Floor,
    /// Open ground carrying a math gate that has not been collected yet.
    Collectible,
    /// Level exit, unlocked once every gate is collected.
    Exit,
}

impl Tile {
    /// Reports whether the tile blocks movement.
    #[must_use]
    pub const fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }
}

/// Arithmetic applied to the army when a gate is collected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateOp {
    /// Adds the gate value.
    Add,
    /// Multiplies by the gate value.
    Multiply,
    /// Subtracts the gate value, clamping at zero.
    Subtract,
}

impl GateOp {
    /// Single character used when annotating the gate on screen.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            GateOp::Add => '+',
            GateOp::Multiply => '*',
            GateOp::Subtract => '-',
        }
    }
}

/// Stable identifier of a math gate, equal to its raster-order index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GateId(u32);

impl GateId {
    /// Creates a new gate identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Arithmetic gate bound to a collectible cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathGate {
    /// Operation applied on pickup.
    pub operation: GateOp,
    /// Operand of the operation.
    pub value: i64,
    /// Whether the gate was already applied.
    pub collected: bool,
}

impl MathGate {
    /// Creates an uncollected gate.
    #[must_use]
    pub const fn new(operation: GateOp, value: i64) -> Self {
        Self {
            operation,
            value,
            collected: false,
        }
    }
}

/// Behaviour profiles available to enemies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Walks back and forth along its row.
    #[default]
    Patrol,
    /// Closes in on the player once within aggro range.
    Chaser,
    /// Drifts downward and leaves the play area.
    Faller,
}

impl EnemyKind {
    /// Hit points assigned when an enemy of this kind spawns.
    #[must_use]
    pub const fn initial_hp(self) -> i32 {
        match self {
            EnemyKind::Faller => 3,
            EnemyKind::Patrol | EnemyKind::Chaser => 1,
        }
    }
}

/// Slot index of an enemy inside the world's enemy pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Hostile unit simulated in pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Enemy {
    /// Pixel-space position of the enemy's centre.
    pub position: Vec2,
    /// Per-move displacement direction.
    pub velocity: Vec2,
    /// Behaviour profile.
    pub kind: EnemyKind,
    /// Remaining hit points.
    pub hp: i32,
    /// Whether the slot holds a live enemy.
    pub active: bool,
    /// Frames accumulated toward the next move.
    pub move_timer: u32,
}

impl Enemy {
    /// Creates a live enemy of `kind` at `position` with the kind's starting hit points.
    #[must_use]
    pub fn spawn(kind: EnemyKind, position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            kind,
            hp: kind.initial_hp(),
            active: true,
            move_timer: 0,
        }
    }
}

/// Player projectile simulated in pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Projectile {
    /// Pixel-space position.
    pub position: Vec2,
    /// Displacement applied every tick.
    pub velocity: Vec2,
    /// Whether the slot holds a live projectile.
    pub active: bool,
}

/// Presentational unit orbiting the player, one per soldier in the army.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Soldier {
    /// Current pixel-space position.
    pub position: Vec2,
    /// Position the soldier eases toward.
    pub target: Vec2,
    /// Ring slot assigned to the soldier.
    pub slot: u32,
    /// Whether the soldier is displayed.
    pub active: bool,
}

/// Shared behaviour of records stored in an [`EntityPool`].
pub trait PoolSlot {
    /// Reports whether the slot currently holds a live entity.
    fn is_active(&self) -> bool;

    /// Marks the slot as free for reuse.
    fn deactivate(&mut self);
}

impl PoolSlot for Enemy {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

impl PoolSlot for Projectile {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

impl PoolSlot for Soldier {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

/// Fixed-capacity arena of entity slots addressed by index.
///
/// The pool never grows after construction. Spawning reuses the first
/// inactive slot and fails silently when every slot is live.
#[derive(Clone, Debug)]
pub struct EntityPool<T> {
    slots: Box<[T]>,
}

impl<T: PoolSlot + Default> EntityPool<T> {
    /// Creates a pool with `capacity` inactive slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| T::default()).collect(),
        }
    }
}

impl<T: PoolSlot> EntityPool<T> {
    /// Number of slots in the pool.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Stores `entity` in the first free slot, returning the slot index.
    pub fn spawn(&mut self, entity: T) -> Option<usize> {
        let index = self.slots.iter().position(|slot| !slot.is_active())?;
        self.slots[index] = entity;
        Some(index)
    }

    /// Deactivates every slot.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.deactivate();
        }
    }

    /// Number of live entities.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    /// Iterates live entities together with their slot index.
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_active())
    }

    /// Iterates live entities mutably together with their slot index.
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.is_active())
    }

    /// Every slot in index order.
    #[must_use]
    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    /// Every slot in index order, mutably.
    pub fn slots_mut(&mut self) -> &mut [T] {
        &mut self.slots
    }
}

/// Reasons a run can be lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefeatReason {
    /// The rising wall reached the player's row.
    WallCaught,
    /// The army dropped to zero.
    ArmyDestroyed,
    /// An enemy reached a player that had no soldiers left.
    EnemyCollision,
}

/// Progress of the current level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The level is still being played.
    #[default]
    InProgress,
    /// The player reached the unlocked exit.
    Victory,
    /// The run ended for the attached reason.
    Defeat(DefeatReason),
}

impl Outcome {
    /// Reports whether no further gameplay mutation is permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}
