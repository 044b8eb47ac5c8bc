#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Gate Runner.

mod campaign;
mod config;
mod map;
mod timers;

use std::time::Duration;

use gate_runner_core::{
    CellCoord, Command, DefeatReason, Direction, Enemy, EntityPool, Event, MathGate, Outcome,
    PoolSlot, Projectile, Soldier, StepCause, Tile, WELCOME_BANNER,
};
use gate_runner_system_enemies::Surroundings;
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

pub use campaign::{Campaign, CampaignError, Level};
pub use config::{ConfigError, GameConfig};
pub use map::{load, GameMap, LoadedMap, MapError};

use timers::GameClock;

/// Represents the authoritative Gate Runner world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    campaign: Campaign,
    level_index: usize,
    map: GameMap,
    gates: Vec<MathGate>,
    player: CellCoord,
    exit: CellCoord,
    army: i64,
    moves: u32,
    collectibles_taken: u32,
    wall_level: u32,
    outcome: Outcome,
    clock: GameClock,
    rng: ChaCha8Rng,
    enemies: EntityPool<Enemy>,
    projectiles: EntityPool<Projectile>,
    soldiers: EntityPool<Soldier>,
    campaign_complete: bool,
    quit_requested: bool,
}

impl World {
    /// Creates a world positioned at the first level of `campaign`.
    #[must_use]
    pub fn new(config: GameConfig, campaign: Campaign) -> Self {
        let first = campaign.levels()[0].clone();
        let mut world = Self {
            banner: WELCOME_BANNER,
            clock: GameClock::new(&config),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            enemies: EntityPool::with_capacity(config.enemy_pool),
            projectiles: EntityPool::with_capacity(config.projectile_pool),
            soldiers: EntityPool::with_capacity(config.soldier_pool),
            level_index: 0,
            map: first.map().clone(),
            gates: Vec::new(),
            player: first.player_start(),
            exit: first.exit(),
            army: config.start_army,
            moves: 0,
            collectibles_taken: 0,
            wall_level: 0,
            outcome: Outcome::InProgress,
            campaign_complete: false,
            quit_requested: false,
            config,
            campaign,
        };
        world.reset_level();
        world
    }

    /// Creates a single-level world from a map source.
    pub fn from_map_source(config: GameConfig, source: &str) -> Result<Self, MapError> {
        let level = Level::parse("level 1", source)?;
        Ok(Self::new(config, Campaign::single(level)))
    }

    fn start_level(&mut self, index: usize, out_events: &mut Vec<Event>) {
        self.level_index = index;
        self.reset_level();
        out_events.push(Event::LevelStarted {
            index,
            name: self.level_name().to_owned(),
        });
    }

    fn reset_level(&mut self) {
        let Some(level) = self.campaign.level(self.level_index) else {
            return;
        };
        self.map = level.map().clone();
        self.player = level.player_start();
        self.exit = level.exit();

        self.gates = gate_runner_system_gates::assign_gates(
            self.map.collectible_count(),
            &self.config.gates,
            &mut self.rng,
        );
        self.army = self.config.start_army;
        self.moves = 0;
        self.collectibles_taken = 0;
        self.wall_level = self.map.rows().saturating_sub(1);
        self.outcome = Outcome::InProgress;
        self.campaign_complete = false;
        self.clock.reset();

        self.projectiles.clear();
        self.enemies.clear();
        let candidates: Vec<CellCoord> = self
            .map
            .cells()
            .filter(|(cell, tile)| {
                *tile == Tile::Floor && !self.map.is_border(*cell) && *cell != self.player
            })
            .map(|(cell, _)| cell)
            .collect();
        let spawned = gate_runner_system_enemies::spawn_enemies(
            candidates,
            self.config.tile_size,
            &self.config.enemies,
            &mut self.rng,
            &mut self.enemies,
        );
        let center = self.player_center();
        gate_runner_system_formation::muster(&mut self.soldiers, self.army, center);

        info!(
            level = self.level_name(),
            columns = self.map.columns(),
            rows = self.map.rows(),
            gates = self.gates.len(),
            enemies = spawned,
            "level started"
        );
        if self.exit.row() >= self.wall_level {
            debug!(
                exit = %self.exit,
                wall_level = self.wall_level,
                "exit starts behind the wall"
            );
        }
    }

    fn level_name(&self) -> &str {
        self.campaign
            .level(self.level_index)
            .map_or("", Level::name)
    }

    fn player_center(&self) -> Vec2 {
        self.player.pixel_center(self.config.tile_size)
    }

    fn is_legal_ground(&self, cell: CellCoord) -> bool {
        cell.row() < self.wall_level && !self.map.is_wall(cell)
    }

    fn step_player(
        &mut self,
        direction: Direction,
        cause: StepCause,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let target = self
            .player
            .step(direction, self.map.columns(), self.map.rows())
            .filter(|cell| self.is_legal_ground(*cell));
        let Some(target) = target else {
            debug!(?direction, ?cause, player = %self.player, "move rejected");
            return false;
        };

        let from = self.player;
        self.player = target;
        self.moves = self.moves.saturating_add(1);
        out_events.push(Event::PlayerMoved {
            from,
            to: target,
            cause,
        });
        self.apply_cell_effect(target, out_events);
        true
    }

    fn apply_cell_effect(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        match self.map.tile(cell) {
            Some(Tile::Collectible) => self.collect_gate(cell, out_events),
            Some(Tile::Exit) => {
                let total = self.collectibles_total();
                if self.collectibles_taken >= total {
                    self.finish(Outcome::Victory, out_events);
                } else {
                    debug!(collected = self.collectibles_taken, total, "exit locked");
                    out_events.push(Event::ExitLocked {
                        collected: self.collectibles_taken,
                        total,
                    });
                }
            }
            Some(Tile::Floor | Tile::Wall) | None => {}
        }
    }

    fn collect_gate(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(id) = self.map.gate_at(cell) else {
            return;
        };
        let Some(gate) = self.gates.get_mut(id.get() as usize) else {
            return;
        };
        if gate.collected {
            return;
        }

        let army_before = self.army;
        self.army = gate_runner_system_gates::apply_gate(army_before, gate);
        gate.collected = true;
        let (operation, value) = (gate.operation, gate.value);
        self.map.set_tile(cell, Tile::Floor);
        self.collectibles_taken = self.collectibles_taken.saturating_add(1);

        info!(
            gate = id.get(),
            op = %operation.symbol(),
            value,
            army_before,
            army_after = self.army,
            "gate collected"
        );
        out_events.push(Event::GateApplied {
            gate: id,
            cell,
            operation,
            value,
            army_before,
            army_after: self.army,
        });

        if self.army <= 0 {
            self.finish(Outcome::Defeat(DefeatReason::ArmyDestroyed), out_events);
        }
    }

    fn collectibles_total(&self) -> u32 {
        u32::try_from(self.gates.len()).unwrap_or(u32::MAX)
    }

    fn finish(&mut self, outcome: Outcome, out_events: &mut Vec<Event>) {
        self.outcome = outcome;
        if outcome == Outcome::Victory && self.level_index + 1 >= self.campaign.len() {
            self.campaign_complete = true;
        }
        info!(?outcome, level = self.level_name(), moves = self.moves, army = self.army, "run ended");
        out_events.push(Event::OutcomeChanged { outcome });
    }

    fn check_caught(&mut self, out_events: &mut Vec<Event>) {
        if self.player.row() >= self.wall_level {
            self.finish(Outcome::Defeat(DefeatReason::WallCaught), out_events);
        }
    }

    fn raise_wall(&mut self, out_events: &mut Vec<Event>) {
        if self.wall_level == 0 {
            return;
        }
        self.wall_level -= 1;
        self.map.raise_row(self.wall_level);
        info!(wall_level = self.wall_level, "wall rose");
        out_events.push(Event::WallRose {
            wall_level: self.wall_level,
        });
    }

    fn shoot(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        if !self.clock.shot.try_trigger(now) {
            debug!(?now, "shot still cooling down");
            return;
        }

        let volley = self.config.volley_size(self.army);
        let origin = self.player_center();
        let centre = volley.saturating_sub(1) as f32 / 2.0;
        let mut fired = 0;
        for shot in 0..volley {
            let spread = (shot as f32 - centre) * self.config.projectile_spread;
            let projectile = Projectile {
                position: origin,
                velocity: Vec2::new(spread, -self.config.projectile_speed),
                active: true,
            };
            if self.projectiles.spawn(projectile).is_none() {
                debug!(volley, fired, "projectile pool exhausted");
                break;
            }
            fired += 1;
        }

        if fired > 0 {
            out_events.push(Event::ProjectilesFired { count: fired });
        }
    }

    fn tick(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { now });

        if self.clock.auto_step.fire(now) {
            let _ = self.step_player(Direction::Up, StepCause::Auto, out_events);
            if self.outcome.is_terminal() {
                return;
            }
            self.check_caught(out_events);
            if self.outcome.is_terminal() {
                return;
            }
        }

        if self.clock.wall_rise.fire(now) {
            self.raise_wall(out_events);
            self.check_caught(out_events);
            if self.outcome.is_terminal() {
                return;
            }
        }

        let viewport = self.config.viewport();
        for (_, projectile) in self.projectiles.iter_active_mut() {
            projectile.position += projectile.velocity;
            let inside = projectile.position.x >= 0.0
                && projectile.position.y >= 0.0
                && projectile.position.x <= viewport.x
                && projectile.position.y <= viewport.y;
            if !inside {
                projectile.deactivate();
            }
        }

        let player_center = self.player_center();
        let map = &self.map;
        let surroundings = Surroundings {
            tile_size: self.config.tile_size,
            columns: map.columns(),
            rows: map.rows(),
            viewport,
            player_center,
            is_wall: |cell: CellCoord| map.is_wall(cell),
        };
        let departed = gate_runner_system_enemies::advance_enemies(
            &mut self.enemies,
            &surroundings,
            &self.config.enemies,
        );
        if departed > 0 {
            debug!(departed, "enemies left the play area");
        }

        let defeat = gate_runner_system_combat::resolve(
            &mut self.projectiles,
            &mut self.enemies,
            player_center,
            &mut self.army,
            &self.config.combat,
            out_events,
        );
        if let Some(reason) = defeat {
            self.finish(Outcome::Defeat(reason), out_events);
            return;
        }

        gate_runner_system_formation::arrange(&mut self.soldiers, self.army, player_center, now);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the outcome is terminal only `Restart`, `NextLevel` and `Quit` have
/// any effect.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Quit => {
            world.quit_requested = true;
            out_events.push(Event::QuitRequested);
        }
        Command::Restart => {
            info!(level = world.level_name(), "restarting level");
            world.start_level(world.level_index, out_events);
        }
        Command::NextLevel => {
            let next = world.level_index + 1;
            if world.outcome == Outcome::Victory && next < world.campaign.len() {
                world.start_level(next, out_events);
            } else {
                debug!(outcome = ?world.outcome, "next level unavailable");
            }
        }
        _ if world.outcome.is_terminal() => {
            debug!(?command, outcome = ?world.outcome, "ignoring command after the run ended");
        }
        Command::Move { direction } => {
            let _ = world.step_player(direction, StepCause::Manual, out_events);
        }
        Command::Shoot { now } => world.shoot(now, out_events),
        Command::Tick { now } => world.tick(now, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gate_runner_core::{
        CellCoord, Enemy, EnemyId, GateId, GateOp, Outcome, Projectile, Soldier, Tile,
    };
    use glam::Vec2;

    use super::{GameConfig, GameMap, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Current tile map, including consumed collectibles and risen rows.
    #[must_use]
    pub fn map(world: &World) -> &GameMap {
        &world.map
    }

    /// Tile at `cell`, or `None` outside the map.
    #[must_use]
    pub fn tile(world: &World, cell: CellCoord) -> Option<Tile> {
        world.map.tile(cell)
    }

    /// Topmost row claimed by the rising wall; the player must stay above it.
    #[must_use]
    pub fn wall_level(world: &World) -> u32 {
        world.wall_level
    }

    /// Reports whether the player could stand on `cell` right now.
    #[must_use]
    pub fn is_legal_ground(world: &World, cell: CellCoord) -> bool {
        world.is_legal_ground(cell)
    }

    /// Cell occupied by the player.
    #[must_use]
    pub fn player_cell(world: &World) -> CellCoord {
        world.player
    }

    /// Pixel-space centre of the player.
    #[must_use]
    pub fn player_center(world: &World) -> Vec2 {
        world.player_center()
    }

    /// Cell holding the exit.
    #[must_use]
    pub fn exit_cell(world: &World) -> CellCoord {
        world.exit
    }

    /// Current army size.
    #[must_use]
    pub fn army(world: &World) -> i64 {
        world.army
    }

    /// Successful moves made on the current level, manual and automatic.
    #[must_use]
    pub fn moves(world: &World) -> u32 {
        world.moves
    }

    /// Gates collected on the current level.
    #[must_use]
    pub fn collectibles_taken(world: &World) -> u32 {
        world.collectibles_taken
    }

    /// Gates present on the current level.
    #[must_use]
    pub fn collectibles_total(world: &World) -> u32 {
        world.collectibles_total()
    }

    /// Progress of the current level.
    #[must_use]
    pub fn outcome(world: &World) -> Outcome {
        world.outcome
    }

    /// Captures every gate of the level together with its bound cell.
    #[must_use]
    pub fn gates(world: &World) -> Vec<GateSnapshot> {
        world
            .gates
            .iter()
            .zip(world.map.collectible_cells())
            .enumerate()
            .map(|(index, (gate, cell))| GateSnapshot {
                id: GateId::new(u32::try_from(index).unwrap_or(u32::MAX)),
                cell: *cell,
                operation: gate.operation,
                value: gate.value,
                collected: gate.collected,
            })
            .collect()
    }

    /// Live enemies with their slot identifiers.
    pub fn enemies(world: &World) -> impl Iterator<Item = (EnemyId, &Enemy)> {
        world
            .enemies
            .iter_active()
            .map(|(index, enemy)| (EnemyId::new(u32::try_from(index).unwrap_or(u32::MAX)), enemy))
    }

    /// Live projectiles.
    pub fn projectiles(world: &World) -> impl Iterator<Item = &Projectile> {
        world.projectiles.iter_active().map(|(_, projectile)| projectile)
    }

    /// Displayed soldiers of the army formation.
    pub fn soldiers(world: &World) -> impl Iterator<Item = &Soldier> {
        world.soldiers.iter_active().map(|(_, soldier)| soldier)
    }

    /// Zero-based index of the current level.
    #[must_use]
    pub fn level_index(world: &World) -> usize {
        world.level_index
    }

    /// Name of the current level.
    #[must_use]
    pub fn level_name(world: &World) -> &str {
        world.level_name()
    }

    /// Number of levels in the campaign.
    #[must_use]
    pub fn level_count(world: &World) -> usize {
        world.campaign.len()
    }

    /// Reports whether the final level has been won.
    #[must_use]
    pub fn campaign_complete(world: &World) -> bool {
        world.campaign_complete
    }

    /// Reports whether the host asked the simulation to stop.
    #[must_use]
    pub fn quit_requested(world: &World) -> bool {
        world.quit_requested
    }

    /// Immutable description of a math gate used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct GateSnapshot {
        /// Stable identifier of the gate.
        pub id: GateId,
        /// Cell the gate was bound to at load time.
        pub cell: CellCoord,
        /// Operation applied on pickup.
        pub operation: GateOp,
        /// Operand of the operation.
        pub value: i64,
        /// Whether the gate was already applied.
        pub collected: bool,
    }
}
