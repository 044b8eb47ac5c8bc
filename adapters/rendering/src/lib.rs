#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Read-only render projection of the Gate Runner world and a text presenter.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use gate_runner_core::{
    CellCoord, DefeatReason, EnemyId, EnemyKind, GateId, GateOp, Outcome, Tile,
};
use gate_runner_world::{query, World};
use glam::Vec2;

/// Tile layout of the level as seen by presenters.
#[derive(Clone, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Edge length of a tile in pixels.
    pub tile_size: f32,
    /// Row-major tiles.
    pub tiles: Vec<Tile>,
    /// Topmost row claimed by the rising wall.
    pub wall_level: u32,
}

impl GridPresentation {
    /// Tile stored at `cell`.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.tiles.get(index).copied()
    }

    /// Reports whether `row` was walled off by the rising wall rather than by the map.
    #[must_use]
    pub fn is_risen(&self, row: u32) -> bool {
        row >= self.wall_level && row + 1 < self.rows
    }

    /// Cell containing the pixel-space `position`, if it lies on the grid.
    #[must_use]
    pub fn cell_at(&self, position: Vec2) -> Option<CellCoord> {
        if position.x < 0.0 || position.y < 0.0 || self.tile_size <= 0.0 {
            return None;
        }
        let column = (position.x / self.tile_size) as u32;
        let row = (position.y / self.tile_size) as u32;
        (column < self.columns && row < self.rows).then_some(CellCoord::new(column, row))
    }
}

/// Math gate annotation drawn on its collectible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GatePresentation {
    /// Stable gate identifier.
    pub id: GateId,
    /// Cell the gate is bound to.
    pub cell: CellCoord,
    /// Operation applied on pickup.
    pub operation: GateOp,
    /// Operand of the operation.
    pub value: i64,
    /// Whether the gate was already applied.
    pub collected: bool,
}

impl GatePresentation {
    /// Short label such as `+25` or `*2`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{}", self.operation.symbol(), self.value)
    }
}

/// Live enemy as seen by presenters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Slot identifier of the enemy.
    pub id: EnemyId,
    /// Behaviour profile.
    pub kind: EnemyKind,
    /// Pixel-space centre.
    pub position: Vec2,
    /// Remaining hit points.
    pub hp: i32,
}

/// Heads-up display values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hud {
    /// Name of the current level.
    pub level_name: String,
    /// Zero-based level index.
    pub level_index: usize,
    /// Number of levels in the campaign.
    pub level_count: usize,
    /// Current army size.
    pub army: i64,
    /// Moves made on the level.
    pub moves: u32,
    /// Gates collected.
    pub collected: u32,
    /// Gates on the level.
    pub total: u32,
    /// Topmost row claimed by the rising wall.
    pub wall_level: u32,
    /// Level progress.
    pub outcome: Outcome,
}

impl Hud {
    /// Human readable status line for the outcome.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self.outcome {
            Outcome::InProgress if self.collected >= self.total => "running, exit open",
            Outcome::InProgress => "running",
            Outcome::Victory => "victory",
            Outcome::Defeat(DefeatReason::WallCaught) => "defeat: caught by the wall",
            Outcome::Defeat(DefeatReason::ArmyDestroyed) => "defeat: army destroyed",
            Outcome::Defeat(DefeatReason::EnemyCollision) => "defeat: overrun by an enemy",
        }
    }
}

/// Everything a presenter needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile layout.
    pub grid: GridPresentation,
    /// Gate annotations in id order.
    pub gates: Vec<GatePresentation>,
    /// Cell occupied by the player.
    pub player_cell: CellCoord,
    /// Pixel-space centre of the player.
    pub player: Vec2,
    /// Cell holding the exit.
    pub exit: CellCoord,
    /// Soldier positions of the army formation.
    pub soldiers: Vec<Vec2>,
    /// Live enemies.
    pub enemies: Vec<EnemyPresentation>,
    /// Live projectile positions.
    pub projectiles: Vec<Vec2>,
    /// Heads-up display values.
    pub hud: Hud,
}

impl Scene {
    /// Captures the current state of `world`.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        let map = query::map(world);
        let grid = GridPresentation {
            columns: map.columns(),
            rows: map.rows(),
            tile_size: query::config(world).tile_size,
            tiles: map.cells().map(|(_, tile)| tile).collect(),
            wall_level: query::wall_level(world),
        };
        let gates = query::gates(world)
            .into_iter()
            .map(|gate| GatePresentation {
                id: gate.id,
                cell: gate.cell,
                operation: gate.operation,
                value: gate.value,
                collected: gate.collected,
            })
            .collect();
        let enemies = query::enemies(world)
            .map(|(id, enemy)| EnemyPresentation {
                id,
                kind: enemy.kind,
                position: enemy.position,
                hp: enemy.hp,
            })
            .collect();

        Self {
            grid,
            gates,
            player_cell: query::player_cell(world),
            player: query::player_center(world),
            exit: query::exit_cell(world),
            soldiers: query::soldiers(world)
                .map(|soldier| soldier.position)
                .collect(),
            enemies,
            projectiles: query::projectiles(world)
                .map(|projectile| projectile.position)
                .collect(),
            hud: Hud {
                level_name: query::level_name(world).to_owned(),
                level_index: query::level_index(world),
                level_count: query::level_count(world),
                army: query::army(world),
                moves: query::moves(world),
                collected: query::collectibles_taken(world),
                total: query::collectibles_total(world),
                wall_level: query::wall_level(world),
                outcome: query::outcome(world),
            },
        }
    }
}

/// Sink that displays captured scenes.
pub trait Presenter {
    /// Displays a single frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Presenter that writes ASCII frames to a byte sink.
///
/// Legend: `#` wall, `=` risen wall, `.` floor, gate operation symbol on
/// uncollected gates, `E`/`e` open/locked exit, `@` player, `p`/`c`/`v`
/// patrol/chaser/faller enemies and `|` projectiles.
#[derive(Debug)]
pub struct TextPresenter<W> {
    out: W,
}

impl<W: Write> TextPresenter<W> {
    /// Creates a presenter writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        self.out
            .write_all(render_text(scene).as_bytes())
            .context("failed to write frame")?;
        self.out.flush().context("failed to flush frame")
    }
}

/// Renders `scene` as an ASCII frame followed by the HUD.
#[must_use]
pub fn render_text(scene: &Scene) -> String {
    let grid = &scene.grid;
    let width = grid.columns as usize;
    let mut canvas: Vec<Vec<char>> = (0..grid.rows)
        .map(|row| {
            (0..grid.columns)
                .map(|column| tile_glyph(scene, CellCoord::new(column, row)))
                .collect()
        })
        .collect();

    let mut paint = |position: Vec2, glyph: char| {
        if let Some(cell) = grid.cell_at(position) {
            if let Some(slot) = canvas
                .get_mut(cell.row() as usize)
                .and_then(|row| row.get_mut(cell.column() as usize))
            {
                *slot = glyph;
            }
        }
    };
    for projectile in &scene.projectiles {
        paint(*projectile, '|');
    }
    for enemy in &scene.enemies {
        let glyph = match enemy.kind {
            EnemyKind::Patrol => 'p',
            EnemyKind::Chaser => 'c',
            EnemyKind::Faller => 'v',
        };
        paint(enemy.position, glyph);
    }
    paint(scene.player, '@');

    let hud = &scene.hud;
    let mut frame = String::with_capacity((width + 1) * canvas.len() + 128);
    for row in canvas {
        frame.extend(row);
        frame.push('\n');
    }
    frame.push_str(&format!(
        "{} ({}/{}) | army {} | moves {} | gates {}/{} | wall {} | {}\n",
        hud.level_name,
        hud.level_index + 1,
        hud.level_count,
        hud.army,
        hud.moves,
        hud.collected,
        hud.total,
        hud.wall_level,
        hud.status(),
    ));
    let pending: Vec<String> = scene
        .gates
        .iter()
        .filter(|gate| !gate.collected)
        .map(|gate| format!("{} {}", gate.cell, gate.label()))
        .collect();
    if !pending.is_empty() {
        frame.push_str(&format!("gates: {}\n", pending.join(", ")));
    }
    frame
}

fn tile_glyph(scene: &Scene, cell: CellCoord) -> char {
    match scene.grid.tile(cell) {
        Some(Tile::Wall) if scene.grid.is_risen(cell.row()) => '=',
        Some(Tile::Wall) | None => '#',
        Some(Tile::Floor) => '.',
        Some(Tile::Exit) if scene.hud.collected >= scene.hud.total => 'E',
        Some(Tile::Exit) => 'e',
        Some(Tile::Collectible) => scene
            .gates
            .iter()
            .find(|gate| gate.cell == cell)
            .map_or('?', |gate| gate.operation.symbol()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_runner_core::{Command, Direction};
    use gate_runner_world::{apply, GameConfig};

    const LEVEL: &str = "111111\n1P0CE1\n10C001\n100001\n111111\n";

    fn calm_world() -> World {
        let mut config = GameConfig::default();
        config.enemies.spawn_chance = 0.0;
        World::from_map_source(config, LEVEL).expect("level loads")
    }

    #[test]
    fn capture_mirrors_world_queries() {
        let world = calm_world();
        let scene = Scene::capture(&world);

        assert_eq!(scene.grid.columns, 6);
        assert_eq!(scene.grid.rows, 5);
        assert_eq!(scene.player_cell, CellCoord::new(1, 1));
        assert_eq!(scene.gates.len(), 2);
        assert_eq!(scene.gates[0].operation, GateOp::Add);
        assert_eq!(scene.soldiers.len(), 30);
        assert_eq!(scene.hud.total, 2);
        assert_eq!(scene.hud.status(), "running");
    }

    #[test]
    fn text_frame_marks_player_gates_and_locked_exit() {
        let scene = Scene::capture(&calm_world());
        let frame = render_text(&scene);
        let lines: Vec<&str> = frame.lines().collect();

        assert_eq!(lines[0], "######");
        assert_eq!(lines[1], "#@.+e#");
        assert_eq!(lines[2], "#.*..#");
        assert!(lines[5].starts_with("level 1 (1/1) | army 30 | moves 0 | gates 0/2 | wall 4"));
        assert!(lines[6].starts_with("gates: (3, 1) +"));
    }

    #[test]
    fn risen_rows_render_distinctly() {
        let mut config = GameConfig::default();
        config.enemies.spawn_chance = 0.0;
        config.auto_step_ms = 3_600_000;
        let mut world = World::from_map_source(config, LEVEL).expect("level loads");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                now: std::time::Duration::ZERO,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                now: std::time::Duration::from_millis(1_200),
            },
            &mut events,
        );

        let frame = render_text(&Scene::capture(&world));
        assert_eq!(frame.lines().nth(3), Some("======"));
        assert_eq!(frame.lines().nth(4), Some("######"));
    }

    #[test]
    fn text_presenter_writes_frames_to_its_sink() {
        let mut world = calm_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Move {
                direction: Direction::Right,
            },
            &mut events,
        );

        let mut presenter = TextPresenter::new(Vec::new());
        presenter
            .present(&Scene::capture(&world))
            .expect("in-memory write succeeds");
        let written = String::from_utf8(presenter.into_inner()).expect("ascii frame");

        assert!(written.contains("#.@+e#"));
        assert!(written.contains("moves 1"));
    }
}
