use std::time::Duration;

use anyhow::Result;
use gate_runner_core::{Command, Event, Outcome};
use gate_runner_rendering::{Presenter, Scene};
use gate_runner_world::{apply, query, World};
use serde::Serialize;
use tracing::{debug, info};

use crate::script::{MoveScript, ScriptedInput};

/// Knobs of a headless run.
#[derive(Clone, Debug)]
pub(crate) struct SessionOptions {
    /// Upper bound on simulated frames.
    pub(crate) frames: u64,
    /// Virtual time between two frames.
    pub(crate) frame_time: Duration,
    /// Frames between two scripted inputs; zero disables the script.
    pub(crate) move_every: u64,
    /// Frames between two shots; zero disables shooting.
    pub(crate) shoot_every: u64,
}

/// Counters gathered from the event stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct EventTally {
    pub(crate) manual_moves: u32,
    pub(crate) auto_steps: u32,
    pub(crate) gates_collected: u32,
    pub(crate) locked_exit_visits: u32,
    pub(crate) wall_rises: u32,
    pub(crate) projectiles_fired: u32,
    pub(crate) enemies_hit: u32,
    pub(crate) enemies_destroyed: u32,
    pub(crate) player_struck: u32,
    pub(crate) levels_started: u32,
}

impl EventTally {
    fn record(&mut self, event: &Event) {
        use gate_runner_core::StepCause;

        let counter = match event {
            Event::PlayerMoved {
                cause: StepCause::Manual,
                ..
            } => &mut self.manual_moves,
            Event::PlayerMoved {
                cause: StepCause::Auto,
                ..
            } => &mut self.auto_steps,
            Event::GateApplied { .. } => &mut self.gates_collected,
            Event::ExitLocked { .. } => &mut self.locked_exit_visits,
            Event::WallRose { .. } => &mut self.wall_rises,
            Event::ProjectilesFired { count } => {
                self.projectiles_fired = self.projectiles_fired.saturating_add(*count);
                return;
            }
            Event::EnemyHit { .. } => &mut self.enemies_hit,
            Event::EnemyDestroyed { .. } => &mut self.enemies_destroyed,
            Event::PlayerStruck { .. } => &mut self.player_struck,
            Event::LevelStarted { .. } => &mut self.levels_started,
            Event::TimeAdvanced { .. } | Event::OutcomeChanged { .. } | Event::QuitRequested => {
                return
            }
        };
        *counter = counter.saturating_add(1);
    }
}

/// Final state of a headless run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Summary {
    pub(crate) level: String,
    pub(crate) level_index: usize,
    pub(crate) level_count: usize,
    pub(crate) outcome: Outcome,
    pub(crate) campaign_complete: bool,
    pub(crate) quit: bool,
    pub(crate) frames: u64,
    pub(crate) elapsed_ms: u128,
    pub(crate) army: i64,
    pub(crate) moves: u32,
    pub(crate) collected: u32,
    pub(crate) total: u32,
    pub(crate) wall_level: u32,
    pub(crate) events: EventTally,
}

/// Drives `world` frame by frame until the run ends or the frame budget runs out.
///
/// Each frame replays at most one scripted input, fires when due, then ticks.
/// A victory on a level with a successor advances the campaign.
pub(crate) fn run(
    world: &mut World,
    options: &SessionOptions,
    mut script: MoveScript,
    mut presenter: Option<&mut dyn Presenter>,
) -> Result<Summary> {
    let mut tally = EventTally::default();
    let mut events = Vec::new();
    let mut frames = 0;
    let mut now = Duration::ZERO;

    while frames < options.frames {
        now = options.frame_time.saturating_mul(u32::try_from(frames).unwrap_or(u32::MAX));
        events.clear();

        if options.move_every > 0 && frames % options.move_every == 0 {
            match script.next() {
                Some(ScriptedInput::Move(direction)) => {
                    apply(world, Command::Move { direction }, &mut events);
                }
                Some(ScriptedInput::Quit) => apply(world, Command::Quit, &mut events),
                None => {}
            }
        }
        if options.shoot_every > 0 && frames % options.shoot_every == 0 {
            apply(world, Command::Shoot { now }, &mut events);
        }
        apply(world, Command::Tick { now }, &mut events);
        frames += 1;

        if query::outcome(world) == Outcome::Victory && !query::campaign_complete(world) {
            apply(world, Command::NextLevel, &mut events);
        }

        for event in &events {
            tally.record(event);
        }
        if let Some(presenter) = presenter.as_deref_mut() {
            presenter.present(&Scene::capture(world))?;
        }

        if query::quit_requested(world) || query::outcome(world).is_terminal() {
            break;
        }
    }

    debug!(unplayed = script.remaining(), "script finished");
    let summary = Summary {
        level: query::level_name(world).to_owned(),
        level_index: query::level_index(world),
        level_count: query::level_count(world),
        outcome: query::outcome(world),
        campaign_complete: query::campaign_complete(world),
        quit: query::quit_requested(world),
        frames,
        elapsed_ms: now.as_millis(),
        army: query::army(world),
        moves: query::moves(world),
        collected: query::collectibles_taken(world),
        total: query::collectibles_total(world),
        wall_level: query::wall_level(world),
        events: tally,
    };
    info!(
        outcome = ?summary.outcome,
        frames = summary.frames,
        army = summary.army,
        "session finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_runner_core::DefeatReason;
    use gate_runner_rendering::TextPresenter;
    use gate_runner_world::{Campaign, GameConfig, Level};

    fn calm_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.enemies.spawn_chance = 0.0;
        config
    }

    fn options(frames: u64) -> SessionOptions {
        SessionOptions {
            frames,
            frame_time: Duration::from_millis(100),
            move_every: 1,
            shoot_every: 0,
        }
    }

    #[test]
    fn scripted_run_clears_a_two_level_campaign() {
        let campaign = Campaign::new(vec![
            Level::parse("first", "11111\n1PCE1\n10001\n10001\n11111").expect("valid"),
            Level::parse("second", "1111\n1PC1\n10E1\n1111").expect("valid"),
        ])
        .expect("non-empty");
        let mut world = World::new(calm_config(), campaign);
        let script = MoveScript::parse("dd ds").expect("valid script");

        let summary = run(&mut world, &options(50), script, None).expect("session runs");

        assert_eq!(summary.outcome, Outcome::Victory);
        assert!(summary.campaign_complete);
        assert_eq!(summary.level, "second");
        assert_eq!(summary.events.levels_started, 1);
        assert_eq!(summary.events.gates_collected, 2);
        assert_eq!(summary.frames, 4);
    }

    #[test]
    fn idle_player_is_caught_by_the_wall() {
        let mut config = calm_config();
        config.auto_step_ms = 3_600_000;
        let mut world = World::from_map_source(config, "11111\n1C0E1\n10001\n10P01\n11111")
            .expect("valid map");

        let summary = run(&mut world, &options(100), MoveScript::default(), None)
            .expect("session runs");

        assert_eq!(summary.outcome, Outcome::Defeat(DefeatReason::WallCaught));
        assert_eq!(summary.events.wall_rises, 1);
        assert_eq!(summary.frames, 13);
    }

    #[test]
    fn quit_key_stops_the_session() {
        let mut world = World::from_map_source(calm_config(), "11111\n1PCE1\n10001\n10001\n11111")
            .expect("valid map");
        let script = MoveScript::parse("q").expect("valid script");

        let summary = run(&mut world, &options(100), script, None).expect("session runs");

        assert!(summary.quit);
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.outcome, Outcome::InProgress);
    }

    #[test]
    fn rendering_writes_one_frame_per_tick() {
        let mut world = World::from_map_source(calm_config(), "11111\n1PCE1\n10001\n10001\n11111")
            .expect("valid map");
        let mut presenter = TextPresenter::new(Vec::new());

        let _ = run(
            &mut world,
            &options(3),
            MoveScript::default(),
            Some(&mut presenter),
        )
        .expect("session runs");

        let output = String::from_utf8(presenter.into_inner()).expect("ascii output");
        assert_eq!(output.matches("| army ").count(), 3);
    }

    #[test]
    fn summary_serialises_to_json() {
        let mut world = World::from_map_source(calm_config(), "11111\n1PCE1\n10001\n10001\n11111")
            .expect("valid map");
        let summary = run(&mut world, &options(2), MoveScript::default(), None).expect("runs");

        let json = serde_json::to_value(&summary).expect("summary serialises");
        assert_eq!(json["outcome"], "InProgress");
        assert_eq!(json["frames"], 2);
        assert_eq!(json["events"]["levels_started"], 0);
    }
}
