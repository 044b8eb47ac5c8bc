#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that validates Gate Runner levels and plays them headlessly.

mod script;
mod session;

use std::{
    fs,
    io,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gate_runner_rendering::{Presenter, TextPresenter};
use gate_runner_world::{query, Campaign, GameConfig, Level, World};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use script::MoveScript;
use session::SessionOptions;

/// Gate Runner, a maze runner raced by a rising wall.
#[derive(Parser, Debug)]
#[command(name = "gate-runner")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse and validate level files
    Validate {
        /// Level files to check
        #[arg(required = true)]
        maps: Vec<PathBuf>,
    },

    /// Play a campaign headlessly with scripted input
    Simulate {
        /// Level files, played in order
        #[arg(required = true)]
        maps: Vec<PathBuf>,

        /// TOML file overriding the default tuning
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum number of frames to simulate
        #[arg(short, long, default_value = "3000")]
        frames: u64,

        /// Virtual milliseconds per frame
        #[arg(long, default_value = "16")]
        frame_ms: u64,

        /// Scripted keys: w/a/s/d move, q quits
        #[arg(short, long, default_value = "")]
        moves: String,

        /// Frames between scripted keys
        #[arg(long, default_value = "10")]
        move_every: u64,

        /// Frames between shots (0 never shoots)
        #[arg(long, default_value = "0")]
        shoot_every: u64,

        /// Print an ASCII frame after every tick
        #[arg(long)]
        render: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(error) => {
            error!("{error:#}");
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn run(args: Args) -> Result<ExitCode> {
    match args.command {
        Commands::Validate { maps } => Ok(validate(&maps)),
        Commands::Simulate {
            maps,
            config,
            frames,
            frame_ms,
            moves,
            move_every,
            shoot_every,
            render,
            json,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => GameConfig::default(),
            };
            let levels = maps
                .iter()
                .map(|path| load_level(path))
                .collect::<Result<Vec<_>>>()?;
            let campaign = Campaign::new(levels)?;
            let script = MoveScript::parse(&moves).context("invalid --moves script")?;
            let options = SessionOptions {
                frames,
                frame_time: Duration::from_millis(frame_ms),
                move_every,
                shoot_every,
            };

            let mut world = World::new(config, campaign);
            info!("{}", query::welcome_banner(&world));
            info!(
                levels = query::level_count(&world),
                first = query::level_name(&world),
                "campaign loaded"
            );

            let mut presenter = TextPresenter::new(io::stdout().lock());
            let presenter = render.then_some(&mut presenter as &mut dyn Presenter);
            let summary = session::run(&mut world, &options, script, presenter)?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("failed to encode summary")?
                );
            } else {
                println!(
                    "{} ({}/{}): {:?} after {} frames, army {}, moves {}, gates {}/{}, wall {}",
                    summary.level,
                    summary.level_index + 1,
                    summary.level_count,
                    summary.outcome,
                    summary.frames,
                    summary.army,
                    summary.moves,
                    summary.collected,
                    summary.total,
                    summary.wall_level,
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn validate(maps: &[PathBuf]) -> ExitCode {
    let mut failures = 0;
    for path in maps {
        match load_level(path) {
            Ok(level) => println!(
                "ok    {} ({}x{}, {} gates)",
                path.display(),
                level.map().columns(),
                level.map().rows(),
                level.map().collectible_count()
            ),
            Err(error) => {
                failures += 1;
                println!("error {}: {error:#}", path.display());
            }
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn load_level(path: &Path) -> Result<Level> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read level {}", path.display()))?;
    let name = path
        .file_stem()
        .map_or_else(|| path.display().to_string(), |stem| stem.to_string_lossy().into_owned());
    Level::parse(name, &source).with_context(|| format!("{} is not a valid level", path.display()))
}

fn load_config(path: &Path) -> Result<GameConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: GameConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}
