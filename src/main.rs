//! Headless aquarium runner
//!
//! Runs the simulation with the autopilot steering the player and prints a
//! JSON summary (and optionally the final arena snapshot).

use std::path::PathBuf;
use std::process::ExitCode;

use aquarium_sim::consts::SIM_DT;
use aquarium_sim::sim::{AquariumScene, AquariumSnapshot, GamePhase, TickInput, tick};
use aquarium_sim::Settings;
use clap::Parser;
use serde::Serialize;

/// Headless aquarium runner - autopilot plays the scripted levels
#[derive(Parser, Debug)]
#[command(name = "aquarium-sim")]
#[command(about = "Run the aquarium simulation headless and report the outcome")]
struct Args {
    /// Settings file (JSON); stock tuning when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum frames to simulate
    #[arg(long, default_value_t = 60 * 60 * 5)]
    max_ticks: u64,

    /// Arena width override
    #[arg(long)]
    width: Option<f32>,

    /// Arena height override
    #[arg(long)]
    height: Option<f32>,

    /// Include the final arena snapshot in the output
    #[arg(long)]
    dump_state: bool,

    /// Write the effective settings to this file and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

/// JSON output structure
#[derive(Serialize)]
struct RunResult {
    outcome: &'static str,
    ticks: u64,
    level: usize,
    score: u64,
    lives: u32,
    power: u32,
    seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<AquariumSnapshot>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(width) = args.width {
        settings.arena.width = width;
    }
    if let Some(height) = args.height {
        settings.arena.height = height;
    }
    if let Err(e) = settings.validate() {
        log::error!("Invalid settings: {}", e);
        return ExitCode::FAILURE;
    }

    if let Some(path) = &args.write_config {
        return match settings.save(path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("Failed to write {}: {}", path.display(), e);
                ExitCode::FAILURE
            }
        };
    }

    log::info!(
        "Aquarium starting: {}x{} arena, {} levels, seed {}",
        settings.arena.width,
        settings.arena.height,
        settings.levels.len(),
        settings.seed
    );

    let result = run(&settings, &args);

    match serde_json::to_string_pretty(&result) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize result: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings, args: &Args) -> RunResult {
    let mut scene = AquariumScene::from_settings(settings);
    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    while scene.frame() < args.max_ticks && scene.phase() == GamePhase::Playing {
        tick(&mut scene, &input, SIM_DT);
        let event = scene.last_event();
        if event.is_new_level() || event.is_collision_event() || event.is_power_up_event() {
            log::info!("[{}] {}", scene.frame(), event);
        }
    }

    summarize(&scene, settings.seed, args.dump_state)
}

fn summarize(scene: &AquariumScene, seed: u64, dump_state: bool) -> RunResult {
    let outcome = match scene.phase() {
        GamePhase::GameOver => "game_over",
        GamePhase::Finished => "complete",
        GamePhase::Playing | GamePhase::Paused => "timeout",
    };
    RunResult {
        outcome,
        ticks: scene.frame(),
        level: scene.aquarium.current_level().number(),
        score: scene.player.score(),
        lives: scene.player.lives(),
        power: scene.player.power(),
        seed,
        snapshot: dump_state.then(|| scene.aquarium.snapshot()),
    }
}
