//! GeoZ Headless Simulation Harness
//!
//! Generates a scenario, runs it for a number of turns and validates the
//! board after every step. Runs entirely in-process with no window.
//!
//! Usage:
//!   cargo run -p geoz-simtest
//!   cargo run -p geoz-simtest -- --turns 200 --seed 7 --map --verbose
//!   cargo run -p geoz-simtest -- --config scenario.json --save run.bin
//!   cargo run -p geoz-simtest -- --save          # writes geoz_save.bin

use std::path::PathBuf;

use clap::Parser;
use geoz_core::engine::PLAYER_DIED;
use geoz_core::persistence::{load_game, DEFAULT_SAVE_FILE};
use geoz_core::prelude::*;
use geoz_core::systems::NOTHING_TO_DO;
use log::{error, info};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "geoz-simtest")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Turns to simulate
    #[arg(short, long, default_value = "100")]
    turns: u64,

    /// Random seed; overrides the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file with `engine` and/or `scenario` sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the final game to this save file and read it back
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_SAVE_FILE)]
    save: Option<PathBuf>,

    /// Print the terrain map before and after the run
    #[arg(long)]
    map: bool,

    /// Print every check and every event
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HarnessConfig {
    engine: EngineConfig,
    scenario: ScenarioConfig,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if args.verbose {
        "debug"
    } else {
        "warn"
    }))
    .init();

    let mut config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };
    if let Some(seed) = args.seed {
        config.engine.seed = seed;
    }

    println!("=== GeoZ Simulation Harness ===");
    println!(
        "seed {} | {}x{} board | {} turns\n",
        config.engine.seed, config.scenario.width, config.scenario.height, args.turns
    );

    let mut results = Vec::new();

    // 1. Scenario generation
    let mut engine = SimulationEngine::new(config.engine.clone());
    engine.generate(&config.scenario);
    if args.map {
        println!("{}", engine.snapshot());
    }
    results.extend(validate_generation(&engine, &config.scenario));

    // 2. Turn loop
    results.extend(run_turns(&mut engine, args.turns, args.verbose));
    if args.verbose {
        print_player(&engine);
    }

    // 3. Replay with the same seed
    results.extend(validate_determinism(&config, args.turns.min(25)));

    // 4. Player commands
    results.extend(validate_player_commands(&config));

    // 5. Save/load
    results.extend(validate_persistence(&mut engine, args.save.as_ref()));

    if args.map {
        println!("{}", engine.snapshot());
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!("\n=== RESULT: {}/{} passed, {} failed ===", passed, total, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<HarnessConfig, String> {
    let Some(path) = path else {
        return Ok(HarnessConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&json).map_err(|e| format!("bad config {}: {}", path.display(), e))
}

// ── 1. Generation ───────────────────────────────────────────────────────

fn validate_generation(engine: &SimulationEngine, scenario: &ScenarioConfig) -> Vec<TestResult> {
    println!("--- Generation ---");
    let mut results = Vec::new();

    let problems = engine.grid.audit();
    results.push(TestResult::new(
        "generation_audit",
        problems.is_empty(),
        if problems.is_empty() {
            "rosters and cells agree".to_string()
        } else {
            problems.join("; ")
        },
    ));

    let npcs = engine.civilian_count().saturating_sub(1) as u32;
    results.push(TestResult::new(
        "generation_population",
        npcs <= scenario.population.total(),
        format!("{} NPC civilians for {} requested", npcs, scenario.population.total()),
    ));

    let player_ok = engine
        .player_status()
        .is_some_and(|s| s.position == scenario.player_start);
    results.push(TestResult::new(
        "generation_player",
        player_ok,
        format!("player at {}", scenario.player_start),
    ));

    results.push(TestResult::new(
        "generation_counts",
        true,
        format!(
            "{} civilians, {} undead, {} resources",
            engine.civilian_count(),
            engine.undead_count(),
            engine.resource_count()
        ),
    ));

    results
}

// ── 2. Turn loop ────────────────────────────────────────────────────────

fn total_stock(engine: &SimulationEngine) -> u64 {
    engine
        .grid
        .resources()
        .iter()
        .filter_map(|e| engine.grid.world.get::<&Resource>(*e).ok().map(|r| r.quantity as u64))
        .sum()
}

fn run_turns(engine: &mut SimulationEngine, turns: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Turn loop ---");
    let mut results = Vec::new();

    let mut audit_failures = Vec::new();
    let mut stock_grew = 0;
    let mut stock = total_stock(engine);
    let mut event_count = 0usize;
    let mut death_reports = 0usize;

    for _ in 0..turns {
        let events = engine.advance_turn();
        event_count += events.len();
        death_reports += events.iter().filter(|e| e.message == PLAYER_DIED).count();
        if verbose {
            for event in &events {
                println!("  [turn {:>4}] {:?}: {}", engine.turn(), event.category, event.message);
            }
        }

        let problems = engine.grid.audit();
        if !problems.is_empty() {
            audit_failures.push(format!("turn {}: {}", engine.turn(), problems.join("; ")));
        }
        let now = total_stock(engine);
        if now > stock {
            stock_grew += 1;
        }
        stock = now;
    }

    info!("{} events over {} turns", event_count, turns);
    results.push(TestResult::new(
        "turns_audit",
        audit_failures.is_empty(),
        if audit_failures.is_empty() {
            format!("board sound after each of {} turns", turns)
        } else {
            audit_failures.join(" | ")
        },
    ));
    results.push(TestResult::new(
        "turns_resources_non_increasing",
        stock_grew == 0,
        format!("{} units left, grew on {} turn(s)", stock, stock_grew),
    ));
    results.push(TestResult::new(
        "turns_game_over_once",
        death_reports == usize::from(engine.is_game_over()),
        format!("game over: {}, reported {} time(s)", engine.is_game_over(), death_reports),
    ));
    results.push(TestResult::new(
        "turns_log_bounded",
        engine.log.len() <= engine.log.capacity(),
        format!("{} of {} log entries", engine.log.len(), engine.log.capacity()),
    ));

    results
}

fn print_player(engine: &SimulationEngine) {
    let Some(status) = engine.player_status() else {
        println!("  no player on the board");
        return;
    };
    let terrain = engine
        .grid
        .terrain_at(status.position)
        .map_or("off the board", |t| t.name());
    println!(
        "  player at {} ({}): {} health, {} energy{}",
        status.position,
        terrain,
        status.health,
        status.energy,
        if status.alive { "" } else { ", dead" }
    );
    if let Some(turns) = status.infection_turns {
        println!("    infected, {} turn(s) left", turns);
    }
    for (effect, turns) in &status.effects {
        println!("    {} for {} turn(s)", effect.label(), turns);
    }
    for item in &status.inventory {
        println!("    carrying {}", item);
    }
}

// ── 3. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(config: &HarnessConfig, turns: u64) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let run = || {
        let mut engine = SimulationEngine::new(config.engine.clone());
        engine.generate(&config.scenario);
        let events: Vec<SimEvent> = (0..turns).flat_map(|_| engine.advance_turn()).collect();
        (events, engine.snapshot())
    };
    let (events_a, snap_a) = run();
    let (events_b, snap_b) = run();

    vec![TestResult::new(
        "determinism_replay",
        events_a == events_b && snap_a == snap_b,
        format!("{} events over {} turns", events_a.len(), turns),
    )]
}

// ── 4. Player commands ──────────────────────────────────────────────────

fn validate_player_commands(config: &HarnessConfig) -> Vec<TestResult> {
    println!("--- Player commands ---");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::new(config.engine.clone());
    engine.generate(&config.scenario);

    // Walk into the top-left corner; the last steps must be refused
    let steps = config.scenario.width.max(config.scenario.height) + 1;
    let mut refused = false;
    for _ in 0..steps {
        refused |= !engine.move_player(Direction::Left);
        refused |= !engine.move_player(Direction::Up);
    }
    let at_corner = engine
        .player_status()
        .is_some_and(|s| s.position == Position::new(0, 0));
    results.push(TestResult::new(
        "player_bounds",
        refused && engine.grid.audit().is_empty(),
        format!("player reached corner: {}", at_corner),
    ));

    let message = engine.interact();
    let logged = engine.log.recent(1).any(|e| e.message == message);
    results.push(TestResult::new(
        "player_interact",
        !message.is_empty() && logged,
        if message == NOTHING_TO_DO {
            "nothing in the corner cell".to_string()
        } else {
            message
        },
    ));

    results
}

// ── 5. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(engine: &mut SimulationEngine, save: Option<&PathBuf>) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();
    let before = engine.snapshot();

    let mut buffer = Vec::new();
    let roundtrip = engine.save(&mut buffer).and_then(|_| {
        let mut restored = SimulationEngine::new(engine.config().clone());
        restored.load(buffer.as_slice())?;
        Ok(restored.snapshot())
    });
    match roundtrip {
        Ok(after) => results.push(TestResult::new(
            "persistence_roundtrip",
            after == before,
            format!("{} bytes", buffer.len()),
        )),
        Err(e) => results.push(TestResult::new("persistence_roundtrip", false, e.to_string())),
    }

    if let Some(path) = save {
        let saved = engine.save_to_path(path);
        let reloaded = saved.and_then(|_| load_game(path));
        let detail = match &reloaded {
            Ok(Some(loaded)) => format!("turn {} written to {}", loaded.turn, path.display()),
            Ok(None) => format!("{} vanished after saving", path.display()),
            Err(e) => e.to_string(),
        };
        results.push(TestResult::new(
            "persistence_file",
            matches!(reloaded, Ok(Some(_))),
            detail,
        ));
    }

    results
}
