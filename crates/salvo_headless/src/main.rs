//! Headless Salvo game runner.
//!
//! Plays sessions without graphics, driven by a scripted autopilot.
//! Designed for balance runs, CI testing and determinism checks.
//!
//! # Usage
//!
//! ```bash
//! # Run a single game of a built-in scenario or a scenario file
//! cargo run -p salvo_headless -- run --scenario scenarios/fixed.ron
//!
//! # Run a batch over 1000 seeds
//! cargo run -p salvo_headless -- batch --scenario standard --count 1000 --output results/
//!
//! # Verify determinism
//! cargo run -p salvo_headless -- verify --scenario standard --seed 12345 --runs 5
//!
//! # Print the default tuning table, or check a tuning file
//! cargo run -p salvo_headless -- config
//! cargo run -p salvo_headless -- config --check my_tuning.ron
//! ```
//!
//! Results (stdout): JSON
//! Logs (stderr): human-readable, filtered by `--verbose` and `RUST_LOG`

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use salvo_core::config::TuningConfig;
use salvo_headless::{
    batch::{all_equal, run_batch, verify_determinism, BatchConfig},
    runner::{run_game, GameConfig},
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "salvo_headless")]
#[command(about = "Headless Salvo runner for autopilot playtesting and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single game and print its metrics
    Run {
        /// Built-in scenario name (standard, fixed, empty) or RON file
        #[arg(short, long, default_value = "standard")]
        scenario: String,

        /// Seed override
        #[arg(long)]
        seed: Option<u64>,

        /// Tick limit override
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Write metrics to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a batch of games for balance testing
    Batch {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "standard")]
        scenario: String,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Tick limit override
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "standard")]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        /// Tick limit override
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Print the default tuning table as RON
    Config {
        /// Validate this tuning file instead
        #[arg(long)]
        check: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is for results
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            seed,
            max_ticks,
            output,
        } => cmd_run(&scenario, seed, max_ticks, output),
        Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            max_ticks,
        } => cmd_batch(&scenario, count, parallel, output, seed, max_ticks),
        Commands::Verify {
            scenario,
            seed,
            runs,
            max_ticks,
        } => cmd_verify(&scenario, seed, runs, max_ticks),
        Commands::Config { check } => cmd_config(check),
    }
}

fn load_scenario(name: &str, max_ticks: Option<u64>) -> Scenario {
    match Scenario::resolve(name) {
        Ok(scenario) => match max_ticks {
            Some(max_ticks) => scenario.with_max_ticks(max_ticks),
            None => scenario,
        },
        Err(e) => {
            eprintln!("Failed to load scenario: {e}");
            std::process::exit(1);
        }
    }
}

/// Run a single game
fn cmd_run(name: &str, seed: Option<u64>, max_ticks: Option<u64>, output: Option<PathBuf>) {
    let scenario = load_scenario(name, max_ticks);
    let seed = seed.unwrap_or(scenario.seed);
    tracing::info!(scenario = %scenario.name, seed, "Running single game");

    let result = match run_game(&GameConfig::with_seed(scenario, seed)) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    let json = match serde_json::to_string_pretty(&result.metrics) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("FATAL: Failed to serialize metrics: {e}");
            std::process::exit(1);
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, json) {
                eprintln!("FATAL: Failed to write '{}': {e}", path.display());
                std::process::exit(1);
            }
            eprintln!("Metrics saved to: {}", path.display());
        }
        None => println!("{json}"),
    }
}

/// Run batch of games for balance testing
fn cmd_batch(
    name: &str,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    max_ticks: Option<u64>,
) {
    let scenario = load_scenario(name, None);

    let num_cpus = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);
    tracing::info!(
        scenario = %scenario.name,
        count,
        parallel,
        seed,
        output = %output.display(),
        cpus_available = num_cpus,
        max_ticks = max_ticks.unwrap_or(scenario.max_ticks),
        "Batch configuration"
    );

    if let Err(e) = std::fs::create_dir_all(&output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to create output directory");
        eprintln!("FATAL: Cannot create output directory '{}': {e}", output.display());
        std::process::exit(1);
    }

    let mut config = BatchConfig::new(name, count)
        .with_output(output.clone())
        .with_seed(seed);
    config.parallel_games = parallel;
    config.max_ticks = max_ticks;

    let results = run_batch(config, &scenario);

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        tracing::error!(error = %e, path = %results_path.display(), "Failed to save results");
        eprintln!("FATAL: Failed to save results: {e}");
        std::process::exit(1);
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Games played: {}", results.games.len());
    if !results.errors.is_empty() {
        eprintln!("Games FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Won / lost / timed out: {} / {} / {}",
        summary.wins, summary.losses, summary.timeouts
    );
    eprintln!("Win rate: {:.1}%", summary.win_rate * 100.0);
    eprintln!("Average duration: {:.0} ticks", summary.avg_duration_ticks);
    eprintln!("Average tokens: {:.2}", summary.avg_tokens_collected);
    eprintln!("\nAverage kills:");
    let mut kills: Vec<_> = summary.avg_kills.iter().collect();
    kills.sort_by(|a, b| a.0.cmp(b.0));
    for (kind, avg) in kills {
        eprintln!("  {kind}: {avg:.2}");
    }

    for error in results.errors.iter().take(10) {
        eprintln!("  Game {} (seed {}): {}", error.game_index, error.seed, error.message);
    }

    eprintln!("\nResults saved to: {}", results_path.display());
}

/// Verify determinism
fn cmd_verify(name: &str, seed: u64, runs: u32, max_ticks: Option<u64>) {
    let scenario = load_scenario(name, max_ticks);
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    let hashes = match verify_determinism(&scenario, seed, runs) {
        Ok(hashes) => hashes,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    if all_equal(&hashes) {
        eprintln!("PASS: All {runs} runs produced identical results");
        if let Some(hash) = hashes.first() {
            eprintln!("  State hash: {hash:016x}");
        }
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        for (run, hash) in hashes.iter().enumerate() {
            eprintln!("  Run {run}: {hash:016x}");
        }
        std::process::exit(1);
    }
}

/// Print or check a tuning table
fn cmd_config(check: Option<PathBuf>) {
    if let Some(path) = check {
        match TuningConfig::load(&path) {
            Ok(_) => eprintln!("OK: {} is a valid tuning table", path.display()),
            Err(e) => {
                eprintln!("FAIL: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    match TuningConfig::default().to_ron_string() {
        Ok(ron) => println!("{ron}"),
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    }
}
