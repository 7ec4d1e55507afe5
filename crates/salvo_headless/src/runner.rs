//! Single-game execution.
//!
//! Runs one seeded session at the scenario's fixed step, driving it with
//! the scenario's autopilot and collecting metrics until the game ends or
//! the tick limit runs out.
//!
//! - The loop is bounded by the scenario's `max_ticks`
//! - Progress is logged at regular intervals
//! - Slow ticks are reported, not fatal

use std::time::Instant;

use tracing::{debug, info, warn};

use salvo_core::simulation::Simulation;

use crate::metrics::{GameMetrics, MetricsCollector, Outcome};
use crate::scenario::{Scenario, ScenarioError};

/// Progress logging interval (ticks).
const PROGRESS_LOG_INTERVAL: u64 = 1000;

/// Wall-clock time above which a single tick is reported as slow.
const SLOW_TICK_THRESHOLD_MS: u128 = 100;

/// Configuration for a single game run.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Scenario to play.
    pub scenario: Scenario,
    /// Random seed for determinism.
    pub seed: u64,
    /// Game ID for tracking.
    pub game_id: String,
}

impl GameConfig {
    /// Play `scenario` with its own seed.
    #[must_use]
    pub fn new(scenario: Scenario) -> Self {
        let seed = scenario.seed;
        Self::with_seed(scenario, seed)
    }

    /// Play `scenario` with `seed` instead of the scenario's.
    #[must_use]
    pub fn with_seed(scenario: Scenario, seed: u64) -> Self {
        Self {
            game_id: format!("{}_{seed}", scenario.name),
            scenario,
            seed,
        }
    }
}

/// Result of running a game.
#[derive(Debug, Clone)]
pub struct GameResult {
    /// Collected metrics, final hash included.
    pub metrics: GameMetrics,
    /// The session as it stood when the run stopped.
    pub simulation: Simulation,
}

/// Run one game to completion or timeout.
///
/// # Errors
///
/// Returns [`ScenarioError::Config`] if the scenario's tuning table or
/// step is rejected.
pub fn run_game(config: &GameConfig) -> Result<GameResult, ScenarioError> {
    let scenario = &config.scenario;
    let game_start = Instant::now();
    info!(
        game_id = %config.game_id,
        seed = config.seed,
        max_ticks = scenario.max_ticks,
        scenario = %scenario.name,
        "Starting game simulation"
    );

    let mut sim = Simulation::new(scenario.simulation_config(config.seed)?)?;
    let mut collector = MetricsCollector::new(&config.game_id, &scenario.name, config.seed);

    while sim.tick_count() < scenario.max_ticks {
        let tick_start = Instant::now();
        let input = scenario.autopilot.input(&sim);
        let events = sim.tick(scenario.step, &input);
        collector.set_tick(sim.tick_count());
        collector.on_tick(&events);

        let elapsed = tick_start.elapsed().as_millis();
        if elapsed > SLOW_TICK_THRESHOLD_MS {
            warn!(
                tick = sim.tick_count(),
                duration_ms = elapsed,
                enemies = sim.enemies().len(),
                bullets = sim.bullets().len(),
                "Slow tick detected"
            );
        }

        if sim.tick_count() % PROGRESS_LOG_INTERVAL == 0 {
            debug!(
                tick = sim.tick_count(),
                max_ticks = scenario.max_ticks,
                enemies = sim.enemies().len(),
                health = sim.player().body.health,
                tokens_left = sim.win_slots().remaining().count(),
                "Game progress"
            );
        }

        if sim.state().is_finished() {
            break;
        }
    }

    let outcome = Outcome::from_state(sim.state()).unwrap_or(Outcome::Timeout);
    let metrics = collector.finalize(outcome, sim.state_hash());

    info!(
        game_id = %config.game_id,
        duration_ticks = metrics.duration_ticks,
        duration_ms = game_start.elapsed().as_millis(),
        outcome = ?metrics.outcome,
        kills = metrics.total_kills(),
        tokens = metrics.tokens_collected,
        "Game simulation complete"
    );

    Ok(GameResult {
        metrics,
        simulation: sim,
    })
}
