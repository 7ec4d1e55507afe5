//! Batch game runner for balance testing.
//!
//! Runs one scenario over a range of seeds in parallel using rayon. Each
//! game is still a single-threaded simulation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, GameMetrics, Outcome};
use crate::runner::{run_game, GameConfig};
use crate::scenario::{Scenario, ScenarioError};

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario name or path, for the record
    pub scenario: String,
    /// Number of games to run
    pub game_count: u32,
    /// Maximum parallel games (0 = use rayon default)
    pub parallel_games: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// Starting seed; game `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Tick limit override
    pub max_ticks: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: "standard".to_string(),
            game_count: 100,
            parallel_games: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
            max_ticks: None,
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario
    pub fn new(scenario: &str, game_count: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            game_count,
            ..Default::default()
        }
    }

    /// Set output directory
    #[must_use]
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the tick limit
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual game metrics, in seed order
    pub games: Vec<GameMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Game index
    pub game_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Progress tracking for batch runs
#[derive(Debug)]
pub struct BatchProgress {
    /// Total games
    pub total: u32,
    completed: AtomicU32,
    wins: AtomicU32,
    start_time: Instant,
}

impl BatchProgress {
    /// Create new progress tracker
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
            wins: AtomicU32::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed game
    pub fn record_completion(&self, outcome: Outcome) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if outcome == Outcome::Won {
            self.wins.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current completion count
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get completion percentage
    pub fn percentage(&self) -> f64 {
        f64::from(self.current()) / f64::from(self.total.max(1)) * 100.0
    }

    /// Win rate over the games finished so far
    pub fn current_win_rate(&self) -> f64 {
        let completed = self.current();
        if completed == 0 {
            return 0.0;
        }
        f64::from(self.wins.load(Ordering::Relaxed)) / f64::from(completed)
    }

    /// Get estimated time remaining
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::from_secs(0);
        }

        let elapsed = self.start_time.elapsed();
        let per_game = elapsed.as_secs_f64() / f64::from(completed);
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_game * f64::from(remaining))
    }
}

/// Run a batch of games
pub fn run_batch(config: BatchConfig, scenario: &Scenario) -> BatchResults {
    let start = Instant::now();
    let progress = BatchProgress::new(config.game_count);

    let mut scenario = scenario.clone();
    if let Some(max_ticks) = config.max_ticks {
        scenario.max_ticks = max_ticks;
    }

    info!(
        "Starting batch run: {} games of '{}'",
        config.game_count, config.scenario
    );

    let play = || -> Vec<Result<GameMetrics, BatchError>> {
        (0..config.game_count)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed_start.wrapping_add(u64::from(i));
                match run_game(&GameConfig::with_seed(scenario.clone(), seed)) {
                    Ok(result) => {
                        progress.record_completion(result.metrics.outcome);
                        let completed = progress.current();
                        if completed % 10 == 0 {
                            debug!(
                                completed,
                                total = config.game_count,
                                percent = format!("{:.0}", progress.percentage()),
                                win_rate = format!("{:.2}", progress.current_win_rate()),
                                eta_secs = progress.eta().as_secs(),
                                "Batch progress"
                            );
                        }
                        Ok(result.metrics)
                    }
                    Err(e) => {
                        warn!("Game {} failed: {}", i, e);
                        Err(BatchError {
                            game_index: i,
                            seed,
                            message: e.to_string(),
                        })
                    }
                }
            })
            .collect()
    };

    let results = if config.parallel_games > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build()
        {
            Ok(pool) => pool.install(play),
            Err(e) => {
                warn!("Failed to build thread pool: {}, using the global pool", e);
                play()
            }
        }
    } else {
        play()
    };

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameMetrics> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({:.1} games/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(0.001)
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Verify determinism by running the same seed several times.
///
/// Returns the final state hash of every run, in order.
///
/// # Errors
///
/// Returns the scenario's configuration error, if any.
pub fn verify_determinism(scenario: &Scenario, seed: u64, runs: u32) -> Result<Vec<u64>, ScenarioError> {
    (0..runs)
        .map(|_| {
            run_game(&GameConfig::with_seed(scenario.clone(), seed))
                .map(|result| result.metrics.final_state_hash)
        })
        .collect()
}

/// Whether every hash matches the first.
#[must_use]
pub fn all_equal(hashes: &[u64]) -> bool {
    hashes.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short() -> Scenario {
        Scenario::standard().with_max_ticks(240)
    }

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.game_count, 100);
        assert_eq!(config.scenario, "standard");
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new("custom_scenario", 500)
            .with_output(PathBuf::from("/tmp/results"))
            .with_seed(12345)
            .with_max_ticks(60);

        assert_eq!(config.scenario, "custom_scenario");
        assert_eq!(config.game_count, 500);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.max_ticks, Some(60));
    }

    #[test]
    fn test_progress_tracking() {
        let progress = BatchProgress::new(100);
        assert_eq!(progress.current(), 0);
        assert_eq!(progress.percentage(), 0.0);

        progress.record_completion(Outcome::Won);
        progress.record_completion(Outcome::Lost);
        progress.record_completion(Outcome::Won);

        assert_eq!(progress.current(), 3);
        assert!((progress.current_win_rate() - 0.666).abs() < 0.01);
    }

    #[test]
    fn test_run_batch_small() {
        let results = run_batch(BatchConfig::new("standard", 6).with_seed(40), &short());

        assert_eq!(results.games.len(), 6);
        assert!(results.errors.is_empty());
        assert_eq!(results.summary.total_games, 6);
        let seeds: Vec<u64> = results.games.iter().map(|game| game.seed).collect();
        assert_eq!(seeds, (40..46).collect::<Vec<_>>());
    }

    #[test]
    fn test_max_ticks_override() {
        let results = run_batch(BatchConfig::new("standard", 2).with_max_ticks(30), &short());
        assert!(results.games.iter().all(|game| game.duration_ticks <= 30));
    }

    #[test]
    fn test_thread_count_does_not_change_results() {
        let mut config = BatchConfig::new("standard", 4);
        let serial = {
            config.parallel_games = 1;
            run_batch(config.clone(), &short())
        };
        config.parallel_games = 4;
        let parallel = run_batch(config, &short());
        assert_eq!(serial.games, parallel.games);
    }

    #[test]
    fn test_invalid_scenario_reports_errors() {
        let mut scenario = short();
        scenario.step = -1.0;
        let results = run_batch(BatchConfig::new("broken", 3), &scenario);
        assert!(results.games.is_empty());
        assert_eq!(results.errors.len(), 3);
        assert_eq!(results.summary, BatchSummary::default());
    }

    #[test]
    fn test_verify_determinism() {
        let hashes = verify_determinism(&short(), 12345, 3).unwrap();
        assert_eq!(hashes.len(), 3);
        assert!(all_equal(&hashes));
    }

    #[test]
    fn test_batch_results_save_load() {
        let results = run_batch(BatchConfig::new("standard", 3), &short());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.games, results.games);
        assert_eq!(loaded.config, results.config);
    }
}
