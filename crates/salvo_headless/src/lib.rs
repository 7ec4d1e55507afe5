//! Headless game runner for autopilot playtesting and CI verification.
//!
//! This crate plays sessions without a window or renderer:
//!
//! - **Playtesting**: an [`autopilot::Autopilot`] drives the ship through a
//!   RON [`scenario::Scenario`] and [`metrics`] record what happened
//! - **Balance runs**: [`batch`] plays one scenario over many seeds in
//!   parallel and summarizes the results as JSON
//! - **CI verification**: the same seed must always end in the same state
//!   hash
//!
//! Results go to stdout (JSON); logs go to stderr.
//!
//! # Example
//!
//! ```bash
//! # One game of a built-in scenario
//! cargo run -p salvo_headless -- run --scenario fixed
//!
//! # A thousand seeds of a scenario file
//! cargo run -p salvo_headless -- batch --scenario scenarios/standard.ron --count 1000
//!
//! # Determinism check
//! cargo run -p salvo_headless -- verify --scenario standard --seed 7 --runs 5
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod autopilot;
pub mod batch;
pub mod metrics;
pub mod runner;
pub mod scenario;

pub use autopilot::Autopilot;
pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults};
pub use metrics::{BatchSummary, GameMetrics, MetricsCollector, Outcome};
pub use runner::{run_game, GameConfig, GameResult};
pub use scenario::{Scenario, ScenarioError};
