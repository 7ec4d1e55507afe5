//! Scenario loading and configuration.
//!
//! A scenario names everything a headless game needs besides the seed
//! override: the arena layout, how long to run, the tick length, which
//! autopilot drives the ship and, optionally, a tuning table to replace
//! the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use salvo_core::config::TuningConfig;
use salvo_core::error::GameError;
use salvo_core::simulation::{Layout, SimulationConfig, StepMode, DEFAULT_MAX_STEPS, DEFAULT_STEP};

use crate::autopilot::Autopilot;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario describes a session the simulation rejects.
    #[error("Invalid scenario: {0}")]
    Config(#[from] GameError),
}

/// A complete scenario configuration.
///
/// Missing fields fall back to [`Scenario::default`], so a scenario file
/// only needs to say what differs.
///
/// # Example
///
/// ```
/// use salvo_headless::scenario::Scenario;
///
/// let scenario = Scenario::from_ron_str(r#"(name: "short", max_ticks: 600)"#).unwrap();
/// assert_eq!(scenario.max_ticks, 600);
/// assert_eq!(scenario.seed, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Seed used when the caller does not supply one.
    pub seed: u64,
    /// Initial population.
    pub layout: Layout,
    /// Ticks after which an unfinished game is called a timeout.
    pub max_ticks: u64,
    /// Seconds per tick.
    pub step: f32,
    /// Input policy.
    pub autopilot: Autopilot,
    /// Tuning table; the defaults when absent.
    pub tuning: Option<TuningConfig>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "standard".to_string(),
            description: "Random arena, hunting autopilot, five minutes".to_string(),
            seed: 0,
            layout: Layout::Standard,
            max_ticks: 5 * 60 * 60,
            step: DEFAULT_STEP,
            autopilot: Autopilot::default(),
            tuning: None,
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Resolve a built-in name or, failing that, a file path.
    ///
    /// Built-ins are `standard`, `fixed` and `empty`.
    pub fn resolve(name: &str) -> Result<Self, ScenarioError> {
        match name {
            "standard" => Ok(Self::standard()),
            "fixed" => Ok(Self::fixed_course()),
            "empty" => Ok(Self::empty()),
            path => Self::load(path),
        }
    }

    /// Random arena with the hunting autopilot.
    #[must_use]
    pub fn standard() -> Self {
        Self::default()
    }

    /// Fixed layout: one melee enemy, pickups and tokens at known points.
    #[must_use]
    pub fn fixed_course() -> Self {
        Self {
            name: "fixed".to_string(),
            description: "Fixed layout, hunting autopilot, two minutes".to_string(),
            layout: Layout::Fixed,
            max_ticks: 2 * 60 * 60,
            ..Self::default()
        }
    }

    /// Nothing but the ship; useful for pickup and streaming checks.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            name: "empty".to_string(),
            description: "Empty arena, weaving autopilot, one minute".to_string(),
            layout: Layout::Empty,
            max_ticks: 60 * 60,
            autopilot: Autopilot::Weave,
            ..Self::default()
        }
    }

    /// Use a different tick limit.
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Use a different autopilot.
    #[must_use]
    pub fn with_autopilot(mut self, autopilot: Autopilot) -> Self {
        self.autopilot = autopilot;
        self
    }

    /// Build the session configuration for `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Config`] if the tuning table or the step
    /// fails validation.
    pub fn simulation_config(&self, seed: u64) -> Result<SimulationConfig, ScenarioError> {
        let config = SimulationConfig::default()
            .with_seed(seed)
            .with_layout(self.layout)
            .with_tuning(self.tuning.clone().unwrap_or_default())
            .with_step(StepMode::Fixed {
                step: self.step,
                max_steps_per_frame: DEFAULT_MAX_STEPS,
            });
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_scenarios() {
        assert_eq!(Scenario::resolve("standard").unwrap().layout, Layout::Standard);
        assert_eq!(Scenario::resolve("fixed").unwrap().layout, Layout::Fixed);
        assert_eq!(Scenario::resolve("empty").unwrap().autopilot, Autopilot::Weave);
    }

    #[test]
    fn test_unknown_name_is_file_not_found() {
        let err = Scenario::resolve("no/such/scenario.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_parse_from_ron() {
        let ron = r#"
            Scenario(
                name: "Test",
                description: "Test scenario",
                seed: 42,
                layout: Fixed,
                max_ticks: 1200,
                step: 0.02,
                autopilot: Hunter(engage_range: 20.0),
            )
        "#;
        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(scenario.name, "Test");
        assert_eq!(scenario.seed, 42);
        assert_eq!(scenario.layout, Layout::Fixed);
        assert_eq!(scenario.autopilot, Autopilot::Hunter { engage_range: 20.0 });
        assert!(scenario.tuning.is_none());
    }

    #[test]
    fn test_partial_tuning_override() {
        let ron = r#"(
            name: "tough",
            tuning: Some((player: (health: 500.0))),
        )"#;
        let scenario = Scenario::from_ron_str(ron).unwrap();
        let config = scenario.simulation_config(3).unwrap();
        assert_eq!(config.tuning.player.health, 500.0);
        assert_eq!(config.tuning.player.hitbox, TuningConfig::default().player.hitbox);
        assert_eq!(config.seed, 3);
    }

    #[test]
    fn test_invalid_step_rejected() {
        let scenario = Scenario {
            step: 0.0,
            ..Scenario::default()
        };
        assert!(matches!(
            scenario.simulation_config(0),
            Err(ScenarioError::Config(GameError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.ron");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"(name: "short", max_ticks: 90, autopilot: Idle)"#).unwrap();

        let scenario = Scenario::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(scenario.name, "short");
        assert_eq!(scenario.max_ticks, 90);
        assert_eq!(scenario.autopilot, Autopilot::Idle);
    }

    #[test]
    fn test_parse_error_reported() {
        let err = Scenario::from_ron_str("(max_ticks: \"lots\")").unwrap_err();
        assert!(matches!(err, ScenarioError::ParseError(_)));
    }
}
