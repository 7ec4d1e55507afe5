//! Game metrics collection for balance analysis.
//!
//! A [`MetricsCollector`] watches the [`TickEvents`] of one game and
//! produces a [`GameMetrics`] record; [`BatchSummary`] aggregates many.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use salvo_core::collectible::CollectibleKind;
use salvo_core::collision::DamageTarget;
use salvo_core::simulation::{GameState, TickEvents};

/// How a game ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The ship reached the open exit door.
    Won,
    /// The ship was destroyed.
    Lost,
    /// The tick limit ran out first.
    #[default]
    Timeout,
}

impl Outcome {
    /// Outcome for a finished session state, if it is one.
    #[must_use]
    pub const fn from_state(state: GameState) -> Option<Self> {
        match state {
            GameState::Won => Some(Self::Won),
            GameState::Lost => Some(Self::Lost),
            GameState::Start | GameState::InGame => None,
        }
    }
}

/// Complete metrics for a single game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Unique game identifier.
    pub game_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Random seed used.
    pub seed: u64,
    /// Total game duration in ticks.
    pub duration_ticks: u64,
    /// How the game ended.
    pub outcome: Outcome,
    /// Enemies killed by archetype.
    pub kills: HashMap<String, u32>,
    /// Enemies removed for straying too far.
    pub despawned: u32,
    /// Enemies the director spawned.
    pub spawned: u32,
    /// Damage dealt to enemies.
    pub damage_dealt: f64,
    /// Damage that reached the ship or one of its turrets.
    pub damage_taken: f64,
    /// Collectibles consumed, by kind.
    pub pickups: HashMap<String, u32>,
    /// Win tokens collected.
    pub tokens_collected: u32,
    /// Tick the exit door opened.
    pub door_opened_tick: Option<u64>,
    /// Bullets fired by the ship.
    pub bullets_fired: u64,
    /// Bullets fired by enemies.
    pub enemy_shots: u64,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Create a new game metrics instance.
    #[must_use]
    pub fn new(game_id: impl Into<String>, scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            game_id: game_id.into(),
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Total kills across archetypes.
    #[must_use]
    pub fn total_kills(&self) -> u32 {
        self.kills.values().sum()
    }

    /// Finalize the game with outcome.
    pub fn finalize(&mut self, duration: u64, outcome: Outcome, state_hash: u64) {
        self.duration_ticks = duration;
        self.outcome = outcome;
        self.final_state_hash = state_hash;
    }
}

/// Summary statistics across multiple games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total games played.
    pub total_games: u32,
    /// Games that ended in a win.
    pub wins: u32,
    /// Games that ended with the ship destroyed.
    pub losses: u32,
    /// Games that hit the tick limit.
    pub timeouts: u32,
    /// Fraction of games won.
    pub win_rate: f64,
    /// Average game duration in ticks.
    pub avg_duration_ticks: f64,
    /// Shortest game.
    pub min_duration_ticks: u64,
    /// Longest game.
    pub max_duration_ticks: u64,
    /// Average kills per game by archetype.
    pub avg_kills: HashMap<String, f64>,
    /// Average damage dealt per game.
    pub avg_damage_dealt: f64,
    /// Average damage taken per game.
    pub avg_damage_taken: f64,
    /// Average tokens collected per game.
    pub avg_tokens_collected: f64,
}

impl BatchSummary {
    /// Calculate summary from a list of game metrics.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let count = games.len() as f64;
        let mut summary = Self {
            total_games: games.len() as u32,
            min_duration_ticks: u64::MAX,
            ..Default::default()
        };

        let mut duration_sum = 0u64;
        let mut kill_sums: HashMap<String, u32> = HashMap::new();
        let mut tokens = 0u32;

        for game in games {
            match game.outcome {
                Outcome::Won => summary.wins += 1,
                Outcome::Lost => summary.losses += 1,
                Outcome::Timeout => summary.timeouts += 1,
            }

            duration_sum += game.duration_ticks;
            summary.min_duration_ticks = summary.min_duration_ticks.min(game.duration_ticks);
            summary.max_duration_ticks = summary.max_duration_ticks.max(game.duration_ticks);

            for (kind, kills) in &game.kills {
                *kill_sums.entry(kind.clone()).or_default() += kills;
            }
            summary.avg_damage_dealt += game.damage_dealt;
            summary.avg_damage_taken += game.damage_taken;
            tokens += game.tokens_collected;
        }

        summary.win_rate = f64::from(summary.wins) / count;
        summary.avg_duration_ticks = duration_sum as f64 / count;
        summary.avg_damage_dealt /= count;
        summary.avg_damage_taken /= count;
        summary.avg_tokens_collected = f64::from(tokens) / count;
        summary.avg_kills = kill_sums
            .into_iter()
            .map(|(kind, total)| (kind, f64::from(total) / count))
            .collect();

        summary
    }
}

/// Metrics collector that tracks events during a game.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    /// Current game metrics.
    metrics: GameMetrics,
    /// Current tick.
    current_tick: u64,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    #[must_use]
    pub fn new(game_id: &str, scenario: &str, seed: u64) -> Self {
        Self {
            metrics: GameMetrics::new(game_id, scenario, seed),
            current_tick: 0,
        }
    }

    /// Update the current tick.
    pub fn set_tick(&mut self, tick: u64) {
        self.current_tick = tick;
    }

    /// Fold one tick's events into the running totals.
    pub fn on_tick(&mut self, events: &TickEvents) {
        let metrics = &mut self.metrics;

        for event in &events.damage_events {
            match event.target {
                DamageTarget::Enemy(_) => metrics.damage_dealt += f64::from(event.amount),
                DamageTarget::Player(_) => metrics.damage_taken += f64::from(event.amount),
            }
        }
        for kill in &events.kills {
            *metrics.kills.entry(format!("{:?}", kill.kind)).or_default() += 1;
        }
        for pickup in &events.pickups {
            *metrics.pickups.entry(format!("{:?}", pickup.kind)).or_default() += 1;
            if pickup.kind == CollectibleKind::WinToken {
                metrics.tokens_collected += 1;
            }
        }
        if events.door_opened.is_some() {
            metrics.door_opened_tick = Some(self.current_tick);
        }

        metrics.spawned += events.spawned.len() as u32;
        metrics.despawned += events.despawned.len() as u32;
        metrics.bullets_fired += events.bullets_fired as u64;
        metrics.enemy_shots += events.enemy_shots as u64;
    }

    /// Current metrics (read-only).
    #[must_use]
    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }

    /// Finalize and return the metrics.
    #[must_use]
    pub fn finalize(mut self, outcome: Outcome, state_hash: u64) -> GameMetrics {
        self.metrics.finalize(self.current_tick, outcome, state_hash);
        self.metrics
    }
}
