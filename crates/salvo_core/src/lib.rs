//! # Salvo Core
//!
//! Deterministic simulation core for Salvo, a top-down arena shooter.
//!
//! This crate contains **only** simulation logic:
//! - No rendering (entities describe themselves as a draw list)
//! - No IO beyond loading the tuning table
//! - No system randomness (one seeded RNG per session)
//!
//! This separation enables:
//! - Headless batch runs and balance testing
//! - Replays from a seed and an input script
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`components`] - Shared transform, health and knockback data
//! - [`player`], [`turret`], [`enemy`], [`projectile`], [`collectible`] - Actors
//! - [`collision`] - Per-tick combat resolution
//! - [`director`] - Spawning and the win condition
//! - [`world`] - Infinite background streaming
//! - [`simulation`] - Core game loop
//! - [`config`] - Tuning table
//! - [`render`] - Draw-list contract

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod collectible;
pub mod collision;
pub mod components;
pub mod config;
pub mod director;
pub mod effects;
pub mod enemy;
pub mod error;
pub mod input;
pub mod math;
pub mod player;
pub mod projectile;
pub mod render;
pub mod rng;
pub mod simulation;
pub mod storage;
pub mod timer;
pub mod turret;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::collectible::{Collectible, CollectibleKind};
    pub use crate::collision::{CollisionReport, DamageCause, DamageEvent, DamageTarget, PickupEvent};
    pub use crate::components::*;
    pub use crate::config::{BulletKind, TurretKind, TuningConfig};
    pub use crate::director::WinSlots;
    pub use crate::enemy::{AiState, Enemy, EnemyKind};
    pub use crate::error::{GameError, Result};
    pub use crate::input::InputFrame;
    pub use crate::player::{DamageOutcome, Player};
    pub use crate::projectile::{Bullet, Shooter};
    pub use crate::render::{AssetTable, RenderItem, Renderable, Renderer, ViewTransform};
    pub use crate::simulation::{
        FixedStepper, GameState, Kill, Layout, Simulation, SimulationConfig, StepMode, TickEvents,
    };
    pub use crate::storage::Registry;
    pub use crate::timer::Timer;
}
