//! Test fixtures and helpers.
//!
//! Pre-built sessions and input scripts for consistent testing.

use glam::{Vec2, Vec3};
use salvo_core::components::EntityId;
use salvo_core::enemy::EnemyKind;
use salvo_core::input::InputFrame;
use salvo_core::simulation::{Layout, Simulation, SimulationConfig};

/// Tick length used by the fixtures.
pub const DT: f32 = 1.0 / 60.0;

/// A session already past the start screen.
///
/// # Panics
///
/// Panics if the default tuning table fails validation.
#[must_use]
pub fn started(layout: Layout, seed: u64) -> Simulation {
    let config = SimulationConfig::default().with_seed(seed).with_layout(layout);
    let mut sim = Simulation::new(config).expect("default config is valid");
    sim.tick(DT, &InputFrame::start());
    sim
}

/// A started session with nothing in it but the player.
#[must_use]
pub fn empty_arena() -> Simulation {
    started(Layout::Empty, 0)
}

/// A started standard session.
#[must_use]
pub fn standard_arena(seed: u64) -> Simulation {
    started(Layout::Standard, seed)
}

/// A started fixed-layout session.
#[must_use]
pub fn fixed_arena() -> Simulation {
    started(Layout::Fixed, 0)
}

/// Empty arena with one enemy of `kind` at `(x, y)`, facing `+x`.
#[must_use]
pub fn arena_with_enemy(kind: EnemyKind, x: f32, y: f32) -> (Simulation, EntityId) {
    let mut sim = empty_arena();
    let id = sim.spawn_enemy(kind, Vec3::new(x, y, 0.0), 0.0);
    (sim, id)
}

/// Deterministic scripted input for tick `tick`.
///
/// Drives forward while weaving, sweeps the aim in a slow circle, holds
/// the primary trigger and taps the secondary one every second.
#[must_use]
pub fn scripted_input(tick: u64) -> InputFrame {
    let t = tick as f32 * DT;
    InputFrame::default()
        .with_movement(Vec2::new(1.0, (t * 0.7).sin()))
        .with_aim(Vec2::new((t * 0.5).cos(), (t * 0.5).sin()) * 0.4)
        .with_primary(true)
        .with_secondary(tick % 60 == 0)
}

/// Advance `sim` by `ticks` with [`scripted_input`].
pub fn run_scripted(sim: &mut Simulation, ticks: u64) {
    for _ in 0..ticks {
        let input = scripted_input(sim.tick_count());
        sim.tick(DT, &input);
    }
}

/// Advance `sim` by `ticks` with no input.
pub fn run_idle(sim: &mut Simulation, ticks: u64) {
    let input = InputFrame::default();
    for _ in 0..ticks {
        sim.tick(DT, &input);
    }
}
