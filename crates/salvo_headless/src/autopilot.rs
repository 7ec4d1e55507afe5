//! Scripted input policies for headless playtesting.
//!
//! An autopilot looks at the session the same way a player looks at the
//! screen and returns the [`InputFrame`] for the next tick. Every policy is
//! a pure function of the session, so a seeded game driven by an autopilot
//! is as reproducible as the simulation itself.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use salvo_core::input::InputFrame;
use salvo_core::math::{heading, planar_distance, wrap_signed};
use salvo_core::simulation::{aim_at, GameState, Simulation};

/// Distance inside which the hunter also fires the cannon.
const CANNON_RANGE: f32 = 10.0;

/// Turn input per radian of heading error.
const STEERING_GAIN: f32 = 2.0;

/// Throttle while the target is behind the ship.
const TURNING_THROTTLE: f32 = 0.3;

/// How the ship is driven.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Autopilot {
    /// Press start, then do nothing.
    Idle,
    /// Drive forward while weaving, sweep the aim in a circle and hold the
    /// trigger. Ignores the arena entirely.
    Weave,
    /// Head for the nearest objective (or pickup when none remain), and
    /// shoot the nearest enemy within `engage_range`.
    Hunter {
        /// Distance at which the hunter opens fire.
        engage_range: f32,
    },
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::Hunter { engage_range: 25.0 }
    }
}

impl Autopilot {
    /// Input for the next tick of `sim`.
    ///
    /// Every policy presses start while the session is on the start screen.
    #[must_use]
    pub fn input(&self, sim: &Simulation) -> InputFrame {
        if sim.state() == GameState::Start {
            return InputFrame::start();
        }
        match self {
            Self::Idle => InputFrame::default(),
            Self::Weave => weave(sim.tick_count(), sim.time()),
            Self::Hunter { engage_range } => hunt(sim, *engage_range),
        }
    }
}

fn weave(tick: u64, time: f64) -> InputFrame {
    let t = time as f32;
    InputFrame::default()
        .with_movement(Vec2::new(1.0, (t * 0.7).sin()))
        .with_aim(Vec2::new((t * 0.5).cos(), (t * 0.5).sin()) * 0.4)
        .with_primary(true)
        .with_secondary(tick % 60 == 0)
}

fn hunt(sim: &Simulation, engage_range: f32) -> InputFrame {
    let ship = &sim.player().body;
    let view = sim.view();

    let destination = nearest(ship.position, sim.objectives()).or_else(|| {
        nearest(
            ship.position,
            sim.collectibles()
                .values()
                .map(|collectible| collectible.body.position),
        )
    });

    let mut input = InputFrame::default();
    if let Some(destination) = destination {
        input = input.with_movement(steer(ship.position, ship.rotation(), destination));
    }

    let enemy = nearest(ship.position, sim.enemies().values().map(|enemy| enemy.body.position))
        .filter(|position| planar_distance(*position, ship.position) <= engage_range);

    match enemy {
        Some(target) => {
            let close = planar_distance(target, ship.position) <= CANNON_RANGE;
            input
                .with_aim(aim_at(&view, target))
                .with_primary(true)
                .with_secondary(close && sim.player().has_cannon())
        }
        None => match destination {
            Some(destination) => input.with_aim(aim_at(&view, destination)),
            None => input,
        },
    }
}

fn nearest(from: Vec3, points: impl Iterator<Item = Vec3>) -> Option<Vec3> {
    points.min_by(|a, b| planar_distance(*a, from).total_cmp(&planar_distance(*b, from)))
}

/// Thrust and turn that bring a ship at `position` facing `rotation`
/// round to `destination`. Positive turn is clockwise.
fn steer(position: Vec3, rotation: f32, destination: Vec3) -> Vec2 {
    let offset = destination - position;
    if offset.truncate().length_squared() == 0.0 {
        return Vec2::ZERO;
    }
    let error = wrap_signed(heading(offset) - rotation);
    let turn = (-error * STEERING_GAIN).clamp(-1.0, 1.0);
    let thrust = if error.abs() < FRAC_PI_2 { 1.0 } else { TURNING_THROTTLE };
    Vec2::new(thrust, turn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use salvo_core::enemy::EnemyKind;
    use salvo_core::simulation::{Layout, SimulationConfig};
    use salvo_test_utils::fixtures::{arena_with_enemy, empty_arena, fixed_arena};

    #[test]
    fn test_every_policy_presses_start() {
        let sim = Simulation::new(SimulationConfig::default()).unwrap();
        for autopilot in [Autopilot::Idle, Autopilot::Weave, Autopilot::default()] {
            assert!(autopilot.input(&sim).start);
        }
    }

    #[test]
    fn test_idle_does_nothing_in_game() {
        let sim = empty_arena();
        assert_eq!(Autopilot::Idle.input(&sim), InputFrame::default());
    }

    #[test]
    fn test_hunter_fires_at_enemy_in_range() {
        let (sim, _) = arena_with_enemy(EnemyKind::Ranged, 12.0, 0.0);
        let input = Autopilot::Hunter { engage_range: 20.0 }.input(&sim);
        assert!(input.primary);
        assert!(!input.secondary);
        assert_eq!(input.aim, aim_at(&sim.view(), Vec3::new(12.0, 0.0, 0.0)));
    }

    #[test]
    fn test_hunter_holds_fire_out_of_range() {
        let (sim, _) = arena_with_enemy(EnemyKind::Ranged, 40.0, 0.0);
        let input = Autopilot::Hunter { engage_range: 20.0 }.input(&sim);
        assert!(!input.primary);
    }

    #[test]
    fn test_hunter_heads_for_objectives() {
        let sim = fixed_arena();
        let input = Autopilot::default().input(&sim);
        // Tokens sit off the nose, so the hunter both turns and thrusts.
        assert!(input.movement.x > 0.0);
        assert!(input.movement.y != 0.0);
    }

    #[test]
    fn test_steer_turns_clockwise_towards_target_on_the_right() {
        // Facing +x; target below-right needs a clockwise (positive) turn.
        let movement = steer(Vec3::ZERO, 0.0, Vec3::new(5.0, -5.0, 0.0));
        assert!(movement.y > 0.0);
        assert_eq!(movement.x, 1.0);

        let behind = steer(Vec3::ZERO, 0.0, Vec3::new(-5.0, 0.1, 0.0));
        assert_eq!(behind.x, TURNING_THROTTLE);
        assert_eq!(behind.y, -1.0);
    }

    #[test]
    fn test_weave_is_reproducible() {
        let config = SimulationConfig::default().with_layout(Layout::Empty);
        let mut a = Simulation::new(config.clone()).unwrap();
        let mut b = Simulation::new(config).unwrap();
        for _ in 0..30 {
            let input = Autopilot::Weave.input(&a);
            assert_eq!(input, Autopilot::Weave.input(&b));
            a.tick(1.0 / 60.0, &input);
            b.tick(1.0 / 60.0, &input);
        }
        assert_eq!(a.state_hash(), b.state_hash());
    }
}
