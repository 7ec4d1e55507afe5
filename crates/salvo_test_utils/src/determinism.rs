//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical seeds and inputs.
//!
//! # Testing Strategy
//!
//! A session must be fully reproducible from its seed and input script so
//! batch runs, replays and balance comparisons can be trusted. Sources of
//! non-determinism include:
//!
//! - **System randomness**: every random decision goes through the
//!   session's seeded [`salvo_core::rng::SimRng`].
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Entity groups are kept in insertion order instead.
//!
//! - **Floating-point reassociation**: the same binary always evaluates
//!   the same expressions in the same order, so results are bit-identical
//!   run to run. They are not guaranteed across platforms.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual passes (collision, spawning, AI)
//! 2. **Property tests**: random inputs must still produce deterministic outputs
//! 3. **Integration tests**: full sessions are reproducible
//! 4. **Parallel tests**: running N sessions in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use salvo_core::simulation::Simulation;

use crate::fixtures::{scripted_input, DT};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use salvo_test_utils::determinism::verify_determinism;
/// use salvo_test_utils::fixtures::{scripted_input, standard_arena, DT};
///
/// let result = verify_determinism(
///     3,
///     120,
///     || standard_arena(5),
///     |sim| {
///         let input = scripted_input(sim.tick_count());
///         sim.tick(DT, &input);
///     },
///     |sim| sim.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

fn scripted_step(sim: &mut Simulation) {
    let input = scripted_input(sim.tick_count());
    sim.tick(DT, &input);
}

/// Run a session twice under the scripted input and compare final hashes.
///
/// Returns `true` if both runs produced identical state hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    verify_determinism(2, num_ticks, &setup_fn, scripted_step, Simulation::state_hash).is_deterministic
}

/// Run N sessions on scoped threads and collect final hashes.
///
/// This is useful for catching non-determinism that only manifests
/// under thread scheduling variations, memory layout differences, etc.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> ParallelSimResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        scripted_step(&mut sim);
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two simulation runs tick-by-tick, finding first divergence.
///
/// Useful for debugging non-determinism by finding exactly when
/// simulations start to differ.
///
/// # Returns
///
/// `None` if simulations are deterministic, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        scripted_step(&mut sim1);
        scripted_step(&mut sim2);

        if sim1.state_hash() != sim2.state_hash() {
            tracing::warn!(tick, "Simulations diverged");
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for simulation testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based tests.
pub mod strategies {
    use glam::{Vec2, Vec3};
    use proptest::prelude::*;
    use salvo_core::collectible::CollectibleKind;
    use salvo_core::enemy::EnemyKind;
    use salvo_core::input::InputFrame;

    /// Generate a planar position within the given half-extent.
    pub fn arb_position(extent: f32) -> impl Strategy<Value = Vec3> {
        (-extent..extent, -extent..extent).prop_map(|(x, y)| Vec3::new(x, y, 0.0))
    }

    /// Generate an angle in `[-4π, 4π]`, well outside the wrapped range.
    pub fn arb_angle() -> impl Strategy<Value = f32> {
        -4.0 * std::f32::consts::PI..4.0 * std::f32::consts::PI
    }

    /// Generate an entity weight.
    pub fn arb_weight() -> impl Strategy<Value = f32> {
        0.1f32..500.0
    }

    /// Generate an enemy archetype.
    pub fn arb_enemy_kind() -> impl Strategy<Value = EnemyKind> {
        prop_oneof![
            Just(EnemyKind::Melee),
            Just(EnemyKind::Ranged),
            Just(EnemyKind::Charge),
        ]
    }

    /// Generate a weapon or turret pickup.
    pub fn arb_pickup_kind() -> impl Strategy<Value = CollectibleKind> {
        prop::sample::select(CollectibleKind::PICKUPS.to_vec())
    }

    /// Generate one tick of input.
    pub fn arb_input() -> impl Strategy<Value = InputFrame> {
        (
            (-1.0f32..=1.0, -1.0f32..=1.0),
            (-0.5f32..=0.5, -0.5f32..=0.5),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|((thrust, turn), (ax, ay), primary, secondary)| {
                InputFrame::default()
                    .with_movement(Vec2::new(thrust, turn))
                    .with_aim(Vec2::new(ax, ay))
                    .with_primary(primary)
                    .with_secondary(secondary)
            })
    }

    /// Generate an input script.
    pub fn arb_input_script(max_len: usize) -> impl Strategy<Value = Vec<InputFrame>> {
        proptest::collection::vec(arb_input(), 1..max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{empty_arena, fixed_arena, standard_arena};
    use proptest::prelude::*;
    use salvo_core::input::InputFrame;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_empty_arena_determinism() {
        assert!(verify_simulation_determinism(empty_arena, 300));
    }

    #[test]
    fn test_fixed_arena_determinism() {
        assert!(verify_simulation_determinism(fixed_arena, 300));
    }

    #[test]
    fn test_standard_arena_determinism() {
        let result = verify_determinism(
            3,
            600,
            || standard_arena(17),
            scripted_step,
            Simulation::state_hash,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_no_divergence() {
        assert_eq!(find_first_divergence(|| standard_arena(3), 200), None);
    }

    #[test]
    fn test_parallel_runs_match() {
        run_parallel_simulations(|| standard_arena(9), 4, 200).assert_deterministic();
    }

    #[test]
    fn test_seed_changes_outcome() {
        let a = verify_determinism(1, 60, || standard_arena(1), scripted_step, Simulation::state_hash);
        let b = verify_determinism(1, 60, || standard_arena(2), scripted_step, Simulation::state_hash);
        assert_ne!(a.hashes, b.hashes);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_random_inputs_are_reproducible(
            seed in any::<u64>(),
            script in strategies::arb_input_script(90),
        ) {
            let run = |script: &[InputFrame]| {
                let mut sim = standard_arena(seed);
                for input in script {
                    sim.tick(DT, input);
                }
                sim.state_hash()
            };
            prop_assert_eq!(run(&script), run(&script));
        }
    }
}
