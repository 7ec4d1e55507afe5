//! Top-level game loop.
//!
//! [`Simulation`] owns every entity group and runs one tick at a time.
//! While in game, a tick goes through these phases in order:
//!
//! 1. apply input (movement, aim, both triggers);
//! 2. update the groups: player, enemies, collectibles, world, explosions,
//!    HUD, then bullets. Shots fired during the tick join the bullet group
//!    afterwards and first move on the next tick;
//! 3. a dead player ends the game;
//! 4. prune dead bullets, dead enemies (leaving an explosion), enemies out
//!    of range and finished explosions;
//! 5. exit door unlock (once the previous tick emptied every token
//!    slot), then director spawning;
//! 6. collision resolution;
//! 7. director timers;
//! 8. weapon strip and the win check.
//!
//! # Determinism
//!
//! All randomness comes from one seeded [`SimRng`] and every group is
//! processed in insertion order, so the same seed and the same inputs
//! produce the same [`state_hash`](Simulation::state_hash).
//!
//! # Example
//!
//! ```
//! use salvo_core::input::InputFrame;
//! use salvo_core::simulation::{GameState, Layout, Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::default().with_seed(7).with_layout(Layout::Fixed);
//! let mut sim = Simulation::new(config).unwrap();
//! assert_eq!(sim.state(), GameState::Start);
//!
//! sim.tick(1.0 / 60.0, &InputFrame::start());
//! assert_eq!(sim.state(), GameState::InGame);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::collectible::Collectible;
use crate::collision::{self, Arena, DamageEvent, PickupEvent};
use crate::components::EntityId;
use crate::config::{TuningConfig, TurretKind};
use crate::director::{self, Director, WinSlots};
use crate::effects::{Explosion, Hud};
use crate::enemy::{Enemy, EnemyContext, EnemyKind, PlayerView};
use crate::error::{GameError, Result};
use crate::input::InputFrame;
use crate::math::planar_distance;
use crate::player::{Player, Trigger};
use crate::projectile::Bullet;
use crate::render::{AssetTable, RenderItem, Renderable, Renderer, ViewTransform};
use crate::rng::SimRng;
use crate::storage::Registry;
use crate::world::WorldStreamer;

/// Default fixed step, in seconds.
pub const DEFAULT_STEP: f32 = 1.0 / 60.0;

/// Default cap on sub-steps per frame.
pub const DEFAULT_MAX_STEPS: u32 = 8;

// ============================================================================
// Configuration
// ============================================================================

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Waiting for the start input.
    Start,
    /// Playing.
    InGame,
    /// The player died.
    Lost,
    /// The player reached the exit door.
    Won,
}

impl GameState {
    /// Whether the session is over.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Lost | Self::Won)
    }
}

/// How the arena is populated at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    /// Random enemies, pickups and tokens around the player.
    #[default]
    Standard,
    /// One melee enemy, pickups and tokens at fixed points, and no enemy
    /// spawning.
    Fixed,
    /// Nothing but the player. Pickups still drop; no tokens, no enemies.
    Empty,
}

/// How wall-clock frames map onto ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StepMode {
    /// One tick per frame with the frame's own delta.
    Variable,
    /// Fixed-size ticks, with the remainder carried to the next frame.
    Fixed {
        /// Seconds per tick.
        step: f32,
        /// Ticks run per frame at most; the backlog beyond is dropped.
        max_steps_per_frame: u32,
    },
}

impl Default for StepMode {
    fn default() -> Self {
        Self::Fixed {
            step: DEFAULT_STEP,
            max_steps_per_frame: DEFAULT_MAX_STEPS,
        }
    }
}

/// Everything needed to start a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Tuning table, immutable for the session.
    pub tuning: TuningConfig,
    /// RNG seed.
    pub seed: u64,
    /// Initial population.
    pub layout: Layout,
    /// Frame stepping used by [`Simulation::frame`].
    pub step: StepMode,
    /// Host asset handles.
    pub assets: AssetTable,
}

impl SimulationConfig {
    /// Use a different seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Use a different layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Use a different tuning table.
    #[must_use]
    pub fn with_tuning(mut self, tuning: TuningConfig) -> Self {
        self.tuning = tuning;
        self
    }

    /// Use a different step mode.
    #[must_use]
    pub fn with_step(mut self, step: StepMode) -> Self {
        self.step = step;
        self
    }

    /// Check the tuning table and the step mode.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] for the first bad value.
    pub fn validate(&self) -> Result<()> {
        self.tuning.validate()?;
        if let StepMode::Fixed {
            step,
            max_steps_per_frame,
        } = self.step
        {
            if !(step.is_finite() && step > 0.0) {
                return Err(GameError::InvalidConfig(format!("step must be positive, got {step}")));
            }
            if max_steps_per_frame == 0 {
                return Err(GameError::InvalidConfig("max_steps_per_frame must be at least 1".into()));
            }
        }
        Ok(())
    }
}

/// Accumulates frame deltas and hands out fixed-size ticks.
///
/// # Example
///
/// ```
/// use salvo_core::simulation::FixedStepper;
///
/// let mut stepper = FixedStepper::new(0.1, 4);
/// assert_eq!(stepper.advance(0.25), 2);
/// assert!((stepper.accumulated() - 0.05).abs() < 1e-6);
/// // A long stall is capped.
/// assert_eq!(stepper.advance(10.0), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedStepper {
    step: f32,
    max_steps_per_frame: u32,
    accumulator: f32,
}

impl FixedStepper {
    /// Stepper with the given tick length and per-frame cap.
    #[must_use]
    pub const fn new(step: f32, max_steps_per_frame: u32) -> Self {
        Self {
            step,
            max_steps_per_frame,
            accumulator: 0.0,
        }
    }

    /// Tick length.
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.step
    }

    /// Time carried over to the next frame.
    #[must_use]
    pub const fn accumulated(&self) -> f32 {
        self.accumulator
    }

    /// Add a frame delta and return how many ticks to run.
    ///
    /// When the cap is hit the backlog is discarded rather than carried.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if self.step <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps_per_frame {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == self.max_steps_per_frame {
            self.accumulator = self.accumulator.min(self.step);
        }
        steps
    }
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self::new(DEFAULT_STEP, DEFAULT_MAX_STEPS)
    }
}

// ============================================================================
// Events
// ============================================================================

/// An enemy killed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kill {
    /// Id it had.
    pub id: EntityId,
    /// Archetype.
    pub kind: EnemyKind,
    /// Where it died.
    pub position: Vec3,
}

/// Everything that happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Hits landed during collision.
    pub damage_events: Vec<DamageEvent>,
    /// Enemies that died.
    pub kills: Vec<Kill>,
    /// Enemies removed for straying too far.
    pub despawned: Vec<EntityId>,
    /// Collectibles consumed.
    pub pickups: Vec<PickupEvent>,
    /// Enemies the director spawned.
    pub spawned: Vec<EntityId>,
    /// Bullets fired by the player's turrets.
    pub bullets_fired: usize,
    /// Bullets fired by enemies.
    pub enemy_shots: usize,
    /// Background tiles created.
    pub tiles_created: usize,
    /// Exit door id, the tick it opened.
    pub door_opened: Option<EntityId>,
    /// New state, if it changed this tick.
    pub state_change: Option<GameState>,
}

// ============================================================================
// Simulation
// ============================================================================

/// One game session.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    tick: u64,
    time: f64,
    state: GameState,
    rng: SimRng,
    player: Player,
    enemies: Registry<Enemy>,
    bullets: Vec<Bullet>,
    collectibles: Registry<Collectible>,
    explosions: Vec<Explosion>,
    world: WorldStreamer,
    hud: Hud,
    director: Director,
    win_slots: WinSlots,
    stepper: Option<FixedStepper>,
}

impl Simulation {
    /// Validate the config and populate the arena.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails validation.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let tuning = &config.tuning;
        let assets = &config.assets;
        let mut rng = SimRng::seeded(config.seed);
        let player = Player::spawn(Vec3::ZERO, tuning, assets);
        let mut enemies = Registry::new();
        let mut collectibles = Registry::new();

        let win_slots = match config.layout {
            Layout::Standard => director::populate_standard(
                player.body.position,
                player.body.hitbox,
                &mut enemies,
                &mut collectibles,
                &mut rng,
                tuning,
                assets,
            ),
            Layout::Fixed => director::populate_fixed(&mut enemies, &mut collectibles, tuning, assets),
            Layout::Empty => WinSlots::default(),
        };
        let director = Director::new(&tuning.director, config.layout == Layout::Standard);
        let mut hud = Hud::new(assets);
        hud.set_weapons(player.turrets().iter().map(|turret| turret.kind));
        let stepper = match config.step {
            StepMode::Variable => None,
            StepMode::Fixed {
                step,
                max_steps_per_frame,
            } => Some(FixedStepper::new(step, max_steps_per_frame)),
        };

        tracing::info!(
            seed = config.seed,
            layout = ?config.layout,
            enemies = enemies.len(),
            collectibles = collectibles.len(),
            "Simulation created"
        );

        Ok(Self {
            world: WorldStreamer::new(&tuning.world, assets),
            tick: 0,
            time: 0.0,
            state: GameState::Start,
            rng,
            player,
            enemies,
            bullets: Vec::new(),
            collectibles,
            explosions: Vec::new(),
            hud,
            director,
            win_slots,
            stepper,
            config,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Ticks run so far, including start-screen ticks.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds so far.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Session config.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Session tuning.
    #[must_use]
    pub const fn tuning(&self) -> &TuningConfig {
        &self.config.tuning
    }

    /// The player ship.
    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable player, for scripted setups.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Live enemies.
    #[must_use]
    pub const fn enemies(&self) -> &Registry<Enemy> {
        &self.enemies
    }

    /// Mutable enemies, for scripted setups.
    pub fn enemies_mut(&mut self) -> &mut Registry<Enemy> {
        &mut self.enemies
    }

    /// Bullets in flight.
    #[must_use]
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    /// Pickups, tokens and the door.
    #[must_use]
    pub const fn collectibles(&self) -> &Registry<Collectible> {
        &self.collectibles
    }

    /// Mutable collectibles, for scripted setups.
    pub fn collectibles_mut(&mut self) -> &mut Registry<Collectible> {
        &mut self.collectibles
    }

    /// Explosions still playing.
    #[must_use]
    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    /// Background tiles.
    #[must_use]
    pub const fn world(&self) -> &WorldStreamer {
        &self.world
    }

    /// HUD state.
    #[must_use]
    pub const fn hud(&self) -> &Hud {
        &self.hud
    }

    /// Token bookkeeping.
    #[must_use]
    pub const fn win_slots(&self) -> &WinSlots {
        &self.win_slots
    }

    /// Spawn timers.
    #[must_use]
    pub const fn director(&self) -> &Director {
        &self.director
    }

    /// Spawn an enemy, for scripted setups.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, position: Vec3, rotation: f32) -> EntityId {
        let enemy = Enemy::spawn(kind, position, rotation, &self.config.tuning, &self.config.assets);
        self.enemies.insert(enemy)
    }

    /// Positions of the remaining objectives (tokens, or the door).
    pub fn objectives(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.win_slots
            .remaining()
            .filter_map(|(_, id)| self.collectibles.get(id))
            .map(|collectible| collectible.body.position)
    }

    // ========================================================================
    // Ticking
    // ========================================================================

    fn set_state(&mut self, state: GameState, events: &mut TickEvents) {
        if self.state == state {
            return;
        }
        tracing::info!(tick = self.tick, from = ?self.state, to = ?state, "Game state changed");
        self.state = state;
        events.state_change = Some(state);
    }

    /// Run as many ticks as the step mode allows for a wall-clock frame.
    pub fn frame(&mut self, frame_dt: f32, input: &InputFrame) -> Vec<TickEvents> {
        match &mut self.stepper {
            None => vec![self.tick(frame_dt, input)],
            Some(stepper) => {
                let dt = stepper.step();
                let steps = stepper.advance(frame_dt);
                (0..steps).map(|_| self.tick(dt, input)).collect()
            }
        }
    }

    /// Advance the session by `dt` seconds.
    pub fn tick(&mut self, dt: f32, input: &InputFrame) -> TickEvents {
        let mut events = TickEvents::default();
        self.tick += 1;
        self.time += f64::from(dt);

        match self.state {
            GameState::Start => {
                if input.start {
                    self.set_state(GameState::InGame, &mut events);
                }
            }
            GameState::InGame => self.play(dt, input, &mut events),
            GameState::Lost | GameState::Won => {}
        }

        #[cfg(feature = "debug-validation")]
        if let Err(e) = self.check_invariants() {
            tracing::error!(tick = self.tick, error = %e, "Simulation invariant violated");
        }

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        events
    }

    fn play(&mut self, dt: f32, input: &InputFrame, events: &mut TickEvents) {
        let tuning = &self.config.tuning;
        let assets = &self.config.assets;

        // 1. Input
        self.player.set_movement_input(input.movement);
        let view = ViewTransform::following(self.player.body.position, &tuning.camera);
        self.player.aim(input.aim, &view, dt, &tuning.turrets);
        let mut fired = Vec::new();
        if input.primary {
            self.player.fire(Trigger::Primary, tuning, &mut fired);
        }
        if input.secondary {
            self.player.fire(Trigger::Secondary, tuning, &mut fired);
        }
        events.bullets_fired = fired.len();

        // 2. Group updates
        self.player.update(dt, tuning, assets);
        let player_position = self.player.body.position;
        let mut ctx = EnemyContext {
            tuning,
            player: PlayerView {
                position: player_position,
                velocity: self.player.velocity(),
            },
            rng: &mut self.rng,
            assets,
        };
        for (id, enemy) in self.enemies.iter_mut() {
            if let Some(bullet) = enemy.update(id, dt, &mut ctx) {
                fired.push(bullet);
                events.enemy_shots += 1;
            }
        }
        for (_, collectible) in self.collectibles.iter_mut() {
            collectible.update(dt);
        }
        events.tiles_created = self.world.update(player_position);
        for explosion in &mut self.explosions {
            explosion.update(dt);
        }
        let objectives: Vec<Vec3> = self.objectives().collect();
        self.hud
            .update(player_position, self.player.body.health_ratio(), objectives);
        let targets = collision::enemy_positions(&self.enemies);
        for bullet in &mut self.bullets {
            bullet.update(dt, &targets);
        }
        self.bullets.append(&mut fired);

        // 3. Defeat
        if self.player.body.is_dead() {
            self.set_state(GameState::Lost, events);
            return;
        }

        // 4. Prune
        self.prune(events);

        // 5. Door unlock, then spawning
        let tuning = &self.config.tuning;
        let assets = &self.config.assets;
        events.door_opened = self.director.check_door(
            &mut self.win_slots,
            &mut self.collectibles,
            &tuning.director,
            assets,
        );
        events.spawned = self.director.spawn(
            player_position,
            self.player.body.hitbox,
            &mut self.enemies,
            &mut self.collectibles,
            &self.win_slots,
            &mut self.rng,
            tuning,
            assets,
        );

        // 6. Collision
        let report = collision::resolve(
            Arena {
                player: &mut self.player,
                enemies: &mut self.enemies,
                bullets: &mut self.bullets,
                collectibles: &mut self.collectibles,
                win_slots: &mut self.win_slots,
            },
            dt,
            tuning,
            assets,
        );
        events.damage_events = report.damage;
        events.pickups = report.pickups;

        // 7. Spawn timers
        self.director.advance(
            dt,
            self.player.body.position,
            &self.collectibles,
            &self.win_slots,
            &tuning.director,
        );

        // 8. Weapons and win
        self.hud
            .set_weapons(self.player.turrets().iter().map(|turret| turret.kind));
        if self.win_slots.is_won() {
            self.set_state(GameState::Won, events);
        }
    }

    fn prune(&mut self, events: &mut TickEvents) {
        let director = &self.config.tuning.director;
        let assets = &self.config.assets;
        let player = self.player.body.position;

        self.bullets.retain(Bullet::is_alive);

        let explosions = &mut self.explosions;
        self.enemies.retain(|id, enemy| {
            if enemy.body.is_dead() {
                explosions.push(Explosion::new(
                    enemy.body.position,
                    enemy.body.scale,
                    director.explosion_time,
                    assets,
                ));
                events.kills.push(Kill {
                    id,
                    kind: enemy.kind,
                    position: enemy.body.position,
                });
                tracing::trace!(enemy = id, kind = ?enemy.kind, "Enemy killed");
                return false;
            }
            if planar_distance(enemy.body.position, player) >= director.despawn_range {
                events.despawned.push(id);
                tracing::trace!(enemy = id, "Enemy despawned");
                return false;
            }
            true
        });

        self.explosions.retain(|explosion| !explosion.is_finished());
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Camera following the player.
    #[must_use]
    pub fn view(&self) -> ViewTransform {
        ViewTransform::following(self.player.body.position, &self.config.tuning.camera)
    }

    /// Build the draw list: background, collectibles, enemies, player,
    /// bullets, explosions, then the HUD on top.
    #[must_use]
    pub fn draw_list(&self) -> Vec<RenderItem> {
        let mut items = Vec::new();
        self.world.render(&mut items);
        for collectible in self.collectibles.values() {
            collectible.render(&mut items);
        }
        for enemy in self.enemies.values() {
            enemy.render(&mut items);
        }
        self.player.render(&mut items);
        for bullet in &self.bullets {
            bullet.render(&mut items);
        }
        for explosion in &self.explosions {
            explosion.render(&mut items);
        }
        self.hud.render(&mut items);
        items
    }

    /// Hand the current frame to a renderer.
    pub fn render(&self, renderer: &mut impl Renderer) {
        renderer.draw(&self.view(), self.time, &self.draw_list());
    }

    /// Check the structural invariants of the session.
    ///
    /// Run after every tick when the `debug-validation` feature is on.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] naming the first broken rule.
    pub fn check_invariants(&self) -> Result<()> {
        let invalid = |message: String| Err(GameError::InvalidState(message));
        let max_turrets = self.config.tuning.turrets.max_turrets;

        let turrets = self.player.turrets();
        if turrets.is_empty() || turrets.len() > max_turrets {
            return invalid(format!("player holds {} turrets (cap {max_turrets})", turrets.len()));
        }
        let cannons = turrets.iter().filter(|turret| turret.kind == TurretKind::Cannon).count();
        if cannons > 1 {
            return invalid(format!("player holds {cannons} cannons"));
        }

        let bodies = std::iter::once((0, &self.player.body))
            .chain(self.enemies.iter().map(|(id, enemy)| (id, &enemy.body)));
        for (id, body) in bodies {
            if !body.position.is_finite() || !body.knockback.is_finite() {
                return invalid(format!("entity {id} has a non-finite position or knockback"));
            }
            if !(0.0..std::f32::consts::TAU).contains(&body.rotation()) {
                return invalid(format!("entity {id} has unwrapped rotation {}", body.rotation()));
            }
        }

        let mut coords = HashSet::with_capacity(self.world.len());
        if !self.world.tiles().iter().all(|tile| coords.insert(tile.coord)) {
            return invalid("duplicate world tile".to_string());
        }

        if self.win_slots.door_opened() && !self.win_slots.tokens_placed() {
            return invalid("exit door opened without win tokens".to_string());
        }
        Ok(())
    }

    /// Hash of the simulation state.
    ///
    /// Two simulations with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.state.hash(&mut hasher);

        let hash_vec3 = |v: Vec3, hasher: &mut DefaultHasher| {
            v.x.to_bits().hash(hasher);
            v.y.to_bits().hash(hasher);
            v.z.to_bits().hash(hasher);
        };

        // Player
        hash_vec3(self.player.body.position, &mut hasher);
        hash_vec3(self.player.velocity(), &mut hasher);
        self.player.body.rotation().to_bits().hash(&mut hasher);
        self.player.body.health.to_bits().hash(&mut hasher);
        self.player.turrets().len().hash(&mut hasher);
        for turret in self.player.turrets() {
            turret.kind.hash(&mut hasher);
            turret.body.rotation().to_bits().hash(&mut hasher);
        }

        // Enemies
        self.enemies.len().hash(&mut hasher);
        for (id, enemy) in self.enemies.iter() {
            id.hash(&mut hasher);
            enemy.kind.hash(&mut hasher);
            enemy.state().hash(&mut hasher);
            hash_vec3(enemy.body.position, &mut hasher);
            enemy.body.rotation().to_bits().hash(&mut hasher);
            enemy.body.health.to_bits().hash(&mut hasher);
        }

        // Bullets
        self.bullets.len().hash(&mut hasher);
        for bullet in &self.bullets {
            bullet.kind.hash(&mut hasher);
            bullet.shooter.hash(&mut hasher);
            hash_vec3(bullet.body.position, &mut hasher);
            hash_vec3(bullet.direction, &mut hasher);
        }

        // Collectibles and the win condition
        self.collectibles.len().hash(&mut hasher);
        for (id, collectible) in self.collectibles.iter() {
            id.hash(&mut hasher);
            collectible.kind.hash(&mut hasher);
            hash_vec3(collectible.body.position, &mut hasher);
        }
        self.win_slots.hash(&mut hasher);

        self.world.len().hash(&mut hasher);

        hasher.finish()
    }
}

/// Screen-space aim that points the turrets at `target`.
#[must_use]
pub fn aim_at(view: &ViewTransform, target: Vec3) -> Vec2 {
    view.world_to_screen(target)
}
