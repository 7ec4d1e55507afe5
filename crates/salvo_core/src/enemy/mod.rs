//! Enemy archetypes and their AI state machine.
//!
//! All archetypes share one state machine:
//!
//! ```text
//!   IDLE ──detect──▶ ENGAGE ◀──detect── ALERT
//!    │  ▲              │  ▲               ▲
//!  roll arrive     lost │  │ charge over  │ damaged (not engaged)
//!    ▼  │              ▼  │               │
//!   WANDER ◀───────────┘  CHARGE          any
//! ```
//!
//! The archetype only changes what ENGAGE does each tick:
//!
//! - **Melee** rams straight at the player and swings an [`ArmChain`].
//! - **Ranged** holds a distance band and shoots at a lead point.
//! - **Charge** telegraphs a dash when close and shoots from mid range.
//!
//! Enemies never hold a reference to the player. Each tick they receive a
//! [`PlayerView`] snapshot instead.

pub mod arm;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::components::{AssetHandle, Body, EntityId};
use crate::config::{BulletKind, ChargeTuning, EnemyProfile, RangedTuning, TuningConfig};
use crate::math::{angle_between, bearing, intercept_point, planar_distance};
use crate::projectile::{Bullet, Shooter, ShotParams};
use crate::render::{AssetTable, RenderItem, Renderable, Sprite};
use crate::rng::SimRng;
use crate::timer::Timer;
use crate::turret::bullet_sprite;

pub use arm::{ArmChain, Saw};

/// Facing error below which an approaching (non-ramming) enemy counts as aligned.
const APPROACH_ALIGNMENT: f32 = 0.001;

/// Facing error below which a ramming enemy commits to closing distance.
const RAM_ALIGNMENT: f32 = std::f32::consts::FRAC_PI_2;

/// Enemy archetype tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Rams the player; carries an arm and saw.
    Melee,
    /// Keeps its distance and shoots.
    Ranged,
    /// Dashes into the player; shoots from mid range.
    Charge,
}

impl EnemyKind {
    /// All archetypes, in spawn-weight order.
    pub const ALL: [Self; 3] = [Self::Melee, Self::Ranged, Self::Charge];

    /// Body and detection values for this archetype.
    #[must_use]
    pub fn profile(self, tuning: &TuningConfig) -> &EnemyProfile {
        match self {
            Self::Melee => &tuning.melee.profile,
            Self::Ranged => &tuning.ranged.profile,
            Self::Charge => &tuning.charge.profile,
        }
    }

    /// Sprite for the body.
    #[must_use]
    pub const fn sprite(self) -> Sprite {
        match self {
            Self::Melee => Sprite::MeleeEnemy,
            Self::Ranged => Sprite::RangedEnemy,
            Self::Charge => Sprite::ChargeEnemy,
        }
    }
}

/// AI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    /// Standing still; may start wandering.
    Idle,
    /// Walking to a random nearby point.
    Wander,
    /// Investigating where damage came from.
    Alert,
    /// Fighting the player.
    Engage,
    /// Committed to a dash (charge archetype only).
    Charge,
}

/// What an enemy knows about the player this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    /// Player position.
    pub position: Vec3,
    /// Player velocity (excluding knockback).
    pub velocity: Vec3,
}

/// Timers of the charge archetype.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeTimers {
    /// Time left in the backward wind-up.
    pub prepare: Timer,
    /// Time left in the whole charge (wind-up plus dash).
    pub charge: Timer,
    /// Time before another charge may start.
    pub cooldown: Timer,
    /// Time before the next shot.
    pub fire: Timer,
}

/// Archetype-specific state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Archetype {
    /// Melee enemy and its arm.
    Melee(ArmChain),
    /// Ranged enemy and its shot cooldown.
    Ranged {
        /// Time before the next shot.
        fire: Timer,
    },
    /// Charge enemy timers.
    Charge(ChargeTimers),
}

/// Per-tick inputs an enemy needs from the simulation.
pub struct EnemyContext<'a> {
    /// Session tuning.
    pub tuning: &'a TuningConfig,
    /// Player snapshot.
    pub player: PlayerView,
    /// Shared random source.
    pub rng: &'a mut SimRng,
    /// Host assets for fired bullets.
    pub assets: &'a AssetTable,
}

/// One enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Transform, health and knockback.
    pub body: Body,
    /// Archetype tag.
    pub kind: EnemyKind,
    /// Archetype-specific state.
    pub archetype: Archetype,
    state: AiState,
    /// Point the enemy is moving to or facing.
    pub target: Vec3,
    alert: Timer,
    profile: EnemyProfile,
}

impl Enemy {
    /// Spawn an archetype at `position` facing `rotation`.
    #[must_use]
    pub fn spawn(
        kind: EnemyKind,
        position: Vec3,
        rotation: f32,
        tuning: &TuningConfig,
        assets: &AssetTable,
    ) -> Self {
        let profile = kind.profile(tuning).clone();
        let body = Body::new(position)
            .with_scale(profile.size)
            .with_hitbox(profile.hitbox())
            .with_health(profile.health)
            .with_melee_damage(profile.melee_damage)
            .with_weight(profile.weight)
            .with_rotation(rotation)
            .with_asset(assets.handle(kind.sprite()));

        let archetype = match kind {
            EnemyKind::Melee => Archetype::Melee(ArmChain::new(&body, &tuning.arm, assets)),
            EnemyKind::Ranged => Archetype::Ranged {
                fire: Timer::expired(),
            },
            EnemyKind::Charge => Archetype::Charge(ChargeTimers::default()),
        };

        Self {
            body,
            kind,
            archetype,
            state: AiState::Idle,
            target: position,
            alert: Timer::expired(),
            profile,
        }
    }

    /// Current AI state.
    #[must_use]
    pub const fn state(&self) -> AiState {
        self.state
    }

    /// Force a state, for scripted setups.
    pub fn set_state(&mut self, state: AiState) {
        self.state = state;
    }

    /// Body and detection values this enemy was spawned with.
    #[must_use]
    pub const fn profile(&self) -> &EnemyProfile {
        &self.profile
    }

    /// The saw, for melee enemies.
    #[must_use]
    pub fn saw(&self) -> Option<&Saw> {
        match &self.archetype {
            Archetype::Melee(arm) => Some(&arm.saw),
            _ => None,
        }
    }

    /// Whether a dash is in progress.
    #[must_use]
    pub fn is_charging(&self) -> bool {
        match &self.archetype {
            Archetype::Charge(timers) => !timers.charge.times_up(),
            _ => false,
        }
    }

    /// Contact damage of a dash; zero for archetypes that cannot charge.
    #[must_use]
    pub fn charge_damage(&self, tuning: &TuningConfig) -> f32 {
        match self.kind {
            EnemyKind::Charge => tuning.charge.charge_damage,
            _ => 0.0,
        }
    }

    /// End a dash early and start the charge cooldown.
    pub fn stop_charging(&mut self, tuning: &ChargeTuning) {
        if let Archetype::Charge(timers) = &mut self.archetype {
            timers.prepare.set(0.0);
            timers.charge.set(0.0);
            timers.cooldown.set(tuning.cooldown);
            self.state = AiState::Engage;
        }
    }

    /// Take damage from something at `source`.
    ///
    /// An enemy that is not engaging the player turns to investigate the
    /// source, even mid-charge. The dash timer keeps running.
    pub fn take_damage(&mut self, amount: f32, source: Vec3) {
        self.body.take_damage(amount);
        if self.state != AiState::Engage {
            self.target = source;
            self.state = AiState::Alert;
            self.alert.set(self.profile.alert_time);
        }
    }

    // ========================================================================
    // Per-tick update
    // ========================================================================

    /// Advance one tick. Returns a bullet if the enemy fired.
    pub fn update(&mut self, id: EntityId, dt: f32, ctx: &mut EnemyContext<'_>) -> Option<Bullet> {
        self.update_timers(dt);

        let player = ctx.player;
        let player_distance = planar_distance(player.position, self.body.position);
        let mut fired = None;

        match self.state {
            AiState::Idle => {
                if player_distance <= self.profile.idle_radius {
                    self.engage(player.position);
                } else if ctx.rng.roll(self.profile.wander_chance) {
                    let offset = ctx.rng.offset_in_square(self.profile.wander_range);
                    self.target = self.body.position + offset;
                    self.state = AiState::Wander;
                }
            }
            AiState::Wander => {
                if player_distance <= self.profile.idle_radius {
                    self.engage(player.position);
                } else if planar_distance(self.target, self.body.position)
                    <= self.profile.arrival_distance
                {
                    self.state = AiState::Idle;
                } else {
                    self.move_towards_target(dt, false);
                }
            }
            AiState::Alert => {
                self.alert.update(dt);
                if self.alert.times_up() {
                    self.state = AiState::Idle;
                } else if player_distance <= self.profile.alert_radius {
                    self.engage(player.position);
                } else {
                    self.turn_towards_target(dt);
                }
            }
            AiState::Engage => {
                fired = self.engage_action(id, dt, player, ctx);
                if player_distance > self.profile.engage_radius {
                    self.state = AiState::Wander;
                }
            }
            AiState::Charge => self.charge(dt, &ctx.tuning.charge),
        }

        let tracking = self.state == AiState::Engage;
        let target = self.target;
        if let Archetype::Melee(arm) = &mut self.archetype {
            arm.update(&self.body, target, tracking, dt, &ctx.tuning.arm);
        }

        self.body.integrate_knockback(dt, &ctx.tuning.entity);
        fired
    }

    fn update_timers(&mut self, dt: f32) {
        match &mut self.archetype {
            Archetype::Melee(_) => {}
            Archetype::Ranged { fire } => fire.update(dt),
            Archetype::Charge(timers) => {
                timers.prepare.update(dt);
                timers.charge.update(dt);
                timers.cooldown.update(dt);
                timers.fire.update(dt);
            }
        }
    }

    fn engage(&mut self, player: Vec3) {
        self.state = AiState::Engage;
        self.target = player;
    }

    fn engage_action(
        &mut self,
        id: EntityId,
        dt: f32,
        player: PlayerView,
        ctx: &mut EnemyContext<'_>,
    ) -> Option<Bullet> {
        match self.kind {
            EnemyKind::Melee => {
                self.target = player.position;
                self.move_towards_target(dt, true);
                None
            }
            EnemyKind::Ranged => {
                let tuning = ctx.tuning;
                self.ranged_engage(id, dt, player, &tuning.ranged, ctx)
            }
            EnemyKind::Charge => {
                let tuning = ctx.tuning;
                self.charge_engage(id, dt, player, &tuning.charge, ctx)
            }
        }
    }

    fn ranged_engage(
        &mut self,
        id: EntityId,
        dt: f32,
        player: PlayerView,
        tuning: &RangedTuning,
        ctx: &EnemyContext<'_>,
    ) -> Option<Bullet> {
        let offset = player.position - self.body.position;
        let distance = offset.truncate().length();
        let direction = offset.truncate().normalize_or_zero().extend(0.0);

        if distance < tuning.min_range {
            self.target = player.position - direction * tuning.min_range;
            self.move_towards_target(dt, true);
            None
        } else if distance > tuning.max_range {
            self.target = player.position - direction * tuning.max_range;
            self.move_towards_target(dt, true);
            None
        } else {
            let bullet_speed = ctx.tuning.bullets.get(tuning.bullet).speed;
            self.target = intercept_point(
                self.body.position,
                player.position,
                player.velocity,
                bullet_speed,
                0.0,
            );
            self.turn_towards_target(dt);
            if self.is_facing_target(tuning.facing_tolerance) {
                self.fire(id, tuning.bullet, tuning.bullet_scale, tuning.fire_rate, ctx)
            } else {
                None
            }
        }
    }

    fn charge_engage(
        &mut self,
        id: EntityId,
        dt: f32,
        player: PlayerView,
        tuning: &ChargeTuning,
        ctx: &EnemyContext<'_>,
    ) -> Option<Bullet> {
        let offset = player.position - self.body.position;
        let distance = offset.truncate().length();
        let direction = offset.truncate().normalize_or_zero().extend(0.0);
        let Archetype::Charge(timers) = &self.archetype else {
            return None;
        };
        let fire_ready = timers.fire.times_up();
        let cooldown_done = timers.cooldown.times_up();

        if !fire_ready || distance <= tuning.charge_range {
            self.target = intercept_point(
                self.body.position,
                player.position,
                player.velocity,
                tuning.charge_speed,
                tuning.prepare_time,
            );
            if distance > tuning.charge_range {
                self.move_towards_target(dt, true);
            } else if self.is_facing_target(tuning.charge_facing) && cooldown_done {
                if let Archetype::Charge(timers) = &mut self.archetype {
                    timers.prepare.set(tuning.prepare_time);
                    timers.charge.set(tuning.charge_time + tuning.prepare_time);
                }
                self.state = AiState::Charge;
            } else {
                self.turn_towards_target(dt);
            }
            None
        } else if distance <= tuning.max_engage_range {
            let bullet_speed = ctx.tuning.bullets.get(tuning.bullet).speed;
            self.target = intercept_point(
                self.body.position,
                player.position,
                player.velocity,
                bullet_speed,
                0.0,
            );
            self.turn_towards_target(dt);
            if self.is_facing_target(tuning.fire_facing) {
                self.fire(id, tuning.bullet, tuning.bullet_scale, tuning.fire_rate, ctx)
            } else {
                None
            }
        } else {
            self.target = player.position - direction * tuning.max_engage_range;
            self.move_towards_target(dt, true);
            None
        }
    }

    /// Run the dash: back up slowly while preparing, then lunge forward.
    fn charge(&mut self, dt: f32, tuning: &ChargeTuning) {
        let Archetype::Charge(timers) = &self.archetype else {
            self.state = AiState::Engage;
            return;
        };
        if timers.charge.times_up() {
            self.stop_charging(tuning);
            return;
        }
        let facing = self.body.bearing();
        if timers.prepare.times_up() {
            self.body.position += facing * tuning.charge_speed * dt;
        } else {
            self.body.position -= facing * (self.profile.speed / 2.0) * dt;
        }
    }

    fn fire(
        &mut self,
        id: EntityId,
        kind: BulletKind,
        scale: f32,
        rate: f32,
        ctx: &EnemyContext<'_>,
    ) -> Option<Bullet> {
        let cooldown = match &mut self.archetype {
            Archetype::Ranged { fire } => fire,
            Archetype::Charge(timers) => &mut timers.fire,
            Archetype::Melee(_) => return None,
        };
        if !cooldown.times_up() {
            return None;
        }
        cooldown.set(1.0 / rate);

        let facing = self.body.bearing();
        let muzzle = self.body.position + facing * self.body.hitbox;
        let asset: AssetHandle = ctx.assets.handle(bullet_sprite(kind));
        Some(Bullet::launch(
            kind,
            ctx.tuning.bullets.get(kind),
            ShotParams {
                origin: Vec3::new(muzzle.x, muzzle.y, 0.0),
                direction: facing,
                shooter: Shooter::Enemy(id),
                scale: Some(scale),
            },
            asset,
            ctx.assets.handle(Sprite::Trail),
        ))
    }

    // ========================================================================
    // Steering
    // ========================================================================

    fn angle_to_target(&self) -> f32 {
        let to_target = (self.target - self.body.position).truncate();
        angle_between(bearing(self.body.rotation()).truncate(), to_target)
    }

    /// Whether the facing is within `tolerance` radians of the target.
    #[must_use]
    pub fn is_facing_target(&self, tolerance: f32) -> bool {
        self.angle_to_target().abs() <= tolerance
    }

    /// Turn toward the target without moving.
    fn turn_towards_target(&mut self, dt: f32) -> f32 {
        let difference = self.angle_to_target();
        let step = self.profile.turn_speed * dt;
        if difference < 0.0 {
            self.body.set_rotation(self.body.rotation() + difference.max(-step));
        } else if difference > 0.0 {
            self.body.set_rotation(self.body.rotation() + difference.min(step));
        }
        difference
    }

    /// Turn toward the target and drive along the pre-turn facing.
    ///
    /// A vehicle whose turning circle is wider than the remaining distance
    /// cannot reach the target by driving, so it holds position and keeps
    /// turning until aligned. Ramming enemies only need to be within a
    /// quarter turn; approaching enemies need to face the target exactly.
    fn move_towards_target(&mut self, dt: f32, ram: bool) {
        let facing = self.body.bearing();
        let step_angle = self.profile.turn_speed * dt;
        let difference = self.turn_towards_target(dt);

        let mut distance = planar_distance(self.target, self.body.position);
        let travel = self.profile.speed * dt;
        let base_angle = (std::f32::consts::PI - step_angle.abs()) / 2.0;
        let sin_step = step_angle.abs().sin();
        let turn_radius = if sin_step > f32::EPSILON {
            travel * base_angle.sin() / sin_step
        } else {
            0.0
        };

        let alignment = if ram { RAM_ALIGNMENT } else { APPROACH_ALIGNMENT };
        if turn_radius > distance && difference.abs() >= alignment {
            distance = 0.0;
        }
        self.body.position += facing * distance.min(travel);
    }
}

impl Renderable for Enemy {
    fn render(&self, out: &mut Vec<RenderItem>) {
        out.push(RenderItem::sprite(&self.body));
        if let Archetype::Melee(arm) = &self.archetype {
            arm.render(out);
        }
    }
}
