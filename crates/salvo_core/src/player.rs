//! The player ship and its turret rack.
//!
//! The ship drives like a boat: forward thrust up to a speed cap, separate
//! friction along and across the hull, and a turning speed that builds up
//! and bleeds off. Turrets ride on the hull in an ordered rack. Slot 0 is
//! the primary weapon that pickups replace, later slots are extra barrels
//! that soak up hits for the hull.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::{Body, KnockbackSource};
use crate::config::{EntityTuning, PlayerTuning, TurretKind, TurretTable, TuningConfig};
use crate::projectile::Bullet;
use crate::render::{AssetTable, RenderItem, Renderable, Sprite, ViewTransform};
use crate::timer::Timer;
use crate::turret::Turret;

/// Which trigger is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Every turret except the cannon.
    Primary,
    /// The cannon only.
    Secondary,
}

/// Where a hit on the player ended up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Invulnerability frames swallowed the hit.
    Ignored,
    /// An extra turret took the hit.
    Absorbed {
        /// Whether the turret was destroyed.
        destroyed: bool,
    },
    /// The hull took the hit.
    Hull,
}

/// The player ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Transform, health and knockback.
    pub body: Body,
    velocity: Vec3,
    turning_speed: f32,
    movement: Vec2,
    iframes: Timer,
    turrets: Vec<Turret>,
}

impl Player {
    /// Spawn the ship at `position` with one default turret.
    #[must_use]
    pub fn spawn(position: Vec3, tuning: &TuningConfig, assets: &AssetTable) -> Self {
        let player = &tuning.player;
        let body = Body::new(position)
            .with_hitbox(player.hitbox)
            .with_health(player.health)
            .with_melee_damage(player.melee_damage)
            .with_weight(player.weight)
            .with_rotation(player.start_rotation)
            .with_asset(assets.handle(Sprite::Player));
        let default_turret = Turret::from_table(TurretKind::Normal, &tuning.turrets, &body, 0.0, assets);

        Self {
            body,
            velocity: Vec3::ZERO,
            turning_speed: 0.0,
            movement: Vec2::ZERO,
            iframes: Timer::expired(),
            turrets: vec![default_turret],
        }
    }

    /// Drive velocity, excluding knockback.
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Current turning speed, in half-turns per second.
    #[must_use]
    pub const fn turning_speed(&self) -> f32 {
        self.turning_speed
    }

    /// Whether hits are currently ignored.
    #[must_use]
    pub fn in_iframes(&self) -> bool {
        !self.iframes.times_up()
    }

    /// The turret rack, primary first.
    #[must_use]
    pub fn turrets(&self) -> &[Turret] {
        &self.turrets
    }

    /// Whether a cannon is mounted.
    #[must_use]
    pub fn has_cannon(&self) -> bool {
        self.turrets.iter().any(|turret| turret.kind == TurretKind::Cannon)
    }

    /// Set the movement input: `x` is thrust, `y` is turn. Both are
    /// clamped to `[-1, 1]`.
    pub fn set_movement_input(&mut self, movement: Vec2) {
        self.movement = movement.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Push the ship away from `source`.
    pub fn apply_knockback(&mut self, source: KnockbackSource, multiplier: f32, tuning: &EntityTuning) {
        self.body.apply_knockback(source, multiplier, tuning);
    }

    /// Take a hit.
    ///
    /// During invulnerability nothing happens. With more than one turret
    /// mounted, the last non-cannon turret past the primary takes the hit
    /// instead of the hull and is removed if destroyed. Any landed hit
    /// restarts the invulnerability window.
    pub fn take_damage(&mut self, amount: f32, tuning: &PlayerTuning) -> DamageOutcome {
        if self.in_iframes() {
            return DamageOutcome::Ignored;
        }
        self.iframes.set(tuning.iframe_time);

        if self.turrets.len() > 1 {
            let shield = (1..self.turrets.len())
                .rev()
                .find(|&index| self.turrets[index].kind != TurretKind::Cannon);
            if let Some(index) = shield {
                let turret = &mut self.turrets[index];
                turret.body.take_damage(amount);
                let destroyed = turret.body.is_dead();
                if destroyed {
                    self.turrets.remove(index);
                }
                return DamageOutcome::Absorbed { destroyed };
            }
        }

        self.body.take_damage(amount);
        DamageOutcome::Hull
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Advance one tick: drive, turn, knockback, then the turret rack.
    pub fn update(&mut self, dt: f32, tuning: &TuningConfig, assets: &AssetTable) {
        self.drive(dt, &tuning.player);
        self.steer(dt, &tuning.player);
        self.iframes.update(dt);
        self.body.integrate_knockback(dt, &tuning.entity);
        self.update_turrets(dt, &tuning.turrets, assets);
    }

    fn drive(&mut self, dt: f32, tuning: &PlayerTuning) {
        let forward = self.body.bearing();
        let right = self.body.right();

        // Friction along the hull, only while faster than the throttle allows.
        let wanted = self.movement.x * tuning.max_speed;
        let along = self.velocity.dot(forward);
        let excess = (wanted - along).abs();
        let front = (tuning.front_friction * dt).min(excess);
        if along > 0.0 && wanted < along {
            self.velocity -= forward * front;
        } else if along < 0.0 && wanted > along {
            self.velocity += forward * front;
        }

        // Friction across the hull always pulls sideways drift to zero.
        let across = self.velocity.dot(right);
        let side = (tuning.side_friction * dt).min(across.abs());
        if across > 0.0 {
            self.velocity -= right * side;
        } else if across < 0.0 {
            self.velocity += right * side;
        }

        let along = self.velocity.dot(forward);
        if along.abs() < tuning.max_speed {
            let thrust = (tuning.acceleration * dt).min((tuning.max_speed - along).abs());
            self.velocity += forward * self.movement.x * thrust;
        }

        self.body.position += self.velocity * dt;
    }

    fn steer(&mut self, dt: f32, tuning: &PlayerTuning) {
        let cap = tuning.max_turning_speed;
        self.turning_speed = self.turning_speed.clamp(-cap, cap);

        let turn = self.movement.y;
        if turn == 0.0 {
            let friction = (tuning.rotational_friction * dt).min(self.turning_speed.abs());
            self.turning_speed -= friction * self.turning_speed.signum();
        } else if turn > 0.0 {
            if self.turning_speed < cap {
                self.turning_speed += (tuning.rotational_acceleration * dt).min(cap - self.turning_speed);
            }
        } else if self.turning_speed > -cap {
            self.turning_speed -= (tuning.rotational_acceleration * dt).min(cap + self.turning_speed);
        }

        let rotation = self.body.rotation() - std::f32::consts::PI * self.turning_speed * dt;
        self.body.set_rotation(rotation);
    }

    fn update_turrets(&mut self, dt: f32, table: &TurretTable, assets: &AssetTable) {
        for turret in &mut self.turrets {
            turret.update(&self.body, dt);
        }

        let primary_expired = self.turrets.first().is_some_and(Turret::is_expired);
        let mut index = 0;
        self.turrets.retain(|turret| {
            let keep = index == 0 || !turret.is_expired();
            index += 1;
            keep
        });
        if primary_expired {
            self.set_turret(TurretKind::Normal, table, assets);
        }
        if self.turrets.is_empty() {
            let turret = Turret::from_table(TurretKind::Normal, table, &self.body, 0.0, assets);
            self.turrets.push(turret);
        }
    }

    // ========================================================================
    // Weapons
    // ========================================================================

    /// Aim every turret at a screen-space cursor.
    pub fn aim(&mut self, cursor: Vec2, view: &ViewTransform, dt: f32, table: &TurretTable) {
        for turret in &mut self.turrets {
            turret.control(cursor, view, dt, table);
        }
    }

    /// Pull a trigger and collect the bullets that left the barrels.
    ///
    /// A cannon shot also throws the ship forward.
    pub fn fire(&mut self, trigger: Trigger, tuning: &TuningConfig, out: &mut Vec<Bullet>) -> usize {
        let before = out.len();
        let mut recoil = false;
        for turret in &mut self.turrets {
            let is_cannon = turret.kind == TurretKind::Cannon;
            if is_cannon != (trigger == Trigger::Secondary) {
                continue;
            }
            if let Some(bullet) = turret.fire(&tuning.bullets) {
                out.push(bullet);
                recoil |= is_cannon;
            }
        }
        if recoil {
            self.velocity += self.body.bearing() * tuning.player.cannon_recoil;
        }
        out.len() - before
    }

    /// Replace the primary turret.
    pub fn set_turret(&mut self, kind: TurretKind, table: &TurretTable, assets: &AssetTable) {
        let turret = Turret::from_table(kind, table, &self.body, 0.0, assets);
        if self.turrets.is_empty() {
            self.turrets.push(turret);
        } else {
            self.turrets[0] = turret;
        }
    }

    /// Mount default turrets at the given offsets, stopping at the cap.
    ///
    /// Returns how many were mounted; a full rack takes nothing.
    pub fn add_turrets(&mut self, offsets: &[f32], table: &TurretTable, assets: &AssetTable) -> usize {
        let room = table.max_turrets.saturating_sub(self.turrets.len());
        let added = offsets.len().min(room);
        for &offset in &offsets[..added] {
            let turret = Turret::from_table(TurretKind::Normal, table, &self.body, offset, assets);
            self.turrets.push(turret);
        }
        added
    }

    /// Mount a cannon unless one is already mounted or the rack is full.
    pub fn add_cannon(&mut self, table: &TurretTable, assets: &AssetTable) -> bool {
        if self.has_cannon() || self.turrets.len() >= table.max_turrets {
            return false;
        }
        let cannon = Turret::from_table(TurretKind::Cannon, table, &self.body, 0.0, assets);
        self.turrets.push(cannon);
        true
    }
}

impl Renderable for Player {
    fn render(&self, out: &mut Vec<RenderItem>) {
        out.push(RenderItem::sprite(&self.body));
        for turret in &self.turrets {
            turret.render(out);
        }
    }
}
