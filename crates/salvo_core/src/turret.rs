//! Player-mounted turrets.
//!
//! A turret rides on the player: it copies the player's position, turns
//! with the player's facing, aims toward the cursor at a fixed angular
//! rate and fires bullets from its muzzle on a cooldown. Pickup weapons
//! carry a lifetime after which they expire.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::{AssetHandle, Body};
use crate::config::{BulletKind, BulletTable, TurretKind, TurretTable, TurretTemplate};
use crate::math::{bearing, heading, wrap_angle, wrap_signed};
use crate::projectile::{Bullet, Shooter, ShotParams};
use crate::render::{AssetTable, RenderItem, Renderable, Sprite, ViewTransform};
use crate::timer::Timer;

/// Lifecycle of a turret. Expiry is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurretState {
    /// Mounted and firing.
    Active,
    /// Lifetime ran out; the owner swaps or removes it.
    Expired,
}

/// Sprite used for a turret kind.
#[must_use]
pub const fn turret_sprite(kind: TurretKind) -> Sprite {
    match kind {
        TurretKind::Normal => Sprite::NormalTurret,
        TurretKind::MachineGun => Sprite::MachineGunTurret,
        TurretKind::Cannon => Sprite::CannonTurret,
        TurretKind::Homing => Sprite::HomingTurret,
    }
}

/// Sprite used for a bullet kind.
#[must_use]
pub const fn bullet_sprite(kind: BulletKind) -> Sprite {
    match kind {
        BulletKind::Normal => Sprite::NormalBullet,
        BulletKind::Machine => Sprite::MachineBullet,
        BulletKind::Cannonball => Sprite::Cannonball,
        BulletKind::Big => Sprite::BigBullet,
        BulletKind::Homing => Sprite::HomingBullet,
    }
}

/// One weapon mounted on the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turret {
    /// Weapon type.
    pub kind: TurretKind,
    /// Transform; the hitbox is the barrel length, the health is what the
    /// turret can absorb for its owner.
    pub body: Body,
    /// Offset between the aim direction and the barrel.
    pub mount_offset: f32,
    parent_rotation: f32,
    fire_cooldown: f32,
    cooldown: Timer,
    expiration: Option<Timer>,
    state: TurretState,
    bullet: BulletKind,
    bullet_asset: AssetHandle,
    trail_asset: AssetHandle,
}

impl Turret {
    /// Instantiate a template on `parent`, facing the parent's heading
    /// plus `mount_offset`.
    #[must_use]
    pub fn mount(
        kind: TurretKind,
        template: &TurretTemplate,
        parent: &Body,
        mount_offset: f32,
        assets: &AssetTable,
    ) -> Self {
        let angle = if kind == TurretKind::Cannon {
            parent.rotation() + PI
        } else {
            parent.rotation() + mount_offset
        };
        let body = Body::new(parent.position)
            .with_hitbox(template.hitbox)
            .with_health(template.health)
            .with_rotation(angle)
            .with_asset(assets.handle(turret_sprite(kind)));

        Self {
            kind,
            body,
            mount_offset,
            parent_rotation: parent.rotation(),
            fire_cooldown: template.fire_cooldown,
            cooldown: Timer::expired(),
            expiration: template.lifetime.map(Timer::started),
            state: TurretState::Active,
            bullet: template.bullet,
            bullet_asset: assets.handle(bullet_sprite(template.bullet)),
            trail_asset: assets.handle(Sprite::Trail),
        }
    }

    /// Instantiate a kind from the turret table.
    #[must_use]
    pub fn from_table(
        kind: TurretKind,
        table: &TurretTable,
        parent: &Body,
        mount_offset: f32,
        assets: &AssetTable,
    ) -> Self {
        Self::mount(kind, table.get(kind), parent, mount_offset, assets)
    }

    /// Absolute barrel angle in `[0, 2π)`.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.body.rotation()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TurretState {
        self.state
    }

    /// Whether the lifetime has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.state == TurretState::Expired
    }

    /// Bullet template this turret fires.
    #[must_use]
    pub const fn bullet(&self) -> BulletKind {
        self.bullet
    }

    /// Whether the fire cooldown has elapsed.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.cooldown.times_up()
    }

    /// Follow the parent for one tick.
    ///
    /// Any change in the parent's facing since the last tick is applied to
    /// the barrel. Cannons are locked to face straight backward.
    pub fn update(&mut self, parent: &Body, dt: f32) {
        let parent_rotation = parent.rotation();
        if parent_rotation != self.parent_rotation {
            let delta = wrap_signed(parent_rotation - self.parent_rotation);
            self.body.set_rotation(self.body.rotation() + delta);
            self.parent_rotation = parent_rotation;
        }
        if self.kind == TurretKind::Cannon {
            self.body.set_rotation(parent_rotation + PI);
        }

        self.cooldown.update(dt);
        if let Some(expiration) = &mut self.expiration {
            expiration.update(dt);
            if expiration.times_up() {
                self.state = TurretState::Expired;
            }
        }

        self.body.position = parent.position;
    }

    /// Turn toward a screen-space cursor.
    ///
    /// The cursor is mapped into the world through the inverse view
    /// transform. The barrel turns at the table's rotation speed and snaps
    /// once within the snap tolerance. Cannons ignore aim.
    pub fn control(&mut self, cursor: Vec2, view: &ViewTransform, dt: f32, table: &TurretTable) {
        if self.kind == TurretKind::Cannon {
            return;
        }

        let aim = view.screen_to_world(cursor) - self.body.position;
        if aim.truncate().length_squared() == 0.0 {
            return;
        }
        let target = wrap_angle(heading(aim) + self.mount_offset);
        let diff = wrap_signed(target - self.body.rotation());

        if diff.abs() <= table.snap_tolerance {
            self.body.set_rotation(target);
        } else {
            let step = (table.rotation_speed * dt).min(diff.abs());
            self.body.set_rotation(self.body.rotation() + step * diff.signum());
        }
    }

    /// Fire if the cooldown allows.
    ///
    /// The bullet appears at the muzzle (barrel length along the facing)
    /// and the cooldown restarts.
    pub fn fire(&mut self, bullets: &BulletTable) -> Option<Bullet> {
        if !self.cooldown.times_up() {
            return None;
        }
        self.cooldown.set(self.fire_cooldown);

        let facing = bearing(self.body.rotation());
        let muzzle = self.body.position + facing * self.body.hitbox;
        Some(Bullet::launch(
            self.bullet,
            bullets.get(self.bullet),
            ShotParams {
                origin: Vec3::new(muzzle.x, muzzle.y, 0.0),
                direction: facing,
                shooter: Shooter::Player,
                scale: None,
            },
            self.bullet_asset,
            self.trail_asset,
        ))
    }
}

impl Renderable for Turret {
    fn render(&self, out: &mut Vec<RenderItem>) {
        out.push(RenderItem::sprite(&self.body));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraTuning;

    fn parent() -> Body {
        Body::new(Vec3::ZERO).with_rotation(PI / 2.0)
    }

    fn turret(kind: TurretKind) -> Turret {
        Turret::from_table(kind, &TurretTable::default(), &parent(), 0.0, &AssetTable::default())
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let bullets = BulletTable::default();
        let mut gun = turret(TurretKind::Normal);
        assert!(gun.fire(&bullets).is_some());
        assert!(gun.fire(&bullets).is_none());
        gun.update(&parent(), 0.31);
        assert!(gun.fire(&bullets).is_some());
    }

    #[test]
    fn test_bullet_spawns_at_muzzle() {
        let bullets = BulletTable::default();
        let mut gun = turret(TurretKind::Normal);
        let bullet = gun.fire(&bullets).unwrap();
        // facing +y with a barrel of length 1
        assert!((bullet.body.position - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
        assert_eq!(bullet.shooter, Shooter::Player);
    }

    #[test]
    fn test_turret_follows_parent_rotation() {
        let mut gun = turret(TurretKind::Normal);
        let mut moved = parent();
        moved.set_rotation(PI / 2.0 + 0.4);
        moved.position = Vec3::new(3.0, 4.0, 0.0);
        gun.update(&moved, 0.016);
        assert!((gun.angle() - (PI / 2.0 + 0.4)).abs() < 1e-5);
        assert_eq!(gun.body.position, moved.position);
    }

    #[test]
    fn test_cannon_locked_backward_and_ignores_aim() {
        let table = TurretTable::default();
        let view = ViewTransform::following(Vec3::ZERO, &CameraTuning::default());
        let mut cannon = turret(TurretKind::Cannon);
        cannon.control(Vec2::new(0.5, 0.0), &view, 1.0, &table);
        cannon.update(&parent(), 0.016);
        assert!((cannon.angle() - 3.0 * PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_control_turns_at_fixed_rate_then_snaps() {
        let table = TurretTable::default();
        let view = ViewTransform::following(Vec3::ZERO, &CameraTuning::default());
        let mut gun = turret(TurretKind::Normal);

        // Aim to the right: a quarter turn clockwise from +y.
        gun.control(Vec2::new(0.5, 0.0), &view, 0.5, &table);
        assert!((gun.angle() - (PI / 2.0 - 0.5)).abs() < 1e-5);

        for _ in 0..10 {
            gun.control(Vec2::new(0.5, 0.0), &view, 0.5, &table);
        }
        assert!(gun.angle() < 1e-4 || (gun.angle() - std::f32::consts::TAU).abs() < 1e-4);
    }

    #[test]
    fn test_pickup_turret_expires() {
        let mut gun = turret(TurretKind::MachineGun);
        gun.update(&parent(), 9.0);
        assert_eq!(gun.state(), TurretState::Active);
        gun.update(&parent(), 1.5);
        assert!(gun.is_expired());

        let mut plain = turret(TurretKind::Normal);
        plain.update(&parent(), 1000.0);
        assert!(!plain.is_expired());
    }
}
