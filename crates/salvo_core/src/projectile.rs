//! Bullets: spawning, flight, homing and pierce memory.

use std::collections::BTreeSet;
use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::{AssetHandle, Body, EntityId, Faction, KnockbackSource};
use crate::config::{BulletKind, BulletTemplate};
use crate::math::heading;
use crate::render::{ObjectType, RenderItem, Renderable};
use crate::timer::Timer;

/// Distance at which a homing bullet lets go of its target.
pub const HOMING_ARRIVAL: f32 = 0.3;

/// Look-ahead used when picking the nearest homing target.
const HOMING_LOOKAHEAD: f32 = 0.5;

/// Non-owning reference to whoever fired a bullet.
///
/// Only used to decide which side the bullet can hurt; the shooter may
/// be gone by the time the bullet lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shooter {
    /// Fired by one of the player's turrets.
    Player,
    /// Fired by the enemy with this id.
    Enemy(EntityId),
}

impl Shooter {
    /// Side the shooter belongs to.
    #[must_use]
    pub const fn faction(self) -> Faction {
        match self {
            Self::Player => Faction::Player,
            Self::Enemy(_) => Faction::Enemy,
        }
    }
}

/// Particle trail that follows a bullet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    /// Render scale of the particle system.
    pub scale: f32,
    /// Seconds since the bullet was fired.
    pub elapsed: f32,
    /// Host asset for the particles.
    pub asset: AssetHandle,
}

/// Everything needed to launch one bullet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotParams {
    /// Muzzle position.
    pub origin: Vec3,
    /// Flight direction; normalized on launch.
    pub direction: Vec3,
    /// Who fired.
    pub shooter: Shooter,
    /// Render scale override.
    pub scale: Option<f32>,
}

/// A projectile in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Transform and collision radius.
    pub body: Body,
    /// Template this bullet was made from.
    pub kind: BulletKind,
    /// Flight direction (not renormalized while homing).
    pub direction: Vec3,
    /// Travel speed.
    pub speed: f32,
    /// Damage per hit.
    pub damage: f32,
    /// Who fired it.
    pub shooter: Shooter,
    expiration: Timer,
    alive: bool,
    pierce: Option<BTreeSet<EntityId>>,
    homing: Option<Option<EntityId>>,
    /// Optional trailing particles.
    pub trail: Option<Trail>,
}

impl Bullet {
    /// Instantiate a template and launch it.
    ///
    /// The bullet faces its direction of travel (sprites point along
    /// `+y`, hence the quarter-turn offset) and expires after the
    /// template's lifetime.
    #[must_use]
    pub fn launch(
        kind: BulletKind,
        template: &BulletTemplate,
        shot: ShotParams,
        asset: AssetHandle,
        trail_asset: AssetHandle,
    ) -> Self {
        let direction = shot.direction.truncate().normalize_or_zero().extend(0.0);
        let origin = Vec3::new(shot.origin.x, shot.origin.y, 0.0);

        let body = Body::new(origin)
            .with_hitbox(template.hitbox)
            .with_weight(template.weight)
            .with_scale(shot.scale.unwrap_or(template.scale))
            .with_rotation(heading(direction) - PI / 2.0)
            .with_asset(asset);

        Self {
            body,
            kind,
            direction,
            speed: template.speed,
            damage: template.damage,
            shooter: shot.shooter,
            expiration: Timer::started(template.lifetime),
            alive: true,
            pierce: template.pierce.then(BTreeSet::new),
            homing: template.homing.then_some(None),
            trail: template.trail_scale.map(|scale| Trail {
                scale,
                elapsed: 0.0,
                asset: trail_asset,
            }),
        }
    }

    /// Whether the bullet is still in flight.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Mark the bullet for removal.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Whether this bullet survives hits.
    #[must_use]
    pub const fn is_piercing(&self) -> bool {
        self.pierce.is_some()
    }

    /// Current homing lock, if this is a homing bullet with a target.
    #[must_use]
    pub fn homing_target(&self) -> Option<EntityId> {
        self.homing.flatten()
    }

    /// Velocity over the current tick.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.direction * self.speed
    }

    /// Seconds before expiry.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.expiration.remaining()
    }

    /// Record a hit on `target`.
    ///
    /// Returns `true` the first time a target is struck and `false` on
    /// every later encounter. Non-piercing bullets always report `true`;
    /// they are removed on their first hit anyway.
    pub fn pierce(&mut self, target: EntityId) -> bool {
        match &mut self.pierce {
            Some(memory) => memory.insert(target),
            None => true,
        }
    }

    /// This bullet as the origin of a knockback.
    #[must_use]
    pub fn as_source(&self) -> KnockbackSource {
        self.body.as_source()
    }

    /// Advance one tick.
    ///
    /// `enemies` lists live enemy positions for homing. A homing bullet
    /// without a lock picks the enemy nearest its look-ahead point, blends
    /// its direction toward it, and drops the lock once within
    /// [`HOMING_ARRIVAL`] or when the target no longer exists.
    pub fn update(&mut self, dt: f32, enemies: &[(EntityId, Vec3)]) {
        self.expiration.update(dt);

        if let Some(lock) = self.homing {
            let lock = lock.filter(|id| enemies.iter().any(|(enemy, _)| enemy == id));
            let lock = lock.or_else(|| self.nearest(enemies));
            self.homing = Some(lock);

            let target = lock.and_then(|id| enemies.iter().find(|(enemy, _)| *enemy == id));
            if let Some(&(_, target)) = target {
                let to_target = (target - self.body.position).truncate();
                if to_target.length() > HOMING_ARRIVAL {
                    let wanted = to_target.normalize_or_zero().extend(0.0);
                    self.direction += (wanted - self.direction) * dt;
                    self.body.set_rotation(heading(self.direction) - PI / 2.0);
                } else {
                    self.homing = Some(None);
                }
            }
        }

        self.body.position += self.direction * self.speed * dt;

        if let Some(trail) = &mut self.trail {
            trail.elapsed += dt;
        }

        if self.expiration.times_up() {
            self.alive = false;
        }
    }

    fn nearest(&self, enemies: &[(EntityId, Vec3)]) -> Option<EntityId> {
        let probe: Vec2 = (self.body.position + self.direction * HOMING_LOOKAHEAD).truncate();
        enemies
            .iter()
            .map(|(id, position)| (*id, probe.distance(position.truncate())))
            .fold(None, |best: Option<(EntityId, f32)>, (id, distance)| match best {
                Some((_, best_distance)) if best_distance <= distance => best,
                _ => Some((id, distance)),
            })
            .map(|(id, _)| id)
    }
}

impl Renderable for Bullet {
    fn render(&self, out: &mut Vec<RenderItem>) {
        if let Some(trail) = &self.trail {
            out.push(RenderItem {
                object_type: ObjectType::BulletTrail,
                asset: trail.asset,
                position: self.body.position,
                rotation: self.body.rotation(),
                scale: Vec2::splat(trail.scale),
                param: trail.elapsed,
            });
        }
        out.push(RenderItem::sprite(&self.body));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BulletTable;

    fn launch(kind: BulletKind, direction: Vec3) -> Bullet {
        let table = BulletTable::default();
        Bullet::launch(
            kind,
            table.get(kind),
            ShotParams {
                origin: Vec3::ZERO,
                direction,
                shooter: Shooter::Player,
                scale: None,
            },
            AssetHandle(1),
            AssetHandle(2),
        )
    }

    #[test]
    fn test_launch_faces_direction() {
        let bullet = launch(BulletKind::Normal, Vec3::X);
        // Sprites point along +y, so +x travel is a quarter turn clockwise.
        assert!((bullet.body.rotation() - 3.0 * PI / 2.0).abs() < 1e-5);
        assert_eq!(bullet.velocity(), Vec3::X * 20.0);
        assert!(bullet.trail.is_some());
    }

    #[test]
    fn test_bullet_moves_and_expires() {
        let mut bullet = launch(BulletKind::Normal, Vec3::Y);
        bullet.update(0.5, &[]);
        assert!((bullet.body.position.y - 10.0).abs() < 1e-4);
        assert!(bullet.is_alive());
        bullet.update(1.6, &[]);
        assert!(!bullet.is_alive());
    }

    #[test]
    fn test_pierce_memory_is_per_target() {
        let mut bullet = launch(BulletKind::Cannonball, Vec3::X);
        assert!(bullet.is_piercing());
        assert!(bullet.pierce(1));
        assert!(bullet.pierce(2));
        assert!(!bullet.pierce(1));
        assert!(!bullet.pierce(2));
    }

    #[test]
    fn test_non_piercing_always_hits() {
        let mut bullet = launch(BulletKind::Normal, Vec3::X);
        assert!(!bullet.is_piercing());
        assert!(bullet.pierce(1));
        assert!(bullet.pierce(1));
    }

    #[test]
    fn test_homing_locks_nearest_and_steers() {
        let mut bullet = launch(BulletKind::Homing, Vec3::X);
        let enemies = [(7, Vec3::new(0.0, 10.0, 0.0)), (9, Vec3::new(0.0, 40.0, 0.0))];
        bullet.update(0.1, &enemies);
        assert_eq!(bullet.homing_target(), Some(7));
        assert!(bullet.direction.y > 0.0);
    }

    #[test]
    fn test_homing_drops_missing_target() {
        let mut bullet = launch(BulletKind::Homing, Vec3::X);
        bullet.update(0.1, &[(7, Vec3::new(0.0, 10.0, 0.0))]);
        assert_eq!(bullet.homing_target(), Some(7));
        bullet.update(0.1, &[(8, Vec3::new(0.0, -10.0, 0.0))]);
        assert_eq!(bullet.homing_target(), Some(8));
        bullet.update(0.1, &[]);
        assert_eq!(bullet.homing_target(), None);
    }

    #[test]
    fn test_homing_releases_on_arrival() {
        let mut bullet = launch(BulletKind::Homing, Vec3::X);
        bullet.update(0.0, &[(3, Vec3::new(0.1, 0.0, 0.0))]);
        assert_eq!(bullet.homing_target(), None);
    }

    #[test]
    fn test_plain_bullet_ignores_enemies() {
        let mut bullet = launch(BulletKind::Normal, Vec3::X);
        bullet.update(0.1, &[(1, Vec3::new(0.0, 5.0, 0.0))]);
        assert_eq!(bullet.direction, Vec3::X);
        assert_eq!(bullet.homing_target(), None);
    }

    #[test]
    fn test_trail_renders_before_bullet() {
        let bullet = launch(BulletKind::Normal, Vec3::X);
        let mut items = Vec::new();
        bullet.render(&mut items);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].object_type, ObjectType::BulletTrail);
        assert_eq!(items[1].object_type, ObjectType::Sprite);
    }
}
