//! Shared entity data.
//!
//! Every actor in the simulation (player, enemies, turrets, bullets,
//! collectibles, arm links) embeds a [`Body`]: the transform, health and
//! knockback state the combat rules operate on. Actor-specific behaviour
//! lives in the owning module; children are owned by value, so dropping a
//! parent drops its whole subtree.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::EntityTuning;
use crate::math::{bearing, planar_distance, right_of, wrap_angle};

/// Unique identifier for registry-owned entities.
pub type EntityId = u64;

/// Opaque texture/geometry handle supplied by the host at construction.
///
/// The simulation copies these into its draw list and never interprets them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHandle(pub u32);

/// Which side fired a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// The player and its turrets.
    Player,
    /// Any enemy archetype.
    Enemy,
}

/// Position and weight of whatever is pushing a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnockbackSource {
    /// Where the push comes from.
    pub position: Vec3,
    /// Weight of the pusher; heavier sources push harder.
    pub weight: f32,
}

// ============================================================================
// Body
// ============================================================================

/// Transform, health and knockback state of one actor.
///
/// Rotation is kept in `[0, 2π)`. Health is never clamped above the
/// maximum by [`heal`](Self::heal), and never drops below zero from
/// [`take_damage`](Self::take_damage).
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use salvo_core::components::Body;
///
/// let mut body = Body::new(Vec3::ZERO).with_health(50.0);
/// body.take_damage(80.0);
/// assert!(body.is_dead());
/// assert_eq!(body.health, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// World position; `z` is draw depth only.
    pub position: Vec3,
    /// Non-uniform render scale.
    pub scale: Vec2,
    rotation: f32,
    /// Collision radius.
    pub hitbox: f32,
    /// Current health.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Contact damage this body deals.
    pub melee_damage: f32,
    /// Knockback resistance.
    pub weight: f32,
    /// Transient velocity from knockback impulses.
    pub knockback: Vec3,
    /// Host asset drawn for this body.
    pub asset: AssetHandle,
}

impl Body {
    /// A body at `position` with the stock entity values.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            scale: Vec2::ONE,
            rotation: 0.0,
            hitbox: 0.1,
            health: 50.0,
            max_health: 50.0,
            melee_damage: 10.0,
            weight: 1.0,
            knockback: Vec3::ZERO,
            asset: AssetHandle::default(),
        }
    }

    /// Set health and maximum health.
    #[must_use]
    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self.max_health = health;
        self
    }

    /// Set the collision radius.
    #[must_use]
    pub fn with_hitbox(mut self, hitbox: f32) -> Self {
        self.hitbox = hitbox;
        self
    }

    /// Set a uniform render scale.
    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec2::splat(scale);
        self
    }

    /// Set the weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Set contact damage.
    #[must_use]
    pub fn with_melee_damage(mut self, damage: f32) -> Self {
        self.melee_damage = damage;
        self
    }

    /// Set the initial rotation (wrapped).
    #[must_use]
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.set_rotation(rotation);
        self
    }

    /// Set the host asset.
    #[must_use]
    pub fn with_asset(mut self, asset: AssetHandle) -> Self {
        self.asset = asset;
        self
    }

    /// Facing angle in `[0, 2π)`.
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Set the facing angle, wrapping it into `[0, 2π)`.
    pub fn set_rotation(&mut self, angle: f32) {
        self.rotation = wrap_angle(angle);
    }

    /// Unit vector along the facing.
    #[must_use]
    pub fn bearing(&self) -> Vec3 {
        bearing(self.rotation)
    }

    /// Unit vector to the right of the facing.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        right_of(self.rotation)
    }

    /// Whether health has run out.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Subtract damage, stopping at zero.
    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    /// Add health. Not clamped to the maximum.
    pub fn heal(&mut self, amount: f32) {
        self.health += amount;
    }

    /// Health as a fraction of the maximum, for display.
    #[must_use]
    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    /// This body as the origin of a knockback.
    #[must_use]
    pub fn as_source(&self) -> KnockbackSource {
        KnockbackSource {
            position: self.position,
            weight: self.weight,
        }
    }

    /// Whether two bodies' hitboxes touch.
    #[must_use]
    pub fn touches(&self, other: &Body) -> bool {
        planar_distance(self.position, other.position) <= self.hitbox + other.hitbox
    }

    /// Push this body away from `source`.
    ///
    /// The impulse has magnitude `force × source.weight / (weight +
    /// source.weight) × multiplier` and accumulates onto the current
    /// knockback velocity. A source at the same position pushes nothing.
    pub fn apply_knockback(&mut self, source: KnockbackSource, multiplier: f32, tuning: &EntityTuning) {
        let away = (self.position - source.position).truncate();
        let direction = away.normalize_or_zero().extend(0.0);

        let total_weight = self.weight + source.weight;
        if total_weight <= 0.0 {
            return;
        }
        let magnitude = tuning.knockback_force * (source.weight / total_weight) * multiplier;
        self.knockback += direction * magnitude;
    }

    /// Move by the knockback velocity, then decay its magnitude toward zero.
    pub fn integrate_knockback(&mut self, dt: f32, tuning: &EntityTuning) {
        self.position += self.knockback * dt;

        let speed = self.knockback.length();
        if speed > 0.0 {
            let slowdown = (tuning.knockback_deceleration * dt).min(speed);
            self.knockback -= self.knockback / speed * slowdown;
        }
    }
}
