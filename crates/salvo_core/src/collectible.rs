//! Pickups, win tokens and the exit door.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::Body;
use crate::render::{AssetTable, RenderItem, Renderable, Sprite};

/// What touching a collectible does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollectibleKind {
    /// Three extra turrets around the hull.
    FourTurrets,
    /// Machine gun in the primary slot.
    MachineGun,
    /// Four extra turrets in a narrow forward fan.
    Shotgun,
    /// One rear-facing cannon.
    Cannon,
    /// Homing launcher in the primary slot.
    Homing,
    /// One of the four tokens that unlock the exit.
    WinToken,
    /// The exit; reaching it wins the game.
    ExitDoor,
}

impl CollectibleKind {
    /// Pickups the director draws from, in spawn-weight order.
    pub const PICKUPS: [Self; 5] = [
        Self::FourTurrets,
        Self::MachineGun,
        Self::Shotgun,
        Self::Cannon,
        Self::Homing,
    ];

    /// Sprite for this kind.
    #[must_use]
    pub const fn sprite(self) -> Sprite {
        match self {
            Self::FourTurrets => Sprite::FourTurretsPickup,
            Self::MachineGun => Sprite::MachineGunPickup,
            Self::Shotgun => Sprite::ShotgunPickup,
            Self::Cannon => Sprite::CannonPickup,
            Self::Homing => Sprite::HomingPickup,
            Self::WinToken => Sprite::WinToken,
            Self::ExitDoor => Sprite::ExitDoor,
        }
    }
}

/// Parametric circle a collectible travels on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    /// Circle radius.
    pub radius: f32,
    /// Seconds per revolution.
    pub period: f32,
    /// Seconds travelled so far.
    pub phase: f32,
    /// Circle centre.
    pub center: Vec2,
}

/// A collectible lying in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    /// Transform and pickup radius.
    pub body: Body,
    /// Effect on pickup.
    pub kind: CollectibleKind,
    /// Circular motion, if any.
    pub orbit: Option<Orbit>,
}

impl Collectible {
    /// Place a collectible with the given pickup radius.
    #[must_use]
    pub fn new(kind: CollectibleKind, position: Vec3, hitbox: f32, assets: &AssetTable) -> Self {
        let body = Body::new(position)
            .with_hitbox(hitbox)
            .with_asset(assets.handle(kind.sprite()));
        Self {
            body,
            kind,
            orbit: None,
        }
    }

    /// Resize; the pickup radius follows the size.
    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.body = self.body.with_scale(scale).with_hitbox(scale / 2.0);
        self
    }

    /// Circle around `center`.
    #[must_use]
    pub fn with_orbit(mut self, radius: f32, period: f32, center: Vec2) -> Self {
        self.orbit = Some(Orbit {
            radius,
            period,
            phase: 0.0,
            center,
        });
        self
    }

    /// Advance along the orbit, facing outward from its centre.
    pub fn update(&mut self, dt: f32) {
        let Some(orbit) = &mut self.orbit else {
            return;
        };
        if orbit.period <= 0.0 {
            return;
        }
        orbit.phase += dt;
        let angle = orbit.phase / orbit.period * TAU;
        let offset = Vec2::new(angle.cos(), angle.sin()) * orbit.radius;
        let position = orbit.center + offset;
        self.body.position = position.extend(self.body.position.z);
        self.body.set_rotation(offset.y.atan2(offset.x));
    }
}

impl Renderable for Collectible {
    fn render(&self, out: &mut Vec<RenderItem>) {
        out.push(RenderItem::sprite(&self.body));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_sets_pickup_radius() {
        let token = Collectible::new(CollectibleKind::WinToken, Vec3::ZERO, 0.5, &AssetTable::default())
            .with_scale(3.0);
        assert_eq!(token.body.hitbox, 1.5);
        assert_eq!(token.body.scale, Vec2::splat(3.0));
    }

    #[test]
    fn test_orbit_follows_circle() {
        let center = Vec2::new(20.0, 20.0);
        let mut token = Collectible::new(CollectibleKind::WinToken, center.extend(0.0), 0.5, &AssetTable::default())
            .with_orbit(1.0, 4.0, center);
        token.update(1.0);
        // A quarter period puts the token straight above the centre.
        assert!((token.body.position - Vec3::new(20.0, 21.0, 0.0)).length() < 1e-4);
        assert!((token.body.rotation() - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
        for _ in 0..3 {
            token.update(1.0);
        }
        assert!((token.body.position - Vec3::new(21.0, 20.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_static_pickup_does_not_move() {
        let mut pickup = Collectible::new(CollectibleKind::Cannon, Vec3::new(3.0, 4.0, 0.0), 0.5, &AssetTable::default());
        pickup.update(10.0);
        assert_eq!(pickup.body.position, Vec3::new(3.0, 4.0, 0.0));
    }
}
