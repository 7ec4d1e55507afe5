//! Visual-only entities: explosions and the HUD.
//!
//! None of these take part in collision. They exist so the host renderer
//! can draw them from the same draw list as everything else.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::AssetHandle;
use crate::config::TurretKind;
use crate::render::{AssetTable, ObjectType, RenderItem, Renderable, Sprite};
use crate::timer::Timer;

/// Offset of the health bar from the player.
const HEALTH_BAR_OFFSET: Vec3 = Vec3::new(-11.5, -8.0, -5.0);

/// Offset of the objective arrow from the player.
const ARROW_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -5.0);

/// Render scale of the objective arrow.
const ARROW_SCALE: f32 = 4.0;

/// Horizontal spacing of the weapon icons.
const ICON_SPACING: f32 = 1.8;

/// Offset of the first weapon icon from the player.
const ICON_ORIGIN: Vec2 = Vec2::new(1.0, -8.0);

/// Render scale of a weapon icon.
const ICON_SCALE: f32 = 2.0;

/// Particle burst left where an enemy died.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    /// Where it happened.
    pub position: Vec3,
    /// Size, copied from the enemy.
    pub scale: Vec2,
    elapsed: f32,
    timer: Timer,
    asset: AssetHandle,
}

impl Explosion {
    /// Start a burst lasting `duration` seconds.
    #[must_use]
    pub fn new(position: Vec3, scale: Vec2, duration: f32, assets: &AssetTable) -> Self {
        Self {
            position,
            scale,
            elapsed: 0.0,
            timer: Timer::started(duration),
            asset: assets.handle(Sprite::Explosion),
        }
    }

    /// Advance the burst.
    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        self.timer.update(dt);
    }

    /// Whether the burst is over.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.timer.times_up()
    }
}

impl Renderable for Explosion {
    fn render(&self, out: &mut Vec<RenderItem>) {
        out.push(RenderItem {
            object_type: ObjectType::Explosion,
            asset: self.asset,
            position: self.position,
            rotation: 0.0,
            scale: self.scale,
            param: self.elapsed,
        });
    }
}

/// Icon sprite for a mounted turret.
#[must_use]
pub const fn icon_sprite(kind: TurretKind) -> Sprite {
    match kind {
        TurretKind::Normal => Sprite::FourTurretsPickup,
        TurretKind::MachineGun => Sprite::MachineGunPickup,
        TurretKind::Cannon => Sprite::CannonPickup,
        TurretKind::Homing => Sprite::HomingPickup,
    }
}

/// Health bar, objective arrow and weapon strip, all pinned to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    anchor: Vec3,
    health_ratio: f32,
    arrow: Option<f32>,
    icons: Vec<TurretKind>,
    health_asset: AssetHandle,
    arrow_asset: AssetHandle,
    icon_assets: [AssetHandle; 4],
}

impl Hud {
    /// Empty HUD.
    #[must_use]
    pub fn new(assets: &AssetTable) -> Self {
        Self {
            anchor: Vec3::ZERO,
            health_ratio: 1.0,
            arrow: None,
            icons: Vec::new(),
            health_asset: assets.handle(Sprite::HealthBar),
            arrow_asset: assets.handle(Sprite::Arrow),
            icon_assets: [
                assets.handle(icon_sprite(TurretKind::Normal)),
                assets.handle(icon_sprite(TurretKind::MachineGun)),
                assets.handle(icon_sprite(TurretKind::Cannon)),
                assets.handle(icon_sprite(TurretKind::Homing)),
            ],
        }
    }

    /// Follow the player and point the arrow at the nearest objective.
    ///
    /// The arrow is hidden when no objective remains.
    pub fn update(&mut self, player: Vec3, health_ratio: f32, objectives: impl IntoIterator<Item = Vec3>) {
        self.anchor = player;
        self.health_ratio = health_ratio;
        let nearest = objectives.into_iter().min_by(|a, b| {
            let da = a.truncate().distance_squared(player.truncate());
            let db = b.truncate().distance_squared(player.truncate());
            da.total_cmp(&db)
        });
        self.arrow = nearest.map(|target| {
            let direction = target - player;
            direction.y.atan2(direction.x)
        });
    }

    /// Rebuild the weapon strip from the turret rack.
    pub fn set_weapons(&mut self, kinds: impl IntoIterator<Item = TurretKind>) {
        self.icons.clear();
        self.icons.extend(kinds);
    }

    /// Health ratio shown on the bar.
    #[must_use]
    pub const fn health_ratio(&self) -> f32 {
        self.health_ratio
    }

    /// Heading of the objective arrow, if any objective remains.
    #[must_use]
    pub const fn arrow(&self) -> Option<f32> {
        self.arrow
    }

    /// Weapons shown in the strip.
    #[must_use]
    pub fn weapons(&self) -> &[TurretKind] {
        &self.icons
    }

    fn icon_asset(&self, kind: TurretKind) -> AssetHandle {
        match kind {
            TurretKind::Normal => self.icon_assets[0],
            TurretKind::MachineGun => self.icon_assets[1],
            TurretKind::Cannon => self.icon_assets[2],
            TurretKind::Homing => self.icon_assets[3],
        }
    }
}

impl Renderable for Hud {
    fn render(&self, out: &mut Vec<RenderItem>) {
        for (index, &kind) in self.icons.iter().enumerate() {
            let offset = ICON_ORIGIN + Vec2::new(index as f32 * ICON_SPACING, 0.0);
            out.push(RenderItem {
                object_type: ObjectType::Sprite,
                asset: self.icon_asset(kind),
                position: Vec3::new(self.anchor.x + offset.x, self.anchor.y + offset.y, 0.0),
                rotation: -FRAC_PI_2,
                scale: Vec2::splat(ICON_SCALE),
                param: 0.0,
            });
        }
        out.push(RenderItem {
            object_type: ObjectType::HealthBar,
            asset: self.health_asset,
            position: self.anchor + HEALTH_BAR_OFFSET,
            rotation: 0.0,
            scale: Vec2::ONE,
            param: self.health_ratio,
        });
        if let Some(heading) = self.arrow {
            out.push(RenderItem {
                object_type: ObjectType::Arrow,
                asset: self.arrow_asset,
                position: self.anchor + ARROW_OFFSET,
                rotation: heading,
                scale: Vec2::splat(ARROW_SCALE),
                param: 0.0,
            });
        }
    }
}
