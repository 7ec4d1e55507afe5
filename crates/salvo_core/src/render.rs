//! Render contract between the simulation and a host renderer.
//!
//! The core never touches shaders, textures or draw calls. Each frame it
//! flattens its entity tree (parents before children) into a list of
//! [`RenderItem`]s and hands them to a [`Renderer`] together with the
//! current [`ViewTransform`].

use std::collections::BTreeMap;

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::{AssetHandle, Body};
use crate::config::CameraTuning;

// ============================================================================
// Draw list
// ============================================================================

/// Shading branch the renderer should take for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    /// Plain textured quad.
    Sprite,
    /// Bullet trail particles.
    BulletTrail,
    /// Explosion particles.
    Explosion,
    /// Player health bar overlay.
    HealthBar,
    /// Objective arrow overlay.
    Arrow,
}

impl ObjectType {
    /// Integer tag passed to the shader.
    #[must_use]
    pub const fn tag(self) -> i32 {
        match self {
            Self::Sprite => 0,
            Self::BulletTrail => 10,
            Self::Explosion => 11,
            Self::HealthBar => 1000,
            Self::Arrow => 1001,
        }
    }
}

/// One drawable quad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderItem {
    /// Shading branch.
    pub object_type: ObjectType,
    /// Host asset to bind.
    pub asset: AssetHandle,
    /// World position; `z` orders layers.
    pub position: Vec3,
    /// Rotation about the view axis.
    pub rotation: f32,
    /// Non-uniform scale.
    pub scale: Vec2,
    /// Type-specific shader input: health ratio for the health bar,
    /// elapsed seconds for particle effects, zero otherwise.
    pub param: f32,
}

impl RenderItem {
    /// A sprite drawn at a body's transform.
    #[must_use]
    pub fn sprite(body: &Body) -> Self {
        Self {
            object_type: ObjectType::Sprite,
            asset: body.asset,
            position: body.position,
            rotation: body.rotation(),
            scale: body.scale,
            param: 0.0,
        }
    }

    /// Change the shading branch.
    #[must_use]
    pub fn with_type(mut self, object_type: ObjectType) -> Self {
        self.object_type = object_type;
        self
    }

    /// Set the type-specific shader input.
    #[must_use]
    pub fn with_param(mut self, param: f32) -> Self {
        self.param = param;
        self
    }
}

/// Anything that contributes to the draw list.
///
/// Implementations push their own item first and then recurse into the
/// children they own.
pub trait Renderable {
    /// Append this entity and its children to `out`.
    fn render(&self, out: &mut Vec<RenderItem>);
}

/// Host-side drawing backend.
pub trait Renderer {
    /// Draw one frame.
    fn draw(&mut self, view: &ViewTransform, current_time: f64, items: &[RenderItem]);
}

/// Renderer that keeps the last frame, for tests and headless inspection.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    /// Items of the most recent frame.
    pub items: Vec<RenderItem>,
    /// View of the most recent frame.
    pub view: Option<ViewTransform>,
    /// Number of frames drawn.
    pub frames: u64,
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, view: &ViewTransform, _current_time: f64, items: &[RenderItem]) {
        self.items = items.to_vec();
        self.view = Some(*view);
        self.frames += 1;
    }
}

// ============================================================================
// Assets
// ============================================================================

/// Every distinct visual the simulation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sprite {
    /// Player ship.
    Player,
    /// Default turret.
    NormalTurret,
    /// Machine-gun turret.
    MachineGunTurret,
    /// Cannon.
    CannonTurret,
    /// Homing launcher.
    HomingTurret,
    /// Default round.
    NormalBullet,
    /// Machine-gun round.
    MachineBullet,
    /// Cannon round.
    Cannonball,
    /// Charge enemy round.
    BigBullet,
    /// Homing round.
    HomingBullet,
    /// Bullet trail particles.
    Trail,
    /// Melee enemy body.
    MeleeEnemy,
    /// Ranged enemy body.
    RangedEnemy,
    /// Charge enemy body.
    ChargeEnemy,
    /// Melee arm link.
    Arm,
    /// Melee saw.
    Saw,
    /// Multi-turret pickup.
    FourTurretsPickup,
    /// Machine-gun pickup.
    MachineGunPickup,
    /// Shotgun pickup.
    ShotgunPickup,
    /// Cannon pickup.
    CannonPickup,
    /// Homing pickup.
    HomingPickup,
    /// Win-condition token.
    WinToken,
    /// Exit door.
    ExitDoor,
    /// Background tile.
    Tile,
    /// Explosion particles.
    Explosion,
    /// Health bar.
    HealthBar,
    /// Objective arrow.
    Arrow,
}

/// Maps sprites to host asset handles.
///
/// Sprites without an explicit entry use their declaration index, so a
/// host that loads textures in [`Sprite`] order needs no table at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetTable {
    /// Explicit handle assignments.
    #[serde(default)]
    pub overrides: BTreeMap<Sprite, AssetHandle>,
}

impl AssetTable {
    /// Handle for a sprite.
    #[must_use]
    pub fn handle(&self, sprite: Sprite) -> AssetHandle {
        self.overrides
            .get(&sprite)
            .copied()
            .unwrap_or(AssetHandle(sprite as u32))
    }

    /// Assign an explicit handle.
    #[must_use]
    pub fn with(mut self, sprite: Sprite, handle: AssetHandle) -> Self {
        self.overrides.insert(sprite, handle);
        self
    }
}

// ============================================================================
// View transform
// ============================================================================

/// World-to-view matrix: aspect correction × zoom × camera translation.
///
/// # Example
///
/// ```
/// use glam::{Vec2, Vec3};
/// use salvo_core::config::CameraTuning;
/// use salvo_core::render::ViewTransform;
///
/// let view = ViewTransform::following(Vec3::new(10.0, 0.0, 0.0), &CameraTuning::default());
/// // The screen center maps back onto the camera focus.
/// let world = view.screen_to_world(Vec2::ZERO);
/// assert!((world - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    matrix: Mat4,
    inverse: Mat4,
}

impl ViewTransform {
    /// Camera centred on `focus`.
    #[must_use]
    pub fn following(focus: Vec3, camera: &CameraTuning) -> Self {
        let window = if camera.aspect >= 1.0 {
            Mat4::from_scale(Vec3::new(1.0 / camera.aspect, 1.0, 1.0))
        } else {
            Mat4::from_scale(Vec3::new(1.0, camera.aspect, 1.0))
        };
        let zoom = Mat4::from_scale(Vec3::splat(camera.zoom));
        let translate = Mat4::from_translation(-focus);
        let matrix = window * zoom * translate;
        Self {
            matrix,
            inverse: matrix.inverse(),
        }
    }

    /// The world-to-view matrix.
    #[must_use]
    pub const fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Project a world point into view space.
    #[must_use]
    pub fn world_to_screen(&self, world: Vec3) -> Vec2 {
        self.matrix.transform_point3(world).truncate()
    }

    /// Map a screen-space point (origin at the centre) back onto the world plane.
    #[must_use]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec3 {
        let world = self.inverse.transform_point3(screen.extend(0.0));
        Vec3::new(world.x, world.y, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_tags() {
        assert_eq!(ObjectType::HealthBar.tag(), 1000);
        assert_eq!(ObjectType::Arrow.tag(), 1001);
    }

    #[test]
    fn test_asset_table_overrides() {
        let table = AssetTable::default().with(Sprite::Saw, AssetHandle(77));
        assert_eq!(table.handle(Sprite::Saw), AssetHandle(77));
        assert_eq!(table.handle(Sprite::Player), AssetHandle(0));
        assert_ne!(table.handle(Sprite::Arm), table.handle(Sprite::Player));
    }

    #[test]
    fn test_screen_edge_maps_by_zoom() {
        let view = ViewTransform::following(Vec3::ZERO, &CameraTuning::default());
        let world = view.screen_to_world(Vec2::new(0.5, 0.0));
        assert!((world.x - 5.0).abs() < 1e-4);
        let back = view.world_to_screen(world);
        assert!((back - Vec2::new(0.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_wide_window_compresses_x() {
        let camera = CameraTuning {
            zoom: 0.1,
            aspect: 2.0,
        };
        let view = ViewTransform::following(Vec3::ZERO, &camera);
        let world = view.screen_to_world(Vec2::new(0.5, 0.5));
        assert!((world.x - 10.0).abs() < 1e-3);
        assert!((world.y - 5.0).abs() < 1e-3);
    }
}
