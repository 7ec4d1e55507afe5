//! Tuning tables for the simulation.
//!
//! Every number the simulation uses (speeds, radii, damages, cooldowns,
//! spawn weights) lives in [`TuningConfig`]. The table is loaded once at
//! startup, validated, and treated as immutable for the session.
//!
//! Sections default individually, so a RON file only needs to name the
//! values it overrides:
//!
//! ```ron
//! TuningConfig(
//!     player: (health: 800.0),
//!     director: (starting_enemies: 0),
//! )
//! ```

use std::f32::consts::{PI, TAU};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

// ============================================================================
// Top-level table
// ============================================================================

/// Complete tuning table for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Shared knockback physics.
    pub entity: EntityTuning,
    /// Player ship.
    pub player: PlayerTuning,
    /// Melee archetype.
    pub melee: MeleeTuning,
    /// Melee arm chain and saw.
    pub arm: ArmTuning,
    /// Ranged archetype.
    pub ranged: RangedTuning,
    /// Charge archetype.
    pub charge: ChargeTuning,
    /// Bullet templates per kind.
    pub bullets: BulletTable,
    /// Turret templates per kind.
    pub turrets: TurretTable,
    /// Spawning and win-condition lifecycle.
    pub director: DirectorTuning,
    /// Background tile streaming.
    pub world: WorldTuning,
    /// Knockback multipliers used by the collision resolver.
    pub collision: CollisionTuning,
    /// View transform used for aim conversion.
    pub camera: CameraTuning,
}

impl TuningConfig {
    /// Parse a tuning table from a RON string.
    ///
    /// The parsed table is validated before it is returned.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| GameError::ConfigParse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a tuning table from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| GameError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = ron::from_str(&source).map_err(|e| GameError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the table as pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::InvalidConfig(e.to_string()))
    }

    /// Reject tables the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        positive("entity.knockback_deceleration", self.entity.knockback_deceleration)?;
        non_negative("entity.knockback_force", self.entity.knockback_force)?;

        let p = &self.player;
        positive("player.health", p.health)?;
        positive("player.hitbox", p.hitbox)?;
        positive("player.weight", p.weight)?;
        positive("player.max_speed", p.max_speed)?;
        positive("player.max_turning_speed", p.max_turning_speed)?;

        self.melee.profile.validate("melee")?;
        self.ranged.profile.validate("ranged")?;
        self.charge.profile.validate("charge")?;
        ordered(
            "ranged.min_range",
            self.ranged.min_range,
            "ranged.max_range",
            self.ranged.max_range,
        )?;
        positive("ranged.fire_rate", self.ranged.fire_rate)?;
        positive("charge.fire_rate", self.charge.fire_rate)?;
        positive("charge.charge_speed", self.charge.charge_speed)?;

        positive("arm.link_length", self.arm.link_length)?;
        positive("arm.saw_scale", self.arm.saw_scale)?;

        for (name, bullet) in self.bullets.iter() {
            positive(&format!("bullets.{name}.speed"), bullet.speed)?;
            positive(&format!("bullets.{name}.hitbox"), bullet.hitbox)?;
            positive(&format!("bullets.{name}.lifetime"), bullet.lifetime)?;
        }
        for (name, turret) in self.turrets.iter() {
            positive(&format!("turrets.{name}.fire_cooldown"), turret.fire_cooldown)?;
            positive(&format!("turrets.{name}.hitbox"), turret.hitbox)?;
        }
        if self.turrets.max_turrets == 0 {
            return Err(GameError::InvalidConfig(
                "turrets.max_turrets must be at least 1".to_string(),
            ));
        }

        let d = &self.director;
        ordered(
            "director.player_spawn_min",
            d.player_spawn_min,
            "director.player_spawn_max",
            d.player_spawn_max,
        )?;
        ordered(
            "director.token_spawn_min",
            d.token_spawn_min,
            "director.token_spawn_max",
            d.token_spawn_max,
        )?;
        ordered(
            "director.min_spawn_time",
            d.min_spawn_time,
            "director.max_spawn_time",
            d.max_spawn_time,
        )?;
        positive("director.min_spawn_time", d.min_spawn_time)?;
        positive("director.collectible_time", d.collectible_time)?;
        positive("director.despawn_range", d.despawn_range)?;
        weights("director.enemy_weights", &d.enemy_weights.as_array())?;
        weights("director.collectible_weights", &d.collectible_weights.as_array())?;

        positive("world.tile_size", self.world.tile_size)?;
        positive("world.spawn_distance", self.world.spawn_distance)?;
        positive("camera.zoom", self.camera.zoom)?;
        positive("camera.aspect", self.camera.aspect)?;
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GameError::InvalidConfig(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GameError::InvalidConfig(format!(
            "{name} must not be negative, got {value}"
        )))
    }
}

fn ordered(min_name: &str, min: f32, max_name: &str, max: f32) -> Result<()> {
    if min <= max {
        Ok(())
    } else {
        Err(GameError::InvalidConfig(format!(
            "{min_name} ({min}) must not exceed {max_name} ({max})"
        )))
    }
}

fn weights(name: &str, values: &[f32]) -> Result<()> {
    if values.iter().any(|w| *w < 0.0 || !w.is_finite()) {
        return Err(GameError::InvalidConfig(format!(
            "{name} must not contain negative weights"
        )));
    }
    if values.iter().all(|w| *w == 0.0) {
        return Err(GameError::InvalidConfig(format!(
            "{name} needs at least one positive weight"
        )));
    }
    Ok(())
}

// ============================================================================
// Entities
// ============================================================================

/// Knockback physics shared by every body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTuning {
    /// Base impulse applied by one knockback.
    pub knockback_force: f32,
    /// Rate at which knockback speed decays toward zero, per second.
    pub knockback_deceleration: f32,
}

impl Default for EntityTuning {
    fn default() -> Self {
        Self {
            knockback_force: 5.0,
            knockback_deceleration: 10.0,
        }
    }
}

/// Player ship handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Starting and maximum health.
    pub health: f32,
    /// Collision radius.
    pub hitbox: f32,
    /// Contact damage dealt to enemies.
    pub melee_damage: f32,
    /// Knockback resistance.
    pub weight: f32,
    /// Forward speed cap.
    pub max_speed: f32,
    /// Forward acceleration.
    pub acceleration: f32,
    /// Deceleration along the facing axis.
    pub front_friction: f32,
    /// Deceleration across the facing axis.
    pub side_friction: f32,
    /// Turning acceleration.
    pub rotational_acceleration: f32,
    /// Turning deceleration without turn input.
    pub rotational_friction: f32,
    /// Turning speed cap, in half-turns per second.
    pub max_turning_speed: f32,
    /// Invulnerability after taking damage, in seconds.
    pub iframe_time: f32,
    /// Forward impulse when the cannon fires.
    pub cannon_recoil: f32,
    /// Facing at spawn.
    pub start_rotation: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            health: 500.0,
            hitbox: 0.5,
            melee_damage: 5.0,
            weight: 50.0,
            max_speed: 10.0,
            acceleration: 7.0,
            front_friction: 5.0,
            side_friction: 15.0,
            rotational_acceleration: 1.2,
            rotational_friction: 1.0,
            max_turning_speed: 0.5,
            iframe_time: 0.5,
            cannon_recoil: 10.0,
            start_rotation: PI / 2.0,
        }
    }
}

/// Body and detection values shared by every enemy archetype.
///
/// # Example RON
///
/// ```ron
/// EnemyProfile(
///     size: 1.5,
///     health: 100.0,
///     melee_damage: 10.0,
///     weight: 10.0,
///     idle_radius: 10.0,
///     alert_radius: 10.0,
///     engage_radius: 15.0,
///     speed: 9.5,
///     turn_speed: 5.0,
///     wander_chance: 0.5,
///     wander_range: 5.0,
///     alert_time: 5.0,
///     arrival_distance: 0.05,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    /// Render scale; the hitbox is half of it.
    pub size: f32,
    /// Starting and maximum health.
    pub health: f32,
    /// Contact damage dealt to the player.
    pub melee_damage: f32,
    /// Knockback resistance.
    pub weight: f32,
    /// Player detection radius while idle or wandering.
    pub idle_radius: f32,
    /// Player detection radius while alert.
    pub alert_radius: f32,
    /// Distance at which an engaged enemy loses the player.
    pub engage_radius: f32,
    /// Travel speed.
    pub speed: f32,
    /// Turn speed in radians per second.
    pub turn_speed: f32,
    /// Percent chance per tick for an idle enemy to start wandering.
    pub wander_chance: f32,
    /// Half-extent of the square a wander target is drawn from.
    pub wander_range: f32,
    /// Seconds an alerted enemy investigates before going idle.
    pub alert_time: f32,
    /// Distance at which a wander target counts as reached.
    #[serde(default = "default_arrival_distance")]
    pub arrival_distance: f32,
}

fn default_arrival_distance() -> f32 {
    0.05
}

impl EnemyProfile {
    /// Default melee archetype body.
    #[must_use]
    pub fn melee() -> Self {
        Self {
            size: 1.5,
            health: 100.0,
            melee_damage: 10.0,
            weight: 10.0,
            idle_radius: 10.0,
            alert_radius: 10.0,
            engage_radius: 15.0,
            speed: 9.5,
            turn_speed: 5.0,
            wander_chance: 0.5,
            wander_range: 5.0,
            alert_time: 5.0,
            arrival_distance: default_arrival_distance(),
        }
    }

    /// Default ranged archetype body.
    #[must_use]
    pub fn ranged() -> Self {
        Self {
            size: 1.0,
            health: 30.0,
            melee_damage: 2.0,
            weight: 5.0,
            idle_radius: 15.0,
            engage_radius: 25.0,
            speed: 7.0,
            turn_speed: 8.0,
            ..Self::melee()
        }
    }

    /// Default charge archetype body.
    #[must_use]
    pub fn charge() -> Self {
        Self {
            size: 3.0,
            health: 150.0,
            melee_damage: 5.0,
            weight: 15.0,
            idle_radius: 10.0,
            engage_radius: 25.0,
            speed: 10.0,
            turn_speed: 5.0,
            ..Self::melee()
        }
    }

    /// Collision radius derived from the size.
    #[must_use]
    pub fn hitbox(&self) -> f32 {
        self.size / 2.0
    }

    fn validate(&self, section: &str) -> Result<()> {
        positive(&format!("{section}.size"), self.size)?;
        positive(&format!("{section}.health"), self.health)?;
        positive(&format!("{section}.weight"), self.weight)?;
        positive(&format!("{section}.speed"), self.speed)?;
        positive(&format!("{section}.turn_speed"), self.turn_speed)?;
        non_negative(&format!("{section}.idle_radius"), self.idle_radius)?;
        non_negative(&format!("{section}.engage_radius"), self.engage_radius)?;
        non_negative(&format!("{section}.arrival_distance"), self.arrival_distance)
    }
}

/// Melee archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeTuning {
    /// Body and detection values.
    pub profile: EnemyProfile,
}

impl Default for MeleeTuning {
    fn default() -> Self {
        Self {
            profile: EnemyProfile::melee(),
        }
    }
}

/// Melee arm chain and the saw at its tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmTuning {
    /// Link turn and swing speed, radians per second.
    pub turn_speed: f32,
    /// Swing amplitude of the second link, radians.
    pub max_swing: f32,
    /// Length of each link.
    pub link_length: f32,
    /// Saw render scale; the hitbox is half of it.
    pub saw_scale: f32,
    /// Saw contact damage.
    pub saw_damage: f32,
    /// Saw weight used for knockback on the player.
    pub saw_weight: f32,
    /// Saw spin, radians per second.
    pub saw_spin: f32,
}

impl Default for ArmTuning {
    fn default() -> Self {
        Self {
            turn_speed: 1.0,
            max_swing: 2.0,
            link_length: 1.0,
            saw_scale: 2.0,
            saw_damage: 15.0,
            saw_weight: 10.0,
            saw_spin: TAU,
        }
    }
}

/// Ranged archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedTuning {
    /// Body and detection values.
    pub profile: EnemyProfile,
    /// Closest preferred distance to the player.
    pub min_range: f32,
    /// Farthest preferred distance to the player.
    pub max_range: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Facing cone (radians) within which the enemy fires.
    pub facing_tolerance: f32,
    /// Bullet template fired.
    pub bullet: BulletKind,
    /// Render scale applied to fired bullets.
    pub bullet_scale: f32,
}

impl Default for RangedTuning {
    fn default() -> Self {
        Self {
            profile: EnemyProfile::ranged(),
            min_range: 6.0,
            max_range: 10.0,
            fire_rate: 2.0,
            facing_tolerance: PI / 4.0,
            bullet: BulletKind::Normal,
            bullet_scale: 5.0,
        }
    }
}

/// Charge archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeTuning {
    /// Body and detection values.
    pub profile: EnemyProfile,
    /// Distance within which the enemy commits to a charge.
    pub charge_range: f32,
    /// Backward wind-up before the dash, seconds.
    pub prepare_time: f32,
    /// Dash duration after the wind-up, seconds.
    pub charge_time: f32,
    /// Mandatory pause after a charge ends, seconds.
    pub cooldown: f32,
    /// Dash speed.
    pub charge_speed: f32,
    /// Damage dealt to the player when a dash connects.
    pub charge_damage: f32,
    /// Distance kept while shooting.
    pub max_engage_range: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Facing tolerance to start a charge.
    pub charge_facing: f32,
    /// Facing tolerance to fire.
    pub fire_facing: f32,
    /// Bullet template fired.
    pub bullet: BulletKind,
    /// Render scale applied to fired bullets.
    pub bullet_scale: f32,
}

impl Default for ChargeTuning {
    fn default() -> Self {
        Self {
            profile: EnemyProfile::charge(),
            charge_range: 10.0,
            prepare_time: 0.5,
            charge_time: 0.5,
            cooldown: 1.0,
            charge_speed: 50.0,
            charge_damage: 30.0,
            max_engage_range: 15.0,
            fire_rate: 0.2,
            charge_facing: 0.2,
            fire_facing: 0.01,
            bullet: BulletKind::Big,
            bullet_scale: 10.0,
        }
    }
}

// ============================================================================
// Weapons
// ============================================================================

/// Bullet template identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BulletKind {
    /// Default turret and ranged enemy round.
    Normal,
    /// Fast, light machine-gun round.
    Machine,
    /// Heavy piercing cannon round.
    Cannonball,
    /// Slow, long-lived charge enemy round.
    Big,
    /// Round that steers toward the nearest enemy.
    Homing,
}

/// Immutable description a bullet is instantiated from.
///
/// # Example RON
///
/// ```ron
/// BulletTemplate(
///     damage: 100.0,
///     speed: 10.0,
///     lifetime: 2.0,
///     weight: 200.0,
///     hitbox: 0.1,
///     scale: 5.0,
///     pierce: true,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletTemplate {
    /// Damage per hit.
    pub damage: f32,
    /// Travel speed.
    pub speed: f32,
    /// Seconds before the bullet expires.
    pub lifetime: f32,
    /// Weight used for knockback on hit.
    pub weight: f32,
    /// Collision radius.
    #[serde(default = "default_bullet_hitbox")]
    pub hitbox: f32,
    /// Render scale.
    pub scale: f32,
    /// Damages each target at most once and keeps flying.
    #[serde(default)]
    pub pierce: bool,
    /// Steers toward the nearest enemy.
    #[serde(default)]
    pub homing: bool,
    /// Render scale of the trailing particle effect, if any.
    #[serde(default)]
    pub trail_scale: Option<f32>,
}

fn default_bullet_hitbox() -> f32 {
    0.1
}

/// Bullet templates indexed by [`BulletKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletTable {
    /// Default round.
    pub normal: BulletTemplate,
    /// Machine-gun round.
    pub machine: BulletTemplate,
    /// Cannon round.
    pub cannonball: BulletTemplate,
    /// Charge enemy round.
    pub big: BulletTemplate,
    /// Homing round.
    pub homing: BulletTemplate,
}

impl BulletTable {
    /// Template for a bullet kind.
    #[must_use]
    pub fn get(&self, kind: BulletKind) -> &BulletTemplate {
        match kind {
            BulletKind::Normal => &self.normal,
            BulletKind::Machine => &self.machine,
            BulletKind::Cannonball => &self.cannonball,
            BulletKind::Big => &self.big,
            BulletKind::Homing => &self.homing,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, &BulletTemplate)> {
        [
            ("normal", &self.normal),
            ("machine", &self.machine),
            ("cannonball", &self.cannonball),
            ("big", &self.big),
            ("homing", &self.homing),
        ]
        .into_iter()
    }
}

impl Default for BulletTable {
    fn default() -> Self {
        let base = BulletTemplate {
            damage: 30.0,
            speed: 20.0,
            lifetime: 2.0,
            weight: 80.0,
            hitbox: default_bullet_hitbox(),
            scale: 10.0,
            pierce: false,
            homing: false,
            trail_scale: Some(0.2),
        };
        Self {
            machine: BulletTemplate {
                speed: 25.0,
                weight: 30.0,
                scale: 5.0,
                trail_scale: Some(0.1),
                ..base.clone()
            },
            cannonball: BulletTemplate {
                damage: 100.0,
                speed: 10.0,
                weight: 200.0,
                scale: 5.0,
                pierce: true,
                trail_scale: None,
                ..base.clone()
            },
            big: BulletTemplate {
                damage: 100.0,
                speed: 15.0,
                lifetime: 10.0,
                weight: 100.0,
                trail_scale: Some(0.8),
                ..base.clone()
            },
            homing: BulletTemplate {
                speed: 15.0,
                lifetime: 10.0,
                scale: 5.0,
                homing: true,
                trail_scale: None,
                ..base.clone()
            },
            normal: base,
        }
    }
}

/// Turret type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurretKind {
    /// Starting turret; never expires.
    Normal,
    /// Time-limited rapid-fire turret.
    MachineGun,
    /// Rear-facing cannon on the secondary trigger.
    Cannon,
    /// Time-limited homing launcher.
    Homing,
}

/// Immutable description a turret is instantiated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurretTemplate {
    /// Seconds between shots.
    pub fire_cooldown: f32,
    /// Barrel length; bullets spawn this far along the facing.
    pub hitbox: f32,
    /// Damage the turret absorbs for the player before breaking.
    pub health: f32,
    /// Seconds until a pickup weapon expires; `None` never expires.
    #[serde(default)]
    pub lifetime: Option<f32>,
    /// Bullet template fired.
    pub bullet: BulletKind,
}

/// Turret templates and mounting rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretTable {
    /// Starting turret.
    pub normal: TurretTemplate,
    /// Machine-gun pickup.
    pub machine_gun: TurretTemplate,
    /// Cannon pickup.
    pub cannon: TurretTemplate,
    /// Homing pickup.
    pub homing: TurretTemplate,
    /// Aim rotation speed, radians per second.
    pub rotation_speed: f32,
    /// Angular distance at which a turret snaps onto its aim.
    pub snap_tolerance: f32,
    /// Turret cap on one player.
    pub max_turrets: usize,
    /// Mounting offsets granted by the multi-turret pickup.
    pub side_offsets: Vec<f32>,
    /// Mounting offsets granted by the shotgun pickup.
    pub spread_offsets: Vec<f32>,
}

impl TurretTable {
    /// Template for a turret kind.
    #[must_use]
    pub fn get(&self, kind: TurretKind) -> &TurretTemplate {
        match kind {
            TurretKind::Normal => &self.normal,
            TurretKind::MachineGun => &self.machine_gun,
            TurretKind::Cannon => &self.cannon,
            TurretKind::Homing => &self.homing,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, &TurretTemplate)> {
        [
            ("normal", &self.normal),
            ("machine_gun", &self.machine_gun),
            ("cannon", &self.cannon),
            ("homing", &self.homing),
        ]
        .into_iter()
    }
}

impl Default for TurretTable {
    fn default() -> Self {
        Self {
            normal: TurretTemplate {
                fire_cooldown: 0.3,
                hitbox: 1.0,
                health: 100.0,
                lifetime: None,
                bullet: BulletKind::Normal,
            },
            machine_gun: TurretTemplate {
                fire_cooldown: 0.1,
                hitbox: 0.7,
                health: 500.0,
                lifetime: Some(10.0),
                bullet: BulletKind::Machine,
            },
            cannon: TurretTemplate {
                fire_cooldown: 1.0,
                hitbox: 0.9,
                health: 100.0,
                lifetime: None,
                bullet: BulletKind::Cannonball,
            },
            homing: TurretTemplate {
                fire_cooldown: 0.5,
                hitbox: 0.7,
                health: 1000.0,
                lifetime: Some(20.0),
                bullet: BulletKind::Homing,
            },
            rotation_speed: 1.0,
            snap_tolerance: 0.05,
            max_turrets: 9,
            side_offsets: vec![PI / 2.0, 3.0 * PI / 2.0, PI],
            spread_offsets: vec![PI / 6.0, -PI / 6.0, PI / 8.0, -PI / 8.0],
        }
    }
}

// ============================================================================
// Director and world
// ============================================================================

/// Relative enemy archetype spawn weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyWeights {
    /// Melee archetype.
    pub melee: f32,
    /// Ranged archetype.
    pub ranged: f32,
    /// Charge archetype.
    pub charge: f32,
}

impl EnemyWeights {
    /// Weights in archetype order (melee, ranged, charge).
    #[must_use]
    pub fn as_array(&self) -> [f32; 3] {
        [self.melee, self.ranged, self.charge]
    }
}

impl Default for EnemyWeights {
    fn default() -> Self {
        Self {
            melee: 6.0,
            ranged: 3.0,
            charge: 1.5,
        }
    }
}

/// Relative pickup spawn weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectibleWeights {
    /// Multi-turret pickup.
    pub four_turrets: f32,
    /// Machine-gun pickup.
    pub machine_gun: f32,
    /// Shotgun pickup.
    pub shotgun: f32,
    /// Cannon pickup.
    pub cannon: f32,
    /// Homing pickup.
    pub homing: f32,
}

impl CollectibleWeights {
    /// Weights in pickup order (four-turrets, machine-gun, shotgun, cannon, homing).
    #[must_use]
    pub fn as_array(&self) -> [f32; 5] {
        [
            self.four_turrets,
            self.machine_gun,
            self.shotgun,
            self.cannon,
            self.homing,
        ]
    }
}

impl Default for CollectibleWeights {
    fn default() -> Self {
        Self {
            four_turrets: 4.0,
            machine_gun: 8.0,
            shotgun: 5.0,
            cannon: 3.0,
            homing: 7.0,
        }
    }
}

/// Spawning, despawning and the win-condition lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorTuning {
    /// Enemies placed around the player when a session starts.
    pub starting_enemies: usize,
    /// Pickups placed around the player when a session starts.
    pub starting_collectibles: usize,
    /// Inner radius of the spawn annulus around the player.
    pub player_spawn_min: f32,
    /// Outer radius of the spawn annulus around the player.
    pub player_spawn_max: f32,
    /// Inner radius of the spawn annulus around a win token.
    pub token_spawn_min: f32,
    /// Outer radius of the spawn annulus around a win token.
    pub token_spawn_max: f32,
    /// Token-anchored spawns closer than this to the player are rejected.
    pub no_spawn_radius: f32,
    /// Token anchors only count down while the player is this close.
    pub token_range: f32,
    /// Shortest spawn interval.
    pub min_spawn_time: f32,
    /// Longest spawn interval (shrinks over time for the player anchor).
    pub max_spawn_time: f32,
    /// Seconds of play that shave one second off the player anchor interval.
    pub spawn_ramp: f32,
    /// Live enemy cap.
    pub max_enemies: usize,
    /// Placement attempts per spawn.
    pub spawn_attempts: usize,
    /// Enemies this far from the player are removed.
    pub despawn_range: f32,
    /// Archetype weights.
    pub enemy_weights: EnemyWeights,
    /// Longest pickup spawn interval; the shortest is a quarter of it.
    pub collectible_time: f32,
    /// Outer radius of the pickup spawn annulus.
    pub collectible_range: f32,
    /// Pickup weights.
    pub collectible_weights: CollectibleWeights,
    /// Pickup collision radius.
    pub collectible_hitbox: f32,
    /// Outer radius of the win token placement annulus.
    pub win_range: f32,
    /// Win token render scale; the hitbox is half of it.
    pub token_scale: f32,
    /// Radius of the win token idle orbit.
    pub token_orbit_radius: f32,
    /// Seconds per win token orbit.
    pub token_orbit_period: f32,
    /// Exit door render scale; the hitbox is half of it.
    pub door_scale: f32,
    /// Explosion duration.
    pub explosion_time: f32,
}

impl Default for DirectorTuning {
    fn default() -> Self {
        Self {
            starting_enemies: 10,
            starting_collectibles: 3,
            player_spawn_min: 15.0,
            player_spawn_max: 30.0,
            token_spawn_min: 1.0,
            token_spawn_max: 15.0,
            no_spawn_radius: 2.0,
            token_range: 30.0,
            min_spawn_time: 0.2,
            max_spawn_time: 5.0,
            spawn_ramp: 20.0,
            max_enemies: 500,
            spawn_attempts: 3,
            despawn_range: 100.0,
            enemy_weights: EnemyWeights::default(),
            collectible_time: 20.0,
            collectible_range: 20.0,
            collectible_weights: CollectibleWeights::default(),
            collectible_hitbox: 0.5,
            win_range: 120.0,
            token_scale: 3.0,
            token_orbit_radius: 1.0,
            token_orbit_period: 3.5,
            door_scale: 5.0,
            explosion_time: 0.7,
        }
    }
}

/// Background tile streaming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    /// Tile edge length.
    pub tile_size: f32,
    /// Distance at which an unvisited tile expands its neighbours.
    pub spawn_distance: f32,
    /// Distance within which tiles are drawn.
    pub render_distance: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            tile_size: 20.0,
            spawn_distance: 40.0,
            render_distance: 50.0,
        }
    }
}

/// Knockback multipliers applied by the collision resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    /// Enemy pushed by the player on contact.
    pub enemy_from_player: f32,
    /// Player pushed by a charging enemy.
    pub player_from_charge: f32,
    /// Player pushed by an enemy body.
    pub player_from_enemy: f32,
    /// Player pushed by a saw.
    pub player_from_saw: f32,
    /// Enemy pushed back after its saw connects.
    pub enemy_from_saw_contact: f32,
    /// Non-charging enemy pushed by a charging one.
    pub charge_push: f32,
    /// Symmetric push between two touching enemies.
    pub bump: f32,
    /// Enemy pushed by a player bullet.
    pub bullet_on_enemy: f32,
    /// Player pushed by an enemy bullet.
    pub bullet_on_player: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            enemy_from_player: 1.0,
            player_from_charge: 3.0,
            player_from_enemy: 1.0,
            player_from_saw: 1.0,
            enemy_from_saw_contact: 0.2,
            charge_push: 1.0,
            bump: 0.1,
            bullet_on_enemy: 1.0,
            bullet_on_player: 0.5,
        }
    }
}

/// Camera used to map screen-space aim into the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Uniform world-to-view scale.
    pub zoom: f32,
    /// Window width over height.
    pub aspect: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            zoom: 0.1,
            aspect: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        TuningConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_ron_overrides_defaults() {
        let config =
            TuningConfig::from_ron_str("(player: (health: 800.0), director: (starting_enemies: 0))")
                .unwrap();
        assert_eq!(config.player.health, 800.0);
        assert_eq!(config.player.max_speed, 10.0);
        assert_eq!(config.director.starting_enemies, 0);
        assert_eq!(config.director.max_enemies, 500);
    }

    #[test]
    fn test_ron_round_trip_preserves_table() {
        let config = TuningConfig::default();
        let text = config.to_ron_string().unwrap();
        let parsed = TuningConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_inverted_band_rejected() {
        let mut config = TuningConfig::default();
        config.ranged.min_range = 20.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
        assert!(err.to_string().contains("ranged.min_range"));
    }

    #[test]
    fn test_zero_weights_rejected() {
        let mut config = TuningConfig::default();
        config.director.enemy_weights = EnemyWeights {
            melee: 0.0,
            ranged: 0.0,
            charge: 0.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_turret_cap_rejected() {
        let mut config = TuningConfig::default();
        config.turrets.max_turrets = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_ron_reports_parse_error() {
        let err = TuningConfig::from_ron_str("(player: (health: ))").unwrap_err();
        assert!(matches!(err, GameError::ConfigParse { .. }));
    }

    #[test]
    fn test_archetype_profiles_differ() {
        assert_eq!(EnemyProfile::melee().hitbox(), 0.75);
        assert_eq!(EnemyProfile::ranged().hitbox(), 0.5);
        assert_eq!(EnemyProfile::charge().hitbox(), 1.5);
        assert_eq!(EnemyProfile::charge().alert_time, 5.0);
    }
}
