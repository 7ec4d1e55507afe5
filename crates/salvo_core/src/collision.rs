//! Combat resolution.
//!
//! Runs once per tick after every group has moved. Four passes, in order:
//!
//! 1. player against enemies (hulls, then the melee saw);
//! 2. every unordered enemy pair;
//! 3. bullets against the opposing side, using a swept test over the tick;
//! 4. player against collectibles.
//!
//! The resolver only borrows the entity groups for the duration of the
//! call and reports what happened; pruning the dead is the caller's job.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collectible::{Collectible, CollectibleKind};
use crate::components::{Body, EntityId, Faction};
use crate::config::{BulletKind, TurretKind, TuningConfig};
use crate::director::WinSlots;
use crate::enemy::Enemy;
use crate::math::swept_sphere_hit;
use crate::player::{DamageOutcome, Player};
use crate::projectile::Bullet;
use crate::render::AssetTable;
use crate::storage::Registry;

/// Pierce-memory key for the player. Registry ids start at 1.
const PLAYER_TARGET: EntityId = 0;

/// Mutable view of every group the resolver touches.
#[derive(Debug)]
pub struct Arena<'a> {
    /// The player ship.
    pub player: &'a mut Player,
    /// Live enemies.
    pub enemies: &'a mut Registry<Enemy>,
    /// Bullets in flight, both sides.
    pub bullets: &'a mut Vec<Bullet>,
    /// Pickups, tokens and the door.
    pub collectibles: &'a mut Registry<Collectible>,
    /// Token bookkeeping.
    pub win_slots: &'a mut WinSlots,
}

/// Who took a hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DamageTarget {
    /// The player, and where the hit went.
    Player(DamageOutcome),
    /// The enemy with this id.
    Enemy(EntityId),
}

/// What dealt a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageCause {
    /// Hull against hull.
    Contact,
    /// A committed charge.
    Charge,
    /// A melee enemy's saw.
    Saw,
    /// A bullet of this kind.
    Bullet(BulletKind),
}

/// One landed hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Who was hit.
    pub target: DamageTarget,
    /// What hit them.
    pub cause: DamageCause,
    /// Damage dealt.
    pub amount: f32,
}

/// One consumed collectible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PickupEvent {
    /// Id the collectible had.
    pub id: EntityId,
    /// What it was.
    pub kind: CollectibleKind,
    /// Whether it had any effect (a full rack ignores turret pickups).
    pub applied: bool,
}

/// Everything one resolution produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionReport {
    /// Hits, in pass order.
    pub damage: Vec<DamageEvent>,
    /// Collectibles consumed this tick.
    pub pickups: Vec<PickupEvent>,
}

impl CollisionReport {
    /// Total damage dealt to enemies.
    #[must_use]
    pub fn damage_dealt(&self) -> f32 {
        self.damage
            .iter()
            .filter(|event| matches!(event.target, DamageTarget::Enemy(_)))
            .map(|event| event.amount)
            .sum()
    }

    /// Total damage that reached the player (hull or a shielding turret).
    #[must_use]
    pub fn damage_taken(&self) -> f32 {
        self.damage
            .iter()
            .filter(|event| matches!(event.target, DamageTarget::Player(_)))
            .map(|event| event.amount)
            .sum()
    }
}

/// Run all four passes.
pub fn resolve(arena: Arena<'_>, dt: f32, tuning: &TuningConfig, assets: &AssetTable) -> CollisionReport {
    let mut report = CollisionReport::default();
    player_vs_enemies(arena.player, arena.enemies, tuning, &mut report);
    enemy_vs_enemy(arena.enemies, tuning);
    bullets_vs_targets(arena.bullets, arena.player, arena.enemies, dt, tuning, &mut report);
    player_vs_collectibles(
        arena.player,
        arena.collectibles,
        arena.win_slots,
        tuning,
        assets,
        &mut report,
    );
    report
}

fn hit_player(
    player: &mut Player,
    amount: f32,
    cause: DamageCause,
    tuning: &TuningConfig,
    report: &mut CollisionReport,
) {
    let outcome = player.take_damage(amount, &tuning.player);
    if outcome != DamageOutcome::Ignored {
        report.damage.push(DamageEvent {
            target: DamageTarget::Player(outcome),
            cause,
            amount,
        });
    }
}

// ============================================================================
// Pass 1: player against enemies
// ============================================================================

/// Hull and saw contact between the player and each enemy.
///
/// A touching enemy takes the player's contact damage and is pushed away.
/// The player takes the enemy's contact damage, or its charge damage (with
/// a harder push, and the charge cancelled) if it was mid-dash. A melee
/// enemy's saw is tested on its own.
pub fn player_vs_enemies(
    player: &mut Player,
    enemies: &mut Registry<Enemy>,
    tuning: &TuningConfig,
    report: &mut CollisionReport,
) {
    let multipliers = &tuning.collision;
    for (id, enemy) in enemies.iter_mut() {
        if player.body.touches(&enemy.body) {
            let amount = player.body.melee_damage;
            enemy.take_damage(amount, player.body.position);
            enemy
                .body
                .apply_knockback(player.body.as_source(), multipliers.enemy_from_player, &tuning.entity);
            report.damage.push(DamageEvent {
                target: DamageTarget::Enemy(id),
                cause: DamageCause::Contact,
                amount,
            });

            if enemy.is_charging() {
                hit_player(player, enemy.charge_damage(tuning), DamageCause::Charge, tuning, report);
                player.apply_knockback(enemy.body.as_source(), multipliers.player_from_charge, &tuning.entity);
                enemy.stop_charging(&tuning.charge);
            } else {
                hit_player(player, enemy.body.melee_damage, DamageCause::Contact, tuning, report);
                player.apply_knockback(enemy.body.as_source(), multipliers.player_from_enemy, &tuning.entity);
            }
        }

        let saw = enemy
            .saw()
            .filter(|saw| saw.body.touches(&player.body))
            .map(|saw| (saw.damage, saw.body.as_source()));
        if let Some((damage, source)) = saw {
            hit_player(player, damage, DamageCause::Saw, tuning, report);
            player.apply_knockback(source, multipliers.player_from_saw, &tuning.entity);
            enemy
                .body
                .apply_knockback(player.body.as_source(), multipliers.enemy_from_saw_contact, &tuning.entity);
        }
    }
}

// ============================================================================
// Pass 2: enemy pairs
// ============================================================================

/// Push touching enemies apart.
///
/// A charging enemy shoves a non-charging one; any other touching pair
/// bumps both ways with a small multiplier.
pub fn enemy_vs_enemy(enemies: &mut Registry<Enemy>, tuning: &TuningConfig) {
    let multipliers = &tuning.collision;
    let count = enemies.len();
    for i in 0..count {
        for j in (i + 1)..count {
            let Some((a, b)) = enemies.pair_mut(i, j) else {
                continue;
            };
            if !a.body.touches(&b.body) {
                continue;
            }
            let (source_a, source_b) = (a.body.as_source(), b.body.as_source());
            match (a.is_charging(), b.is_charging()) {
                (true, false) => b.body.apply_knockback(source_a, multipliers.charge_push, &tuning.entity),
                (false, true) => a.body.apply_knockback(source_b, multipliers.charge_push, &tuning.entity),
                _ => {
                    a.body.apply_knockback(source_b, multipliers.bump, &tuning.entity);
                    b.body.apply_knockback(source_a, multipliers.bump, &tuning.entity);
                }
            }
        }
    }
}

// ============================================================================
// Pass 3: bullets
// ============================================================================

/// Earliest time in `[0, dt]` at which `bullet` touches `target`.
fn sweep(bullet: &Bullet, target: &Body, dt: f32) -> Option<f32> {
    swept_sphere_hit(
        bullet.body.position,
        bullet.velocity(),
        target.position,
        // Both radii count, so a bullet grazing the hitbox edge still lands.
        target.hitbox + bullet.body.hitbox,
        dt,
    )
}

/// Player bullets against enemies, enemy bullets against the player.
///
/// Each bullet is swept over the coming `dt` and only its earliest hit
/// counts. A piercing bullet lands on each target once and keeps flying;
/// any other bullet is spent on its first hit. Spent bullets are removed.
pub fn bullets_vs_targets(
    bullets: &mut Vec<Bullet>,
    player: &mut Player,
    enemies: &mut Registry<Enemy>,
    dt: f32,
    tuning: &TuningConfig,
    report: &mut CollisionReport,
) {
    let multipliers = &tuning.collision;
    for bullet in bullets.iter_mut() {
        if !bullet.is_alive() {
            continue;
        }
        let cause = DamageCause::Bullet(bullet.kind);

        match bullet.shooter.faction() {
            Faction::Player => {
                let nearest = enemies
                    .iter()
                    .filter_map(|(id, enemy)| sweep(bullet, &enemy.body, dt).map(|t| (id, t)))
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                let Some((id, _)) = nearest else {
                    continue;
                };
                let Some(enemy) = enemies.get_mut(id) else {
                    continue;
                };
                if bullet.pierce(id) {
                    enemy.take_damage(bullet.damage, bullet.body.position);
                    enemy
                        .body
                        .apply_knockback(bullet.as_source(), multipliers.bullet_on_enemy, &tuning.entity);
                    report.damage.push(DamageEvent {
                        target: DamageTarget::Enemy(id),
                        cause,
                        amount: bullet.damage,
                    });
                }
            }
            Faction::Enemy => {
                if sweep(bullet, &player.body, dt).is_none() {
                    continue;
                }
                if bullet.pierce(PLAYER_TARGET) {
                    hit_player(player, bullet.damage, cause, tuning, report);
                    player.apply_knockback(bullet.as_source(), multipliers.bullet_on_player, &tuning.entity);
                }
            }
        }

        if !bullet.is_piercing() {
            bullet.kill();
        }
    }
    bullets.retain(Bullet::is_alive);
}

// ============================================================================
// Pass 4: collectibles
// ============================================================================

/// Consume every collectible the player touches and apply its effect.
pub fn player_vs_collectibles(
    player: &mut Player,
    collectibles: &mut Registry<Collectible>,
    win_slots: &mut WinSlots,
    tuning: &TuningConfig,
    assets: &AssetTable,
    report: &mut CollisionReport,
) {
    let touched: Vec<EntityId> = collectibles
        .iter()
        .filter(|(_, collectible)| collectible.body.touches(&player.body))
        .map(|(id, _)| id)
        .collect();

    let table = &tuning.turrets;
    for id in touched {
        let Some(collectible) = collectibles.remove(id) else {
            continue;
        };
        let applied = match collectible.kind {
            CollectibleKind::FourTurrets => player.add_turrets(&table.side_offsets, table, assets) > 0,
            CollectibleKind::Shotgun => player.add_turrets(&table.spread_offsets, table, assets) > 0,
            CollectibleKind::MachineGun => {
                player.set_turret(TurretKind::MachineGun, table, assets);
                true
            }
            CollectibleKind::Homing => {
                player.set_turret(TurretKind::Homing, table, assets);
                true
            }
            CollectibleKind::Cannon => player.add_cannon(table, assets),
            CollectibleKind::WinToken | CollectibleKind::ExitDoor => win_slots.clear(id).is_some(),
        };
        tracing::trace!(collectible = id, kind = ?collectible.kind, applied, "Collectible consumed");
        report.pickups.push(PickupEvent {
            id,
            kind: collectible.kind,
            applied,
        });
    }
}

/// Positions of live enemies, for homing bullets.
#[must_use]
pub fn enemy_positions(enemies: &Registry<Enemy>) -> Vec<(EntityId, Vec3)> {
    enemies.iter().map(|(id, enemy)| (id, enemy.body.position)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::AssetHandle;
    use crate::enemy::{AiState, EnemyKind};
    use crate::projectile::{ShotParams, Shooter};

    fn setup() -> (TuningConfig, AssetTable, Player) {
        let tuning = TuningConfig::default();
        let assets = AssetTable::default();
        let player = Player::spawn(Vec3::ZERO, &tuning, &assets);
        (tuning, assets, player)
    }

    fn enemy_at(kind: EnemyKind, x: f32, y: f32, tuning: &TuningConfig) -> Enemy {
        Enemy::spawn(kind, Vec3::new(x, y, 0.0), 0.0, tuning, &AssetTable::default())
    }

    fn player_bullet(kind: BulletKind, tuning: &TuningConfig, origin: Vec3) -> Bullet {
        Bullet::launch(
            kind,
            tuning.bullets.get(kind),
            ShotParams {
                origin,
                direction: Vec3::X,
                shooter: Shooter::Player,
                scale: None,
            },
            AssetHandle::default(),
            AssetHandle::default(),
        )
    }

    #[test]
    fn test_contact_hurts_both_sides() {
        let (tuning, _, mut player) = setup();
        let mut enemies = Registry::new();
        let id = enemies.insert(enemy_at(EnemyKind::Ranged, 0.5, 0.0, &tuning));
        let mut report = CollisionReport::default();

        player_vs_enemies(&mut player, &mut enemies, &tuning, &mut report);

        let enemy = enemies.get(id).unwrap();
        assert_eq!(enemy.body.health, 30.0 - 5.0);
        assert_eq!(enemy.state(), AiState::Alert);
        assert!(enemy.body.knockback.x > 0.0);
        assert_eq!(player.body.health, 500.0 - 2.0);
        assert!(player.body.knockback.x < 0.0);
        assert_eq!(report.damage.len(), 2);
    }

    #[test]
    fn test_charge_contact_is_cancelled() {
        let (tuning, _, mut player) = setup();
        let mut enemies = Registry::new();
        let mut charger = enemy_at(EnemyKind::Charge, 1.0, 0.0, &tuning);
        if let crate::enemy::Archetype::Charge(timers) = &mut charger.archetype {
            timers.charge.set(0.5);
        }
        charger.set_state(AiState::Charge);
        assert!(charger.is_charging());
        let id = enemies.insert(charger);
        let mut report = CollisionReport::default();

        player_vs_enemies(&mut player, &mut enemies, &tuning, &mut report);

        let charger = enemies.get(id).unwrap();
        assert!(!charger.is_charging());
        assert_eq!(charger.state(), AiState::Engage);
        assert_eq!(player.body.health, 500.0 - 30.0);
        assert!(report
            .damage
            .iter()
            .any(|event| event.cause == DamageCause::Charge));
    }

    #[test]
    fn test_enemy_bump_is_symmetric() {
        let (tuning, _, _) = setup();
        let mut enemies = Registry::new();
        let a = enemies.insert(enemy_at(EnemyKind::Melee, 0.0, 0.0, &tuning));
        let b = enemies.insert(enemy_at(EnemyKind::Melee, 1.0, 0.0, &tuning));

        enemy_vs_enemy(&mut enemies, &tuning);

        let ka = enemies.get(a).unwrap().body.knockback;
        let kb = enemies.get(b).unwrap().body.knockback;
        assert!(ka.x < 0.0 && kb.x > 0.0);
        assert!((ka + kb).length() < 1e-5);
    }

    #[test]
    fn test_bullet_hits_only_nearest_target() {
        let (tuning, _, mut player) = setup();
        player.body.position = Vec3::new(0.0, 50.0, 0.0);
        let mut enemies = Registry::new();
        let near = enemies.insert(enemy_at(EnemyKind::Charge, 4.0, 0.0, &tuning));
        let far = enemies.insert(enemy_at(EnemyKind::Charge, 8.0, 0.0, &tuning));
        let mut bullets = vec![player_bullet(BulletKind::Normal, &tuning, Vec3::ZERO)];
        let mut report = CollisionReport::default();

        bullets_vs_targets(&mut bullets, &mut player, &mut enemies, 0.5, &tuning, &mut report);

        assert!(bullets.is_empty());
        assert_eq!(enemies.get(near).unwrap().body.health, 150.0 - 30.0);
        assert_eq!(enemies.get(far).unwrap().body.health, 150.0);
        assert_eq!(report.damage_dealt(), 30.0);
    }

    #[test]
    fn test_bullet_ignores_targets_behind() {
        let (tuning, _, mut player) = setup();
        player.body.position = Vec3::new(0.0, 50.0, 0.0);
        let mut enemies = Registry::new();
        let behind = enemies.insert(enemy_at(EnemyKind::Charge, -5.0, 0.0, &tuning));
        let mut bullets = vec![player_bullet(BulletKind::Normal, &tuning, Vec3::ZERO)];
        let mut report = CollisionReport::default();

        bullets_vs_targets(&mut bullets, &mut player, &mut enemies, 0.5, &tuning, &mut report);

        assert_eq!(bullets.len(), 1);
        assert_eq!(enemies.get(behind).unwrap().body.health, 150.0);
    }

    #[test]
    fn test_bullet_radius_widens_the_target() {
        let (tuning, _, mut player) = setup();
        player.body.position = Vec3::new(0.0, 50.0, 0.0);
        let bullet = player_bullet(BulletKind::Normal, &tuning, Vec3::ZERO);
        let target_hitbox = enemy_at(EnemyKind::Charge, 0.0, 0.0, &tuning).body.hitbox;
        let reach = target_hitbox + bullet.body.hitbox;

        let mut enemies = Registry::new();
        let grazed = enemies.insert(enemy_at(EnemyKind::Charge, 4.0, reach - 0.05, &tuning));
        let missed = enemies.insert(enemy_at(EnemyKind::Charge, 9.0, -(reach + 0.05), &tuning));
        let mut bullets = vec![bullet];
        let mut report = CollisionReport::default();

        bullets_vs_targets(&mut bullets, &mut player, &mut enemies, 0.5, &tuning, &mut report);

        assert!(bullets.is_empty());
        assert!(enemies.get(grazed).unwrap().body.health < 150.0);
        assert_eq!(enemies.get(missed).unwrap().body.health, 150.0);
    }

    #[test]
    fn test_piercing_bullet_hits_each_target_once() {
        let (tuning, _, mut player) = setup();
        player.body.position = Vec3::new(0.0, 50.0, 0.0);
        let mut enemies = Registry::new();
        let a = enemies.insert(enemy_at(EnemyKind::Charge, 3.0, 0.0, &tuning));
        let b = enemies.insert(enemy_at(EnemyKind::Charge, 8.0, 0.0, &tuning));
        let mut bullets = vec![player_bullet(BulletKind::Cannonball, &tuning, Vec3::ZERO)];
        let mut report = CollisionReport::default();
        let dt = 0.1;

        for _ in 0..12 {
            for bullet in &mut bullets {
                bullet.update(dt, &[]);
            }
            bullets_vs_targets(&mut bullets, &mut player, &mut enemies, dt, &tuning, &mut report);
        }
        // Put A back in the bullet's path.
        let ahead = bullets[0].body.position + Vec3::new(2.0, 0.0, 0.0);
        enemies.get_mut(a).unwrap().body.position = ahead;
        for _ in 0..5 {
            for bullet in &mut bullets {
                bullet.update(dt, &[]);
            }
            bullets_vs_targets(&mut bullets, &mut player, &mut enemies, dt, &tuning, &mut report);
        }

        assert_eq!(bullets.len(), 1);
        assert_eq!(enemies.get(a).unwrap().body.health, 150.0 - 100.0);
        assert_eq!(enemies.get(b).unwrap().body.health, 150.0 - 100.0);
        assert_eq!(report.damage.len(), 2);
    }

    #[test]
    fn test_enemy_bullet_hurts_player() {
        let (tuning, _, mut player) = setup();
        let mut enemies: Registry<Enemy> = Registry::new();
        let mut bullet = player_bullet(BulletKind::Big, &tuning, Vec3::new(-3.0, 0.0, 0.0));
        bullet.shooter = Shooter::Enemy(7);
        let mut bullets = vec![bullet];
        let mut report = CollisionReport::default();

        bullets_vs_targets(&mut bullets, &mut player, &mut enemies, 0.5, &tuning, &mut report);

        assert!(bullets.is_empty());
        assert_eq!(player.body.health, 500.0 - 100.0);
        assert_eq!(report.damage_taken(), 100.0);
    }

    #[test]
    fn test_pickups_apply_effects() {
        let (tuning, assets, mut player) = setup();
        let mut collectibles = Registry::new();
        let mut slots = WinSlots::default();
        for kind in [CollectibleKind::FourTurrets, CollectibleKind::Cannon, CollectibleKind::MachineGun] {
            collectibles.insert(Collectible::new(kind, Vec3::new(0.3, 0.0, 0.0), 0.5, &assets));
        }
        let mut report = CollisionReport::default();

        player_vs_collectibles(&mut player, &mut collectibles, &mut slots, &tuning, &assets, &mut report);

        assert!(collectibles.is_empty());
        assert_eq!(report.pickups.len(), 3);
        assert_eq!(player.turrets().len(), 5);
        assert_eq!(player.turrets()[0].kind, TurretKind::MachineGun);
        assert!(player.has_cannon());
    }

    #[test]
    fn test_token_clears_its_slot() {
        let (tuning, assets, mut player) = setup();
        let mut collectibles = Registry::new();
        let near = collectibles.insert(Collectible::new(CollectibleKind::WinToken, Vec3::ZERO, 0.5, &assets));
        let far = collectibles.insert(Collectible::new(
            CollectibleKind::WinToken,
            Vec3::new(30.0, 0.0, 0.0),
            0.5,
            &assets,
        ));
        let mut slots = WinSlots::new([Some(near), Some(far), None, None]);
        let mut report = CollisionReport::default();

        player_vs_collectibles(&mut player, &mut collectibles, &mut slots, &tuning, &assets, &mut report);

        assert_eq!(slots.slots(), &[None, Some(far), None, None]);
        assert!(report.pickups[0].applied);
        assert!(collectibles.contains(far));
    }
}
