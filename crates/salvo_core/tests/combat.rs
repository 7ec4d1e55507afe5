//! Combat properties: swept hits, piercing, AI reactions and the turret rack.

use glam::Vec3;
use proptest::prelude::*;
use salvo_core::collision::{bullets_vs_targets, player_vs_collectibles, CollisionReport};
use salvo_core::director::WinSlots;
use salvo_core::prelude::*;
use salvo_core::projectile::ShotParams;
use salvo_core::simulation::aim_at;
use salvo_test_utils::determinism::strategies::{arb_pickup_kind, arb_position};
use salvo_test_utils::fixtures::{arena_with_enemy, DT};

fn player_bullet(kind: BulletKind, origin: Vec3, direction: Vec3, tuning: &TuningConfig) -> Bullet {
    Bullet::launch(
        kind,
        tuning.bullets.get(kind),
        ShotParams {
            origin,
            direction,
            shooter: Shooter::Player,
            scale: None,
        },
        AssetHandle::default(),
        AssetHandle::default(),
    )
}

fn enemy(kind: EnemyKind, position: Vec3, tuning: &TuningConfig) -> Enemy {
    Enemy::spawn(kind, position, 0.0, tuning, &AssetTable::default())
}

// ============================================================================
// Swept bullets
// ============================================================================

#[test]
fn test_only_nearer_of_two_targets_on_the_ray_is_hit() {
    let tuning = TuningConfig::default();
    let mut player = Player::spawn(Vec3::new(0.0, -50.0, 0.0), &tuning, &AssetTable::default());
    let mut enemies = Registry::new();
    // Insert the far one first so insertion order cannot pick the winner.
    let far = enemies.insert(enemy(EnemyKind::Charge, Vec3::new(0.0, 9.0, 0.0), &tuning));
    let near = enemies.insert(enemy(EnemyKind::Charge, Vec3::new(0.0, 5.0, 0.0), &tuning));
    let mut bullets = vec![player_bullet(BulletKind::Big, Vec3::ZERO, Vec3::Y, &tuning)];
    let mut report = CollisionReport::default();

    bullets_vs_targets(&mut bullets, &mut player, &mut enemies, 1.0, &tuning, &mut report);

    assert!(bullets.is_empty());
    assert_eq!(enemies.get(near).unwrap().body.health, 50.0);
    assert_eq!(enemies.get(far).unwrap().body.health, 150.0);
}

#[test]
fn test_fast_bullet_cannot_tunnel() {
    let tuning = TuningConfig::default();
    let mut player = Player::spawn(Vec3::new(0.0, -50.0, 0.0), &tuning, &AssetTable::default());
    let mut enemies = Registry::new();
    let target = enemies.insert(enemy(EnemyKind::Ranged, Vec3::new(6.0, 0.0, 0.0), &tuning));
    let mut bullet = player_bullet(BulletKind::Normal, Vec3::ZERO, Vec3::X, &tuning);
    // Far faster than the target is wide.
    bullet.speed = 500.0;
    let mut bullets = vec![bullet];
    let mut report = CollisionReport::default();

    bullets_vs_targets(&mut bullets, &mut player, &mut enemies, 0.1, &tuning, &mut report);

    assert_eq!(report.damage.len(), 1);
    assert!(enemies.get(target).unwrap().body.health < 30.0);
}

#[test]
fn test_piercing_bullet_lands_once_per_target() {
    let tuning = TuningConfig::default();
    let mut player = Player::spawn(Vec3::new(0.0, -50.0, 0.0), &tuning, &AssetTable::default());
    let mut enemies = Registry::new();
    let a = enemies.insert(enemy(EnemyKind::Charge, Vec3::new(4.0, 0.0, 0.0), &tuning));
    let b = enemies.insert(enemy(EnemyKind::Charge, Vec3::new(10.0, 0.0, 0.0), &tuning));
    let mut bullets = vec![player_bullet(BulletKind::Cannonball, Vec3::ZERO, Vec3::X, &tuning)];
    let mut report = CollisionReport::default();

    let mut step = |bullets: &mut Vec<Bullet>, enemies: &mut Registry<Enemy>| {
        for bullet in bullets.iter_mut() {
            bullet.update(0.1, &[]);
        }
        bullets_vs_targets(bullets, &mut player, enemies, 0.1, &tuning, &mut report);
    };

    for _ in 0..13 {
        step(&mut bullets, &mut enemies);
    }
    // A steps back into the path ahead of the bullet; it was already hit.
    let ahead = bullets[0].body.position + Vec3::new(2.5, 0.0, 0.0);
    enemies.get_mut(a).unwrap().body.position = ahead;
    for _ in 0..5 {
        step(&mut bullets, &mut enemies);
    }

    assert_eq!(bullets.len(), 1);
    assert_eq!(enemies.get(a).unwrap().body.health, 50.0);
    assert_eq!(enemies.get(b).unwrap().body.health, 50.0);
}

// ============================================================================
// AI reactions inside a running session
// ============================================================================

#[test]
fn test_idle_enemy_engages_next_tick() {
    let (mut sim, id) = arena_with_enemy(EnemyKind::Ranged, 12.0, 0.0);
    sim.tick(DT, &InputFrame::default());
    assert_eq!(sim.enemies().get(id).unwrap().state(), AiState::Engage);
}

#[test]
fn test_engaged_enemy_loses_player_beyond_engage_radius() {
    let (mut sim, id) = arena_with_enemy(EnemyKind::Melee, 8.0, 0.0);
    sim.tick(DT, &InputFrame::default());
    assert_eq!(sim.enemies().get(id).unwrap().state(), AiState::Engage);

    sim.enemies_mut().get_mut(id).unwrap().body.position = Vec3::new(40.0, 0.0, 0.0);
    sim.tick(DT, &InputFrame::default());
    assert_eq!(sim.enemies().get(id).unwrap().state(), AiState::Wander);
}

#[test]
fn test_shot_from_afar_alerts_idle_enemy() {
    let mut tuning = TuningConfig::default();
    tuning.charge.profile.wander_chance = 0.0;
    let config = SimulationConfig::default()
        .with_layout(Layout::Empty)
        .with_tuning(tuning);
    let mut sim = Simulation::new(config).unwrap();
    sim.tick(DT, &InputFrame::start());

    // Outside both the idle and alert radii of the charge archetype.
    let position = sim.player().body.position + Vec3::new(14.0, 0.0, 0.0);
    let id = sim.spawn_enemy(EnemyKind::Charge, position, 0.0);

    let mut hit = false;
    for _ in 0..120 {
        let fire = InputFrame::default()
            .with_aim(aim_at(&sim.view(), position))
            .with_primary(true);
        let events = sim.tick(DT, &fire);
        if events
            .damage_events
            .iter()
            .any(|event| event.target == DamageTarget::Enemy(id))
        {
            hit = true;
            break;
        }
    }
    assert!(hit);
    let enemy = sim.enemies().get(id).unwrap();
    assert_eq!(enemy.state(), AiState::Alert);
    // It turns to look where the shot landed, not at the ship.
    assert!(enemy.target.truncate().distance(position.truncate()) < 14.0);
}

// ============================================================================
// Turret rack
// ============================================================================

proptest! {
    #[test]
    fn prop_turret_rack_never_exceeds_cap(
        pickups in prop::collection::vec(arb_pickup_kind(), 1..30),
    ) {
        let tuning = TuningConfig::default();
        let assets = AssetTable::default();
        let mut player = Player::spawn(Vec3::ZERO, &tuning, &assets);
        let mut slots = WinSlots::default();
        for kind in pickups {
            let mut collectibles = Registry::new();
            collectibles.insert(Collectible::new(kind, Vec3::ZERO, 0.5, &assets));
            let mut report = CollisionReport::default();
            player_vs_collectibles(&mut player, &mut collectibles, &mut slots, &tuning, &assets, &mut report);

            prop_assert!(player.turrets().len() <= tuning.turrets.max_turrets);
            let cannons = player
                .turrets()
                .iter()
                .filter(|turret| turret.kind == TurretKind::Cannon)
                .count();
            prop_assert!(cannons <= 1);
            prop_assert!(!player.turrets().is_empty());
        }
    }

    #[test]
    fn prop_collectibles_are_consumed_once(position in arb_position(3.0)) {
        let tuning = TuningConfig::default();
        let assets = AssetTable::default();
        let mut player = Player::spawn(Vec3::ZERO, &tuning, &assets);
        let mut slots = WinSlots::default();
        let mut collectibles = Registry::new();
        collectibles.insert(Collectible::new(CollectibleKind::Cannon, position, 0.5, &assets));

        let mut report = CollisionReport::default();
        for _ in 0..3 {
            player_vs_collectibles(&mut player, &mut collectibles, &mut slots, &tuning, &assets, &mut report);
        }
        let touching = position.truncate().length() <= 1.0;
        prop_assert_eq!(report.pickups.len(), usize::from(touching));
        prop_assert_eq!(collectibles.is_empty(), touching);
    }
}
