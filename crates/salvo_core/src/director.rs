//! Spawning and the win-condition lifecycle.
//!
//! The director keeps the arena populated. Enemies appear around *anchors*:
//! the player (on a timer that shortens as the session goes on) and every
//! win token still in play (on per-token timers that only run while the
//! player is close to that token). Pickups drop around the player on their
//! own timer. All placement goes through [`spawn_enemy_near`], which
//! rejection-samples positions that do not overlap existing enemies.
//!
//! Four win tokens are tracked in [`WinSlots`]. Once every slot is empty
//! the exit door opens at the origin and takes the first slot; consuming
//! it wins the game.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::collectible::{Collectible, CollectibleKind};
use crate::components::EntityId;
use crate::config::{DirectorTuning, TuningConfig};
use crate::enemy::{Enemy, EnemyKind};
use crate::math::planar_distance;
use crate::render::AssetTable;
use crate::rng::SimRng;
use crate::storage::Registry;
use crate::timer::Timer;

/// Number of win tokens.
pub const WIN_SLOT_COUNT: usize = 4;

/// Facing given to every freshly spawned enemy.
const SPAWN_ROTATION: f32 = std::f32::consts::FRAC_PI_2;

// ============================================================================
// Win slots
// ============================================================================

/// The four win tokens and the exit door.
///
/// Default slots hold no tokens and never open the door; only slots built
/// from placed tokens with [`WinSlots::new`] lead to a win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WinSlots {
    slots: [Option<EntityId>; WIN_SLOT_COUNT],
    tokens_placed: bool,
    door_opened: bool,
}

impl WinSlots {
    /// Slots holding the given token ids.
    #[must_use]
    pub const fn new(tokens: [Option<EntityId>; WIN_SLOT_COUNT]) -> Self {
        Self {
            slots: tokens,
            tokens_placed: true,
            door_opened: false,
        }
    }

    /// Whether this session has win tokens at all.
    #[must_use]
    pub const fn tokens_placed(&self) -> bool {
        self.tokens_placed
    }

    /// Raw slot contents.
    #[must_use]
    pub const fn slots(&self) -> &[Option<EntityId>; WIN_SLOT_COUNT] {
        &self.slots
    }

    /// Ids still in play, in slot order.
    pub fn remaining(&self) -> impl Iterator<Item = (usize, EntityId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, id)| id.map(|id| (slot, id)))
    }

    /// Whether every slot is empty.
    #[must_use]
    pub fn all_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Empty the slot holding `id`. Returns the slot index, if any.
    pub fn clear(&mut self, id: EntityId) -> Option<usize> {
        let slot = self.slots.iter().position(|entry| *entry == Some(id))?;
        self.slots[slot] = None;
        Some(slot)
    }

    /// Whether the exit door has been opened.
    #[must_use]
    pub const fn door_opened(&self) -> bool {
        self.door_opened
    }

    /// Put the exit door into the first slot.
    pub fn open_door(&mut self, door: EntityId) {
        self.slots[0] = Some(door);
        self.door_opened = true;
    }

    /// Whether the door was opened and then reached.
    #[must_use]
    pub fn is_won(&self) -> bool {
        self.door_opened && self.all_empty()
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Where [`spawn_enemy_near`] may place an enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnAnchor {
    /// Centre of the spawn annulus.
    pub center: Vec3,
    /// Inner radius.
    pub min_distance: f32,
    /// Outer radius.
    pub max_distance: f32,
    /// A point the enemy must not appear too close to, with its radius.
    pub keep_clear: Option<(Vec3, f32)>,
}

/// Spawn one weighted-random enemy around an anchor.
///
/// The archetype is drawn first, then up to `spawn_attempts` positions are
/// sampled in the anchor's annulus. A position is rejected when it falls
/// inside the keep-clear radius or overlaps an existing enemy (summed
/// hitboxes). Returns the new id, or `None` when the cap is reached or
/// every attempt was rejected.
pub fn spawn_enemy_near(
    anchor: SpawnAnchor,
    enemies: &mut Registry<Enemy>,
    rng: &mut SimRng,
    tuning: &TuningConfig,
    assets: &AssetTable,
) -> Option<EntityId> {
    let director = &tuning.director;
    if enemies.len() >= director.max_enemies {
        return None;
    }
    let index = rng.weighted_index(&director.enemy_weights.as_array())?;
    let kind = EnemyKind::ALL[index];
    let hitbox = kind.profile(tuning).hitbox();

    for _ in 0..director.spawn_attempts {
        let position = rng.point_around(anchor.center, anchor.min_distance, anchor.max_distance);
        if let Some((point, radius)) = anchor.keep_clear {
            if planar_distance(position, point) < radius {
                continue;
            }
        }
        let overlaps = enemies
            .values()
            .any(|enemy| planar_distance(position, enemy.body.position) < hitbox + enemy.body.hitbox);
        if overlaps {
            continue;
        }

        let enemy = Enemy::spawn(kind, position, SPAWN_ROTATION, tuning, assets);
        let id = enemies.insert(enemy);
        tracing::trace!(enemy = id, ?kind, x = position.x, y = position.y, "Enemy spawned");
        return Some(id);
    }
    None
}

/// Drop one weighted-random pickup around the player.
pub fn spawn_pickup(
    player: Vec3,
    player_hitbox: f32,
    collectibles: &mut Registry<Collectible>,
    rng: &mut SimRng,
    tuning: &DirectorTuning,
    assets: &AssetTable,
) -> Option<EntityId> {
    let index = rng.weighted_index(&tuning.collectible_weights.as_array())?;
    let kind = CollectibleKind::PICKUPS[index];
    let inner = (tuning.collectible_range - player_hitbox) / 4.0;
    let position = rng.point_around(player, inner, tuning.collectible_range);
    let id = collectibles.insert(Collectible::new(kind, position, tuning.collectible_hitbox, assets));
    tracing::trace!(collectible = id, ?kind, "Pickup spawned");
    Some(id)
}

/// Place a circling win token at `position`.
pub fn place_win_token(
    position: Vec3,
    collectibles: &mut Registry<Collectible>,
    tuning: &DirectorTuning,
    assets: &AssetTable,
) -> EntityId {
    let token = Collectible::new(CollectibleKind::WinToken, position, tuning.collectible_hitbox, assets)
        .with_orbit(
            tuning.token_orbit_radius,
            tuning.token_orbit_period,
            Vec2::new(position.x, position.y),
        )
        .with_scale(tuning.token_scale);
    collectibles.insert(token)
}

// ============================================================================
// Director
// ============================================================================

/// Spawn timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Director {
    player_timer: Timer,
    token_timers: [Timer; WIN_SLOT_COUNT],
    pickup_timer: Timer,
    elapsed: f32,
    enemy_spawning: bool,
}

impl Director {
    /// Fresh timers. With `enemy_spawning` off, only pickups are dropped.
    #[must_use]
    pub fn new(tuning: &DirectorTuning, enemy_spawning: bool) -> Self {
        Self {
            player_timer: Timer::started(tuning.max_spawn_time),
            token_timers: [Timer::started(tuning.max_spawn_time); WIN_SLOT_COUNT],
            pickup_timer: Timer::started(tuning.collectible_time),
            elapsed: 0.0,
            enemy_spawning,
        }
    }

    /// Seconds of play so far.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whether enemies are spawned at all.
    #[must_use]
    pub const fn enemy_spawning(&self) -> bool {
        self.enemy_spawning
    }

    /// Run every anchor whose timer is up. Returns the spawned enemy ids.
    pub fn spawn(
        &mut self,
        player: Vec3,
        player_hitbox: f32,
        enemies: &mut Registry<Enemy>,
        collectibles: &mut Registry<Collectible>,
        slots: &WinSlots,
        rng: &mut SimRng,
        tuning: &TuningConfig,
        assets: &AssetTable,
    ) -> Vec<EntityId> {
        let director = &tuning.director;
        let mut spawned = Vec::new();

        if self.enemy_spawning && self.player_timer.times_up() {
            let anchor = SpawnAnchor {
                center: player,
                min_distance: director.player_spawn_min,
                max_distance: director.player_spawn_max,
                keep_clear: None,
            };
            spawned.extend(spawn_enemy_near(anchor, enemies, rng, tuning, assets));
            let ceiling = (director.max_spawn_time - self.elapsed / director.spawn_ramp).max(director.min_spawn_time);
            self.player_timer.set(rng.range(director.min_spawn_time, ceiling));
        }

        if self.enemy_spawning && enemies.len() < director.max_enemies {
            for (slot, id) in slots.remaining() {
                if !self.token_timers[slot].times_up() {
                    continue;
                }
                let Some(token) = collectibles.get(id) else {
                    continue;
                };
                self.token_timers[slot].set(rng.range(director.min_spawn_time, director.max_spawn_time));
                let anchor = SpawnAnchor {
                    center: token.body.position,
                    min_distance: director.token_spawn_min,
                    max_distance: director.token_spawn_max,
                    keep_clear: Some((player, director.no_spawn_radius)),
                };
                spawned.extend(spawn_enemy_near(anchor, enemies, rng, tuning, assets));
            }
        }

        if self.pickup_timer.times_up() {
            spawn_pickup(player, player_hitbox, collectibles, rng, director, assets);
            self.pickup_timer.set(rng.range(director.collectible_time / 4.0, director.collectible_time));
        }

        spawned
    }

    /// Advance the timers. A token's timer only runs while the player is
    /// within the token range.
    pub fn advance(
        &mut self,
        dt: f32,
        player: Vec3,
        collectibles: &Registry<Collectible>,
        slots: &WinSlots,
        tuning: &DirectorTuning,
    ) {
        self.elapsed += dt;
        self.player_timer.update(dt);
        for (slot, id) in slots.remaining() {
            let near = collectibles
                .get(id)
                .is_some_and(|token| planar_distance(token.body.position, player) <= tuning.token_range);
            if near {
                self.token_timers[slot].update(dt);
            }
        }
        self.pickup_timer.update(dt);
    }

    /// Open the exit door at the origin once every placed token is gone.
    ///
    /// Returns the door id the tick it opens. Sessions without tokens never
    /// get a door.
    pub fn check_door(
        &self,
        slots: &mut WinSlots,
        collectibles: &mut Registry<Collectible>,
        tuning: &DirectorTuning,
        assets: &AssetTable,
    ) -> Option<EntityId> {
        if !slots.tokens_placed() || slots.door_opened() || !slots.all_empty() {
            return None;
        }
        let door = Collectible::new(CollectibleKind::ExitDoor, Vec3::ZERO, tuning.collectible_hitbox, assets)
            .with_scale(tuning.door_scale);
        let id = collectibles.insert(door);
        slots.open_door(id);
        tracing::info!(door = id, "Exit door opened");
        Some(id)
    }
}

/// Populate a standard session: starting enemies, pickups and four tokens
/// scattered around the player.
pub fn populate_standard(
    player: Vec3,
    player_hitbox: f32,
    enemies: &mut Registry<Enemy>,
    collectibles: &mut Registry<Collectible>,
    rng: &mut SimRng,
    tuning: &TuningConfig,
    assets: &AssetTable,
) -> WinSlots {
    let director = &tuning.director;
    let anchor = SpawnAnchor {
        center: player,
        min_distance: director.player_spawn_min,
        max_distance: director.player_spawn_max,
        keep_clear: None,
    };
    let target = director.starting_enemies.min(director.max_enemies);
    // Placement can be rejected; bound the retries so a crowded table
    // cannot stall setup.
    let mut tries = target * director.spawn_attempts.max(1) * 4;
    while enemies.len() < target && tries > 0 {
        spawn_enemy_near(anchor, enemies, rng, tuning, assets);
        tries -= 1;
    }

    for _ in 0..director.starting_collectibles {
        spawn_pickup(player, player_hitbox, collectibles, rng, director, assets);
    }

    let mut tokens = [None; WIN_SLOT_COUNT];
    for slot in &mut tokens {
        let position = rng.point_around(player, player_hitbox * 4.0, director.win_range);
        *slot = Some(place_win_token(position, collectibles, director, assets));
    }
    WinSlots::new(tokens)
}

/// Token positions of the fixed layout.
pub const FIXED_TOKENS: [Vec2; WIN_SLOT_COUNT] = [
    Vec2::new(20.0, 20.0),
    Vec2::new(-20.0, -20.0),
    Vec2::new(20.0, -20.0),
    Vec2::new(-20.0, 20.0),
];

/// Pickups of the fixed layout.
pub const FIXED_PICKUPS: [(CollectibleKind, Vec2); 5] = [
    (CollectibleKind::FourTurrets, Vec2::new(5.0, 5.0)),
    (CollectibleKind::MachineGun, Vec2::new(-5.0, -5.0)),
    (CollectibleKind::Shotgun, Vec2::new(5.0, -5.0)),
    (CollectibleKind::Cannon, Vec2::new(0.0, -10.0)),
    (CollectibleKind::Homing, Vec2::new(0.0, 10.0)),
];

/// Position of the lone enemy in the fixed layout.
pub const FIXED_ENEMY: Vec2 = Vec2::new(2.0, 0.0);

/// Populate the deterministic test layout.
pub fn populate_fixed(
    enemies: &mut Registry<Enemy>,
    collectibles: &mut Registry<Collectible>,
    tuning: &TuningConfig,
    assets: &AssetTable,
) -> WinSlots {
    let director = &tuning.director;
    enemies.insert(Enemy::spawn(
        EnemyKind::Melee,
        FIXED_ENEMY.extend(0.0),
        SPAWN_ROTATION,
        tuning,
        assets,
    ));
    for (kind, position) in FIXED_PICKUPS {
        collectibles.insert(Collectible::new(kind, position.extend(0.0), director.collectible_hitbox, assets));
    }
    let mut tokens = [None; WIN_SLOT_COUNT];
    for (slot, position) in tokens.iter_mut().zip(FIXED_TOKENS) {
        *slot = Some(place_win_token(position.extend(0.0), collectibles, director, assets));
    }
    WinSlots::new(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TuningConfig, AssetTable, SimRng) {
        (TuningConfig::default(), AssetTable::default(), SimRng::seeded(42))
    }

    #[test]
    fn test_win_slots_lifecycle() {
        let mut slots = WinSlots::new([Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(slots.clear(3), Some(2));
        assert_eq!(slots.clear(3), None);
        for id in [1, 2, 4] {
            slots.clear(id);
        }
        assert!(slots.all_empty());
        assert!(!slots.is_won());
        slots.open_door(9);
        assert!(!slots.is_won());
        assert_eq!(slots.remaining().collect::<Vec<_>>(), vec![(0, 9)]);
        slots.clear(9);
        assert!(slots.is_won());
    }

    #[test]
    fn test_spawn_respects_annulus() {
        let (tuning, assets, mut rng) = setup();
        let mut enemies = Registry::new();
        let anchor = SpawnAnchor {
            center: Vec3::new(100.0, 0.0, 0.0),
            min_distance: 15.0,
            max_distance: 30.0,
            keep_clear: None,
        };
        for _ in 0..20 {
            spawn_enemy_near(anchor, &mut enemies, &mut rng, &tuning, &assets);
        }
        assert!(!enemies.is_empty());
        for enemy in enemies.values() {
            let distance = planar_distance(enemy.body.position, anchor.center);
            assert!((15.0 - 1e-3..=30.0 + 1e-3).contains(&distance));
        }
    }

    #[test]
    fn test_spawn_rejects_keep_clear_zone() {
        let (tuning, assets, mut rng) = setup();
        let mut enemies = Registry::new();
        // The keep-clear disc swallows the whole annulus.
        let anchor = SpawnAnchor {
            center: Vec3::ZERO,
            min_distance: 1.0,
            max_distance: 2.0,
            keep_clear: Some((Vec3::ZERO, 5.0)),
        };
        for _ in 0..10 {
            assert!(spawn_enemy_near(anchor, &mut enemies, &mut rng, &tuning, &assets).is_none());
        }
        assert!(enemies.is_empty());
    }

    #[test]
    fn test_spawn_respects_cap() {
        let (mut tuning, assets, mut rng) = setup();
        tuning.director.max_enemies = 2;
        let mut enemies = Registry::new();
        let anchor = SpawnAnchor {
            center: Vec3::ZERO,
            min_distance: 15.0,
            max_distance: 30.0,
            keep_clear: None,
        };
        for _ in 0..20 {
            spawn_enemy_near(anchor, &mut enemies, &mut rng, &tuning, &assets);
        }
        assert!(enemies.len() <= 2);
    }

    #[test]
    fn test_standard_layout() {
        let (tuning, assets, mut rng) = setup();
        let mut enemies = Registry::new();
        let mut collectibles = Registry::new();
        let slots = populate_standard(Vec3::ZERO, 0.5, &mut enemies, &mut collectibles, &mut rng, &tuning, &assets);
        assert_eq!(enemies.len(), 10);
        assert_eq!(collectibles.len(), 3 + WIN_SLOT_COUNT);
        assert_eq!(slots.remaining().count(), WIN_SLOT_COUNT);
        for (_, id) in slots.remaining() {
            let token = collectibles.get(id).unwrap();
            assert_eq!(token.kind, CollectibleKind::WinToken);
            assert_eq!(token.body.hitbox, 1.5);
            assert!(token.orbit.is_some());
        }
    }

    #[test]
    fn test_fixed_layout() {
        let (tuning, assets, _) = setup();
        let mut enemies = Registry::new();
        let mut collectibles = Registry::new();
        let slots = populate_fixed(&mut enemies, &mut collectibles, &tuning, &assets);
        assert_eq!(enemies.len(), 1);
        assert_eq!(collectibles.len(), 9);
        let first = collectibles.get(slots.slots()[0].unwrap()).unwrap();
        assert_eq!(first.body.position, Vec3::new(20.0, 20.0, 0.0));
    }

    #[test]
    fn test_token_timers_need_player_nearby() {
        let (tuning, assets, mut rng) = setup();
        let director_tuning = &tuning.director;
        let mut enemies = Registry::new();
        let mut collectibles = Registry::new();
        let token_position = Vec3::new(200.0, 0.0, 0.0);
        let token = place_win_token(token_position, &mut collectibles, director_tuning, &assets);
        let slots = WinSlots::new([Some(token), None, None, None]);
        let mut director = Director::new(director_tuning, true);
        let near_token = |enemies: &Registry<Enemy>| {
            enemies
                .values()
                .filter(|enemy| {
                    planar_distance(enemy.body.position, token_position) <= director_tuning.token_spawn_max + 1e-3
                })
                .count()
        };

        // Far away: only the player anchor fires.
        let far = Vec3::ZERO;
        for _ in 0..10 {
            director.advance(1.0, far, &collectibles, &slots, director_tuning);
        }
        director.spawn(far, 0.5, &mut enemies, &mut collectibles, &slots, &mut rng, &tuning, &assets);
        assert_eq!(near_token(&enemies), 0);
        for enemy in enemies.values() {
            assert!(planar_distance(enemy.body.position, far) <= director_tuning.player_spawn_max + 1e-3);
        }

        // Within range the token timer runs out and the token spawns an enemy.
        // Player-anchored spawns are pushed well away from the token.
        let mut remote = tuning.clone();
        remote.director.player_spawn_min = 500.0;
        remote.director.player_spawn_max = 501.0;
        let near = token_position - Vec3::new(director_tuning.token_range - 10.0, 0.0, 0.0);
        for _ in 0..(director_tuning.max_spawn_time.ceil() as usize) {
            director.advance(1.0, near, &collectibles, &slots, director_tuning);
        }
        director.spawn(near, 0.5, &mut enemies, &mut collectibles, &slots, &mut rng, &remote, &assets);
        assert_eq!(near_token(&enemies), 1);
    }

    #[test]
    fn test_pickup_timer_drops_pickup() {
        let (tuning, assets, mut rng) = setup();
        let mut enemies = Registry::new();
        let mut collectibles = Registry::new();
        let slots = WinSlots::default();
        let mut director = Director::new(&tuning.director, false);
        director.advance(20.0, Vec3::ZERO, &collectibles, &slots, &tuning.director);
        let spawned = director.spawn(
            Vec3::ZERO,
            0.5,
            &mut enemies,
            &mut collectibles,
            &slots,
            &mut rng,
            &tuning,
            &assets,
        );
        assert!(spawned.is_empty());
        assert!(enemies.is_empty());
        assert_eq!(collectibles.len(), 1);
        let pickup = collectibles.values().next().unwrap();
        assert!(CollectibleKind::PICKUPS.contains(&pickup.kind));
        let distance = planar_distance(pickup.body.position, Vec3::ZERO);
        assert!(distance >= (20.0 - 0.5) / 4.0 - 1e-3 && distance <= 20.0 + 1e-3);
    }

    #[test]
    fn test_door_opens_once_at_origin() {
        let (tuning, assets, _) = setup();
        let mut collectibles = Registry::new();
        let mut slots = WinSlots::new([Some(1), None, None, None]);
        let director = Director::new(&tuning.director, false);
        assert!(director.check_door(&mut slots, &mut collectibles, &tuning.director, &assets).is_none());
        slots.clear(1);
        let door = director
            .check_door(&mut slots, &mut collectibles, &tuning.director, &assets)
            .unwrap();
        assert!(director.check_door(&mut slots, &mut collectibles, &tuning.director, &assets).is_none());
        let door = collectibles.get(door).unwrap();
        assert_eq!(door.kind, CollectibleKind::ExitDoor);
        assert_eq!(door.body.position, Vec3::ZERO);
        assert_eq!(door.body.hitbox, 2.5);
    }

    #[test]
    fn test_no_door_without_tokens() {
        let (tuning, assets, _) = setup();
        let mut collectibles = Registry::new();
        let mut slots = WinSlots::default();
        let director = Director::new(&tuning.director, false);
        assert!(slots.all_empty());
        assert!(director.check_door(&mut slots, &mut collectibles, &tuning.director, &assets).is_none());
        assert!(collectibles.is_empty());
        assert!(!slots.is_won());
    }
}
