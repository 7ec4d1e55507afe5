//! Infinite background streaming.
//!
//! The world starts as a single tile at the origin. Whenever the player
//! comes within the spawn distance of a tile that has not been expanded
//! yet, its eight neighbours are created (skipping any that already exist)
//! and the tile is marked visited so it is never expanded again. Tiles are
//! only ever added; rendering is gated by a separate, larger distance.
//!
//! Tiles are keyed by integer grid coordinates rather than float centres,
//! so two routes to the same cell always agree on its identity.

use std::collections::HashSet;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::AssetHandle;
use crate::config::WorldTuning;
use crate::render::{AssetTable, ObjectType, RenderItem, Renderable, Sprite};

/// Depth at which background tiles are drawn.
const TILE_LAYER: f32 = 5.0;

/// Grid cell of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl TileCoord {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The eight surrounding cells, clockwise from top-left.
    #[must_use]
    pub const fn neighbours(self) -> [Self; 8] {
        let Self { x, y } = self;
        [
            Self::new(x - 1, y + 1),
            Self::new(x, y + 1),
            Self::new(x + 1, y + 1),
            Self::new(x + 1, y),
            Self::new(x + 1, y - 1),
            Self::new(x, y - 1),
            Self::new(x - 1, y - 1),
            Self::new(x - 1, y),
        ]
    }

    /// Centre of the cell in world units.
    #[must_use]
    pub fn center(self, tile_size: f32) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32) * tile_size
    }
}

/// One background tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Grid cell.
    pub coord: TileCoord,
    /// Whether the neighbours have been spawned.
    pub visited: bool,
}

/// Lazily grown tile grid around the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldStreamer {
    tiles: Vec<Tile>,
    spawned: HashSet<TileCoord>,
    tile_size: f32,
    spawn_distance: f32,
    render_distance: f32,
    asset: AssetHandle,
    focus: Vec3,
}

impl WorldStreamer {
    /// A world holding only the origin tile.
    #[must_use]
    pub fn new(tuning: &WorldTuning, assets: &AssetTable) -> Self {
        let origin = TileCoord::new(0, 0);
        Self {
            tiles: vec![Tile {
                coord: origin,
                visited: false,
            }],
            spawned: HashSet::from([origin]),
            tile_size: tuning.tile_size,
            spawn_distance: tuning.spawn_distance,
            render_distance: tuning.render_distance,
            asset: assets.handle(Sprite::Tile),
            focus: Vec3::ZERO,
        }
    }

    /// Tiles in creation order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of tiles created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false; the origin tile exists from the start.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Whether a tile exists at `coord`.
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.spawned.contains(&coord)
    }

    /// Expand every unvisited tile within spawn distance of `player`.
    ///
    /// Tiles created during this call are examined in the same pass, so a
    /// player who teleports far away is caught up in one tick. Returns how
    /// many tiles were created.
    pub fn update(&mut self, player: Vec3) -> usize {
        self.focus = player;
        let before = self.tiles.len();
        let player = player.truncate();

        let mut index = 0;
        while index < self.tiles.len() {
            let tile = self.tiles[index];
            index += 1;
            if tile.visited || tile.coord.center(self.tile_size).distance(player) > self.spawn_distance {
                continue;
            }
            for neighbour in tile.coord.neighbours() {
                if self.spawned.insert(neighbour) {
                    self.tiles.push(Tile {
                        coord: neighbour,
                        visited: false,
                    });
                }
            }
            self.tiles[index - 1].visited = true;
        }

        let created = self.tiles.len() - before;
        if created > 0 {
            tracing::trace!(created, total = self.tiles.len(), "Tiles streamed");
        }
        created
    }
}

impl Renderable for WorldStreamer {
    fn render(&self, out: &mut Vec<RenderItem>) {
        let focus = self.focus.truncate();
        for tile in &self.tiles {
            let center = tile.coord.center(self.tile_size);
            if center.distance(focus) > self.render_distance {
                continue;
            }
            out.push(RenderItem {
                object_type: ObjectType::Sprite,
                asset: self.asset,
                position: center.extend(TILE_LAYER),
                rotation: 0.0,
                scale: Vec2::splat(self.tile_size),
                param: 0.0,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn world() -> WorldStreamer {
        WorldStreamer::new(&WorldTuning::default(), &AssetTable::default())
    }

    #[test]
    fn test_origin_expands_once() {
        let mut world = world();
        // The origin and its ring are within reach; the ring itself expands
        // too, since its centres are at most 20·√2 from the origin.
        world.update(Vec3::ZERO);
        assert!(world.tiles()[0].visited);
        assert!(world.contains(TileCoord::new(1, 1)));
        let count = world.len();
        assert_eq!(world.update(Vec3::ZERO), 0);
        assert_eq!(world.len(), count);
    }

    #[test]
    fn test_distant_tiles_stay_unexpanded() {
        let mut world = world();
        world.update(Vec3::ZERO);
        let far = world
            .tiles()
            .iter()
            .find(|tile| tile.coord == TileCoord::new(3, 0))
            .copied();
        if let Some(tile) = far {
            assert!(!tile.visited);
        }
    }

    #[test]
    fn test_travel_extends_the_grid() {
        let mut world = world();
        world.update(Vec3::ZERO);
        assert!(!world.contains(TileCoord::new(10, 0)));
        for step in 0..=10 {
            world.update(Vec3::new(step as f32 * 20.0, 0.0, 0.0));
        }
        assert!(world.contains(TileCoord::new(10, 0)));
        assert!(world.contains(TileCoord::new(11, 1)));
    }

    #[test]
    fn test_render_gated_by_distance() {
        let mut world = world();
        world.update(Vec3::ZERO);
        let mut items = Vec::new();
        world.render(&mut items);
        assert!(!items.is_empty());
        assert!(items.len() < world.len());
        for item in &items {
            assert!(item.position.truncate().length() <= 50.0);
            assert_eq!(item.position.z, TILE_LAYER);
        }
    }

    proptest! {
        #[test]
        fn prop_no_duplicate_tiles(path in prop::collection::vec((-200.0f32..200.0, -200.0f32..200.0), 1..20)) {
            let mut world = world();
            for (x, y) in path {
                world.update(Vec3::new(x, y, 0.0));
            }
            let unique: HashSet<TileCoord> = world.tiles().iter().map(|tile| tile.coord).collect();
            prop_assert_eq!(unique.len(), world.len());
        }

        #[test]
        fn prop_visited_tiles_never_expand_again(x in -100.0f32..100.0, y in -100.0f32..100.0) {
            let mut world = world();
            world.update(Vec3::new(x, y, 0.0));
            let count = world.len();
            prop_assert_eq!(world.update(Vec3::new(x, y, 0.0)), 0);
            prop_assert_eq!(world.len(), count);
        }
    }
}
