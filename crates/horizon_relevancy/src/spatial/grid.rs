//! R*-tree backed grid spatialization
//!
//! Objects are indexed by point in an `rstar` tree and gathered by radius
//! around the viewer, each object using its own cull distance. The grid
//! cell size and bias only matter for bookkeeping: objects below the bias
//! origin are "out of grid" and, when rebuilds are enabled for their type,
//! trigger a rebuild that moves the bias to cover them.

use super::{SpatialActorInfo, SpatialIndex, SpatialMode};
use crate::config::SpatialConfig;
use crate::types::{ClassId, ObjectId, Vec3};
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Entry stored inside the R-tree.
#[derive(Debug, Clone)]
struct GridEntry {
    object: ObjectId,
    point: [f64; 3],
    cull_distance_squared: f64,
}

impl PartialEq for GridEntry {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object
    }
}

impl RTreeObject for GridEntry {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for GridEntry {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

#[derive(Debug, Clone)]
struct Tracked {
    class: ClassId,
    mode: SpatialMode,
    dormant: bool,
    entry: GridEntry,
}

impl Tracked {
    fn moves(&self) -> bool {
        match self.mode {
            SpatialMode::Static => false,
            SpatialMode::Dynamic => true,
            SpatialMode::Dormancy => !self.dormant,
        }
    }
}

/// Counters for the grid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridStats {
    pub total_insertions: u64,
    pub total_removals: u64,
    pub total_position_updates: u64,
    pub total_rebuilds: u64,
    /// Inserts or moves that landed below the bias origin
    pub out_of_grid_events: u64,
}

/// Reference [`SpatialIndex`] implementation.
#[derive(Debug)]
pub struct GridSpatialization {
    cell_size: f64,
    bias: (f64, f64),
    rebuilds_enabled: bool,
    rebuild_blacklist: HashSet<ClassId>,
    tree: RTree<GridEntry>,
    tracked: HashMap<ObjectId, Tracked>,
    max_cull_distance_squared: f64,
    needs_rebuild: bool,
    stats: GridStats,
}

impl GridSpatialization {
    /// Creates an empty grid.
    ///
    /// `rebuild_blacklist` holds the resolved types (subtypes included)
    /// that never trigger a rebuild; it is ignored while rebuilds are
    /// disabled, since then nothing rebuilds.
    pub fn new(config: &SpatialConfig, rebuild_blacklist: HashSet<ClassId>) -> Self {
        Self {
            cell_size: config.clamped_cell_size(),
            bias: config.spatial_bias,
            rebuilds_enabled: config.enable_spatial_rebuilds,
            rebuild_blacklist,
            tree: RTree::new(),
            tracked: HashMap::new(),
            max_cull_distance_squared: 0.0,
            needs_rebuild: false,
            stats: GridStats::default(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn bias(&self) -> (f64, f64) {
        self.bias
    }

    pub fn stats(&self) -> &GridStats {
        &self.stats
    }

    /// Grid cell of a position. Out-of-grid positions clamp to cell 0.
    pub fn cell_of(&self, position: Vec3) -> (u32, u32) {
        let x = ((position.x - self.bias.0) / self.cell_size).floor().max(0.0);
        let y = ((position.y - self.bias.1) / self.cell_size).floor().max(0.0);
        (x as u32, y as u32)
    }

    /// Number of distinct cells holding at least one object
    pub fn occupied_cells(&self) -> usize {
        self.tracked
            .values()
            .map(|t| {
                let [x, y, z] = t.entry.point;
                self.cell_of(Vec3::new(x, y, z))
            })
            .collect::<HashSet<_>>()
            .len()
    }

    fn is_out_of_grid(&self, point: [f64; 3]) -> bool {
        point[0] < self.bias.0 || point[1] < self.bias.1
    }

    fn check_bounds(&mut self, class: ClassId, object: ObjectId, point: [f64; 3]) {
        if !self.is_out_of_grid(point) {
            return;
        }
        self.stats.out_of_grid_events += 1;
        if self.rebuilds_enabled && !self.rebuild_blacklist.contains(&class) {
            debug!("Object {} left the grid, scheduling rebuild", object);
            self.needs_rebuild = true;
        } else {
            debug!("Object {} is outside the grid, clamping to edge cells", object);
        }
    }

    fn insert_tracked(&mut self, mode: SpatialMode, info: SpatialActorInfo) {
        if self.tracked.contains_key(&info.object) {
            warn!("⚠️ Object {} already in spatial grid, replacing", info.object);
            self.remove_tracked(info.object, None);
        }

        let entry = GridEntry {
            object: info.object,
            point: info.position.to_array(),
            cull_distance_squared: f64::from(info.cull_distance_squared.max(0.0)),
        };
        self.max_cull_distance_squared = self.max_cull_distance_squared.max(entry.cull_distance_squared);
        self.check_bounds(info.class, info.object, entry.point);

        self.tree.insert(entry.clone());
        self.tracked.insert(
            info.object,
            Tracked {
                class: info.class,
                mode,
                dormant: mode == SpatialMode::Dormancy && info.dormant,
                entry,
            },
        );
        self.stats.total_insertions += 1;
    }

    fn remove_tracked(&mut self, object: ObjectId, mode: Option<SpatialMode>) -> bool {
        match self.tracked.get(&object) {
            Some(tracked) if mode.map_or(true, |m| m == tracked.mode) => {}
            Some(tracked) => {
                debug!(
                    "Object {} is tracked as {:?}, not {:?}; ignoring removal",
                    object, tracked.mode, mode
                );
                return false;
            }
            None => return false,
        }

        let Some(tracked) = self.tracked.remove(&object) else {
            return false;
        };
        self.tree.remove(&tracked.entry);
        self.stats.total_removals += 1;
        true
    }

    fn move_entry(&mut self, object: ObjectId, position: Vec3) {
        let Some(tracked) = self.tracked.get_mut(&object) else {
            return;
        };
        self.tree.remove(&tracked.entry);
        tracked.entry.point = position.to_array();
        self.tree.insert(tracked.entry.clone());
        let (class, point) = (tracked.class, tracked.entry.point);
        self.stats.total_position_updates += 1;
        self.check_bounds(class, object, point);
    }

    fn rebuild(&mut self) {
        let cell = self.cell_size;
        let (mut min_x, mut min_y) = self.bias;
        for tracked in self.tracked.values() {
            min_x = min_x.min((tracked.entry.point[0] / cell).floor() * cell);
            min_y = min_y.min((tracked.entry.point[1] / cell).floor() * cell);
        }
        self.bias = (min_x, min_y);

        let entries: Vec<GridEntry> = self.tracked.values().map(|t| t.entry.clone()).collect();
        self.tree = RTree::bulk_load(entries);
        self.needs_rebuild = false;
        self.stats.total_rebuilds += 1;
        info!(
            "🗺️ Spatial grid rebuilt around bias ({:.0}, {:.0}) with {} objects",
            self.bias.0,
            self.bias.1,
            self.tracked.len()
        );
    }
}

impl SpatialIndex for GridSpatialization {
    fn insert_static(&mut self, info: SpatialActorInfo) {
        self.insert_tracked(SpatialMode::Static, info);
    }

    fn insert_dynamic(&mut self, info: SpatialActorInfo) {
        self.insert_tracked(SpatialMode::Dynamic, info);
    }

    fn insert_dormancy(&mut self, info: SpatialActorInfo) {
        self.insert_tracked(SpatialMode::Dormancy, info);
    }

    fn remove_static(&mut self, object: ObjectId) -> bool {
        self.remove_tracked(object, Some(SpatialMode::Static))
    }

    fn remove_dynamic(&mut self, object: ObjectId) -> bool {
        self.remove_tracked(object, Some(SpatialMode::Dynamic))
    }

    fn remove_dormancy(&mut self, object: ObjectId) -> bool {
        self.remove_tracked(object, Some(SpatialMode::Dormancy))
    }

    fn update_position(&mut self, object: ObjectId, position: Vec3) {
        if self.tracked.get(&object).is_some_and(Tracked::moves) {
            self.move_entry(object, position);
        }
    }

    fn set_dormant(&mut self, object: ObjectId, dormant: bool, position: Vec3) {
        let Some(tracked) = self.tracked.get_mut(&object) else {
            return;
        };
        if tracked.mode != SpatialMode::Dormancy || tracked.dormant == dormant {
            return;
        }
        tracked.dormant = dormant;
        if !dormant {
            // Woken objects pick up wherever they drifted to while asleep.
            self.move_entry(object, position);
        }
    }

    fn prepare_for_replication(&mut self) {
        if self.needs_rebuild {
            self.rebuild();
        }
    }

    fn gather(&self, viewer: Vec3) -> Vec<ObjectId> {
        let center = viewer.to_array();
        self.tree
            .locate_within_distance(center, self.max_cull_distance_squared)
            .filter(|entry| entry.distance_2(&center) <= entry.cull_distance_squared)
            .map(|entry| entry.object)
            .collect()
    }

    fn contains(&self, object: ObjectId) -> bool {
        self.tracked.contains_key(&object)
    }

    fn len(&self) -> usize {
        self.tracked.len()
    }

    fn reset(&mut self) {
        self.tree = RTree::new();
        self.tracked.clear();
        self.max_cull_distance_squared = 0.0;
        self.needs_rebuild = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridSpatialization {
        GridSpatialization::new(&SpatialConfig::default(), HashSet::new())
    }

    fn info(position: Vec3, cull: f32) -> SpatialActorInfo {
        SpatialActorInfo {
            object: ObjectId::new(),
            class: ClassId(0),
            position,
            cull_distance_squared: cull * cull,
            dormant: false,
        }
    }

    #[test]
    fn test_gather_respects_per_object_cull_distance() {
        let mut grid = grid();
        let near = info(Vec3::new(100.0, 0.0, 0.0), 500.0);
        let far_but_loud = info(Vec3::new(5000.0, 0.0, 0.0), 10000.0);
        let far = info(Vec3::new(5000.0, 0.0, 0.0), 500.0);
        grid.insert_dynamic(near);
        grid.insert_static(far_but_loud);
        grid.insert_static(far);

        let relevant = grid.gather(Vec3::zero());
        assert!(relevant.contains(&near.object));
        assert!(relevant.contains(&far_but_loud.object));
        assert!(!relevant.contains(&far.object));
    }

    #[test]
    fn test_remove_requires_matching_mode() {
        let mut grid = grid();
        let object = info(Vec3::zero(), 100.0);
        grid.insert_dynamic(object);

        assert!(!grid.remove_static(object.object));
        assert!(grid.contains(object.object));
        assert!(grid.remove_dynamic(object.object));
        assert!(grid.is_empty());
        assert!(!grid.remove_dynamic(object.object));
    }

    #[test]
    fn test_static_objects_ignore_position_updates() {
        let mut grid = grid();
        let tower = info(Vec3::zero(), 100.0);
        let runner = info(Vec3::zero(), 100.0);
        grid.insert_static(tower);
        grid.insert_dynamic(runner);

        grid.update_position(tower.object, Vec3::new(10000.0, 0.0, 0.0));
        grid.update_position(runner.object, Vec3::new(10000.0, 0.0, 0.0));

        let at_origin = grid.gather(Vec3::zero());
        assert_eq!(at_origin, vec![tower.object]);
        assert_eq!(grid.stats().total_position_updates, 1);
    }

    #[test]
    fn test_dormant_objects_are_treated_as_static() {
        let mut grid = grid();
        let mut door = info(Vec3::zero(), 100.0);
        door.dormant = true;
        grid.insert_dormancy(door);

        grid.update_position(door.object, Vec3::new(5000.0, 0.0, 0.0));
        assert_eq!(grid.gather(Vec3::zero()), vec![door.object]);

        grid.set_dormant(door.object, false, Vec3::new(5000.0, 0.0, 0.0));
        assert!(grid.gather(Vec3::zero()).is_empty());
        assert_eq!(grid.gather(Vec3::new(5000.0, 0.0, 0.0)), vec![door.object]);
    }

    #[test]
    fn test_rebuild_only_when_enabled() {
        let mut disabled = grid();
        disabled.insert_dynamic(info(Vec3::new(-900000.0, 0.0, 0.0), 100.0));
        disabled.prepare_for_replication();
        assert_eq!(disabled.stats().out_of_grid_events, 1);
        assert_eq!(disabled.stats().total_rebuilds, 0);
        assert_eq!(disabled.cell_of(Vec3::new(-900000.0, 0.0, 0.0)).0, 0);

        let config = SpatialConfig {
            enable_spatial_rebuilds: true,
            ..SpatialConfig::default()
        };
        let mut enabled = GridSpatialization::new(&config, HashSet::new());
        let lost = info(Vec3::new(-900000.0, 0.0, 0.0), 100.0);
        enabled.insert_dynamic(lost);
        enabled.prepare_for_replication();
        assert_eq!(enabled.stats().total_rebuilds, 1);
        assert!(enabled.bias().0 <= -900000.0);
        assert_eq!(enabled.gather(Vec3::new(-900000.0, 0.0, 0.0)), vec![lost.object]);
    }

    #[test]
    fn test_blacklisted_types_do_not_rebuild() {
        let config = SpatialConfig {
            enable_spatial_rebuilds: true,
            ..SpatialConfig::default()
        };
        let mut grid = GridSpatialization::new(&config, HashSet::from([ClassId(0)]));
        grid.insert_dynamic(info(Vec3::new(-900000.0, 0.0, 0.0), 100.0));
        grid.prepare_for_replication();
        assert_eq!(grid.stats().total_rebuilds, 0);
    }

    #[test]
    fn test_cell_bookkeeping() {
        let config = SpatialConfig {
            cell_size: 1000.0,
            spatial_bias: (0.0, 0.0),
            ..SpatialConfig::default()
        };
        let mut grid = GridSpatialization::new(&config, HashSet::new());
        assert_eq!(grid.cell_of(Vec3::new(2500.0, 999.0, 0.0)), (2, 0));
        grid.insert_static(info(Vec3::new(100.0, 100.0, 0.0), 1.0));
        grid.insert_static(info(Vec3::new(200.0, 200.0, 0.0), 1.0));
        grid.insert_static(info(Vec3::new(1500.0, 100.0, 0.0), 1.0));
        assert_eq!(grid.occupied_cells(), 2);
    }
}
