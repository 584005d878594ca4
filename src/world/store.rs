use std::sync::Arc;

use super::block::BlockKind;
use super::generator::WorldGenerator;
use super::position::{Column, Position};
use super::world::World;

/// Owner of the current world. Every edit swaps in a new snapshot, so a
/// reader holding an older `Arc<World>` never sees a half-applied change.
#[derive(Debug, Clone)]
pub struct WorldStore {
    world: Arc<World>,
    generator: WorldGenerator,
}

impl WorldStore {
    pub fn new(generator: WorldGenerator) -> Self {
        Self {
            world: Arc::new(generator.generate()),
            generator,
        }
    }

    pub fn snapshot(&self) -> Arc<World> {
        Arc::clone(&self.world)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn add_block(&mut self, pos: Position, kind: BlockKind) -> Arc<World> {
        match self.world.add_block(pos, kind) {
            Some(next) => {
                tracing::debug!("add {kind} at {pos}");
                self.world = Arc::new(next);
            }
            None => tracing::debug!("add {kind} at {pos} ignored: cell occupied"),
        }

        self.snapshot()
    }

    pub fn remove_block(&mut self, pos: Position) -> Arc<World> {
        match self.world.remove_block(pos) {
            Some(next) => {
                tracing::debug!("remove at {pos}");
                self.world = Arc::new(next);
            }
            None => tracing::debug!("remove at {pos} ignored: cell is air"),
        }

        self.snapshot()
    }

    /// Top of the column under a continuous `(x, z)`, `0` when the column is
    /// empty or the coordinates do not address a cell. Only reads the cache.
    pub fn get_top_height(&self, x: f32, z: f32) -> i32 {
        Column::from_f32(x, z)
            .ok()
            .and_then(|column| self.top_height(column))
            .unwrap_or(0)
    }

    pub fn top_height(&self, column: Column) -> Option<i32> {
        self.world.top_height(column)
    }

    pub fn reset(&mut self) -> Arc<World> {
        self.world = Arc::new(self.generator.generate());
        tracing::info!(
            "world reset: seed={} blocks={}",
            self.generator.config().seed,
            self.world.len()
        );
        self.snapshot()
    }
}

impl Default for WorldStore {
    fn default() -> Self {
        Self::new(WorldGenerator::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::WorldStore;
    use crate::world::block::BlockKind;
    use crate::world::generator::{GeneratorConfig, WorldGenerator};
    use crate::world::position::{Column, Position};
    use crate::world::Verify;

    fn single_column_store() -> WorldStore {
        WorldStore::new(WorldGenerator::new(GeneratorConfig::single_column()).expect("valid config"))
    }

    #[test]
    fn unittest_store_place_and_mine_on_single_column() -> eyre::Result<()> {
        let _ = tracing_subscriber::fmt::try_init();
        let mut store = single_column_store();

        assert_eq!(store.get_top_height(0.0, 0.0), 0);

        store.add_block(Position(0, 1, 0), BlockKind::Wood);
        assert_eq!(store.get_top_height(0.0, 0.0), 1);
        assert_eq!(store.world().get(Position(0, 1, 0)), Some(BlockKind::Wood));

        store.remove_block(Position(0, 1, 0));
        assert_eq!(store.get_top_height(0.0, 0.0), 0);
        assert_eq!(store.top_height(Column(0, 0)), Some(0));

        store.world().verify()
    }

    #[test]
    fn unittest_store_noops_keep_snapshot() {
        let mut store = single_column_store();
        let before = store.snapshot();

        let after = store.add_block(Position(0, 0, 0), BlockKind::Stone);
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.get(Position(0, 0, 0)), Some(BlockKind::Grass));

        let after = store.remove_block(Position(4, 4, 4));
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn unittest_store_old_snapshot_is_stable() {
        let mut store = single_column_store();
        let before = store.snapshot();

        let after = store.add_block(Position(0, 1, 0), BlockKind::Leaf);

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
        assert_eq!(before.top_height(Column(0, 0)), Some(0));
    }

    #[test]
    fn unittest_store_column_sentinel() -> eyre::Result<()> {
        let mut store = single_column_store();
        store.remove_block(Position(0, 0, 0));
        for y in 0..3 {
            store.add_block(Position(0, y, 0), BlockKind::Stone);
        }
        assert_eq!(store.get_top_height(0.0, 0.0), 2);

        store.remove_block(Position(0, 2, 0));
        assert_eq!(store.get_top_height(0.0, 0.0), 1);

        store.remove_block(Position(0, 1, 0));
        assert_eq!(store.get_top_height(0.0, 0.0), 0);
        assert_eq!(store.top_height(Column(0, 0)), Some(0));

        store.remove_block(Position(0, 0, 0));
        assert_eq!(store.get_top_height(0.0, 0.0), 0);
        assert_eq!(store.top_height(Column(0, 0)), None);

        store.world().verify()
    }

    #[test]
    fn unittest_store_rounds_to_nearest_column() {
        let mut store = single_column_store();
        store.add_block(Position(3, 5, -2), BlockKind::Sand);

        assert_eq!(store.get_top_height(2.6, -2.4), 5);
        assert_eq!(store.get_top_height(3.4, -1.6), 5);
        assert_eq!(store.get_top_height(3.5, -2.0), 0);
        assert_eq!(store.get_top_height(f32::NAN, 0.0), 0);
    }

    #[test]
    fn unittest_store_reset_replaces_world() {
        let mut store = WorldStore::new(WorldGenerator::new(GeneratorConfig::flat(1)).expect("valid config"));
        let generated = store.snapshot();

        store.add_block(Position(0, 10, 0), BlockKind::Wood);
        store.remove_block(Position(1, 2, 1));
        assert_ne!(*store.snapshot(), *generated);

        let reset = store.reset();
        assert_eq!(*reset, *generated);
        assert!(!Arc::ptr_eq(&reset, &generated));
    }

    #[test]
    fn unittest_store_random_edits_keep_invariant() -> eyre::Result<()> {
        let mut store = WorldStore::new(WorldGenerator::new(GeneratorConfig::default())?);
        let mut rng = StdRng::seed_from_u64(1234);

        for _ in 0..2000 {
            let pos = Position(
                rng.gen_range(-4..=4),
                rng.gen_range(-2..=10),
                rng.gen_range(-4..=4),
            );

            if rng.gen_bool(0.5) {
                store.add_block(pos, BlockKind::Stone);
            } else {
                store.remove_block(pos);
            }
        }

        store.world().verify()
    }
}
