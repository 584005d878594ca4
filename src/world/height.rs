use std::collections::BTreeMap;

use super::block::BlockKind;
use super::position::{Column, Position};

pub type BlockMap = BTreeMap<Position, BlockKind>;

/// Cached top of every non-empty column. A column without an entry is empty;
/// there is no stored sentinel, so a real top at `y = 0` stays distinguishable.
#[derive(Debug, Default, Clone, PartialEq, Eq, derive_more::Deref)]
pub struct HeightMap {
    #[deref]
    heights: BTreeMap<Column, i32>,
}

impl HeightMap {
    pub fn from_blocks(blocks: &BlockMap) -> Self {
        let mut heights = BTreeMap::new();

        for pos in blocks.keys() {
            heights
                .entry(pos.column())
                .and_modify(|top: &mut i32| *top = (*top).max(pos.y()))
                .or_insert(pos.y());
        }

        Self { heights }
    }

    pub fn top(&self, column: Column) -> Option<i32> {
        self.heights.get(&column).copied()
    }

    // adding can only raise a column
    pub fn raise(&mut self, column: Column, y: i32) {
        self.heights
            .entry(column)
            .and_modify(|top| *top = (*top).max(y))
            .or_insert(y);
    }

    // removal can lower a column by any amount, so look at what is left
    pub fn rescan(&mut self, column: Column, blocks: &BlockMap) {
        match column_top(column, blocks) {
            Some(top) => {
                self.heights.insert(column, top);
            }
            None => {
                self.heights.remove(&column);
            }
        }
    }

    /// Checks the cache against the blocks it was derived from and reports the
    /// first disagreement.
    pub fn check_against(&self, blocks: &BlockMap) -> eyre::Result<()> {
        for (&column, &top) in &self.heights {
            eyre::ensure!(
                blocks.contains_key(&column.at(top)),
                "column {column} claims top {top} but that cell is air"
            );

            let actual = column_top(column, blocks);
            eyre::ensure!(
                actual == Some(top),
                "column {column} caches top {top} but the highest block is at {actual:?}"
            );
        }

        for pos in blocks.keys() {
            eyre::ensure!(
                self.heights.contains_key(&pos.column()),
                "block at {pos} has no height entry for column {}",
                pos.column()
            );
        }

        Ok(())
    }
}

fn column_top(column: Column, blocks: &BlockMap) -> Option<i32> {
    let lo = Position(column.x(), i32::MIN, i32::MIN);
    let hi = Position(column.x(), i32::MAX, i32::MAX);

    blocks
        .range(lo..=hi)
        .filter(|(pos, _)| pos.z() == column.z())
        .map(|(pos, _)| pos.y())
        .max()
}
