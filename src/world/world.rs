use std::fmt::{self, Debug};

use itertools::Itertools;

use super::block::BlockKind;
use super::height::{BlockMap, HeightMap};
use super::position::{Column, Position};
use super::Verify;

/// One immutable state of the voxel world. Edits never touch a `World` in
/// place; they build the next one.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct World {
    blocks: BlockMap,
    heights: HeightMap,
}

impl World {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds a world from a finished block set, deriving the height map in
    /// one pass.
    pub fn from_blocks(blocks: BlockMap) -> Self {
        let heights = HeightMap::from_blocks(&blocks);
        Self { blocks, heights }
    }

    pub fn blocks(&self) -> &BlockMap {
        &self.blocks
    }

    pub fn heights(&self) -> &HeightMap {
        &self.heights
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, pos: Position) -> Option<BlockKind> {
        self.blocks.get(&pos).copied()
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.blocks.contains_key(&pos)
    }

    pub fn top_height(&self, column: Column) -> Option<i32> {
        self.heights.top(column)
    }

    pub fn iter_block(&self) -> impl Iterator<Item = (Position, BlockKind)> + '_ {
        self.blocks.iter().map(|(pos, kind)| (*pos, *kind))
    }

    pub fn count_kind(&self, kind: BlockKind) -> usize {
        self.blocks.values().filter(|k| **k == kind).count()
    }

    /// Next world with `kind` at `pos`, or `None` when `pos` is already taken.
    /// The first block written to a cell stays.
    pub fn add_block(&self, pos: Position, kind: BlockKind) -> Option<World> {
        if self.is_occupied(pos) {
            return None;
        }

        let mut next = self.clone();
        next.blocks.insert(pos, kind);
        next.heights.raise(pos.column(), pos.y());
        Some(next)
    }

    /// Next world without the block at `pos`, or `None` when `pos` is air.
    pub fn remove_block(&self, pos: Position) -> Option<World> {
        if !self.is_occupied(pos) {
            return None;
        }

        let mut next = self.clone();
        next.blocks.remove(&pos);
        next.heights.rescan(pos.column(), &next.blocks);
        Some(next)
    }

    // inclusive (min, max) corners of all blocks
    pub fn bounds(&self) -> Option<(Position, Position)> {
        let (min_x, max_x) = self.blocks.keys().map(Position::x).minmax().into_option()?;
        let (min_y, max_y) = self.blocks.keys().map(Position::y).minmax().into_option()?;
        let (min_z, max_z) = self.blocks.keys().map(Position::z).minmax().into_option()?;

        Some((
            Position(min_x, min_y, min_z),
            Position(max_x, max_y, max_z),
        ))
    }

    /// Top-down view: one character per column, the last digit of its top
    /// height, `.` for empty columns.
    pub fn height_view(&self) -> String {
        let Some((min, max)) = self.bounds() else {
            return String::new();
        };

        (min.z()..=max.z())
            .map(|z| {
                (min.x()..=max.x())
                    .map(|x| match self.top_height(Column(x, z)) {
                        Some(top) => char::from_digit(top.unsigned_abs() % 10, 10).unwrap_or('?'),
                        None => '.',
                    })
                    .collect::<String>()
            })
            .join("\n")
    }
}

impl Verify for World {
    fn verify(&self) -> eyre::Result<()> {
        self.heights.check_against(&self.blocks)
    }
}

impl Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((min, max)) = self.bounds() else {
            return writeln!(f, "<empty world>");
        };

        for height in (min.y()..=max.y()).rev() {
            writeln!(f, "h={height:?}")?;

            for z in min.z()..=max.z() {
                writeln!(
                    f,
                    "  {}",
                    (min.x()..=max.x())
                        .map(|x| self
                            .get(Position(x, height, z))
                            .map_or('.', |kind| kind.glyph()))
                        .collect::<String>()
                )?;
            }
        }

        Ok(())
    }
}
