use std::path::Path;

use eyre::WrapErr;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::block::BlockKind;
use super::height::BlockMap;
use super::position::{Column, Position};
use super::world::World;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    // columns span [-radius, radius] on x and z
    pub radius: i32,
    pub base_height: i32,
    // surface offsets lie in 0..=amplitude
    pub amplitude: i32,
    pub lattice_spacing: i32,
    pub dirt_depth: i32,
    // columns with a surface below this get sand and water on top
    pub water_level: Option<i32>,
    pub tree_count: usize,
    pub trunk_height: i32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            radius: 12,
            base_height: 2,
            amplitude: 3,
            lattice_spacing: 6,
            dirt_depth: 2,
            water_level: Some(3),
            tree_count: 4,
            trunk_height: 3,
        }
    }
}

impl GeneratorConfig {
    pub fn flat(radius: i32) -> Self {
        Self {
            radius,
            amplitude: 0,
            water_level: None,
            tree_count: 0,
            ..Default::default()
        }
    }

    // one grass block at the origin
    pub fn single_column() -> Self {
        Self {
            radius: 0,
            base_height: 0,
            amplitude: 0,
            dirt_depth: 0,
            water_level: None,
            tree_count: 0,
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> eyre::Result<Self> {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot read generator config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .wrap_err_with(|| format!("malformed generator config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        eyre::ensure!(self.radius >= 0, "radius must not be negative");
        eyre::ensure!(self.radius <= 256, "radius {} is too large", self.radius);
        eyre::ensure!(self.base_height >= 0, "base height must not be negative");
        eyre::ensure!(self.amplitude >= 0, "amplitude must not be negative");
        eyre::ensure!(self.lattice_spacing > 0, "lattice spacing must be positive");
        eyre::ensure!(self.dirt_depth >= 0, "dirt depth must not be negative");
        eyre::ensure!(self.trunk_height > 0, "trunk height must be positive");
        eyre::ensure!(
            self.base_height
                .checked_add(self.amplitude)
                .and_then(|top| top.checked_add(self.trunk_height))
                .and_then(|top| top.checked_add(2))
                .map_or(false, |top| top <= 1024),
            "terrain is too tall"
        );
        Ok(())
    }
}

/// Builds the initial world. The result depends only on the config, seed
/// included; the config is checked once on construction.
#[derive(Debug, Clone, Default)]
pub struct WorldGenerator {
    config: GeneratorConfig,
}

impl WorldGenerator {
    pub fn new(config: GeneratorConfig) -> eyre::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(&self) -> World {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let surface = self.surface_heights(&mut rng);
        let mut blocks = BlockMap::new();

        for (&column, &top) in surface.iter() {
            self.fill_column(&mut blocks, column, top);
        }

        self.plant_trees(&mut blocks, &surface, &mut rng);

        let world = World::from_blocks(blocks);

        tracing::info!(
            "generated world: seed={} radius={} blocks={} columns={}",
            self.config.seed,
            self.config.radius,
            world.len(),
            world.heights().len()
        );

        world
    }

    fn columns(&self) -> impl Iterator<Item = Column> {
        let r = self.config.radius;
        (-r..=r).cartesian_product(-r..=r).map(|(x, z)| Column(x, z))
    }

    // coarse random lattice, bilinearly interpolated
    fn surface_heights(&self, rng: &mut StdRng) -> std::collections::BTreeMap<Column, i32> {
        let cfg = &self.config;
        let spacing = cfg.lattice_spacing;
        let cells = (2 * cfg.radius) / spacing + 2;

        let lattice = (0..cells)
            .map(|_| {
                (0..cells)
                    .map(|_| rng.gen_range(0..=cfg.amplitude))
                    .collect_vec()
            })
            .collect_vec();

        self.columns()
            .map(|column| {
                let lx = column.x() + cfg.radius;
                let lz = column.z() + cfg.radius;
                let (ix, iz) = ((lx / spacing) as usize, (lz / spacing) as usize);
                let fx = f64::from(lx % spacing) / f64::from(spacing);
                let fz = f64::from(lz % spacing) / f64::from(spacing);

                let at = |x: usize, z: usize| f64::from(lattice[z][x]);
                let near = at(ix, iz) * (1.0 - fx) + at(ix + 1, iz) * fx;
                let far = at(ix, iz + 1) * (1.0 - fx) + at(ix + 1, iz + 1) * fx;
                let offset = (near * (1.0 - fz) + far * fz).round() as i32;

                (column, cfg.base_height + offset)
            })
            .collect()
    }

    fn fill_column(&self, blocks: &mut BlockMap, column: Column, top: i32) {
        let flooded = self.config.water_level.filter(|level| top < *level);

        // y = 0 stays stone under any surface above it
        for y in 0..=top {
            let kind = if y == top {
                if flooded.is_some() {
                    BlockKind::Sand
                } else {
                    BlockKind::Grass
                }
            } else if y > 0 && y >= top - self.config.dirt_depth {
                BlockKind::Dirt
            } else {
                BlockKind::Stone
            };

            place(blocks, column.at(y), kind);
        }

        if let Some(level) = flooded {
            for y in top + 1..=level {
                place(blocks, column.at(y), BlockKind::Water);
            }
        }
    }

    fn plant_trees(
        &self,
        blocks: &mut BlockMap,
        surface: &std::collections::BTreeMap<Column, i32>,
        rng: &mut StdRng,
    ) {
        let trunk_height = self.config.trunk_height;
        let r = self.config.radius;

        // keep the spawn column and the patch border clear
        let candidates = surface
            .iter()
            .filter(|(column, _)| {
                column.x().abs() < r && column.z().abs() < r && **column != Column(0, 0)
            })
            .filter(|(column, top)| {
                matches!(blocks.get(&column.at(**top)), Some(BlockKind::Grass))
            })
            .map(|(column, top)| (*column, *top))
            .collect_vec();

        let mut planted: Vec<Column> = Vec::new();

        for (column, top) in candidates
            .into_iter()
            .choose_multiple(rng, self.config.tree_count * 2)
        {
            if planted.len() >= self.config.tree_count {
                break;
            }

            // canopies must not touch
            if planted
                .iter()
                .any(|other| (other.x() - column.x()).abs() < 3 && (other.z() - column.z()).abs() < 3)
            {
                continue;
            }

            let trunk_top = top + trunk_height;
            for y in top + 1..=trunk_top {
                place(blocks, column.at(y), BlockKind::Wood);
            }

            let crown = column.at(trunk_top);
            for around in crown
                .forwards()
                .into_iter()
                .filter(|pos| Some(*pos) != crown.down())
                .chain(crown.up().and_then(|p| p.up()))
            {
                place(blocks, around, BlockKind::Leaf);
            }

            planted.push(column);
        }

        tracing::debug!("planted {} trees", planted.len());
    }
}

// first write wins
fn place(blocks: &mut BlockMap, pos: Position, kind: BlockKind) {
    blocks.entry(pos).or_insert(kind);
}
