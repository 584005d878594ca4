use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

// block kinds
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Grass,
    Dirt,
    Stone,
    Sand,
    Water,
    Wood,
    Leaf,
}

impl BlockKind {
    pub fn is_water(&self) -> bool {
        matches!(self, BlockKind::Water)
    }

    // water can be neither placed nor mined
    pub fn is_interactive(&self) -> bool {
        !self.is_water()
    }

    pub fn is_placeable(&self) -> bool {
        !self.is_water()
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Grass => "Grass",
            BlockKind::Dirt => "Dirt",
            BlockKind::Stone => "Stone",
            BlockKind::Sand => "Sand",
            BlockKind::Water => "Water",
            BlockKind::Wood => "Wood",
            BlockKind::Leaf => "Leaf",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            BlockKind::Grass => "#3e9945",
            BlockKind::Dirt => "#8a5a3b",
            BlockKind::Stone => "#8c8f96",
            BlockKind::Sand => "#e2d9a4",
            BlockKind::Water => "#3a74c4",
            BlockKind::Wood => "#553423",
            BlockKind::Leaf => "#2c7a3d",
        }
    }

    // single character used by the layer dump
    pub fn glyph(&self) -> char {
        match self {
            BlockKind::Grass => 'g',
            BlockKind::Dirt => 'd',
            BlockKind::Stone => 's',
            BlockKind::Sand => 'a',
            BlockKind::Water => 'w',
            BlockKind::Wood => 'o',
            BlockKind::Leaf => 'l',
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::BlockKind;

    #[test]
    fn unittest_block_kind_names() -> eyre::Result<()> {
        for kind in BlockKind::iter() {
            assert_eq!(BlockKind::from_str(kind.name())?, kind);
            assert_eq!(kind.to_string(), kind.name());
        }

        assert_eq!(BlockKind::from_str("Wood")?, BlockKind::Wood);
        assert!(BlockKind::from_str("lava").is_err());

        Ok(())
    }

    #[test]
    fn unittest_block_kind_water_is_not_placeable() {
        let placeable = BlockKind::iter()
            .filter(BlockKind::is_placeable)
            .collect::<Vec<_>>();

        assert_eq!(placeable.len(), 6);
        assert!(!placeable.contains(&BlockKind::Water));
    }
}
