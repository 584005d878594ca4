use std::fmt;
use std::str::FromStr;

use eyre::WrapErr;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

// faces of a block, y is up
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bottom,
    Top,
    // +x
    East,
    // -x
    West,
    // +z
    South,
    // -z
    North,
}

impl Direction {
    pub fn inverse(&self) -> Self {
        match self {
            Direction::Bottom => Direction::Top,
            Direction::Top => Direction::Bottom,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::South => Direction::North,
            Direction::North => Direction::South,
        }
    }

    pub fn offset(&self) -> (i32, i32, i32) {
        match self {
            Direction::Bottom => (0, -1, 0),
            Direction::Top => (0, 1, 0),
            Direction::East => (1, 0, 0),
            Direction::West => (-1, 0, 0),
            Direction::South => (0, 0, 1),
            Direction::North => (0, 0, -1),
        }
    }

    /// Picks the face a pointer hit from the raw face normal reported by the
    /// renderer. Every component is rounded to the grid and exactly one of them
    /// must survive as a unit step.
    pub fn from_normal(x: f32, y: f32, z: f32) -> eyre::Result<Direction> {
        let step = (round_to_grid(x)?, round_to_grid(y)?, round_to_grid(z)?);

        Ok(match step {
            (0, -1, 0) => Direction::Bottom,
            (0, 1, 0) => Direction::Top,
            (1, 0, 0) => Direction::East,
            (-1, 0, 0) => Direction::West,
            (0, 0, 1) => Direction::South,
            (0, 0, -1) => Direction::North,
            _ => eyre::bail!("face normal ({x}, {y}, {z}) is not axis aligned"),
        })
    }
}

/// Rounds a continuous coordinate to its grid cell, half up, the way the
/// camera and pointer layers address cells. Non-finite values and values
/// outside the `i32` range are rejected instead of clamped.
pub fn round_to_grid(value: f32) -> eyre::Result<i32> {
    eyre::ensure!(value.is_finite(), "invalid coordinate: {value} is not finite");

    let rounded = (f64::from(value) + 0.5).floor();

    eyre::ensure!(
        rounded >= f64::from(i32::MIN) && rounded <= f64::from(i32::MAX),
        "invalid coordinate: {value} is out of the world range"
    );

    Ok(rounded as i32)
}

// position (x, y, z)
#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position(pub i32, pub i32, pub i32);

impl Position {
    pub fn from_f32(x: f32, y: f32, z: f32) -> eyre::Result<Position> {
        Ok(Position(
            round_to_grid(x)?,
            round_to_grid(y)?,
            round_to_grid(z)?,
        ))
    }

    pub fn x(&self) -> i32 {
        self.0
    }

    pub fn y(&self) -> i32 {
        self.1
    }

    pub fn z(&self) -> i32 {
        self.2
    }

    pub fn column(&self) -> Column {
        Column(self.0, self.2)
    }

    /// Canonical block key, `"x,y,z"`.
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn from_key(key: &str) -> eyre::Result<Position> {
        key.parse()
    }

    pub fn up(&self) -> Option<Position> {
        self.walk(Direction::Top)
    }

    pub fn down(&self) -> Option<Position> {
        self.walk(Direction::Bottom)
    }

    // None when the step leaves the i32 range
    pub fn walk(&self, dir: Direction) -> Option<Position> {
        let (dx, dy, dz) = dir.offset();

        Some(Position(
            self.0.checked_add(dx)?,
            self.1.checked_add(dy)?,
            self.2.checked_add(dz)?,
        ))
    }

    pub fn forwards(&self) -> Vec<Position> {
        [
            Direction::Bottom,
            Direction::Top,
            Direction::East,
            Direction::West,
            Direction::South,
            Direction::North,
        ]
        .into_iter()
        .filter_map(|dir| self.walk(dir))
        .collect()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.0, self.1, self.2)
    }
}

impl FromStr for Position {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((x, y, z)) = s.split(',').collect_tuple() else {
            eyre::bail!("block key {s:?} must have exactly three components");
        };

        Ok(Position(
            parse_component(x, s)?,
            parse_component(y, s)?,
            parse_component(z, s)?,
        ))
    }
}

// column (x, z)
#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Column(pub i32, pub i32);

impl Column {
    pub fn from_f32(x: f32, z: f32) -> eyre::Result<Column> {
        Ok(Column(round_to_grid(x)?, round_to_grid(z)?))
    }

    pub fn x(&self) -> i32 {
        self.0
    }

    pub fn z(&self) -> i32 {
        self.1
    }

    pub fn at(&self, y: i32) -> Position {
        Position(self.0, y, self.1)
    }

    /// Canonical column key, `"x|z"`.
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn from_key(key: &str) -> eyre::Result<Column> {
        key.parse()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.0, self.1)
    }
}

impl FromStr for Column {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((x, z)) = s.split('|').collect_tuple() else {
            eyre::bail!("column key {s:?} must have exactly two components");
        };

        Ok(Column(parse_component(x, s)?, parse_component(z, s)?))
    }
}

// accepts plain base-10 only, so every value has exactly one key
fn parse_component(component: &str, key: &str) -> eyre::Result<i32> {
    let digits = component.strip_prefix('-').unwrap_or(component);

    eyre::ensure!(
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        "malformed component {component:?} in key {key:?}"
    );
    eyre::ensure!(
        digits == "0" || !digits.starts_with('0'),
        "non-canonical component {component:?} in key {key:?}"
    );
    eyre::ensure!(component != "-0", "non-canonical component {component:?} in key {key:?}");

    component
        .parse::<i32>()
        .wrap_err_with(|| format!("component {component:?} in key {key:?} is out of range"))
}
