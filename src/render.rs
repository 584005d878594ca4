use serde::Serialize;

use crate::world::block::BlockKind;
use crate::world::position::{Column, Position};
use crate::world::World;

// draw parameters for one occupied cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderBlock {
    pub key: String,
    // unit cube centre
    pub position: [f32; 3],
    pub kind: BlockKind,
    pub color: &'static str,
    pub emissive: Option<&'static str>,
    pub emissive_intensity: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub casts_shadow: bool,
    pub interactive: bool,
}

impl RenderBlock {
    pub fn new(pos: Position, kind: BlockKind) -> Self {
        let water = kind.is_water();

        Self {
            key: pos.key(),
            position: [
                pos.x() as f32 + 0.5,
                pos.y() as f32 + 0.5,
                pos.z() as f32 + 0.5,
            ],
            kind,
            color: kind.color(),
            emissive: water.then_some("#1c3b70"),
            emissive_intensity: if water { 0.6 } else { 0.0 },
            roughness: if water { 0.2 } else { 0.8 },
            metalness: if water { 0.2 } else { 0.05 },
            casts_shadow: !water,
            interactive: kind.is_interactive(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderFrame {
    pub blocks: Vec<RenderBlock>,
    pub spawn_height: i32,
}

pub fn render_frame(world: &World) -> RenderFrame {
    RenderFrame {
        blocks: world
            .iter_block()
            .map(|(pos, kind)| RenderBlock::new(pos, kind))
            .collect(),
        spawn_height: world.top_height(Column(0, 0)).unwrap_or(0),
    }
}
