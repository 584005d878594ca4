use std::collections::BTreeSet;

use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};

use crate::world::WorldStore;

pub const MOVEMENT_SPEED: f32 = 6.0;
pub const SPRINT_MULTIPLIER: f32 = 1.6;
pub const JUMP_VELOCITY: f32 = 7.0;
pub const GRAVITY: f32 = 18.0;
pub const PLAYER_HEIGHT: f32 = 1.8;

// held movement keys
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Intent {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
    Sprint,
}

#[derive(Debug, Default, Clone)]
pub struct InputState {
    held: BTreeSet<Intent>,
}

impl InputState {
    pub fn press(&mut self, intent: Intent) {
        self.held.insert(intent);
    }

    pub fn release(&mut self, intent: Intent) {
        self.held.remove(&intent);
    }

    pub fn is_held(&self, intent: Intent) -> bool {
        self.held.contains(&intent)
    }

    fn axis(&self, positive: Intent, negative: Intent) -> f32 {
        f32::from(u8::from(self.is_held(positive))) - f32::from(u8::from(self.is_held(negative)))
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// First-person camera rig. Horizontal motion is free; the only collision is
/// the ground under the camera, taken from the store's height cache.
#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec3,
    pub velocity_y: f32,
    // radians around the y axis
    pub yaw: f32,
    pub grounded: bool,
}

impl Player {
    pub fn spawn(store: &WorldStore) -> Self {
        let top = store.get_top_height(0.0, 0.0) as f32;

        Self {
            position: Vec3::new(0.0, top + PLAYER_HEIGHT + 2.0, 0.0),
            velocity_y: 0.0,
            yaw: 0.0,
            grounded: false,
        }
    }

    pub fn look(&mut self, yaw: f32) {
        if yaw.is_finite() {
            self.yaw = yaw;
        }
    }

    // ground the camera rests on over the current column
    pub fn ground_level(&self, store: &WorldStore) -> f32 {
        store.get_top_height(self.position.x, self.position.z) as f32 + 1.0 + PLAYER_HEIGHT * 0.5
    }

    pub fn tick(&mut self, input: &InputState, store: &WorldStore, delta: f32) {
        if !(delta.is_finite() && delta > 0.0) {
            return;
        }

        let front = input.axis(Intent::Backward, Intent::Forward);
        let side = input.axis(Intent::Left, Intent::Right);
        let length = (front * front + side * side).sqrt();

        if length > 0.0 {
            let speed = if input.is_held(Intent::Sprint) {
                SPRINT_MULTIPLIER * MOVEMENT_SPEED
            } else {
                MOVEMENT_SPEED
            };
            let step = speed * delta / length;
            let (dx, dz) = (side * step, front * step);
            let (sin, cos) = self.yaw.sin_cos();

            self.position.x += dx * cos + dz * sin;
            self.position.z += dz * cos - dx * sin;
        }

        let ground = self.ground_level(store);

        self.velocity_y -= GRAVITY * delta;
        let next_y = self.position.y + self.velocity_y * delta;

        if next_y <= ground {
            self.velocity_y = 0.0;
            self.position.y = ground;
            self.grounded = true;

            if input.is_held(Intent::Jump) {
                self.velocity_y = JUMP_VELOCITY;
                tracing::trace!("jump at {:?}", self.position);
            }
        } else {
            self.position.y = next_y;
            self.grounded = false;
        }
    }
}
