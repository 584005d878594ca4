pub mod hud;
pub mod player;
pub mod render;
pub mod session;
pub mod world;
