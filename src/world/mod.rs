pub mod block;
pub mod generator;
pub mod height;
pub mod position;
pub mod store;
#[allow(clippy::module_inception)]
pub mod world;

pub use store::WorldStore;
pub use world::World;

pub trait Verify {
    fn verify(&self) -> eyre::Result<()>;
}
