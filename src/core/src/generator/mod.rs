pub mod names;
pub mod world;

pub use names::*;
pub use world::*;
