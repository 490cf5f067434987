pub mod rng;
pub mod slug;

pub use rng::*;
pub use slug::*;
