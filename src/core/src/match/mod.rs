pub mod engine;
pub mod events;
pub mod lineup;
pub mod ratings;
pub mod referee;
pub mod result;

pub use engine::*;
pub use events::*;
pub use lineup::*;
pub use ratings::*;
pub use referee::*;
pub use result::*;
