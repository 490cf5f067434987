pub mod club;
pub mod player;
pub mod tactics;

pub use club::*;
pub use player::*;
pub use tactics::*;
