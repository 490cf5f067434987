pub mod game;
pub mod history;
pub mod mail;

pub use game::*;
pub use history::*;
pub use mail::*;
