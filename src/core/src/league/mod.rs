pub mod league;
pub mod schedule;
pub mod table;

pub use league::*;
pub use schedule::*;
pub use table::*;
