pub mod bracket;
pub mod state;

pub use bracket::*;
pub use state::*;
