pub mod club;
pub mod cup;
pub mod economy;
pub mod error;
pub mod generator;
pub mod league;
pub mod r#match;
pub mod season;
pub mod state;
pub mod stats;
pub mod utils;

pub use club::*;
pub use error::*;
pub use league::*;
pub use state::*;
pub use utils::*;
