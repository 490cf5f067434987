pub mod career;
pub mod context;
pub mod contract;
pub mod details;
pub mod error;
pub mod flags;
pub mod service;

pub use career::*;
pub use context::*;
pub use contract::*;
pub use error::*;
pub use flags::*;
pub use service::*;
