pub mod bids;
pub mod juniors;
pub mod ledger;
pub mod market;
pub mod training;
pub mod valuation;
pub mod weekly;

pub use bids::*;
pub use juniors::*;
pub use ledger::*;
pub use market::*;
pub use training::*;
pub use valuation::*;
pub use weekly::*;
