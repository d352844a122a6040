//! Domain models for rare-disease pattern detection.

mod alert;
mod ledger;
mod patient;
mod signature;

pub use alert::*;
pub use ledger::*;
pub use patient::*;
pub use signature::*;
