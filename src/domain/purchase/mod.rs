//! Purchase domain module.
//!
//! Purchase and restore transactions and what they produce.

mod outcome;
mod transaction;

pub use outcome::{TransactionOutcome, TransactionReceipt};
pub use transaction::{Transaction, TransactionKind};
