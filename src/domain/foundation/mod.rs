//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the gating engine.

mod day_key;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use day_key::DayKey;
pub use errors::{ErrorCode, QuotaError, ValidationError};
pub use ids::TransactionId;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
