//! Usage domain module.
//!
//! Daily consumption of metered actions.
//!
//! # Module Structure
//!
//! - `action` - MeteredAction enum
//! - `counters` - UsageCounters per-day record

mod action;
mod counters;

pub use action::MeteredAction;
pub use counters::UsageCounters;
