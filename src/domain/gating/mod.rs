//! Gating domain module.
//!
//! The pure allow/deny decision for metered actions.

mod policy;
mod verdict;

pub use policy::GatingPolicy;
pub use verdict::{Remaining, Verdict};
