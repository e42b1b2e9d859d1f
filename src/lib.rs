//! Recipe Gate - Usage quota and entitlement gating engine
//!
//! Decides whether a metered action (recipe view, search, AI recipe
//! generation) may run, counts daily consumption, and reconciles that with a
//! subscription entitlement that may be stale, offline or mid-purchase.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
