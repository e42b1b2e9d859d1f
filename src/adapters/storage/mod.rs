//! Storage Adapters
//!
//! Implementations of the DurableStore port.
//!
//! ## Available Adapters
//!
//! - **FileDurableStore** - One file per key on disk
//! - **InMemoryDurableStore** - Shared in-memory map (testing/development)

mod file_durable_store;
mod in_memory_durable_store;

pub use file_durable_store::FileDurableStore;
pub use in_memory_durable_store::InMemoryDurableStore;
