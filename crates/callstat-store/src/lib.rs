//! Checkpoint stores for callstat
//!
//! This crate provides the two bundled `CheckpointStore` implementations:
//! an in-memory store for tests and one-shot runs, and a JSON file store
//! for cron deployments.

pub mod file;
pub mod memory;

pub use file::FileCheckpointStore;
pub use memory::MemoryCheckpointStore;
