//! Snapshot provider for callstat
//!
//! This crate implements the metrics source trait over per-day JSON
//! snapshots of a telephony account, for dry runs and replay.

pub mod data_loader;

pub use data_loader::{DataLoader, DaySnapshot};
