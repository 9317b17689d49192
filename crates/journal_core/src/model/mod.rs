//! Domain model for journals and the catalog entities they reference.
//!
//! # Responsibility
//! - Define plain snapshot values read from and written to storage.
//! - Define client input shapes for journal create/update use-cases.
//!
//! # Invariants
//! - Model values never hold live references into storage.
//! - Event indices within one journal are `0..n-1` in submission order.

pub mod catalog;
pub mod journal;
pub mod summary;
