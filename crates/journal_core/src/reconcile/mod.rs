//! Desired-state reconciliation for journal child collections.
//!
//! # Responsibility
//! - Diff stored child rows against a client-submitted total state.
//! - Produce plain plans; applying them is the caller's job.
//!
//! # Invariants
//! - Functions here are pure: no storage access, no logging, no clock.
//! - Plans never contain the same row in two sets.

pub mod activities;
pub mod events;

pub use activities::{reconcile_activities, ActivityPlan};
pub use events::{reconcile_events, EventPlan, EventUpdate, NewEvent};
