//! Core data-access logic for the journaling service.
//! This crate owns journal aggregate invariants and their SQLite persistence.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, open_db_with_config, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::catalog::{Activity, Category, Mood, Track, TrackDisplayType};
pub use model::journal::{
    CreateJournalInput, GetJournalsInput, Journal, JournalDetail, JournalEvent,
    JournalValidationError, UpdateJournalEventInput, UpdateJournalInput,
};
pub use model::summary::{MonthlyMoodData, MoodCount, YearlyCounter, YearlySummary};
pub use reconcile::{reconcile_activities, reconcile_events, ActivityPlan, EventPlan};
pub use repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
pub use repo::journal_repo::{JournalRepository, JournalStore, SqliteJournalRepository};
pub use repo::{RepoError, RepoResult};
pub use service::catalog_service::{CatalogService, CatalogServiceError};
pub use service::journal_service::{
    JournalErrorKind, JournalResult, JournalService, JournalServiceError,
};
pub use service::response::MutationResponse;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
