//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Validate inputs before any write.
//! - Keep outer API layers decoupled from storage details.

pub mod catalog_service;
pub mod journal_service;
pub mod response;
