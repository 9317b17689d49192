//! Mutation result envelope for outer API layers.
//!
//! Maps service results to `{ code, success, message, data }`.
//! Codes: 200 ok, 400 invalid input or referential violation, 404 not found,
//! 500 storage failure.

use crate::service::catalog_service::CatalogServiceError;
use crate::service::journal_service::{JournalErrorKind, JournalServiceError};
use serde::Serialize;
use std::fmt::Display;

/// Errors that carry a response status code.
pub trait ResponseStatus: Display {
    fn status_code(&self) -> u16;
}

impl ResponseStatus for JournalServiceError {
    fn status_code(&self) -> u16 {
        match self.kind() {
            JournalErrorKind::InvalidInput | JournalErrorKind::ReferentialViolation => 400,
            JournalErrorKind::NotFound => 404,
            JournalErrorKind::Storage => 500,
        }
    }
}

impl ResponseStatus for CatalogServiceError {
    fn status_code(&self) -> u16 {
        match self {
            Self::BlankName(_) | Self::ReferentialViolation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Repo(_) => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationResponse<T> {
    pub code: u16,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> MutationResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            code: 200,
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn from_error<E: ResponseStatus>(err: &E) -> Self {
        Self {
            code: err.status_code(),
            success: false,
            message: err.to_string(),
            data: None,
        }
    }

    /// Wraps a service result. `message` is used on success only.
    pub fn from_result<E: ResponseStatus>(result: Result<T, E>, message: &str) -> Self {
        match result {
            Ok(data) => Self::ok(message, data),
            Err(err) => Self::from_error(&err),
        }
    }
}

impl MutationResponse<()> {
    /// Wraps a result that carries no payload.
    pub fn status_only<E: ResponseStatus>(result: Result<(), E>, message: &str) -> Self {
        match result {
            Ok(()) => Self {
                code: 200,
                success: true,
                message: message.to_string(),
                data: None,
            },
            Err(err) => Self::from_error(&err),
        }
    }
}
