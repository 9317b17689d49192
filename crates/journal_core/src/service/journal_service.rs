//! Journal use-case service.
//!
//! # Responsibility
//! - Create journals with their events, tracks and activity links.
//! - Update a journal as one aggregate: reconcile events and activity links
//!   against stored state and apply every resulting write atomically.
//! - Read, list and remove journals.
//! - Summarize a user's moods per month of a year.
//!
//! # Invariants
//! - An update either commits every write or none of them.
//! - After a committed update, event indices are `0..n-1` in submission order.
//! - Surviving events are always rewritten, even when unchanged.
//! - Inputs are validated before a transaction is opened.

use crate::model::catalog::UserId;
use crate::model::journal::{
    validate_summary_year, AddJournalTrackInput, CreateJournalInput, EventId, GetJournalsInput,
    Journal, JournalDetail, JournalId, JournalValidationError, TrackAssociation, TrackLinkId,
    UpdateJournalEventInput, UpdateJournalInput,
};
use crate::model::summary::YearlySummary;
use crate::reconcile::{reconcile_activities, reconcile_events};
use crate::repo::journal_repo::{JournalRepository, JournalScalarUpdate};
use crate::repo::write_set::JournalWriteSet;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type JournalResult<T> = Result<T, JournalServiceError>;

/// Coarse error class, stable across error variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalErrorKind {
    InvalidInput,
    NotFound,
    ReferentialViolation,
    Storage,
}

impl JournalErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::ReferentialViolation => "referential_violation",
            Self::Storage => "storage",
        }
    }
}

/// Service error for journal use-cases.
#[derive(Debug)]
pub enum JournalServiceError {
    /// Input rejected before any write.
    InvalidInput(JournalValidationError),
    /// Target journal does not exist or is not owned by the caller.
    JournalNotFound(JournalId),
    /// Submitted event id does not exist in the journal.
    EventNotFound(EventId),
    /// A write referenced a missing mood, category, activity, track or group.
    ReferentialViolation(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl JournalServiceError {
    pub fn kind(&self) -> JournalErrorKind {
        match self {
            Self::InvalidInput(_) => JournalErrorKind::InvalidInput,
            Self::JournalNotFound(_) | Self::EventNotFound(_) => JournalErrorKind::NotFound,
            Self::Repo(RepoError::RecordNotFound { .. }) => JournalErrorKind::NotFound,
            Self::ReferentialViolation(_) => JournalErrorKind::ReferentialViolation,
            Self::Repo(_) | Self::InconsistentState(_) => JournalErrorKind::Storage,
        }
    }
}

impl Display for JournalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::JournalNotFound(id) => write!(f, "can not find journal {id}"),
            Self::EventNotFound(id) => write!(f, "can not find event {id}"),
            Self::ReferentialViolation(message) => {
                write!(f, "referenced row does not exist: {message}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent journal state: {details}"),
        }
    }
}

impl Error for JournalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<JournalValidationError> for JournalServiceError {
    fn from(value: JournalValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<RepoError> for JournalServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::JournalNotFound(id) => Self::JournalNotFound(id),
            RepoError::EventNotFound(id) => Self::EventNotFound(id),
            RepoError::ReferentialViolation(message) => Self::ReferentialViolation(message),
            other => Self::Repo(other),
        }
    }
}

/// Journal service facade over repository implementations.
pub struct JournalService<R: JournalRepository> {
    repo: R,
}

impl<R: JournalRepository> JournalService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a journal owned by `owner` with its child rows.
    ///
    /// Events are indexed by their position in `input.events`.
    pub fn create_journal(
        &mut self,
        owner: UserId,
        input: &CreateJournalInput,
    ) -> JournalResult<JournalDetail> {
        input.validate()?;

        let journal_id = self.repo.write_transaction(|store| {
            let journal_id = store.insert_journal(owner, input)?;
            store.insert_track_links(journal_id, &input.tracks)?;

            // A new journal is a reconciliation against empty stored state.
            let activities = reconcile_activities(&[], &input.activities);
            store.insert_activity_links(journal_id, &activities.to_insert)?;

            let submitted: Vec<UpdateJournalEventInput> = input
                .events
                .iter()
                .map(|event| UpdateJournalEventInput {
                    id: None,
                    event_title: event.event_title.clone(),
                    event_body: event.event_body.clone(),
                    event_mood_id: event.event_mood_id,
                })
                .collect();
            let events = reconcile_events(&[], &submitted, journal_id, input.group_id);
            store.insert_events(&events.to_insert)?;

            Ok::<_, JournalServiceError>(journal_id)
        })?;

        info!(
            "event=journal_create module=service status=ok journal_id={} events={} activities={} tracks={}",
            journal_id,
            input.events.len(),
            input.activities.len(),
            input.tracks.len()
        );

        self.repo
            .get_journal(journal_id)?
            .ok_or(JournalServiceError::InconsistentState(
                "created journal not found in read-back",
            ))
    }

    /// Replaces a journal's scalar fields, events and activity links.
    ///
    /// Reads the stored events and links, reconciles them against `input`,
    /// then applies the resulting write set in one transaction. Any failure
    /// rolls back every write of the call.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank title or a repeated event id.
    /// - `JournalNotFound` when `input.id` does not exist.
    /// - `EventNotFound` when a submitted event id is not in the journal.
    /// - `ReferentialViolation` for unknown mood/category/activity/group ids.
    pub fn update_journal(&mut self, input: &UpdateJournalInput) -> JournalResult<()> {
        let started_at = Instant::now();
        input.validate()?;

        let result = self.repo.write_transaction(|store| {
            let stored_events = store.find_events(input.id)?;
            let stored_links = store.find_activity_links(input.id)?;

            let event_plan = reconcile_events(&stored_events, &input.events, input.id, input.group_id);
            let activity_plan = reconcile_activities(&stored_links, &input.activities);

            let write_set = JournalWriteSet::for_update(
                JournalScalarUpdate {
                    journal_id: input.id,
                    journal_title: input.journal_title.clone(),
                    journal_body: input.journal_body.clone(),
                    journal_date: input.journal_date,
                    mood_id: input.mood_id,
                    category_id: input.category_id,
                },
                event_plan,
                activity_plan,
            );
            write_set.apply(store)?;
            Ok::<_, JournalServiceError>(write_set.summary())
        });

        match result {
            Ok(summary) => {
                info!(
                    "event=journal_update module=service status=ok journal_id={} events_deleted={} events_inserted={} events_updated={} links_deleted={} links_inserted={} duration_ms={}",
                    input.id,
                    summary.events_deleted,
                    summary.events_inserted,
                    summary.events_updated,
                    summary.links_deleted,
                    summary.links_inserted,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=journal_update module=service status=error journal_id={} duration_ms={} error_code={} error={}",
                    input.id,
                    started_at.elapsed().as_millis(),
                    err.kind().as_str(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Gets one journal with its events, activity ids and tracks.
    pub fn get_journal(&self, journal_id: JournalId) -> JournalResult<Option<JournalDetail>> {
        Ok(self.repo.get_journal(journal_id)?)
    }

    /// Lists the owner's journals, newest `journal_date` first.
    pub fn list_journals(
        &self,
        owner: UserId,
        query: Option<&GetJournalsInput>,
    ) -> JournalResult<Vec<Journal>> {
        let default_query = GetJournalsInput::default();
        let query = query.unwrap_or(&default_query);
        Ok(self.repo.list_journals(owner, query)?)
    }

    /// Deletes the owner's journal along with its events and links.
    pub fn remove_journal(&self, owner: UserId, journal_id: JournalId) -> JournalResult<Journal> {
        let journal = self.repo.remove_journal(owner, journal_id)?;
        info!(
            "event=journal_remove module=service status=ok journal_id={}",
            journal_id
        );
        Ok(journal)
    }

    /// Records one track value on an existing journal.
    pub fn add_journal_track(
        &self,
        input: &AddJournalTrackInput,
    ) -> JournalResult<TrackAssociation> {
        Ok(self.repo.add_journal_track(input)?)
    }

    /// Removes one recorded track value.
    pub fn remove_journal_track(&self, link_id: TrackLinkId) -> JournalResult<TrackAssociation> {
        Ok(self.repo.remove_journal_track(link_id)?)
    }

    /// Mood breakdown of the owner's journals for each month of `year`, plus
    /// yearly journal and event totals.
    pub fn yearly_summary(&self, owner: UserId, year: i32) -> JournalResult<YearlySummary> {
        validate_summary_year(year)?;
        Ok(self.repo.yearly_summary(owner, year)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{JournalErrorKind, JournalServiceError};
    use crate::model::journal::JournalValidationError;
    use crate::repo::RepoError;

    #[test]
    fn repo_errors_map_to_semantic_variants() {
        let err = JournalServiceError::from(RepoError::EventNotFound(9));
        assert!(matches!(err, JournalServiceError::EventNotFound(9)));
        assert_eq!(err.kind(), JournalErrorKind::NotFound);

        let err = JournalServiceError::from(RepoError::ReferentialViolation("fk".to_string()));
        assert_eq!(err.kind(), JournalErrorKind::ReferentialViolation);

        let err = JournalServiceError::from(RepoError::InvalidData("bad".to_string()));
        assert_eq!(err.kind(), JournalErrorKind::Storage);
    }

    #[test]
    fn validation_errors_are_invalid_input() {
        let err = JournalServiceError::from(JournalValidationError::BlankTitle);
        assert_eq!(err.kind(), JournalErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "journal title must not be blank");
    }
}
