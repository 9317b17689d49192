//! Journal aggregate model.
//!
//! # Responsibility
//! - Define the journal root, its ordered events and its association rows.
//! - Define the total desired-state inputs used by create/update use-cases.
//! - Validate inputs before any storage write happens.
//!
//! # Invariants
//! - `JournalEvent::event_index` is zero-based and contiguous within one journal.
//! - Update inputs describe the entire child state, never a delta.

use crate::model::catalog::{ActivityId, CategoryId, GroupId, MoodId, TrackId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type JournalId = i64;
pub type EventId = i64;
pub type ActivityLinkId = i64;
pub type TrackLinkId = i64;

/// Visibility of a journal. New journals are always `GroupOnly`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalStatus {
    #[default]
    GroupOnly,
    Private,
    Public,
}

impl JournalStatus {
    pub(crate) fn as_db(self) -> &'static str {
        match self {
            Self::GroupOnly => "group_only",
            Self::Private => "private",
            Self::Public => "public",
        }
    }

    pub(crate) fn from_db(value: &str) -> Option<Self> {
        match value {
            "group_only" => Some(Self::GroupOnly),
            "private" => Some(Self::Private),
            "public" => Some(Self::Public),
            _ => None,
        }
    }
}

/// Journal root row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Journal {
    pub id: JournalId,
    pub journal_title: String,
    pub journal_body: Option<String>,
    /// Epoch milliseconds.
    pub journal_date: i64,
    pub journal_status: JournalStatus,
    pub mood_id: Option<MoodId>,
    pub category_id: Option<CategoryId>,
    pub user_id: UserId,
    pub group_id: GroupId,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Persisted event row owned by one journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEvent {
    pub id: EventId,
    pub journal_id: JournalId,
    pub event_title: String,
    pub event_body: String,
    /// Zero-based position within the journal.
    pub event_index: i64,
    pub mood_id: Option<MoodId>,
    pub group_id: GroupId,
}

/// Journal <-> activity join row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityAssociation {
    pub id: ActivityLinkId,
    pub journal_id: JournalId,
    pub activity_id: ActivityId,
}

/// Journal <-> track join row carrying the recorded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackAssociation {
    pub id: TrackLinkId,
    pub journal_id: JournalId,
    pub track_id: TrackId,
    pub track_value: i64,
    pub track_goal: Option<i64>,
}

/// Journal with its owned and associated rows, as returned by reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalDetail {
    pub journal: Journal,
    /// Ordered by `event_index ASC`.
    pub events: Vec<JournalEvent>,
    /// Ordered by activity id.
    pub activity_ids: Vec<ActivityId>,
    pub tracks: Vec<TrackAssociation>,
}

/// One event of an update submission. `id = None` means "create".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJournalEventInput {
    #[serde(default)]
    pub id: Option<EventId>,
    pub event_title: String,
    pub event_body: String,
    #[serde(default)]
    pub event_mood_id: Option<MoodId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJournalEventInput {
    pub event_title: String,
    pub event_body: String,
    #[serde(default)]
    pub event_mood_id: Option<MoodId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalTrackInput {
    pub track_id: TrackId,
    #[serde(default)]
    pub track_goal: Option<i64>,
    pub track_value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddJournalTrackInput {
    pub journal_id: JournalId,
    pub track_id: TrackId,
    #[serde(default)]
    pub track_goal: Option<i64>,
    pub track_value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJournalInput {
    pub journal_title: String,
    pub journal_date: i64,
    #[serde(default)]
    pub journal_body: Option<String>,
    #[serde(default)]
    pub mood_id: Option<MoodId>,
    pub group_id: GroupId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub tracks: Vec<JournalTrackInput>,
    #[serde(default)]
    pub activities: Vec<ActivityId>,
    #[serde(default)]
    pub events: Vec<CreateJournalEventInput>,
}

/// Full desired state of one journal.
///
/// `activities` and `events` replace the stored collections entirely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJournalInput {
    pub id: JournalId,
    #[serde(default)]
    pub mood_id: Option<MoodId>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub activities: Vec<ActivityId>,
    pub events: Vec<UpdateJournalEventInput>,
    pub journal_title: String,
    pub journal_date: i64,
    pub journal_body: String,
    pub group_id: GroupId,
}

/// Filters for journal listing. All filters are optional and combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetJournalsInput {
    /// Inclusive lower bound, epoch ms. Applied only with `end_date`.
    pub start_date: Option<i64>,
    /// Inclusive upper bound, epoch ms. Applied only with `start_date`.
    pub end_date: Option<i64>,
    pub category_id: Option<CategoryId>,
    pub mood_id: Option<MoodId>,
    /// Matches journals linked to any of these activities.
    pub activity_ids: Vec<ActivityId>,
}

/// Input rejected before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalValidationError {
    /// `journal_title` is blank after trim.
    BlankTitle,
    /// The same event id appears more than once in one submission.
    DuplicateEventId(EventId),
    /// Summary year outside `1..=9999`.
    YearOutOfRange(i32),
}

impl Display for JournalValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "journal title must not be blank"),
            Self::DuplicateEventId(id) => write!(f, "event {id} submitted more than once"),
            Self::YearOutOfRange(year) => write!(f, "year {year} is outside 1..=9999"),
        }
    }
}

impl Error for JournalValidationError {}

impl CreateJournalInput {
    pub fn validate(&self) -> Result<(), JournalValidationError> {
        ensure_title(&self.journal_title)
    }
}

impl UpdateJournalInput {
    /// Checks the submission is a well-formed total state.
    ///
    /// Unknown event ids are not checked here; the per-row update reports them.
    pub fn validate(&self) -> Result<(), JournalValidationError> {
        ensure_title(&self.journal_title)?;

        let mut seen = HashSet::new();
        for id in self.events.iter().filter_map(|event| event.id) {
            if !seen.insert(id) {
                return Err(JournalValidationError::DuplicateEventId(id));
            }
        }
        Ok(())
    }
}

/// Checks a summary year is one SQLite date functions can represent.
pub fn validate_summary_year(year: i32) -> Result<(), JournalValidationError> {
    if !(1..=9999).contains(&year) {
        return Err(JournalValidationError::YearOutOfRange(year));
    }
    Ok(())
}

fn ensure_title(title: &str) -> Result<(), JournalValidationError> {
    if title.trim().is_empty() {
        return Err(JournalValidationError::BlankTitle);
    }
    Ok(())
}
