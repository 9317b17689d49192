//! Event list reconciliation.
//!
//! Every submitted event is renumbered to its submission position and every
//! surviving event is rewritten, even when nothing changed. Callers rely on the
//! renumbering always happening.

use crate::model::catalog::{GroupId, MoodId};
use crate::model::journal::{EventId, JournalEvent, JournalId, UpdateJournalEventInput};
use std::collections::HashSet;

/// Field values written to one surviving event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventUpdate {
    pub id: EventId,
    pub event_title: String,
    pub event_body: String,
    pub event_index: i64,
    pub mood_id: Option<MoodId>,
}

/// Event row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub journal_id: JournalId,
    pub group_id: GroupId,
    pub event_title: String,
    pub event_body: String,
    pub event_index: i64,
    pub mood_id: Option<MoodId>,
}

/// Writes needed to turn the stored event list into the submitted one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPlan {
    /// Stored events no longer submitted, in stored order.
    pub to_delete: Vec<JournalEvent>,
    /// Submitted events carrying an id, in submission order.
    pub to_update: Vec<EventUpdate>,
    /// Submitted events without an id, in submission order.
    pub to_insert: Vec<NewEvent>,
}

impl EventPlan {
    /// Ids of `to_delete`, for batch deletion.
    pub fn delete_ids(&self) -> Vec<EventId> {
        self.to_delete.iter().map(|event| event.id).collect()
    }
}

/// Diffs `stored` against the full `submitted` list of one journal.
///
/// A submitted id that matches no stored row still lands in `to_update`; the
/// storage update for that row is what reports it missing.
pub fn reconcile_events(
    stored: &[JournalEvent],
    submitted: &[UpdateJournalEventInput],
    journal_id: JournalId,
    group_id: GroupId,
) -> EventPlan {
    let submitted_ids: HashSet<EventId> = submitted.iter().filter_map(|event| event.id).collect();

    let to_delete: Vec<JournalEvent> = stored
        .iter()
        .filter(|event| !submitted_ids.contains(&event.id))
        .cloned()
        .collect();

    let mut to_update = Vec::new();
    let mut to_insert = Vec::new();
    for (position, event) in submitted.iter().enumerate() {
        let event_index = position as i64;
        match event.id {
            Some(id) => to_update.push(EventUpdate {
                id,
                event_title: event.event_title.clone(),
                event_body: event.event_body.clone(),
                event_index,
                mood_id: event.event_mood_id,
            }),
            None => to_insert.push(NewEvent {
                journal_id,
                group_id,
                event_title: event.event_title.clone(),
                event_body: event.event_body.clone(),
                event_index,
                mood_id: event.event_mood_id,
            }),
        }
    }

    EventPlan {
        to_delete,
        to_update,
        to_insert,
    }
}
