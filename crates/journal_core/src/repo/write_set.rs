//! Ordered write batches applied inside one journal transaction.
//!
//! # Responsibility
//! - Turn reconciliation plans and scalar changes into an explicit list of
//!   storage writes.
//! - Apply that list in order, stopping at the first failure.
//!
//! # Invariants
//! - Empty batches are never queued.
//! - The journal scalar update is always the first op, so a missing journal
//!   is reported as `JournalNotFound` before any child write runs.
//! - Atomicity comes from the surrounding transaction, not from this type.

use crate::model::catalog::ActivityId;
use crate::model::journal::{EventId, JournalId};
use crate::reconcile::{ActivityPlan, EventPlan, EventUpdate, NewEvent};
use crate::repo::journal_repo::{JournalScalarUpdate, JournalStore};
use crate::repo::RepoResult;
use log::debug;

/// One storage write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    UpdateJournal(JournalScalarUpdate),
    DeleteEvents {
        journal_id: JournalId,
        ids: Vec<EventId>,
    },
    InsertEvents(Vec<NewEvent>),
    UpdateEvent {
        journal_id: JournalId,
        update: EventUpdate,
    },
    DeleteActivityLinks {
        journal_id: JournalId,
        activity_ids: Vec<ActivityId>,
    },
    InsertActivityLinks {
        journal_id: JournalId,
        activity_ids: Vec<ActivityId>,
    },
}

impl WriteOp {
    /// Stable op name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdateJournal(_) => "update_journal",
            Self::DeleteEvents { .. } => "delete_events",
            Self::InsertEvents(_) => "insert_events",
            Self::UpdateEvent { .. } => "update_event",
            Self::DeleteActivityLinks { .. } => "delete_activity_links",
            Self::InsertActivityLinks { .. } => "insert_activity_links",
        }
    }

    fn apply(&self, store: &dyn JournalStore) -> RepoResult<()> {
        match self {
            Self::UpdateJournal(update) => store.update_journal_scalars(update),
            Self::DeleteEvents { journal_id, ids } => {
                store.delete_events(*journal_id, ids).map(|_| ())
            }
            Self::InsertEvents(events) => store.insert_events(events),
            Self::UpdateEvent { journal_id, update } => store.update_event(*journal_id, update),
            Self::DeleteActivityLinks {
                journal_id,
                activity_ids,
            } => store
                .delete_activity_links(*journal_id, activity_ids)
                .map(|_| ()),
            Self::InsertActivityLinks {
                journal_id,
                activity_ids,
            } => store.insert_activity_links(*journal_id, activity_ids),
        }
    }
}

/// Write counts by kind, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSetSummary {
    pub events_deleted: usize,
    pub events_inserted: usize,
    pub events_updated: usize,
    pub links_deleted: usize,
    pub links_inserted: usize,
}

/// Ordered list of writes for one journal update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalWriteSet {
    ops: Vec<WriteOp>,
}

impl JournalWriteSet {
    /// Builds the write list for a journal update.
    ///
    /// Order: scalar update, event deletes, event inserts, per-event updates,
    /// link deletes, link inserts.
    pub fn for_update(
        scalars: JournalScalarUpdate,
        events: EventPlan,
        activities: ActivityPlan,
    ) -> Self {
        let journal_id = scalars.journal_id;
        let mut set = Self::default();
        set.push(WriteOp::UpdateJournal(scalars));

        let delete_ids = events.delete_ids();
        if !delete_ids.is_empty() {
            set.push(WriteOp::DeleteEvents {
                journal_id,
                ids: delete_ids,
            });
        }
        if !events.to_insert.is_empty() {
            set.push(WriteOp::InsertEvents(events.to_insert));
        }
        for update in events.to_update {
            set.push(WriteOp::UpdateEvent { journal_id, update });
        }

        if !activities.to_delete.is_empty() {
            set.push(WriteOp::DeleteActivityLinks {
                journal_id,
                activity_ids: activities.to_delete,
            });
        }
        if !activities.to_insert.is_empty() {
            set.push(WriteOp::InsertActivityLinks {
                journal_id,
                activity_ids: activities.to_insert,
            });
        }
        set
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn summary(&self) -> WriteSetSummary {
        let mut summary = WriteSetSummary::default();
        for op in &self.ops {
            match op {
                WriteOp::UpdateJournal(_) => {}
                WriteOp::DeleteEvents { ids, .. } => summary.events_deleted += ids.len(),
                WriteOp::InsertEvents(events) => summary.events_inserted += events.len(),
                WriteOp::UpdateEvent { .. } => summary.events_updated += 1,
                WriteOp::DeleteActivityLinks { activity_ids, .. } => {
                    summary.links_deleted += activity_ids.len()
                }
                WriteOp::InsertActivityLinks { activity_ids, .. } => {
                    summary.links_inserted += activity_ids.len()
                }
            }
        }
        summary
    }

    /// Applies every op in order. The first failure is returned unchanged.
    pub fn apply(&self, store: &dyn JournalStore) -> RepoResult<()> {
        for op in &self.ops {
            op.apply(store).inspect_err(|err| {
                debug!(
                    "event=write_op module=repo status=error op={} error={}",
                    op.name(),
                    err
                );
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{JournalWriteSet, WriteOp};
    use crate::reconcile::{ActivityPlan, EventPlan, EventUpdate};
    use crate::repo::journal_repo::JournalScalarUpdate;

    fn scalars() -> JournalScalarUpdate {
        JournalScalarUpdate {
            journal_id: 5,
            journal_title: "title".to_string(),
            journal_body: "body".to_string(),
            journal_date: 0,
            mood_id: None,
            category_id: None,
        }
    }

    #[test]
    fn no_child_changes_still_updates_scalars() {
        let set = JournalWriteSet::for_update(
            scalars(),
            EventPlan::default(),
            ActivityPlan::default(),
        );
        let names: Vec<&str> = set.ops().iter().map(WriteOp::name).collect();
        assert_eq!(names, vec!["update_journal"]);
    }

    #[test]
    fn ops_follow_fixed_order_with_one_update_per_event() {
        let update = |id: i64, event_index: i64| EventUpdate {
            id,
            event_title: String::new(),
            event_body: String::new(),
            event_index,
            mood_id: None,
        };
        let events = EventPlan {
            to_delete: Vec::new(),
            to_update: vec![update(1, 0), update(2, 1)],
            to_insert: Vec::new(),
        };
        let activities = ActivityPlan {
            to_delete: vec![10, 12],
            to_insert: vec![13],
        };

        let set = JournalWriteSet::for_update(scalars(), events, activities);
        let names: Vec<&str> = set.ops().iter().map(WriteOp::name).collect();
        assert_eq!(
            names,
            vec![
                "update_journal",
                "update_event",
                "update_event",
                "delete_activity_links",
                "insert_activity_links",
            ]
        );

        let summary = set.summary();
        assert_eq!(summary.events_updated, 2);
        assert_eq!(summary.links_deleted, 2);
        assert_eq!(summary.links_inserted, 1);
    }
}
