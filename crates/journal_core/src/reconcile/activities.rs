//! Activity association reconciliation.
//!
//! Links carry no payload, so the plan only has insert and delete sets. Order
//! of the submitted ids carries no meaning.

use crate::model::catalog::ActivityId;
use crate::model::journal::ActivityAssociation;
use std::collections::HashSet;

/// Link changes needed to reach the submitted activity set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityPlan {
    /// Stored activity ids not submitted, in stored order.
    pub to_delete: Vec<ActivityId>,
    /// Submitted activity ids not stored, first occurrence only.
    pub to_insert: Vec<ActivityId>,
}

impl ActivityPlan {
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_insert.is_empty()
    }
}

/// Diffs stored links against the desired activity id set.
pub fn reconcile_activities(
    stored: &[ActivityAssociation],
    submitted: &[ActivityId],
) -> ActivityPlan {
    let stored_ids: HashSet<ActivityId> = stored.iter().map(|link| link.activity_id).collect();
    let submitted_ids: HashSet<ActivityId> = submitted.iter().copied().collect();

    let to_delete = stored
        .iter()
        .map(|link| link.activity_id)
        .filter(|id| !submitted_ids.contains(id))
        .collect();

    let mut queued = HashSet::new();
    let to_insert = submitted
        .iter()
        .copied()
        .filter(|id| !stored_ids.contains(id) && queued.insert(*id))
        .collect();

    ActivityPlan {
        to_delete,
        to_insert,
    }
}

#[cfg(test)]
mod tests {
    use super::reconcile_activities;
    use crate::model::journal::ActivityAssociation;

    fn links(activity_ids: &[i64]) -> Vec<ActivityAssociation> {
        activity_ids
            .iter()
            .enumerate()
            .map(|(offset, activity_id)| ActivityAssociation {
                id: 100 + offset as i64,
                journal_id: 1,
                activity_id: *activity_id,
            })
            .collect()
    }

    #[test]
    fn removes_stale_and_adds_missing_ids() {
        let plan = reconcile_activities(&links(&[10, 11, 12]), &[11, 13]);
        assert_eq!(plan.to_delete, vec![10, 12]);
        assert_eq!(plan.to_insert, vec![13]);
    }

    #[test]
    fn same_set_in_other_order_is_a_noop() {
        let plan = reconcile_activities(&links(&[1, 2, 3]), &[3, 1, 2]);
        assert!(plan.is_empty());
    }

    #[test]
    fn repeated_submitted_id_is_inserted_once() {
        let plan = reconcile_activities(&[], &[5, 6, 5]);
        assert_eq!(plan.to_insert, vec![5, 6]);
    }

    #[test]
    fn empty_submission_unlinks_everything() {
        let plan = reconcile_activities(&links(&[4, 8]), &[]);
        assert_eq!(plan.to_delete, vec![4, 8]);
        assert!(plan.to_insert.is_empty());
    }
}
