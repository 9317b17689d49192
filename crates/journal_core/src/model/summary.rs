//! Yearly mood summary read model.
//!
//! Month and year are taken from `journal_date` in UTC.

use crate::model::catalog::MoodId;
use serde::Serialize;

/// Counts for one mood within one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodCount {
    pub mood_id: MoodId,
    pub mood_name: String,
    /// Journals recorded with this mood.
    pub journal_count: i64,
    /// Events belonging to those journals.
    pub event_count: i64,
}

/// One calendar month; `moods` lists every mood, zero counts included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyMoodData {
    /// 1 = January.
    pub month: u32,
    /// Ordered by mood name.
    pub moods: Vec<MoodCount>,
}

/// Totals over the whole year, journals without a mood included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyCounter {
    pub total_journal_count: i64,
    pub total_event_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySummary {
    /// Always 12 entries, January first.
    pub monthly_mood_data: Vec<MonthlyMoodData>,
    pub counter: YearlyCounter,
}
