//! Journal aggregate repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read journals with their ordered events and associations.
//! - Expose the transaction-scoped write surface (`JournalStore`) used by
//!   journal create/update orchestration.
//!
//! # Invariants
//! - Event listing is deterministic: `event_index ASC, id ASC`.
//! - Every child write is scoped by `journal_id`.
//! - `write_transaction` commits only when the closure succeeds; any error
//!   rolls back every write made through the store.

use crate::model::catalog::{ActivityId, CategoryId, MoodId, UserId};
use crate::model::journal::{
    ActivityAssociation, AddJournalTrackInput, CreateJournalInput, EventId, GetJournalsInput,
    Journal, JournalDetail, JournalEvent, JournalId, JournalStatus, JournalTrackInput,
    TrackAssociation, TrackLinkId,
};
use crate::model::summary::{MonthlyMoodData, MoodCount, YearlyCounter, YearlySummary};
use crate::reconcile::{EventUpdate, NewEvent};
use crate::repo::{
    ensure_connection_ready, json_id_array, placeholders, RepoError, RepoResult,
    MAX_IDS_PER_STATEMENT,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};

const JOURNAL_SELECT_SQL: &str = "SELECT
    id,
    journal_title,
    journal_body,
    journal_date,
    journal_status,
    mood_id,
    category_id,
    user_id,
    group_id,
    created_at,
    updated_at
FROM journals";

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    journal_id,
    event_title,
    event_body,
    event_index,
    mood_id,
    group_id
FROM events";

// Every (month, mood) pair appears once, even with no journals. Journals are
// counted distinctly because the events join repeats them.
const MONTHLY_MOOD_SQL: &str = "WITH RECURSIVE months(month) AS (
    SELECT 1
    UNION ALL
    SELECT month + 1 FROM months WHERE month < 12
)
SELECT
    m.month AS month,
    moods.id AS mood_id,
    moods.mood_name AS mood_name,
    COUNT(DISTINCT j.id) AS journal_count,
    COUNT(e.id) AS event_count
FROM months m
CROSS JOIN moods
LEFT JOIN journals j
    ON j.mood_id = moods.id
   AND j.user_id = ?1
   AND CAST(strftime('%Y', j.journal_date / 1000.0, 'unixepoch') AS INTEGER) = ?2
   AND CAST(strftime('%m', j.journal_date / 1000.0, 'unixepoch') AS INTEGER) = m.month
LEFT JOIN events e ON e.journal_id = j.id
GROUP BY m.month, moods.id, moods.mood_name
ORDER BY m.month ASC, moods.mood_name ASC;";

const JOURNAL_COLUMNS: &[&str] = &[
    "id",
    "journal_title",
    "journal_body",
    "journal_date",
    "journal_status",
    "mood_id",
    "category_id",
    "user_id",
    "group_id",
];
const EVENT_COLUMNS: &[&str] = &[
    "id",
    "journal_id",
    "event_title",
    "event_body",
    "event_index",
    "mood_id",
    "group_id",
];
const ACTIVITY_LINK_COLUMNS: &[&str] = &["id", "journal_id", "activity_id"];
const TRACK_LINK_COLUMNS: &[&str] = &["id", "journal_id", "track_id", "track_value", "track_goal"];

/// Scalar journal fields replaced by an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalScalarUpdate {
    pub journal_id: JournalId,
    pub journal_title: String,
    pub journal_body: String,
    pub journal_date: i64,
    pub mood_id: Option<MoodId>,
    pub category_id: Option<CategoryId>,
}

/// Write surface available inside one journal transaction.
pub trait JournalStore {
    /// Lists a journal's events by index.
    fn find_events(&self, journal_id: JournalId) -> RepoResult<Vec<JournalEvent>>;
    /// Deletes the given events of one journal. Returns rows removed.
    fn delete_events(&self, journal_id: JournalId, ids: &[EventId]) -> RepoResult<usize>;
    /// Inserts new events.
    fn insert_events(&self, events: &[NewEvent]) -> RepoResult<()>;
    /// Rewrites one event. Missing rows yield `EventNotFound`.
    fn update_event(&self, journal_id: JournalId, update: &EventUpdate) -> RepoResult<()>;
    /// Lists a journal's activity links.
    fn find_activity_links(&self, journal_id: JournalId) -> RepoResult<Vec<ActivityAssociation>>;
    /// Removes links to the given activities. Returns rows removed.
    fn delete_activity_links(
        &self,
        journal_id: JournalId,
        activity_ids: &[ActivityId],
    ) -> RepoResult<usize>;
    /// Links the journal to the given activities.
    fn insert_activity_links(
        &self,
        journal_id: JournalId,
        activity_ids: &[ActivityId],
    ) -> RepoResult<()>;
    /// Replaces scalar fields. Missing journals yield `JournalNotFound`.
    fn update_journal_scalars(&self, update: &JournalScalarUpdate) -> RepoResult<()>;
    /// Inserts a journal root row owned by `user_id`.
    fn insert_journal(&self, user_id: UserId, input: &CreateJournalInput)
        -> RepoResult<JournalId>;
    /// Inserts track values recorded for the journal.
    fn insert_track_links(
        &self,
        journal_id: JournalId,
        tracks: &[JournalTrackInput],
    ) -> RepoResult<()>;
}

/// Repository interface for journal aggregate operations.
pub trait JournalRepository {
    /// Runs `work` inside one IMMEDIATE transaction.
    fn write_transaction<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn JournalStore) -> Result<T, E>,
        E: From<RepoError>;
    /// Loads a journal with events, activity ids and tracks.
    fn get_journal(&self, journal_id: JournalId) -> RepoResult<Option<JournalDetail>>;
    /// Lists a user's journals, newest date first.
    fn list_journals(&self, user_id: UserId, query: &GetJournalsInput)
        -> RepoResult<Vec<Journal>>;
    /// Deletes a user's journal; children go with it.
    fn remove_journal(&self, user_id: UserId, journal_id: JournalId) -> RepoResult<Journal>;
    /// Records one track value on a journal.
    fn add_journal_track(&self, input: &AddJournalTrackInput) -> RepoResult<TrackAssociation>;
    /// Removes one recorded track value.
    fn remove_journal_track(&self, link_id: TrackLinkId) -> RepoResult<TrackAssociation>;
    /// Per-month, per-mood journal and event counts of a user for one UTC year.
    fn yearly_summary(&self, user_id: UserId, year: i32) -> RepoResult<YearlySummary>;
}

/// `JournalStore` over any SQLite connection or transaction.
pub struct SqliteJournalStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJournalStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl JournalStore for SqliteJournalStore<'_> {
    fn find_events(&self, journal_id: JournalId) -> RepoResult<Vec<JournalEvent>> {
        load_events(self.conn, journal_id)
    }

    fn delete_events(&self, journal_id: JournalId, ids: &[EventId]) -> RepoResult<usize> {
        delete_in_chunks(
            self.conn,
            "DELETE FROM events WHERE journal_id = ? AND id IN",
            journal_id,
            ids,
        )
    }

    fn insert_events(&self, events: &[NewEvent]) -> RepoResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO events (
                journal_id,
                event_title,
                event_body,
                event_index,
                mood_id,
                group_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        )?;
        for event in events {
            stmt.execute(params![
                event.journal_id,
                event.event_title.as_str(),
                event.event_body.as_str(),
                event.event_index,
                event.mood_id,
                event.group_id,
            ])?;
        }
        Ok(())
    }

    fn update_event(&self, journal_id: JournalId, update: &EventUpdate) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE events
             SET
                event_title = ?3,
                event_body = ?4,
                event_index = ?5,
                mood_id = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND journal_id = ?2;",
            params![
                update.id,
                journal_id,
                update.event_title.as_str(),
                update.event_body.as_str(),
                update.event_index,
                update.mood_id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::EventNotFound(update.id));
        }
        Ok(())
    }

    fn find_activity_links(&self, journal_id: JournalId) -> RepoResult<Vec<ActivityAssociation>> {
        load_activity_links(self.conn, journal_id)
    }

    fn delete_activity_links(
        &self,
        journal_id: JournalId,
        activity_ids: &[ActivityId],
    ) -> RepoResult<usize> {
        delete_in_chunks(
            self.conn,
            "DELETE FROM journal_activities WHERE journal_id = ? AND activity_id IN",
            journal_id,
            activity_ids,
        )
    }

    fn insert_activity_links(
        &self,
        journal_id: JournalId,
        activity_ids: &[ActivityId],
    ) -> RepoResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO journal_activities (journal_id, activity_id) VALUES (?1, ?2);",
        )?;
        for activity_id in activity_ids {
            stmt.execute(params![journal_id, activity_id])?;
        }
        Ok(())
    }

    fn update_journal_scalars(&self, update: &JournalScalarUpdate) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE journals
             SET
                journal_title = ?2,
                journal_body = ?3,
                journal_date = ?4,
                mood_id = ?5,
                category_id = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                update.journal_id,
                update.journal_title.as_str(),
                update.journal_body.as_str(),
                update.journal_date,
                update.mood_id,
                update.category_id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::JournalNotFound(update.journal_id));
        }
        Ok(())
    }

    fn insert_journal(
        &self,
        user_id: UserId,
        input: &CreateJournalInput,
    ) -> RepoResult<JournalId> {
        self.conn.execute(
            "INSERT INTO journals (
                journal_title,
                journal_body,
                journal_date,
                journal_status,
                mood_id,
                category_id,
                user_id,
                group_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                input.journal_title.as_str(),
                input.journal_body.as_deref(),
                input.journal_date,
                JournalStatus::GroupOnly.as_db(),
                input.mood_id,
                input.category_id,
                user_id,
                input.group_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_track_links(
        &self,
        journal_id: JournalId,
        tracks: &[JournalTrackInput],
    ) -> RepoResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO journal_tracks (journal_id, track_id, track_value, track_goal)
             VALUES (?1, ?2, ?3, ?4);",
        )?;
        for track in tracks {
            stmt.execute(params![
                journal_id,
                track.track_id,
                track.track_value,
                track.track_goal,
            ])?;
        }
        Ok(())
    }
}

/// SQLite-backed journal repository.
pub struct SqliteJournalRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteJournalRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("journals", JOURNAL_COLUMNS),
                ("events", EVENT_COLUMNS),
                ("journal_activities", ACTIVITY_LINK_COLUMNS),
                ("journal_tracks", TRACK_LINK_COLUMNS),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl JournalRepository for SqliteJournalRepository<'_> {
    fn write_transaction<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn JournalStore) -> Result<T, E>,
        E: From<RepoError>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        // Dropping `tx` on the error path rolls back.
        let output = work(&SqliteJournalStore::new(&tx))?;
        tx.commit().map_err(RepoError::from)?;
        Ok(output)
    }

    fn get_journal(&self, journal_id: JournalId) -> RepoResult<Option<JournalDetail>> {
        let Some(journal) = load_journal(self.conn, journal_id)? else {
            return Ok(None);
        };
        let events = load_events(self.conn, journal_id)?;
        let activity_ids = load_activity_links(self.conn, journal_id)?
            .into_iter()
            .map(|link| link.activity_id)
            .collect();
        let tracks = load_track_links(self.conn, journal_id)?;
        Ok(Some(JournalDetail {
            journal,
            events,
            activity_ids,
            tracks,
        }))
    }

    fn list_journals(
        &self,
        user_id: UserId,
        query: &GetJournalsInput,
    ) -> RepoResult<Vec<Journal>> {
        let mut sql = format!("{JOURNAL_SELECT_SQL} WHERE user_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(user_id)];

        if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
            sql.push_str(" AND journal_date >= ? AND journal_date <= ?");
            bind_values.push(Value::Integer(start));
            bind_values.push(Value::Integer(end));
        }

        if let Some(category_id) = query.category_id {
            sql.push_str(" AND category_id = ?");
            bind_values.push(Value::Integer(category_id));
        }

        if let Some(mood_id) = query.mood_id {
            sql.push_str(" AND mood_id = ?");
            bind_values.push(Value::Integer(mood_id));
        }

        if !query.activity_ids.is_empty() {
            // One JSON array bind keeps the statement size independent of the
            // filter length.
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM journal_activities ja
                    WHERE ja.journal_id = journals.id
                      AND ja.activity_id IN (SELECT value FROM json_each(?))
                )",
            );
            bind_values.push(Value::Text(json_id_array(&query.activity_ids)));
        }

        sql.push_str(" ORDER BY journal_date DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut journals = Vec::new();
        while let Some(row) = rows.next()? {
            journals.push(parse_journal_row(row)?);
        }
        Ok(journals)
    }

    fn remove_journal(&self, user_id: UserId, journal_id: JournalId) -> RepoResult<Journal> {
        let journal = load_journal(self.conn, journal_id)?
            .filter(|journal| journal.user_id == user_id)
            .ok_or(RepoError::JournalNotFound(journal_id))?;
        self.conn.execute(
            "DELETE FROM journals WHERE id = ?1 AND user_id = ?2;",
            params![journal_id, user_id],
        )?;
        Ok(journal)
    }

    fn add_journal_track(&self, input: &AddJournalTrackInput) -> RepoResult<TrackAssociation> {
        self.conn.execute(
            "INSERT INTO journal_tracks (journal_id, track_id, track_value, track_goal)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                input.journal_id,
                input.track_id,
                input.track_value,
                input.track_goal,
            ],
        )?;
        Ok(TrackAssociation {
            id: self.conn.last_insert_rowid(),
            journal_id: input.journal_id,
            track_id: input.track_id,
            track_value: input.track_value,
            track_goal: input.track_goal,
        })
    }

    fn remove_journal_track(&self, link_id: TrackLinkId) -> RepoResult<TrackAssociation> {
        let link = self
            .conn
            .query_row(
                "SELECT id, journal_id, track_id, track_value, track_goal
                 FROM journal_tracks
                 WHERE id = ?1;",
                [link_id],
                parse_track_link_row,
            )
            .optional()?
            .ok_or(RepoError::RecordNotFound {
                table: "journal_tracks",
                id: link_id,
            })?;
        self.conn
            .execute("DELETE FROM journal_tracks WHERE id = ?1;", [link_id])?;
        Ok(link)
    }

    fn yearly_summary(&self, user_id: UserId, year: i32) -> RepoResult<YearlySummary> {
        let mut monthly_mood_data: Vec<MonthlyMoodData> = (1..=12)
            .map(|month| MonthlyMoodData {
                month,
                moods: Vec::new(),
            })
            .collect();

        let mut stmt = self.conn.prepare_cached(MONTHLY_MOOD_SQL)?;
        let mut rows = stmt.query(params![user_id, year])?;
        while let Some(row) = rows.next()? {
            let month: i64 = row.get("month")?;
            let slot = usize::try_from(month - 1)
                .ok()
                .and_then(|index| monthly_mood_data.get_mut(index))
                .ok_or_else(|| {
                    RepoError::InvalidData(format!("month `{month}` out of range in summary"))
                })?;
            slot.moods.push(MoodCount {
                mood_id: row.get("mood_id")?,
                mood_name: row.get("mood_name")?,
                journal_count: row.get("journal_count")?,
                event_count: row.get("event_count")?,
            });
        }

        let counter = self.conn.query_row(
            "SELECT
                COUNT(DISTINCT j.id) AS journal_count,
                COUNT(e.id) AS event_count
             FROM journals j
             LEFT JOIN events e ON e.journal_id = j.id
             WHERE j.user_id = ?1
               AND CAST(strftime('%Y', j.journal_date / 1000.0, 'unixepoch') AS INTEGER) = ?2;",
            params![user_id, year],
            |row| {
                Ok(YearlyCounter {
                    total_journal_count: row.get("journal_count")?,
                    total_event_count: row.get("event_count")?,
                })
            },
        )?;

        Ok(YearlySummary {
            monthly_mood_data,
            counter,
        })
    }
}

/// Runs `<sql_prefix> (?, ...)` over `ids` in bounded chunks. Returns rows removed.
///
/// `sql_prefix` binds `journal_id` as its only parameter before the `IN` list.
fn delete_in_chunks(
    conn: &Connection,
    sql_prefix: &str,
    journal_id: JournalId,
    ids: &[i64],
) -> RepoResult<usize> {
    let mut removed = 0;
    for chunk in ids.chunks(MAX_IDS_PER_STATEMENT) {
        let sql = format!("{sql_prefix} ({});", placeholders(chunk.len()));
        let binds = std::iter::once(journal_id).chain(chunk.iter().copied());
        removed += conn.prepare_cached(&sql)?.execute(params_from_iter(binds))?;
    }
    Ok(removed)
}

fn load_journal(conn: &Connection, journal_id: JournalId) -> RepoResult<Option<Journal>> {
    let mut stmt = conn.prepare(&format!("{JOURNAL_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([journal_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_journal_row(row)?));
    }
    Ok(None)
}

fn load_events(conn: &Connection, journal_id: JournalId) -> RepoResult<Vec<JournalEvent>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{EVENT_SELECT_SQL}
         WHERE journal_id = ?1
         ORDER BY event_index ASC, id ASC;"
    ))?;
    let mut rows = stmt.query([journal_id])?;
    let mut events = Vec::new();
    while let Some(row) = rows.next()? {
        events.push(parse_event_row(row)?);
    }
    Ok(events)
}

fn load_activity_links(
    conn: &Connection,
    journal_id: JournalId,
) -> RepoResult<Vec<ActivityAssociation>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, journal_id, activity_id
         FROM journal_activities
         WHERE journal_id = ?1
         ORDER BY activity_id ASC;",
    )?;
    let links = stmt
        .query_map([journal_id], |row| {
            Ok(ActivityAssociation {
                id: row.get("id")?,
                journal_id: row.get("journal_id")?,
                activity_id: row.get("activity_id")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(links)
}

fn load_track_links(conn: &Connection, journal_id: JournalId) -> RepoResult<Vec<TrackAssociation>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, journal_id, track_id, track_value, track_goal
         FROM journal_tracks
         WHERE journal_id = ?1
         ORDER BY id ASC;",
    )?;
    let links = stmt
        .query_map([journal_id], parse_track_link_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(links)
}

fn parse_journal_row(row: &Row<'_>) -> RepoResult<Journal> {
    let status_text: String = row.get("journal_status")?;
    let journal_status = JournalStatus::from_db(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid journal status `{status_text}` in journals.journal_status"
        ))
    })?;

    Ok(Journal {
        id: row.get("id")?,
        journal_title: row.get("journal_title")?,
        journal_body: row.get("journal_body")?,
        journal_date: row.get("journal_date")?,
        journal_status,
        mood_id: row.get("mood_id")?,
        category_id: row.get("category_id")?,
        user_id: row.get("user_id")?,
        group_id: row.get("group_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<JournalEvent> {
    let event_index: i64 = row.get("event_index")?;
    if event_index < 0 {
        return Err(RepoError::InvalidData(format!(
            "negative event index `{event_index}` in events.event_index"
        )));
    }

    Ok(JournalEvent {
        id: row.get("id")?,
        journal_id: row.get("journal_id")?,
        event_title: row.get("event_title")?,
        event_body: row.get("event_body")?,
        event_index,
        mood_id: row.get("mood_id")?,
        group_id: row.get("group_id")?,
    })
}

fn parse_track_link_row(row: &Row<'_>) -> rusqlite::Result<TrackAssociation> {
    Ok(TrackAssociation {
        id: row.get("id")?,
        journal_id: row.get("journal_id")?,
        track_id: row.get("track_id")?,
        track_value: row.get("track_value")?,
        track_goal: row.get("track_goal")?,
    })
}
