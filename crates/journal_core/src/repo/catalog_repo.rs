//! Catalog repository: users, groups, moods, categories, activities, tracks.
//!
//! Plain single-row create/read/delete. Deleting a category clears it from
//! journals; deleting an activity or track removes its journal links.

use crate::model::catalog::{
    Activity, ActivityId, Category, CreateActivityInput, CreateCategoryInput, CreateTrackInput,
    GroupId, Mood, RemoveCategoryInput, Track, TrackDisplayType, TrackId, UpdateActivityInput,
    UserId,
};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const MOOD_COLUMNS: &[&str] = &["id", "mood_name", "icon_id"];
const CATEGORY_COLUMNS: &[&str] = &["id", "category_name", "group_id"];
const ACTIVITY_COLUMNS: &[&str] = &["id", "activity_name", "group_id", "icon_id"];
const TRACK_COLUMNS: &[&str] = &["id", "track_name", "track_display_type", "group_id"];

/// Repository interface for catalog rows.
pub trait CatalogRepository {
    fn create_user(&self, user_name: &str) -> RepoResult<UserId>;
    fn create_group(&self, group_name: &str) -> RepoResult<GroupId>;
    /// Lists seeded moods by id.
    fn list_moods(&self) -> RepoResult<Vec<Mood>>;
    fn create_category(&self, input: &CreateCategoryInput) -> RepoResult<Category>;
    /// Deletes a category only when it belongs to `input.group_id`.
    fn remove_category(&self, input: &RemoveCategoryInput) -> RepoResult<Category>;
    fn create_activity(&self, input: &CreateActivityInput) -> RepoResult<Activity>;
    fn update_activity(&self, input: &UpdateActivityInput) -> RepoResult<Activity>;
    fn remove_activity(&self, id: ActivityId) -> RepoResult<Activity>;
    fn list_activities(&self, group_id: GroupId) -> RepoResult<Vec<Activity>>;
    fn create_track(&self, input: &CreateTrackInput) -> RepoResult<Track>;
    fn remove_track(&self, id: TrackId) -> RepoResult<Track>;
    fn list_tracks(&self, group_id: GroupId) -> RepoResult<Vec<Track>>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("moods", MOOD_COLUMNS),
                ("categories", CATEGORY_COLUMNS),
                ("activities", ACTIVITY_COLUMNS),
                ("tracks", TRACK_COLUMNS),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn create_user(&self, user_name: &str) -> RepoResult<UserId> {
        self.conn
            .execute("INSERT INTO users (user_name) VALUES (?1);", [user_name])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn create_group(&self, group_name: &str) -> RepoResult<GroupId> {
        self.conn
            .execute("INSERT INTO user_groups (group_name) VALUES (?1);", [group_name])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_moods(&self) -> RepoResult<Vec<Mood>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, mood_name, icon_id FROM moods ORDER BY id ASC;")?;
        let moods = stmt
            .query_map([], |row| {
                Ok(Mood {
                    id: row.get("id")?,
                    mood_name: row.get("mood_name")?,
                    icon_id: row.get("icon_id")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(moods)
    }

    fn create_category(&self, input: &CreateCategoryInput) -> RepoResult<Category> {
        self.conn.execute(
            "INSERT INTO categories (category_name, group_id) VALUES (?1, ?2);",
            params![input.category_name.as_str(), input.group_id],
        )?;
        Ok(Category {
            id: self.conn.last_insert_rowid(),
            category_name: input.category_name.clone(),
            group_id: input.group_id,
        })
    }

    fn remove_category(&self, input: &RemoveCategoryInput) -> RepoResult<Category> {
        let category = self
            .conn
            .query_row(
                "SELECT id, category_name, group_id
                 FROM categories
                 WHERE id = ?1
                   AND group_id = ?2;",
                params![input.id, input.group_id],
                |row| {
                    Ok(Category {
                        id: row.get("id")?,
                        category_name: row.get("category_name")?,
                        group_id: row.get("group_id")?,
                    })
                },
            )
            .optional()?
            .ok_or(RepoError::RecordNotFound {
                table: "categories",
                id: input.id,
            })?;
        self.conn
            .execute("DELETE FROM categories WHERE id = ?1;", [input.id])?;
        Ok(category)
    }

    fn create_activity(&self, input: &CreateActivityInput) -> RepoResult<Activity> {
        self.conn.execute(
            "INSERT INTO activities (activity_name, group_id, icon_id) VALUES (?1, ?2, ?3);",
            params![input.activity_name.as_str(), input.group_id, input.icon_id],
        )?;
        load_activity(self.conn, self.conn.last_insert_rowid())
    }

    fn update_activity(&self, input: &UpdateActivityInput) -> RepoResult<Activity> {
        let changed = self.conn.execute(
            "UPDATE activities
             SET activity_name = ?2,
                 icon_id = ?3
             WHERE id = ?1;",
            params![input.id, input.activity_name.as_str(), input.icon_id],
        )?;
        if changed == 0 {
            return Err(RepoError::RecordNotFound {
                table: "activities",
                id: input.id,
            });
        }
        load_activity(self.conn, input.id)
    }

    fn remove_activity(&self, id: ActivityId) -> RepoResult<Activity> {
        let activity = load_activity(self.conn, id)?;
        self.conn
            .execute("DELETE FROM activities WHERE id = ?1;", [id])?;
        Ok(activity)
    }

    fn list_activities(&self, group_id: GroupId) -> RepoResult<Vec<Activity>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, activity_name, group_id, icon_id
             FROM activities
             WHERE group_id = ?1
             ORDER BY id ASC;",
        )?;
        let activities = stmt
            .query_map([group_id], parse_activity_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(activities)
    }

    fn create_track(&self, input: &CreateTrackInput) -> RepoResult<Track> {
        self.conn.execute(
            "INSERT INTO tracks (track_name, track_display_type, group_id) VALUES (?1, ?2, ?3);",
            params![
                input.track_name.as_str(),
                input.track_display_type.as_db(),
                input.group_id,
            ],
        )?;
        Ok(Track {
            id: self.conn.last_insert_rowid(),
            track_name: input.track_name.clone(),
            track_display_type: input.track_display_type,
            group_id: input.group_id,
        })
    }

    fn remove_track(&self, id: TrackId) -> RepoResult<Track> {
        let track = load_track(self.conn, id)?;
        self.conn.execute("DELETE FROM tracks WHERE id = ?1;", [id])?;
        Ok(track)
    }

    fn list_tracks(&self, group_id: GroupId) -> RepoResult<Vec<Track>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, track_name, track_display_type, group_id
             FROM tracks
             WHERE group_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([group_id])?;
        let mut tracks = Vec::new();
        while let Some(row) = rows.next()? {
            tracks.push(parse_track_row(row)?);
        }
        Ok(tracks)
    }
}

fn load_activity(conn: &Connection, id: ActivityId) -> RepoResult<Activity> {
    conn.query_row(
        "SELECT id, activity_name, group_id, icon_id
         FROM activities
         WHERE id = ?1;",
        [id],
        parse_activity_row,
    )
    .optional()?
    .ok_or(RepoError::RecordNotFound {
        table: "activities",
        id,
    })
}

fn load_track(conn: &Connection, id: TrackId) -> RepoResult<Track> {
    let mut stmt = conn.prepare(
        "SELECT id, track_name, track_display_type, group_id
         FROM tracks
         WHERE id = ?1;",
    )?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => parse_track_row(row),
        None => Err(RepoError::RecordNotFound { table: "tracks", id }),
    }
}

fn parse_activity_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get("id")?,
        activity_name: row.get("activity_name")?,
        group_id: row.get("group_id")?,
        icon_id: row.get("icon_id")?,
    })
}

fn parse_track_row(row: &Row<'_>) -> RepoResult<Track> {
    let type_text: String = row.get("track_display_type")?;
    let track_display_type = TrackDisplayType::from_db(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid track display type `{type_text}` in tracks.track_display_type"
        ))
    })?;
    Ok(Track {
        id: row.get("id")?,
        track_name: row.get("track_name")?,
        track_display_type,
        group_id: row.get("group_id")?,
    })
}
