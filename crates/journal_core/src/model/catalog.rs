//! Catalog entities referenced by journals.
//!
//! Moods are seeded by migration and read-only. Categories, activities and
//! tracks are owned by a group and managed through plain create/delete calls.

use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type GroupId = i64;
pub type IconId = i64;
pub type MoodId = i64;
pub type CategoryId = i64;
pub type ActivityId = i64;
pub type TrackId = i64;

/// How a track value is rendered by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackDisplayType {
    /// Free numeric value.
    Value,
    /// 0/1 checkbox.
    CheckBox,
}

impl TrackDisplayType {
    pub(crate) fn as_db(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::CheckBox => "check_box",
        }
    }

    pub(crate) fn from_db(value: &str) -> Option<Self> {
        match value {
            "value" => Some(Self::Value),
            "check_box" => Some(Self::CheckBox),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mood {
    pub id: MoodId,
    pub mood_name: String,
    pub icon_id: IconId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub category_name: String,
    pub group_id: GroupId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    pub activity_name: String,
    pub group_id: GroupId,
    pub icon_id: Option<IconId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub track_name: String,
    pub track_display_type: TrackDisplayType,
    pub group_id: GroupId,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrackInput {
    pub track_name: String,
    pub track_display_type: TrackDisplayType,
    pub group_id: GroupId,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    pub category_name: String,
    pub group_id: GroupId,
}

/// Category removal is scoped to the owning group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCategoryInput {
    pub id: CategoryId,
    pub group_id: GroupId,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityInput {
    pub activity_name: String,
    pub group_id: GroupId,
    pub icon_id: Option<IconId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityInput {
    pub id: ActivityId,
    pub activity_name: String,
    pub icon_id: Option<IconId>,
}
