//! Catalog use-case service.
//!
//! Thin pass-through over `CatalogRepository` with name normalization.
//! Names are trimmed and must be non-empty.

use crate::model::catalog::{
    Activity, ActivityId, Category, CreateActivityInput, CreateCategoryInput, CreateTrackInput,
    GroupId, Mood, RemoveCategoryInput, Track, TrackId, UpdateActivityInput, UserId,
};
use crate::repo::catalog_repo::CatalogRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CatalogResult<T> = Result<T, CatalogServiceError>;

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum CatalogServiceError {
    /// Name is blank after trim. Carries the field name.
    BlankName(&'static str),
    /// Target row does not exist.
    NotFound { table: &'static str, id: i64 },
    /// Write referenced a missing group or icon.
    ReferentialViolation(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for CatalogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName(field) => write!(f, "{field} must not be blank"),
            Self::NotFound { table, id } => write!(f, "{table} row not found: {id}"),
            Self::ReferentialViolation(message) => {
                write!(f, "referenced row does not exist: {message}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CatalogServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::RecordNotFound { table, id } => Self::NotFound { table, id },
            RepoError::ReferentialViolation(message) => Self::ReferentialViolation(message),
            other => Self::Repo(other),
        }
    }
}

/// Catalog service facade over repository implementations.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_user(&self, user_name: &str) -> CatalogResult<UserId> {
        let user_name = normalize_name("user_name", user_name)?;
        Ok(self.repo.create_user(&user_name)?)
    }

    pub fn create_group(&self, group_name: &str) -> CatalogResult<GroupId> {
        let group_name = normalize_name("group_name", group_name)?;
        Ok(self.repo.create_group(&group_name)?)
    }

    pub fn list_moods(&self) -> CatalogResult<Vec<Mood>> {
        Ok(self.repo.list_moods()?)
    }

    pub fn create_category(&self, input: &CreateCategoryInput) -> CatalogResult<Category> {
        let input = CreateCategoryInput {
            category_name: normalize_name("category_name", &input.category_name)?,
            group_id: input.group_id,
        };
        Ok(self.repo.create_category(&input)?)
    }

    /// Removes a category; journals filed under it become uncategorized.
    pub fn remove_category(&self, input: &RemoveCategoryInput) -> CatalogResult<Category> {
        Ok(self.repo.remove_category(input)?)
    }

    pub fn create_activity(&self, input: &CreateActivityInput) -> CatalogResult<Activity> {
        let input = CreateActivityInput {
            activity_name: normalize_name("activity_name", &input.activity_name)?,
            ..input.clone()
        };
        Ok(self.repo.create_activity(&input)?)
    }

    pub fn update_activity(&self, input: &UpdateActivityInput) -> CatalogResult<Activity> {
        let input = UpdateActivityInput {
            activity_name: normalize_name("activity_name", &input.activity_name)?,
            ..input.clone()
        };
        Ok(self.repo.update_activity(&input)?)
    }

    /// Removes an activity and every journal link to it.
    pub fn remove_activity(&self, id: ActivityId) -> CatalogResult<Activity> {
        Ok(self.repo.remove_activity(id)?)
    }

    pub fn list_activities(&self, group_id: GroupId) -> CatalogResult<Vec<Activity>> {
        Ok(self.repo.list_activities(group_id)?)
    }

    pub fn create_track(&self, input: &CreateTrackInput) -> CatalogResult<Track> {
        let input = CreateTrackInput {
            track_name: normalize_name("track_name", &input.track_name)?,
            ..input.clone()
        };
        Ok(self.repo.create_track(&input)?)
    }

    pub fn remove_track(&self, id: TrackId) -> CatalogResult<Track> {
        Ok(self.repo.remove_track(id)?)
    }

    pub fn list_tracks(&self, group_id: GroupId) -> CatalogResult<Vec<Track>> {
        Ok(self.repo.list_tracks(group_id)?)
    }
}

fn normalize_name(field: &'static str, value: &str) -> CatalogResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogServiceError::BlankName(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, CatalogServiceError};

    #[test]
    fn normalize_name_trims_and_rejects_blank() {
        assert_eq!(normalize_name("track_name", "  Water ").unwrap(), "Water");
        assert!(matches!(
            normalize_name("track_name", " \t"),
            Err(CatalogServiceError::BlankName("track_name"))
        ));
    }
}
