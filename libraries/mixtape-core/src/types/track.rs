//! Track types

use super::{Code, GenreId, TrackId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A track in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub code: Code,
    pub title: String,
    pub genre_id: Option<GenreId>,
    pub release_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Data for creating a new track
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTrack {
    pub title: String,
    pub genre_id: Option<GenreId>,
    pub release_date: Option<NaiveDate>,
}

impl CreateTrack {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Data for updating a track
///
/// `None` leaves a field untouched; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTrack {
    pub title: Option<String>,
    pub genre_id: Option<Option<GenreId>>,
    pub release_date: Option<Option<NaiveDate>>,
}
