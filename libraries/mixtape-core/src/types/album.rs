//! Album types

use super::{AlbumId, Code, TrackId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// An album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub code: Code,
    pub name: String,
    pub release_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new album
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlbum {
    pub name: String,
    pub release_date: Option<NaiveDate>,
}

/// Track on an album
///
/// Track numbers are informational; two tracks may share one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumTrack {
    pub album_id: AlbumId,
    pub track_id: TrackId,
    pub track_number: Option<u32>,
}
