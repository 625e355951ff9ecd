//! Artist types

use super::{ArtistId, Code};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub code: Code,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new artist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArtist {
    pub name: String,
}
