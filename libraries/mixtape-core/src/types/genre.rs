//! Genre types

use super::{Code, GenreId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A music genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub code: Code,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new genre
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGenre {
    pub name: String,
}
