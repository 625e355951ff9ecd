/// Core error types for Mixtape
use crate::types::{Code, CodeKind, PlaylistId};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias using `MixtapeError`
pub type Result<T> = std::result::Result<T, MixtapeError>;

/// Core error type for Mixtape
///
/// Every variant is detected at the store boundary and returned to the
/// caller as-is; none of them is retried internally.
#[derive(Error, Debug)]
pub enum MixtapeError {
    /// An entry must reference exactly one track or one sub-playlist
    #[error("Playlist entry must reference exactly one of a track or a sub-playlist")]
    InvalidEntryPayload,

    /// The insertion slot was still occupied after shifting
    #[error("Position {position} in playlist {playlist} is still occupied after shifting")]
    PositionOccupiedAfterShift { playlist: PlaylistId, position: u32 },

    /// Provider payload does not match its kind
    #[error("Malformed provider payload: {0}")]
    MalformedProviderPayload(String),

    /// No codes left for this entity kind
    #[error("Code space exhausted for {0}")]
    CodeSpaceExhausted(CodeKind),

    /// A freshly allocated code already exists
    #[error("Duplicate {kind} code: {code}")]
    DuplicateCode { kind: CodeKind, code: Code },

    /// A referenced row does not exist
    #[error("Unknown {entity} reference: {id}")]
    UnknownReference { entity: String, id: String },

    /// The row was changed by someone else while editing
    #[error("The row was changed by someone else while editing, at {0}")]
    OutdatedState(DateTime<Utc>),

    /// Following sub-playlists from this playlist leads back to it
    #[error("Playlist {0} is part of a reference cycle")]
    CyclicPlaylist(PlaylistId),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),
}

impl MixtapeError {
    /// Create an unknown reference error
    pub fn unknown(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::UnknownReference {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a malformed provider payload error
    pub fn malformed_provider(msg: impl Into<String>) -> Self {
        Self::MalformedProviderPayload(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Integrity errors signal a broken invariant and must never be retried
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            Self::PositionOccupiedAfterShift { .. } | Self::DuplicateCode { .. }
        )
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for MixtapeError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
