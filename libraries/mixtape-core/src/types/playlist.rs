/// Playlist domain types
use super::{Code, EntryId, PlaylistId, TrackId};
use crate::error::{MixtapeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Streaming service a playlist was imported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalKind {
    Spotify,
    Youtube,
}

impl ExternalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExternalKind::Spotify => "spotify",
            ExternalKind::Youtube => "youtube",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "spotify" => Some(ExternalKind::Spotify),
            "youtube" => Some(ExternalKind::Youtube),
            _ => None,
        }
    }
}

impl fmt::Display for ExternalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to the playlist on the external service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalRef {
    pub kind: ExternalKind,
    pub external_id: String,
}

impl ExternalRef {
    pub fn spotify(id: impl Into<String>) -> Self {
        Self {
            kind: ExternalKind::Spotify,
            external_id: id.into(),
        }
    }

    pub fn youtube(id: impl Into<String>) -> Self {
        Self {
            kind: ExternalKind::Youtube,
            external_id: id.into(),
        }
    }
}

/// Playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub code: Code,
    pub title: String,
    pub external: Option<ExternalRef>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Data for creating a new playlist
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePlaylist {
    pub title: String,
    pub external: Option<ExternalRef>,
}

impl CreatePlaylist {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            external: None,
        }
    }
}

/// Data for updating a playlist
///
/// `expected_modified_at` is the `modified_at` the caller last saw. When the
/// stored value is newer the update is refused with `OutdatedState`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlaylist {
    pub title: Option<String>,
    pub external: Option<Option<ExternalRef>>,
    pub expected_modified_at: Option<DateTime<Utc>>,
}

/// What a playlist entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryContent {
    Track(TrackId),
    Playlist(PlaylistId),
}

impl EntryContent {
    /// Build content from the two nullable reference columns.
    ///
    /// Exactly one of them must be set.
    pub fn from_parts(track: Option<TrackId>, sub_playlist: Option<PlaylistId>) -> Result<Self> {
        match (track, sub_playlist) {
            (Some(track), None) => Ok(EntryContent::Track(track)),
            (None, Some(playlist)) => Ok(EntryContent::Playlist(playlist)),
            _ => Err(MixtapeError::InvalidEntryPayload),
        }
    }

    /// Split content into its track / sub-playlist columns
    pub fn to_parts(self) -> (Option<TrackId>, Option<PlaylistId>) {
        match self {
            EntryContent::Track(track) => (Some(track), None),
            EntryContent::Playlist(playlist) => (None, Some(playlist)),
        }
    }

    pub fn track(self) -> Option<TrackId> {
        self.to_parts().0
    }

    pub fn sub_playlist(self) -> Option<PlaylistId> {
        self.to_parts().1
    }
}

/// One ordered element of a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EntryRecord", into = "EntryRecord")]
pub struct PlaylistEntry {
    pub id: EntryId,
    pub playlist_id: PlaylistId,
    pub position: u32,
    pub content: EntryContent,
}

/// Persisted layout of a playlist entry row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: EntryId,
    pub playlist_id: PlaylistId,
    pub position: u32,
    pub track_id: Option<TrackId>,
    pub sub_playlist_id: Option<PlaylistId>,
}

impl From<PlaylistEntry> for EntryRecord {
    fn from(entry: PlaylistEntry) -> Self {
        let (track_id, sub_playlist_id) = entry.content.to_parts();
        Self {
            id: entry.id,
            playlist_id: entry.playlist_id,
            position: entry.position,
            track_id,
            sub_playlist_id,
        }
    }
}

impl TryFrom<EntryRecord> for PlaylistEntry {
    type Error = MixtapeError;

    fn try_from(record: EntryRecord) -> Result<Self> {
        Ok(Self {
            id: record.id,
            playlist_id: record.playlist_id,
            position: record.position,
            content: EntryContent::from_parts(record.track_id, record.sub_playlist_id)?,
        })
    }
}
