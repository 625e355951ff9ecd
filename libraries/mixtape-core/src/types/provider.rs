//! Track providers
//!
//! A provider records one place the audio for a track can be obtained from.
//! The source is a typed one-of: each kind owns its own payload shape, and the
//! persisted layout keeps one nullable column per kind. Converting between the
//! two rejects rows with zero or several populated columns.

use super::{ProviderId, TrackId};
use crate::error::{MixtapeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Kind of a provider source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Local,
    Url,
    Spotify,
    Youtube,
}

impl ProviderKind {
    /// Convert kind to string for database storage
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Local => "local",
            ProviderKind::Url => "url",
            ProviderKind::Spotify => "spotify",
            ProviderKind::Youtube => "youtube",
        }
    }

    /// Parse kind from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "local" => Some(ProviderKind::Local),
            "url" => Some(ProviderKind::Url),
            "spotify" => Some(ProviderKind::Spotify),
            "youtube" => Some(ProviderKind::Youtube),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the audio for a track comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSource {
    /// File on the local filesystem
    Local(PathBuf),
    /// Directly downloadable URL
    Url(Url),
    /// Spotify track id
    Spotify(String),
    /// YouTube video id
    Youtube(String),
}

impl ProviderSource {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderSource::Local(_) => ProviderKind::Local,
            ProviderSource::Url(_) => ProviderKind::Url,
            ProviderSource::Spotify(_) => ProviderKind::Spotify,
            ProviderSource::Youtube(_) => ProviderKind::Youtube,
        }
    }

    /// Build a source from a kind and its raw textual payload
    pub fn parse(kind: ProviderKind, raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(MixtapeError::malformed_provider(format!(
                "empty payload for {kind} provider"
            )));
        }
        // Stored payloads must read back unchanged, so whitespace is refused
        // rather than trimmed.
        if raw.trim() != raw {
            return Err(MixtapeError::malformed_provider(format!(
                "{kind} payload '{raw}' has surrounding whitespace"
            )));
        }

        Ok(match kind {
            ProviderKind::Local => ProviderSource::Local(PathBuf::from(raw)),
            ProviderKind::Url => ProviderSource::Url(Url::parse(raw).map_err(|e| {
                MixtapeError::malformed_provider(format!("invalid URL '{raw}': {e}"))
            })?),
            ProviderKind::Spotify => ProviderSource::Spotify(raw.to_string()),
            ProviderKind::Youtube => ProviderSource::Youtube(raw.to_string()),
        })
    }

    /// Rebuild a source from its per-kind columns.
    ///
    /// Exactly one column must be populated and it must be the one belonging
    /// to `kind`.
    pub fn from_columns(kind: ProviderKind, columns: ProviderColumns) -> Result<Self> {
        let populated: Vec<ProviderKind> = [
            (ProviderKind::Local, columns.local_path.is_some()),
            (ProviderKind::Url, columns.url.is_some()),
            (ProviderKind::Spotify, columns.spotify_id.is_some()),
            (ProviderKind::Youtube, columns.youtube_id.is_some()),
        ]
        .into_iter()
        .filter_map(|(k, set)| set.then_some(k))
        .collect();

        match populated.as_slice() {
            [] => Err(MixtapeError::malformed_provider(format!(
                "{kind} provider has no payload"
            ))),
            [only] if *only != kind => Err(MixtapeError::malformed_provider(format!(
                "{kind} provider carries a {only} payload"
            ))),
            [_] => {
                let raw = match kind {
                    ProviderKind::Local => columns.local_path,
                    ProviderKind::Url => columns.url,
                    ProviderKind::Spotify => columns.spotify_id,
                    ProviderKind::Youtube => columns.youtube_id,
                };
                Self::parse(kind, raw.as_deref().unwrap_or_default())
            }
            many => Err(MixtapeError::malformed_provider(format!(
                "{kind} provider has {} payloads populated",
                many.len()
            ))),
        }
    }

    /// Split the source into its per-kind columns
    pub fn to_columns(&self) -> ProviderColumns {
        let mut columns = ProviderColumns::default();
        match self {
            ProviderSource::Local(path) => {
                columns.local_path = Some(path.to_string_lossy().into_owned());
            }
            ProviderSource::Url(url) => columns.url = Some(url.to_string()),
            ProviderSource::Spotify(id) => columns.spotify_id = Some(id.clone()),
            ProviderSource::Youtube(id) => columns.youtube_id = Some(id.clone()),
        }
        columns
    }
}

/// Per-kind payload columns of the persisted layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderColumns {
    pub local_path: Option<String>,
    pub url: Option<String>,
    pub spotify_id: Option<String>,
    pub youtube_id: Option<String>,
}

/// A provider attached to a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProviderRecord", into = "ProviderRecord")]
pub struct Provider {
    pub id: ProviderId,
    pub track_id: TrackId,
    pub source: ProviderSource,
}

impl Provider {
    pub fn kind(&self) -> ProviderKind {
        self.source.kind()
    }
}

/// Persisted layout of a provider row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub id: ProviderId,
    pub track_id: TrackId,
    pub kind: ProviderKind,
    #[serde(flatten)]
    pub columns: ProviderColumns,
}

impl From<Provider> for ProviderRecord {
    fn from(provider: Provider) -> Self {
        Self {
            id: provider.id,
            track_id: provider.track_id,
            kind: provider.source.kind(),
            columns: provider.source.to_columns(),
        }
    }
}

impl TryFrom<ProviderRecord> for Provider {
    type Error = MixtapeError;

    fn try_from(record: ProviderRecord) -> Result<Self> {
        Ok(Self {
            id: record.id,
            track_id: record.track_id,
            source: ProviderSource::from_columns(record.kind, record.columns)?,
        })
    }
}
