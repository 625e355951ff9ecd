//! Operator commands
//!
//! Each command returns plain data; rendering is left to the binary.

use crate::error::{AdminError, Result};
use mixtape_core::{
    storage::StorageContext, Code, CodeKind, EntryContent, Playlist, PlaylistEntry, PlaylistId,
    Track, TrackId,
};
use mixtape_storage::migrations::{self, MigrationStatus, Step};
use mixtape_storage::schema::{self, SchemaDescription};
use mixtape_storage::LocalStorageContext;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

/// Apply migrations up to `target`, or all of them
pub async fn migrate(pool: &SqlitePool, target: Option<i64>) -> Result<Vec<Step>> {
    let steps = match target {
        Some(target) => mixtape_storage::migrate_to(pool, target).await?,
        None => mixtape_storage::run_migrations(pool).await?,
    };
    info!(steps = steps.len(), "migrations done");
    Ok(steps)
}

/// Revert migrations newer than `target`.
///
/// A target above the current version is refused; going forward is `migrate`.
pub async fn revert(pool: &SqlitePool, target: i64) -> Result<Vec<Step>> {
    let current = migrations::current_version(pool).await?;
    if target > current {
        return Err(AdminError::InvalidArgument(format!(
            "cannot revert to {target}: schema is at version {current}"
        )));
    }

    let steps = mixtape_storage::migrate_to(pool, target).await?;
    info!(steps = steps.len(), target, "revert done");
    Ok(steps)
}

/// Every known migration with its applied timestamp
pub async fn status(pool: &SqlitePool) -> Result<Vec<MigrationStatus>> {
    Ok(migrations::status(pool).await?)
}

/// Structural description of the live schema
pub async fn describe(pool: &SqlitePool) -> Result<SchemaDescription> {
    Ok(schema::describe(pool).await?)
}

/// A playlist expanded into the tracks it plays
#[derive(Debug, Clone, Serialize)]
pub struct Resolved {
    pub playlist: Playlist,
    pub tracks: Vec<Track>,
}

/// Find a playlist by UUID or short code
pub async fn find_playlist(storage: &LocalStorageContext, reference: &str) -> Result<Playlist> {
    let found = if let Ok(id) = reference.parse::<PlaylistId>() {
        storage.get_playlist(id).await?
    } else {
        let code = Code::parse(CodeKind::Playlist, reference)?;
        storage.find_playlist_by_code(&code).await?
    };

    found.ok_or_else(|| AdminError::NotFound(format!("playlist '{reference}'")))
}

/// Find a track by UUID or short code
pub async fn find_track(storage: &LocalStorageContext, reference: &str) -> Result<Track> {
    let found = if let Ok(id) = reference.parse::<TrackId>() {
        storage.get_track(id).await?
    } else {
        let code = Code::parse(CodeKind::Track, reference)?;
        storage.find_track_by_code(&code).await?
    };

    found.ok_or_else(|| AdminError::NotFound(format!("track '{reference}'")))
}

/// What `append` adds to a playlist
#[derive(Debug, Clone)]
pub enum AppendTarget {
    Track(String),
    Playlist(String),
}

/// Append a track or a sub-playlist to the end of a playlist.
///
/// Goes through the storage context, so its cycle rejection setting applies.
pub async fn append(
    storage: &LocalStorageContext,
    playlist: &str,
    target: AppendTarget,
) -> Result<PlaylistEntry> {
    let playlist = find_playlist(storage, playlist).await?;
    let content = match target {
        AppendTarget::Track(reference) => {
            EntryContent::Track(find_track(storage, &reference).await?.id)
        }
        AppendTarget::Playlist(reference) => {
            EntryContent::Playlist(find_playlist(storage, &reference).await?.id)
        }
    };

    let entry = storage.append_entry(playlist.id, content).await?;
    info!(playlist = %playlist.id, position = entry.position, "appended entry");
    Ok(entry)
}

/// Expand a playlist, sub-playlists included, into its tracks
pub async fn resolve(storage: &LocalStorageContext, reference: &str) -> Result<Resolved> {
    let playlist = find_playlist(storage, reference).await?;
    let track_ids = storage.flatten_playlist(playlist.id).await?;

    let mut tracks = Vec::with_capacity(track_ids.len());
    for id in track_ids {
        let track = storage
            .get_track(id)
            .await?
            .ok_or_else(|| AdminError::NotFound(format!("track {id}")))?;
        tracks.push(track);
    }

    Ok(Resolved { playlist, tracks })
}
