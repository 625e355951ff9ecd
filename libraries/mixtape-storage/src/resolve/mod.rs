//! Following sub-playlist references
//!
//! Entries may embed other playlists, and nothing in the schema stops a
//! playlist from (indirectly) containing itself. Expansion walks the graph
//! depth first and reports a cycle as soon as a playlist reappears on the
//! current path.

use mixtape_core::{error::Result, types::*, MixtapeError};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

/// Entry contents of one playlist in position order
async fn contents(conn: &mut SqliteConnection, playlist_id: PlaylistId) -> Result<Vec<EntryContent>> {
    let rows: Vec<(Option<TrackId>, Option<PlaylistId>)> = sqlx::query_as(
        "SELECT track_id, sub_playlist_id
         FROM playlist_entry
         WHERE playlist_id = ?
         ORDER BY position",
    )
    .bind(playlist_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter()
        .map(|(track, sub_playlist)| EntryContent::from_parts(track, sub_playlist))
        .collect()
}

/// Tracks the playlist plays, with every sub-playlist expanded in place.
///
/// Reads happen in one transaction so the expansion sees a single snapshot.
pub async fn flatten(pool: &SqlitePool, root: PlaylistId) -> Result<Vec<TrackId>> {
    let mut tx = pool.begin().await?;

    let exists = sqlx::query("SELECT 1 FROM playlist WHERE id = ?")
        .bind(root)
        .fetch_optional(&mut *tx)
        .await?
        .is_some();
    if !exists {
        return Err(MixtapeError::unknown("playlist", root));
    }

    let mut path = vec![root];
    let mut pending = vec![contents(&mut tx, root).await?.into_iter()];
    let mut tracks = Vec::new();

    while let Some(level) = pending.last_mut() {
        match level.next() {
            Some(EntryContent::Track(track_id)) => tracks.push(track_id),
            Some(EntryContent::Playlist(child)) => {
                if path.contains(&child) {
                    warn!(%root, playlist = %child, "cycle while flattening playlist");
                    return Err(MixtapeError::CyclicPlaylist(child));
                }
                path.push(child);
                pending.push(contents(&mut tx, child).await?.into_iter());
            }
            None => {
                pending.pop();
                path.pop();
            }
        }
    }

    tx.commit().await?;
    debug!(%root, tracks = tracks.len(), "flattened playlist");
    Ok(tracks)
}

/// Fail with `CyclicPlaylist` if embedding `child` into `parent` would close
/// a loop, that is if `parent` is `child` or reachable from it.
pub async fn ensure_acyclic(
    conn: &mut SqliteConnection,
    parent: PlaylistId,
    child: PlaylistId,
) -> Result<()> {
    let mut seen = HashSet::from([child]);
    let mut queue = VecDeque::from([child]);

    while let Some(current) = queue.pop_front() {
        if current == parent {
            debug!(%parent, %child, "rejecting cyclic sub-playlist");
            return Err(MixtapeError::CyclicPlaylist(parent));
        }

        let nested: Vec<PlaylistId> = sqlx::query_scalar(
            "SELECT DISTINCT sub_playlist_id
             FROM playlist_entry
             WHERE playlist_id = ? AND sub_playlist_id IS NOT NULL",
        )
        .bind(current)
        .fetch_all(&mut *conn)
        .await?;

        for id in nested {
            if seen.insert(id) {
                queue.push_back(id);
            }
        }
    }

    Ok(())
}
