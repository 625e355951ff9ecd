//! Playlist entries and position maintenance
//!
//! Positions are unique per playlist but need not be contiguous. Inserting
//! at an occupied position moves the contiguous run starting there one slot
//! later; entries beyond the first gap stay put. Removal never compacts.
//!
//! Every write opens with a write statement (stamping the playlist or
//! deleting the entry) so the transaction holds SQLite's writer lock before
//! it reads the positions it is about to shift.

use crate::error::{violation, Violation};
use crate::{playlists, resolve, tracks};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use mixtape_core::{error::Result, types::*, MixtapeError};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use tracing::{debug, error};

const ENTRY_COLUMNS: &str = "id, playlist_id, position, track_id, sub_playlist_id";

fn entry_from_row(row: &SqliteRow) -> Result<PlaylistEntry> {
    let position: i64 = row.try_get("position")?;
    let position = u32::try_from(position)
        .map_err(|_| MixtapeError::Database(format!("entry position {position} out of range")))?;

    Ok(PlaylistEntry {
        id: row.try_get("id")?,
        playlist_id: row.try_get("playlist_id")?,
        position,
        content: EntryContent::from_parts(row.try_get("track_id")?, row.try_get("sub_playlist_id")?)?,
    })
}

/// Get entry by ID
pub async fn get_by_id(pool: &SqlitePool, id: EntryId) -> Result<Option<PlaylistEntry>> {
    let row = sqlx::query(&format!("SELECT {ENTRY_COLUMNS} FROM playlist_entry WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(entry_from_row).transpose()
}

/// Entries of a playlist by ascending position
pub async fn get_by_playlist(pool: &SqlitePool, playlist_id: PlaylistId) -> Result<Vec<PlaylistEntry>> {
    stream(pool, playlist_id).try_collect().await
}

/// Entries of a playlist by ascending position, fetched lazily.
///
/// Each call runs a fresh query, so the stream can be restarted by calling
/// again.
pub fn stream(pool: &SqlitePool, playlist_id: PlaylistId) -> BoxStream<'_, Result<PlaylistEntry>> {
    sqlx::query(
        "SELECT id, playlist_id, position, track_id, sub_playlist_id
         FROM playlist_entry
         WHERE playlist_id = ?
         ORDER BY position",
    )
    .bind(playlist_id)
    .fetch(pool)
    .map(|row| entry_from_row(&row?))
    .boxed()
}

/// Insert an entry at `position`
pub async fn insert(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    position: u32,
    content: EntryContent,
    reject_cycles: bool,
) -> Result<PlaylistEntry> {
    let mut tx = pool.begin().await?;
    playlists::touch(&mut tx, playlist_id).await?;

    let entry = PlaylistEntry {
        id: EntryId::generate(),
        playlist_id,
        position,
        content,
    };
    place(&mut tx, &entry, reject_cycles).await?;

    tx.commit().await?;
    debug!(id = %entry.id, %playlist_id, position, "inserted entry");
    Ok(entry)
}

/// Insert an entry after the current last one (at 0 in an empty playlist)
pub async fn append(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    content: EntryContent,
    reject_cycles: bool,
) -> Result<PlaylistEntry> {
    let mut tx = pool.begin().await?;
    playlists::touch(&mut tx, playlist_id).await?;

    let last: Option<i64> =
        sqlx::query_scalar("SELECT MAX(position) FROM playlist_entry WHERE playlist_id = ?")
            .bind(playlist_id)
            .fetch_one(&mut *tx)
            .await?;

    let position = match last {
        None => 0,
        Some(last) => u32::try_from(last + 1)
            .map_err(|_| MixtapeError::invalid_input("playlist has no position left to append at"))?,
    };

    let entry = PlaylistEntry {
        id: EntryId::generate(),
        playlist_id,
        position,
        content,
    };
    place(&mut tx, &entry, reject_cycles).await?;

    tx.commit().await?;
    debug!(id = %entry.id, %playlist_id, position, "appended entry");
    Ok(entry)
}

/// Move an entry to `new_position`, keeping its id.
///
/// The entry is lifted out first, so its old slot becomes a gap, then placed
/// with the same shifting rule as an insert.
pub async fn move_to(
    pool: &SqlitePool,
    id: EntryId,
    new_position: u32,
    reject_cycles: bool,
) -> Result<PlaylistEntry> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query(
        "DELETE FROM playlist_entry WHERE id = ?
         RETURNING id, playlist_id, position, track_id, sub_playlist_id",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| MixtapeError::unknown("entry", id))?;
    let current = entry_from_row(&row)?;

    if current.position == new_position {
        // Dropping the transaction puts the row back
        return Ok(current);
    }

    playlists::touch(&mut tx, current.playlist_id).await?;

    let entry = PlaylistEntry {
        position: new_position,
        ..current
    };
    place(&mut tx, &entry, reject_cycles).await?;

    tx.commit().await?;
    debug!(%id, from = current.position, to = new_position, "moved entry");
    Ok(entry)
}

/// Remove an entry; later entries keep their positions
pub async fn remove(pool: &SqlitePool, id: EntryId) -> Result<()> {
    let mut tx = pool.begin().await?;

    let playlist_id: PlaylistId =
        sqlx::query_scalar("DELETE FROM playlist_entry WHERE id = ? RETURNING playlist_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| MixtapeError::unknown("entry", id))?;

    playlists::touch(&mut tx, playlist_id).await?;

    tx.commit().await?;
    debug!(%id, %playlist_id, "removed entry");
    Ok(())
}

/// Check references, make room at the entry's position and write the row.
///
/// The caller holds the writer lock.
async fn place(conn: &mut SqliteConnection, entry: &PlaylistEntry, reject_cycles: bool) -> Result<()> {
    match entry.content {
        EntryContent::Track(track_id) => {
            if !tracks::exists(&mut *conn, track_id).await? {
                return Err(MixtapeError::unknown("track", track_id));
            }
        }
        EntryContent::Playlist(child) => {
            let exists = sqlx::query("SELECT 1 FROM playlist WHERE id = ?")
                .bind(child)
                .fetch_optional(&mut *conn)
                .await?
                .is_some();
            if !exists {
                return Err(MixtapeError::unknown("playlist", child));
            }
            if reject_cycles {
                resolve::ensure_acyclic(&mut *conn, entry.playlist_id, child).await?;
            }
        }
    }

    shift_run(conn, entry.playlist_id, entry.position).await?;

    let (track_id, sub_playlist_id) = entry.content.to_parts();
    sqlx::query(
        "INSERT INTO playlist_entry (id, playlist_id, position, track_id, sub_playlist_id)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(entry.id)
    .bind(entry.playlist_id)
    .bind(i64::from(entry.position))
    .bind(track_id)
    .bind(sub_playlist_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| match violation(&e) {
        Some(Violation::Unique(columns)) if columns.contains("position") => {
            error!(playlist = %entry.playlist_id, position = entry.position, "slot still occupied after shift");
            MixtapeError::PositionOccupiedAfterShift {
                playlist: entry.playlist_id,
                position: entry.position,
            }
        }
        Some(Violation::Check) => MixtapeError::InvalidEntryPayload,
        _ => e.into(),
    })?;

    Ok(())
}

/// Move the contiguous run starting at `target` one slot later.
///
/// Done in two statements so no row ever lands on a position another row
/// still holds: the run is first mapped to distinct negative positions, then
/// back to the original position plus one.
async fn shift_run(conn: &mut SqliteConnection, playlist_id: PlaylistId, target: u32) -> Result<()> {
    let start = i64::from(target);

    let positions: Vec<i64> = sqlx::query_scalar(
        "SELECT position FROM playlist_entry
         WHERE playlist_id = ? AND position >= ?
         ORDER BY position",
    )
    .bind(playlist_id)
    .bind(start)
    .fetch_all(&mut *conn)
    .await?;

    let Some(end) = run_end(start, &positions) else {
        return Ok(());
    };
    if end == i64::from(u32::MAX) {
        return Err(MixtapeError::invalid_input(
            "shifting the run would push an entry past the last position",
        ));
    }

    sqlx::query(
        "UPDATE playlist_entry SET position = -position - 1
         WHERE playlist_id = ? AND position BETWEEN ? AND ?",
    )
    .bind(playlist_id)
    .bind(start)
    .bind(end)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "UPDATE playlist_entry SET position = -position
         WHERE playlist_id = ? AND position BETWEEN ? AND ?",
    )
    .bind(playlist_id)
    .bind(-(end + 1))
    .bind(-(start + 1))
    .execute(&mut *conn)
    .await?;

    debug!(%playlist_id, start, end, "shifted run");
    Ok(())
}

/// Last position of the run `start, start + 1, ...` in ascending `positions`
fn run_end(start: i64, positions: &[i64]) -> Option<i64> {
    positions
        .iter()
        .zip(start..)
        .take_while(|(position, expected)| **position == *expected)
        .last()
        .map(|(position, _)| *position)
}
