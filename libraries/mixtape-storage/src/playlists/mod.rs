use crate::codes;
use crate::error::{coded_insert_error, violation, Violation};
use chrono::{DateTime, Utc};
use mixtape_core::{error::Result, types::*, MixtapeError};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use tracing::{debug, info};

const PLAYLIST_COLUMNS: &str =
    "id, code, title, external_kind, external_id, created_at, modified_at";

fn playlist_from_row(row: &SqliteRow) -> Result<Playlist> {
    let external_kind: Option<String> = row.try_get("external_kind")?;
    let external_id: Option<String> = row.try_get("external_id")?;

    let external = match (external_kind, external_id) {
        (Some(kind), Some(external_id)) => Some(ExternalRef {
            kind: ExternalKind::from_str(&kind).ok_or_else(|| {
                MixtapeError::Database(format!("unknown external playlist kind '{kind}'"))
            })?,
            external_id,
        }),
        _ => None,
    };

    Ok(Playlist {
        id: row.try_get("id")?,
        code: Code::parse(CodeKind::Playlist, row.try_get::<String, _>("code")?)?,
        title: row.try_get("title")?,
        external,
        created_at: row.try_get("created_at")?,
        modified_at: row.try_get("modified_at")?,
    })
}

/// Get all playlists
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Playlist>> {
    let rows = sqlx::query(&format!(
        "SELECT {PLAYLIST_COLUMNS} FROM playlist ORDER BY created_at DESC, code DESC"
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(playlist_from_row).collect()
}

/// Get playlist by ID
pub async fn get_by_id(pool: &SqlitePool, id: PlaylistId) -> Result<Option<Playlist>> {
    let row = sqlx::query(&format!("SELECT {PLAYLIST_COLUMNS} FROM playlist WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(playlist_from_row).transpose()
}

/// Get playlist by short code
pub async fn find_by_code(pool: &SqlitePool, code: &Code) -> Result<Option<Playlist>> {
    let row = sqlx::query(&format!("SELECT {PLAYLIST_COLUMNS} FROM playlist WHERE code = ?"))
        .bind(code.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(playlist_from_row).transpose()
}

/// Create a new playlist
pub async fn create(pool: &SqlitePool, playlist: CreatePlaylist) -> Result<Playlist> {
    if playlist.title.trim().is_empty() {
        return Err(MixtapeError::invalid_input("playlist title must not be empty"));
    }

    let mut tx = pool.begin().await?;
    let code = codes::allocate(&mut tx, CodeKind::Playlist).await?;

    let id = PlaylistId::generate();
    let created_at = Utc::now();
    insert_row(&mut tx, id, &code, &playlist.title, playlist.external.as_ref(), created_at)
        .await?;

    tx.commit().await?;
    debug!(%id, %code, "created playlist");

    Ok(Playlist {
        id,
        code,
        title: playlist.title,
        external: playlist.external,
        created_at,
        modified_at: None,
    })
}

async fn insert_row(
    conn: &mut SqliteConnection,
    id: PlaylistId,
    code: &Code,
    title: &str,
    external: Option<&ExternalRef>,
    created_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO playlist (id, code, title, external_kind, external_id, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(code.as_str())
    .bind(title)
    .bind(external.map(|e| e.kind.as_str()))
    .bind(external.map(|e| e.external_id.as_str()))
    .bind(created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| coded_insert_error(e, "playlist", CodeKind::Playlist, code))?;

    Ok(())
}

/// Update title and external reference.
///
/// The stored `modified_at` is read under the writer lock and compared with
/// `expected_modified_at`; a newer stored value fails with `OutdatedState`.
pub async fn update(pool: &SqlitePool, id: PlaylistId, changes: UpdatePlaylist) -> Result<Playlist> {
    if changes
        .title
        .as_deref()
        .is_some_and(|title| title.trim().is_empty())
    {
        return Err(MixtapeError::invalid_input("playlist title must not be empty"));
    }

    let mut tx = pool.begin().await?;

    // No-op write: takes the lock and hands back the stored stamp
    let row = sqlx::query(
        "UPDATE playlist SET modified_at = modified_at WHERE id = ? RETURNING modified_at",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| MixtapeError::unknown("playlist", id))?;

    let stored: Option<DateTime<Utc>> = row.try_get("modified_at")?;
    if let Some(stored) = stored {
        if changes.expected_modified_at.map_or(true, |seen| stored > seen) {
            debug!(%id, %stored, "refusing update of outdated playlist");
            return Err(MixtapeError::OutdatedState(stored));
        }
    }

    let external = changes.external.as_ref();
    sqlx::query(
        "UPDATE playlist SET
            title = COALESCE(?, title),
            external_kind = CASE WHEN ? THEN ? ELSE external_kind END,
            external_id = CASE WHEN ? THEN ? ELSE external_id END,
            modified_at = ?
         WHERE id = ?",
    )
    .bind(changes.title.as_deref())
    .bind(external.is_some())
    .bind(external.and_then(|e| e.as_ref()).map(|e| e.kind.as_str()))
    .bind(external.is_some())
    .bind(external.and_then(|e| e.as_ref()).map(|e| e.external_id.as_str()))
    .bind(Utc::now())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let row = sqlx::query(&format!("SELECT {PLAYLIST_COLUMNS} FROM playlist WHERE id = ?"))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    let playlist = playlist_from_row(&row)?;

    tx.commit().await?;
    Ok(playlist)
}

/// Delete playlist.
///
/// Its own entries go with it, and so does every entry of another playlist
/// that embedded it.
pub async fn delete(pool: &SqlitePool, id: PlaylistId) -> Result<()> {
    let result = sqlx::query("DELETE FROM playlist WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MixtapeError::unknown("playlist", id));
    }

    info!(%id, "deleted playlist");
    Ok(())
}

/// Copy a playlist under a new id and code.
///
/// Entries are copied with fresh ids at the same positions. The copy is a
/// local playlist: the external reference stays with the source.
pub async fn duplicate(pool: &SqlitePool, id: PlaylistId, title: String) -> Result<Playlist> {
    if title.trim().is_empty() {
        return Err(MixtapeError::invalid_input("playlist title must not be empty"));
    }

    let mut tx = pool.begin().await?;
    let code = codes::allocate(&mut tx, CodeKind::Playlist).await?;

    let exists = sqlx::query("SELECT 1 FROM playlist WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .is_some();
    if !exists {
        return Err(MixtapeError::unknown("playlist", id));
    }

    let copy_id = PlaylistId::generate();
    let created_at = Utc::now();
    insert_row(&mut tx, copy_id, &code, &title, None, created_at).await?;

    let entries = sqlx::query(
        "SELECT position, track_id, sub_playlist_id
         FROM playlist_entry
         WHERE playlist_id = ?
         ORDER BY position",
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;

    for entry in &entries {
        sqlx::query(
            "INSERT INTO playlist_entry (id, playlist_id, position, track_id, sub_playlist_id)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(EntryId::generate())
        .bind(copy_id)
        .bind(entry.try_get::<i64, _>("position")?)
        .bind(entry.try_get::<Option<TrackId>, _>("track_id")?)
        .bind(entry.try_get::<Option<PlaylistId>, _>("sub_playlist_id")?)
        .execute(&mut *tx)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::Check) => MixtapeError::InvalidEntryPayload,
            _ => e.into(),
        })?;
    }

    tx.commit().await?;
    info!(source = %id, %copy_id, %code, entries = entries.len(), "duplicated playlist");

    Ok(Playlist {
        id: copy_id,
        code,
        title,
        external: None,
        created_at,
        modified_at: None,
    })
}

/// Stamp `modified_at` as the opening write of an entry transaction.
///
/// Fails with `UnknownReference` when the playlist does not exist.
pub(crate) async fn touch(conn: &mut SqliteConnection, id: PlaylistId) -> Result<()> {
    let result = sqlx::query("UPDATE playlist SET modified_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MixtapeError::unknown("playlist", id));
    }
    Ok(())
}
