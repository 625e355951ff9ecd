use crate::codes;
use crate::error::{coded_insert_error, violation, Violation};
use chrono::Utc;
use mixtape_core::{error::Result, types::*, MixtapeError};
use sqlx::{sqlite::SqliteRow, Row, SqliteExecutor, SqlitePool};
use tracing::{debug, info};

const TRACK_COLUMNS: &str = "id, code, title, genre_id, release_date, created_at, modified_at";

fn track_from_row(row: &SqliteRow) -> Result<Track> {
    Ok(Track {
        id: row.try_get("id")?,
        code: Code::parse(CodeKind::Track, row.try_get::<String, _>("code")?)?,
        title: row.try_get("title")?,
        genre_id: row.try_get("genre_id")?,
        release_date: row.try_get("release_date")?,
        created_at: row.try_get("created_at")?,
        modified_at: row.try_get("modified_at")?,
    })
}

/// Get all tracks, alphabetical
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Track>> {
    let rows = sqlx::query(&format!("SELECT {TRACK_COLUMNS} FROM track ORDER BY title, code"))
        .fetch_all(pool)
        .await?;

    rows.iter().map(track_from_row).collect()
}

pub async fn get_by_id(pool: &SqlitePool, id: TrackId) -> Result<Option<Track>> {
    let row = sqlx::query(&format!("SELECT {TRACK_COLUMNS} FROM track WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(track_from_row).transpose()
}

pub async fn find_by_code(pool: &SqlitePool, code: &Code) -> Result<Option<Track>> {
    let row = sqlx::query(&format!("SELECT {TRACK_COLUMNS} FROM track WHERE code = ?"))
        .bind(code.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(track_from_row).transpose()
}

/// Tracks of a genre
pub async fn get_by_genre(pool: &SqlitePool, genre_id: GenreId) -> Result<Vec<Track>> {
    let rows = sqlx::query(&format!(
        "SELECT {TRACK_COLUMNS} FROM track WHERE genre_id = ? ORDER BY title, code"
    ))
    .bind(genre_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(track_from_row).collect()
}

pub async fn create(pool: &SqlitePool, track: CreateTrack) -> Result<Track> {
    if track.title.trim().is_empty() {
        return Err(MixtapeError::invalid_input("track title must not be empty"));
    }

    let mut tx = pool.begin().await?;
    let code = codes::allocate(&mut tx, CodeKind::Track).await?;

    let id = TrackId::generate();
    let created_at = Utc::now();

    sqlx::query(
        "INSERT INTO track (id, code, title, genre_id, release_date, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(code.as_str())
    .bind(&track.title)
    .bind(track.genre_id)
    .bind(track.release_date)
    .bind(created_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| match (violation(&e), track.genre_id) {
        (Some(Violation::ForeignKey), Some(genre_id)) => MixtapeError::unknown("genre", genre_id),
        _ => coded_insert_error(e, "track", CodeKind::Track, &code),
    })?;

    tx.commit().await?;
    debug!(%id, %code, "created track");

    Ok(Track {
        id,
        code,
        title: track.title,
        genre_id: track.genre_id,
        release_date: track.release_date,
        created_at,
        modified_at: None,
    })
}

/// Apply the set fields of `changes` and stamp `modified_at`
pub async fn update(pool: &SqlitePool, id: TrackId, changes: UpdateTrack) -> Result<Track> {
    if changes
        .title
        .as_deref()
        .is_some_and(|title| title.trim().is_empty())
    {
        return Err(MixtapeError::invalid_input("track title must not be empty"));
    }

    let mut tx = pool.begin().await?;

    // COALESCE keeps the column when the parameter is NULL; the flags
    // distinguish "leave alone" from "clear"
    let result = sqlx::query(
        "UPDATE track SET
            title = COALESCE(?, title),
            genre_id = CASE WHEN ? THEN ? ELSE genre_id END,
            release_date = CASE WHEN ? THEN ? ELSE release_date END,
            modified_at = ?
         WHERE id = ?",
    )
    .bind(changes.title.as_deref())
    .bind(changes.genre_id.is_some())
    .bind(changes.genre_id.flatten())
    .bind(changes.release_date.is_some())
    .bind(changes.release_date.flatten())
    .bind(Utc::now())
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| match (violation(&e), changes.genre_id.flatten()) {
        (Some(Violation::ForeignKey), Some(genre_id)) => MixtapeError::unknown("genre", genre_id),
        _ => e.into(),
    })?;

    if result.rows_affected() == 0 {
        return Err(MixtapeError::unknown("track", id));
    }

    let row = sqlx::query(&format!("SELECT {TRACK_COLUMNS} FROM track WHERE id = ?"))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    let track = track_from_row(&row)?;

    tx.commit().await?;
    Ok(track)
}

/// Assign or clear the genre of a track
pub async fn set_genre(pool: &SqlitePool, id: TrackId, genre_id: Option<GenreId>) -> Result<Track> {
    update(
        pool,
        id,
        UpdateTrack {
            genre_id: Some(genre_id),
            ..Default::default()
        },
    )
    .await
}

/// Delete a track.
///
/// Providers, credits and every playlist entry pointing at the track go with
/// it; the playlists keep a gap where the entry was.
pub async fn delete(pool: &SqlitePool, id: TrackId) -> Result<()> {
    let result = sqlx::query("DELETE FROM track WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MixtapeError::unknown("track", id));
    }

    info!(%id, "deleted track");
    Ok(())
}

pub(crate) async fn exists<'e>(executor: impl SqliteExecutor<'e>, id: TrackId) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM track WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.is_some())
}
