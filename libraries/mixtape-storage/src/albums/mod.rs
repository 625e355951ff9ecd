use crate::codes;
use crate::error::{coded_insert_error, violation, Violation};
use chrono::Utc;
use mixtape_core::{error::Result, types::*, MixtapeError};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

fn album_from_row(row: &SqliteRow) -> Result<Album> {
    Ok(Album {
        id: row.try_get("id")?,
        code: Code::parse(CodeKind::Album, row.try_get::<String, _>("code")?)?,
        name: row.try_get("name")?,
        release_date: row.try_get("release_date")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Album>> {
    let rows = sqlx::query(
        "SELECT id, code, name, release_date, created_at FROM album ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(album_from_row).collect()
}

pub async fn get_by_id(pool: &SqlitePool, id: AlbumId) -> Result<Option<Album>> {
    let row = sqlx::query(
        "SELECT id, code, name, release_date, created_at FROM album WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(album_from_row).transpose()
}

pub async fn create(pool: &SqlitePool, album: CreateAlbum) -> Result<Album> {
    if album.name.trim().is_empty() {
        return Err(MixtapeError::invalid_input("album name must not be empty"));
    }

    let mut tx = pool.begin().await?;
    let code = codes::allocate(&mut tx, CodeKind::Album).await?;

    let id = AlbumId::generate();
    let created_at = Utc::now();

    sqlx::query(
        "INSERT INTO album (id, code, name, release_date, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(code.as_str())
    .bind(&album.name)
    .bind(album.release_date)
    .bind(created_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| coded_insert_error(e, "album", CodeKind::Album, &code))?;

    tx.commit().await?;
    debug!(%id, %code, "created album");

    Ok(Album {
        id,
        code,
        name: album.name,
        release_date: album.release_date,
        created_at,
    })
}

/// Put a track on an album, replacing its track number if already there
pub async fn add_track(
    pool: &SqlitePool,
    album_id: AlbumId,
    track_id: TrackId,
    track_number: Option<u32>,
) -> Result<()> {
    let result = sqlx::query(
        "INSERT INTO album_track (album_id, track_id, track_number) VALUES (?, ?, ?)
         ON CONFLICT (album_id, track_id) DO UPDATE SET track_number = excluded.track_number",
    )
    .bind(album_id)
    .bind(track_id)
    .bind(track_number.map(i64::from))
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if violation(&e) == Some(Violation::ForeignKey) => {
            if crate::tracks::exists(pool, track_id).await? {
                Err(MixtapeError::unknown("album", album_id))
            } else {
                Err(MixtapeError::unknown("track", track_id))
            }
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn remove_track(pool: &SqlitePool, album_id: AlbumId, track_id: TrackId) -> Result<()> {
    sqlx::query("DELETE FROM album_track WHERE album_id = ? AND track_id = ?")
        .bind(album_id)
        .bind(track_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Tracks of an album; numbered tracks first, in order
pub async fn tracks(pool: &SqlitePool, album_id: AlbumId) -> Result<Vec<AlbumTrack>> {
    let rows = sqlx::query(
        "SELECT album_id, track_id, track_number
         FROM album_track
         WHERE album_id = ?
         ORDER BY track_number IS NULL, track_number, track_id",
    )
    .bind(album_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(AlbumTrack {
                album_id: row.try_get("album_id")?,
                track_id: row.try_get("track_id")?,
                track_number: row
                    .try_get::<Option<i64>, _>("track_number")?
                    .map(|n| n as u32),
            })
        })
        .collect()
}
