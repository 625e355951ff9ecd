use crate::codes;
use crate::error::{coded_insert_error, violation, Violation};
use chrono::Utc;
use mixtape_core::{error::Result, types::*, MixtapeError};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

fn artist_from_row(row: &SqliteRow) -> Result<Artist> {
    Ok(Artist {
        id: row.try_get("id")?,
        code: Code::parse(CodeKind::Artist, row.try_get::<String, _>("code")?)?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Artist>> {
    let rows = sqlx::query("SELECT id, code, name, created_at FROM artist ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter().map(artist_from_row).collect()
}

pub async fn get_by_id(pool: &SqlitePool, id: ArtistId) -> Result<Option<Artist>> {
    let row = sqlx::query("SELECT id, code, name, created_at FROM artist WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(artist_from_row).transpose()
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Artist>> {
    let row = sqlx::query("SELECT id, code, name, created_at FROM artist WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(artist_from_row).transpose()
}

pub async fn create(pool: &SqlitePool, artist: CreateArtist) -> Result<Artist> {
    if artist.name.trim().is_empty() {
        return Err(MixtapeError::invalid_input("artist name must not be empty"));
    }

    let mut tx = pool.begin().await?;
    let code = codes::allocate(&mut tx, CodeKind::Artist).await?;

    let id = ArtistId::generate();
    let created_at = Utc::now();

    sqlx::query("INSERT INTO artist (id, code, name, created_at) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(code.as_str())
        .bind(&artist.name)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| coded_insert_error(e, "artist", CodeKind::Artist, &code))?;

    tx.commit().await?;
    debug!(%id, %code, "created artist");

    Ok(Artist {
        id,
        code,
        name: artist.name,
        created_at,
    })
}

/// Credit an artist on a track (no-op if already credited)
pub async fn add_to_track(pool: &SqlitePool, track_id: TrackId, artist_id: ArtistId) -> Result<()> {
    let result = sqlx::query("INSERT OR IGNORE INTO track_artist (track_id, artist_id) VALUES (?, ?)")
        .bind(track_id)
        .bind(artist_id)
        .execute(pool)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if violation(&e) == Some(Violation::ForeignKey) => {
            if crate::tracks::exists(pool, track_id).await? {
                Err(MixtapeError::unknown("artist", artist_id))
            } else {
                Err(MixtapeError::unknown("track", track_id))
            }
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn remove_from_track(
    pool: &SqlitePool,
    track_id: TrackId,
    artist_id: ArtistId,
) -> Result<()> {
    sqlx::query("DELETE FROM track_artist WHERE track_id = ? AND artist_id = ?")
        .bind(track_id)
        .bind(artist_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Artists credited on a track
pub async fn get_by_track(pool: &SqlitePool, track_id: TrackId) -> Result<Vec<Artist>> {
    let rows = sqlx::query(
        "SELECT a.id, a.code, a.name, a.created_at
         FROM artist a
         INNER JOIN track_artist ta ON a.id = ta.artist_id
         WHERE ta.track_id = ?
         ORDER BY a.name",
    )
    .bind(track_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(artist_from_row).collect()
}

/// Tracks an artist is credited on
pub async fn track_ids(pool: &SqlitePool, artist_id: ArtistId) -> Result<Vec<TrackId>> {
    let rows = sqlx::query(
        "SELECT ta.track_id
         FROM track_artist ta
         INNER JOIN track t ON t.id = ta.track_id
         WHERE ta.artist_id = ?
         ORDER BY t.title",
    )
    .bind(artist_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| row.try_get("track_id").map_err(Into::into))
        .collect()
}
