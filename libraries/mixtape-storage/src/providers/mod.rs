//! Track providers
//!
//! A provider says where the audio of a track can be obtained. The row layout
//! has one nullable column per kind and the schema enforces that exactly the
//! column matching `kind` is populated.

use crate::error::{violation, Violation};
use mixtape_core::{error::Result, types::*, MixtapeError};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

fn provider_from_row(row: &SqliteRow) -> Result<Provider> {
    let kind: String = row.try_get("kind")?;
    let kind = ProviderKind::from_str(&kind)
        .ok_or_else(|| MixtapeError::malformed_provider(format!("unknown provider kind '{kind}'")))?;

    ProviderRecord {
        id: row.try_get("id")?,
        track_id: row.try_get("track_id")?,
        kind,
        columns: ProviderColumns {
            local_path: row.try_get("local_path")?,
            url: row.try_get("url")?,
            spotify_id: row.try_get("spotify_id")?,
            youtube_id: row.try_get("youtube_id")?,
        },
    }
    .try_into()
}

pub async fn get_by_track(pool: &SqlitePool, track_id: TrackId) -> Result<Vec<Provider>> {
    let rows = sqlx::query(
        "SELECT id, track_id, kind, local_path, url, spotify_id, youtube_id
         FROM track_provider
         WHERE track_id = ?
         ORDER BY kind, id",
    )
    .bind(track_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(provider_from_row).collect()
}

pub async fn get_by_id(pool: &SqlitePool, id: ProviderId) -> Result<Option<Provider>> {
    let row = sqlx::query(
        "SELECT id, track_id, kind, local_path, url, spotify_id, youtube_id
         FROM track_provider
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(provider_from_row).transpose()
}

pub async fn add(pool: &SqlitePool, track_id: TrackId, source: ProviderSource) -> Result<Provider> {
    let id = ProviderId::generate();
    let kind = source.kind();
    let columns = source.to_columns();

    // Only persist what the read path can rebuild unchanged.
    if ProviderSource::from_columns(kind, columns.clone())? != source {
        return Err(MixtapeError::malformed_provider(format!(
            "{kind} payload does not survive storage unchanged"
        )));
    }

    sqlx::query(
        "INSERT INTO track_provider (id, track_id, kind, local_path, url, spotify_id, youtube_id)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(track_id)
    .bind(kind.as_str())
    .bind(&columns.local_path)
    .bind(&columns.url)
    .bind(&columns.spotify_id)
    .bind(&columns.youtube_id)
    .execute(pool)
    .await
    .map_err(|e| match violation(&e) {
        Some(Violation::ForeignKey) => MixtapeError::unknown("track", track_id),
        Some(Violation::Check) => {
            MixtapeError::malformed_provider(format!("{kind} provider rejected by schema"))
        }
        _ => e.into(),
    })?;

    debug!(%id, %track_id, %kind, "added provider");

    Ok(Provider {
        id,
        track_id,
        source,
    })
}

pub async fn remove(pool: &SqlitePool, id: ProviderId) -> Result<()> {
    let result = sqlx::query("DELETE FROM track_provider WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MixtapeError::unknown("provider", id));
    }

    Ok(())
}
