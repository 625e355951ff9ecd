use crate::codes;
use crate::error::coded_insert_error;
use chrono::Utc;
use mixtape_core::{error::Result, types::*, MixtapeError};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

fn genre_from_row(row: &SqliteRow) -> Result<Genre> {
    Ok(Genre {
        id: row.try_get("id")?,
        code: Code::parse(CodeKind::Genre, row.try_get::<String, _>("code")?)?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Genre>> {
    let rows = sqlx::query("SELECT id, code, name, created_at FROM genre ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter().map(genre_from_row).collect()
}

pub async fn get_by_id(pool: &SqlitePool, id: GenreId) -> Result<Option<Genre>> {
    let row = sqlx::query("SELECT id, code, name, created_at FROM genre WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(genre_from_row).transpose()
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Genre>> {
    let row = sqlx::query("SELECT id, code, name, created_at FROM genre WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(genre_from_row).transpose()
}

pub async fn create(pool: &SqlitePool, genre: CreateGenre) -> Result<Genre> {
    if genre.name.trim().is_empty() {
        return Err(MixtapeError::invalid_input("genre name must not be empty"));
    }

    let mut tx = pool.begin().await?;
    let code = codes::allocate(&mut tx, CodeKind::Genre).await?;

    let id = GenreId::generate();
    let created_at = Utc::now();

    sqlx::query("INSERT INTO genre (id, code, name, created_at) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(code.as_str())
        .bind(&genre.name)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| coded_insert_error(e, "genre", CodeKind::Genre, &code))?;

    tx.commit().await?;
    debug!(%id, %code, "created genre");

    Ok(Genre {
        id,
        code,
        name: genre.name,
        created_at,
    })
}
