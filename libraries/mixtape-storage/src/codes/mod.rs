//! Short code allocation
//!
//! One counter row per entity kind. Allocation is a single
//! `UPDATE ... RETURNING` and must be the first write of the creating
//! transaction: it takes SQLite's writer lock, so concurrent creators of the
//! same kind are serialized and can never observe the same counter value.
//! If the creating transaction aborts, the increment is rolled back with it.

use mixtape_core::{error::Result, Code, CodeKind, MixtapeError};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, warn};

/// Allocate the next code of `kind` inside the caller's transaction
pub(crate) async fn allocate(conn: &mut SqliteConnection, kind: CodeKind) -> Result<Code> {
    let row = sqlx::query(
        "UPDATE code_counter SET last_value = last_value + 1
         WHERE kind = ?
         RETURNING last_value",
    )
    .bind(kind.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Err(MixtapeError::Database(format!(
            "no code counter for {kind}; is the schema up to date?"
        )));
    };

    let value: i64 = row.get("last_value");
    let code = kind
        .format(value as u64)
        .inspect_err(|_| warn!(%kind, value, "code space exhausted"))?;

    debug!(%kind, %code, "allocated code");
    Ok(code)
}

/// Last value handed out for `kind` (0 if none yet)
pub async fn last_allocated(pool: &SqlitePool, kind: CodeKind) -> Result<u64> {
    let row = sqlx::query("SELECT last_value FROM code_counter WHERE kind = ?")
        .bind(kind.as_str())
        .fetch_optional(pool)
        .await?;

    Ok(row.map_or(0, |row| row.get::<i64, _>("last_value") as u64))
}

