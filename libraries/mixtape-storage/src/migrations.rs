//! Versioned schema migrations
//!
//! The schema is described as an ordered list of reversible steps. Each step
//! runs in its own transaction and is recorded in `schema_migrations`, so an
//! external sequencer can move the database forward or backward one version
//! at a time. Every step preserves existing identifiers and entry positions.

use crate::error::{Result, StorageError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

/// A reversible schema migration
#[derive(Debug)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 20_240_301_000_001,
        name: "initial_catalog",
        up: include_str!("../migrations/20240301000001_initial_catalog.up.sql"),
        down: include_str!("../migrations/20240301000001_initial_catalog.down.sql"),
    },
    Migration {
        version: 20_240_412_000_002,
        name: "typed_track_provider",
        up: include_str!("../migrations/20240412000002_typed_track_provider.up.sql"),
        down: include_str!("../migrations/20240412000002_typed_track_provider.down.sql"),
    },
    Migration {
        version: 20_240_520_000_003,
        name: "short_codes",
        up: include_str!("../migrations/20240520000003_short_codes.up.sql"),
        down: include_str!("../migrations/20240520000003_short_codes.down.sql"),
    },
];

/// Version the code in this crate expects
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Direction a migration step was run in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// A migration step that was executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub version: i64,
    pub name: &'static str,
    pub direction: Direction,
}

/// Known migration and whether it is applied
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub version: i64,
    pub name: &'static str,
    pub applied_at: Option<DateTime<Utc>>,
}

async fn ensure_bookkeeping(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Versions recorded as applied, ascending
pub async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i64>> {
    ensure_bookkeeping(pool).await?;

    let rows = sqlx::query("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(|row| row.get("version")).collect())
}

/// Highest applied version, 0 for an empty database
pub async fn current_version(pool: &SqlitePool) -> Result<i64> {
    Ok(applied_versions(pool).await?.last().copied().unwrap_or(0))
}

/// Every known migration with its applied timestamp
pub async fn status(pool: &SqlitePool) -> Result<Vec<MigrationStatus>> {
    ensure_bookkeeping(pool).await?;

    let rows = sqlx::query("SELECT version, applied_at FROM schema_migrations")
        .fetch_all(pool)
        .await?;

    let applied: Vec<(i64, DateTime<Utc>)> = rows
        .iter()
        .map(|row| (row.get("version"), row.get("applied_at")))
        .collect();

    Ok(MIGRATIONS
        .iter()
        .map(|m| MigrationStatus {
            version: m.version,
            name: m.name,
            applied_at: applied
                .iter()
                .find(|(version, _)| *version == m.version)
                .map(|(_, at)| *at),
        })
        .collect())
}

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
pub async fn run_migrations(pool: &SqlitePool) -> Result<Vec<Step>> {
    migrate_to(pool, latest_version()).await
}

/// Apply or revert migrations until `target` is the newest applied version.
///
/// `target` 0 reverts everything.
pub async fn migrate_to(pool: &SqlitePool, target: i64) -> Result<Vec<Step>> {
    if target != 0 && !MIGRATIONS.iter().any(|m| m.version == target) {
        return Err(StorageError::UnknownVersion(target));
    }

    let applied = applied_versions(pool).await?;
    if let Some(unknown) = applied
        .iter()
        .find(|v| !MIGRATIONS.iter().any(|m| m.version == **v))
    {
        warn!(version = unknown, "database carries a migration this build does not know");
        return Err(StorageError::Migration(format!(
            "migration {unknown} is applied but has no definition"
        )));
    }

    let mut steps = Vec::new();

    // Forward: everything up to target that is missing
    for migration in MIGRATIONS.iter().filter(|m| m.version <= target) {
        if !applied.contains(&migration.version) {
            apply(pool, migration, Direction::Up).await?;
            steps.push(Step {
                version: migration.version,
                name: migration.name,
                direction: Direction::Up,
            });
        }
    }

    // Backward: newest first, everything past target that is applied
    for migration in MIGRATIONS.iter().rev().filter(|m| m.version > target) {
        if applied.contains(&migration.version) {
            apply(pool, migration, Direction::Down).await?;
            steps.push(Step {
                version: migration.version,
                name: migration.name,
                direction: Direction::Down,
            });
        }
    }

    Ok(steps)
}

async fn apply(pool: &SqlitePool, migration: &Migration, direction: Direction) -> Result<()> {
    info!(
        version = migration.version,
        name = migration.name,
        ?direction,
        "running migration"
    );

    let mut tx = pool.begin().await?;

    let sql = match direction {
        Direction::Up => migration.up,
        Direction::Down => migration.down,
    };
    sqlx::raw_sql(sql)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Migration(format!("{} ({:?}): {e}", migration.name, direction)))?;

    match direction {
        Direction::Up => {
            sqlx::query("INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)")
                .bind(migration.version)
                .bind(migration.name)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
        }
        Direction::Down => {
            sqlx::query("DELETE FROM schema_migrations WHERE version = ?")
                .bind(migration.version)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}
