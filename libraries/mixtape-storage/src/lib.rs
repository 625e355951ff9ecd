//! Mixtape Storage
//!
//! `SQLite` persistence for the mixtape catalog: tracks and their providers,
//! artists, genres, albums, and playlists whose entries are kept in a
//! stable, gap-tolerant order.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: Each entity owns its own queries and logic
//! - **Writer-first transactions**: every write transaction opens with a
//!   write, so position shifts and code allocation are serialized by
//!   SQLite's writer lock
//! - **Reversible migrations**: the schema can be moved to any known version
//!
//! # Example
//!
//! ```rust,no_run
//! use mixtape_storage::{create_pool, run_migrations, LocalStorageContext, StorageSettings};
//! use mixtape_core::{CreatePlaylist, EntryContent, StorageContext};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = StorageSettings::new("sqlite://mixtape.db");
//! let pool = create_pool(&settings).await?;
//! run_migrations(&pool).await?;
//!
//! let storage = LocalStorageContext::new(pool);
//! let road_trip = storage.create_playlist(CreatePlaylist::new("Road trip")).await?;
//! let favourites = storage.create_playlist(CreatePlaylist::new("Favourites")).await?;
//!
//! // Embed one playlist in another at the front
//! storage
//!     .insert_entry(road_trip.id, 0, EntryContent::Playlist(favourites.id))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
mod error;

// Vertical slices
pub mod albums;
pub mod artists;
pub mod codes;
pub mod entries;
pub mod genres;
pub mod playlists;
pub mod providers;
pub mod resolve;
pub mod tracks;

// Schema management
pub mod migrations;
pub mod schema;

pub use config::StorageSettings;
pub use context::LocalStorageContext;
pub use error::StorageError;
pub use migrations::{migrate_to, run_migrations};

use sqlx::sqlite::SqlitePool;

/// Create a new `SQLite` pool
///
/// WAL journaling with a busy timeout lets readers proceed while a writer
/// holds the lock; foreign keys are enforced on every connection.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the connection fails
pub async fn create_pool(settings: &StorageSettings) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(url = %settings.database_url, "creating pool");

    let options = SqliteConnectOptions::from_str(&settings.database_url)
        .map_err(|e| StorageError::Connection(format!("{}: {e}", settings.database_url)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(settings.busy_timeout());

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

    tracing::info!(
        url = %settings.database_url,
        max_connections = settings.max_connections,
        "pool ready"
    );

    Ok(pool)
}
