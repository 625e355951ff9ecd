//! Integration tests for reversible migrations and schema description


use chrono::Utc;
use mixtape_core::types::*;
use mixtape_storage::migrations::{self, Direction, MIGRATIONS};
use mixtape_storage::{schema, StorageError};
use sqlx::{Row, SqlitePool};
use std::path::PathBuf;
use test_helpers::*;

const INITIAL: i64 = 20_240_301_000_001;
const TYPED_PROVIDERS: i64 = 20_240_412_000_002;

struct Seeded {
    track: TrackId,
    playlist: PlaylistId,
    entries: Vec<(EntryId, i64)>,
    provider: ProviderId,
}

/// Rows written against the first schema version
async fn seed_initial(pool: &SqlitePool) -> Seeded {
    let track = TrackId::generate();
    let playlist = PlaylistId::generate();
    let provider = ProviderId::generate();
    let entries = vec![(EntryId::generate(), 0), (EntryId::generate(), 4)];

    sqlx::query("INSERT INTO track (id, title, created_at) VALUES (?, 'Legacy', ?)")
        .bind(track)
        .bind(Utc::now())
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO playlist (id, title, created_at) VALUES (?, 'Old mix', ?)")
        .bind(playlist)
        .bind(Utc::now())
        .execute(pool)
        .await
        .unwrap();
    for (id, position) in &entries {
        sqlx::query(
            "INSERT INTO playlist_entry (id, playlist_id, position, track_id) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(playlist)
        .bind(position)
        .bind(track)
        .execute(pool)
        .await
        .unwrap();
    }
    sqlx::query(
        "INSERT INTO track_provider (id, track_id, kind, source) VALUES (?, ?, 'local', '/old/a.flac')",
    )
    .bind(provider)
    .bind(track)
    .execute(pool)
    .await
    .unwrap();

    Seeded {
        track,
        playlist,
        entries,
        provider,
    }
}

async fn raw_entries(pool: &SqlitePool, playlist: PlaylistId) -> Vec<(EntryId, i64)> {
    sqlx::query("SELECT id, position FROM playlist_entry WHERE playlist_id = ? ORDER BY position")
        .bind(playlist)
        .fetch_all(pool)
        .await
        .unwrap()
        .iter()
        .map(|row| (row.get("id"), row.get("position")))
        .collect()
}

#[tokio::test]
async fn test_upgrade_preserves_rows_and_backfills_codes() {
    let test_db = TestDb::at_version(INITIAL).await;
    let pool = test_db.pool();
    let seeded = seed_initial(pool).await;

    let steps = mixtape_storage::run_migrations(pool).await.unwrap();
    assert_eq!(steps.len(), MIGRATIONS.len() - 1);
    assert!(steps.iter().all(|s| s.direction == Direction::Up));

    let track = mixtape_storage::tracks::get_by_id(pool, seeded.track).await.unwrap().unwrap();
    assert_eq!(track.code.as_str(), "00000001");

    let playlist = mixtape_storage::playlists::get_by_id(pool, seeded.playlist)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(playlist.code.as_str(), "00001");

    let providers = mixtape_storage::providers::get_by_track(pool, seeded.track).await.unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].id, seeded.provider);
    assert_eq!(
        providers[0].source,
        ProviderSource::Local(PathBuf::from("/old/a.flac"))
    );

    assert_eq!(raw_entries(pool, seeded.playlist).await, seeded.entries);

    // Counters continue after the backfill
    let next = create_test_track(pool, "New").await;
    assert_eq!(next.code.as_str(), "00000002");
}

#[tokio::test]
async fn test_downgrade_round_trip_preserves_rows() {
    let test_db = TestDb::at_version(INITIAL).await;
    let pool = test_db.pool();
    let seeded = seed_initial(pool).await;

    mixtape_storage::run_migrations(pool).await.unwrap();
    let steps = mixtape_storage::migrate_to(pool, INITIAL).await.unwrap();
    assert_eq!(steps.len(), MIGRATIONS.len() - 1);
    assert!(steps.iter().all(|s| s.direction == Direction::Down));
    assert_eq!(migrations::current_version(pool).await.unwrap(), INITIAL);

    let row = sqlx::query("SELECT id, kind, source FROM track_provider WHERE track_id = ?")
        .bind(seeded.track)
        .fetch_one(pool)
        .await
        .unwrap();
    assert_eq!(row.get::<ProviderId, _>("id"), seeded.provider);
    assert_eq!(row.get::<String, _>("kind"), "local");
    assert_eq!(row.get::<String, _>("source"), "/old/a.flac");
    assert_eq!(raw_entries(pool, seeded.playlist).await, seeded.entries);

    // And back up again
    mixtape_storage::run_migrations(pool).await.unwrap();
    assert_eq!(raw_entries(pool, seeded.playlist).await, seeded.entries);
    assert_eq!(
        migrations::current_version(pool).await.unwrap(),
        migrations::latest_version()
    );
}

#[tokio::test]
async fn test_migrate_to_zero_and_status() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let status = migrations::status(pool).await.unwrap();
    assert_eq!(status.len(), MIGRATIONS.len());
    assert!(status.iter().all(|s| s.applied_at.is_some()));

    mixtape_storage::migrate_to(pool, 0).await.unwrap();
    assert!(migrations::applied_versions(pool).await.unwrap().is_empty());

    let description = schema::describe(pool).await.unwrap();
    assert_eq!(description.version, 0);
    assert!(description.table("track").is_none());

    // Running again is a no-op
    assert!(mixtape_storage::run_migrations(pool).await.unwrap().len() == MIGRATIONS.len());
    assert!(mixtape_storage::run_migrations(pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_target_version() {
    let test_db = TestDb::new().await;

    let result = mixtape_storage::migrate_to(test_db.pool(), 42).await;
    assert!(matches!(result, Err(StorageError::UnknownVersion(42))));
}

#[tokio::test]
async fn test_describe_reflects_typed_providers() {
    let test_db = TestDb::at_version(TYPED_PROVIDERS).await;
    let pool = test_db.pool();

    let description = schema::describe(pool).await.unwrap();
    assert_eq!(description.version, TYPED_PROVIDERS);

    let providers = description.table("track_provider").unwrap();
    assert!(providers.column("local_path").is_some());
    assert!(providers.column("source").is_none());
    assert!(description.table("code_counter").is_none());

    mixtape_storage::run_migrations(pool).await.unwrap();
    let description = schema::describe(pool).await.unwrap();

    let entries = description.table("playlist_entry").unwrap();
    assert!(entries.column("position").unwrap().not_null);
    assert!(entries
        .indexes
        .iter()
        .any(|i| i.unique && i.columns == ["playlist_id", "position"]));

    let tracks = description.table("track").unwrap();
    assert!(tracks.indexes.iter().any(|i| i.name == "idx_track_code" && i.unique));

    let json = serde_json::to_value(&description).unwrap();
    assert!(json["tables"].is_array());
}
