//! Integration tests for playlists and their entries
//!
//! Tests playlist operations including:
//! - Position shifting on insert, gaps on removal
//! - Moving entries while keeping their identity
//! - Optimistic concurrency on playlist updates
//! - Duplication and cascading deletes


use futures::StreamExt;
use mixtape_core::{types::*, MixtapeError};
use mixtape_storage::{entries, playlists};
use test_helpers::*;

#[tokio::test]
async fn test_create_and_get_playlist() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = playlists::create(
        pool,
        CreatePlaylist {
            title: "Discover Weekly".to_string(),
            external: Some(ExternalRef::spotify("37i9dQZEVXcQ9COmYvdajy")),
        },
    )
    .await
    .expect("Failed to create playlist");

    assert_eq!(playlist.title, "Discover Weekly");
    assert_eq!(playlist.code.as_str(), "00001");
    assert!(playlist.modified_at.is_none());

    let retrieved = playlists::get_by_id(pool, playlist.id).await.unwrap().unwrap();
    assert_eq!(retrieved, playlist);

    let by_code = playlists::find_by_code(pool, &playlist.code).await.unwrap().unwrap();
    assert_eq!(by_code.id, playlist.id);
}

#[tokio::test]
async fn test_create_playlist_rejects_empty_title() {
    let test_db = TestDb::new().await;

    let result = playlists::create(test_db.pool(), CreatePlaylist::new("   ")).await;
    assert!(matches!(result, Err(MixtapeError::InvalidInput(_))));
}

#[tokio::test]
async fn test_insert_shifts_contiguous_run() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_filled_playlist(pool, "Mix", &[0, 1, 2]).await;
    let before = entries::get_by_playlist(pool, playlist.id).await.unwrap();

    let track = create_test_track(pool, "Inserted").await;
    let inserted = entries::insert(pool, playlist.id, 1, EntryContent::Track(track.id), false)
        .await
        .unwrap();
    assert_eq!(inserted.position, 1);

    let after = entries::get_by_playlist(pool, playlist.id).await.unwrap();
    let layout: Vec<(EntryId, u32)> = after.iter().map(|e| (e.id, e.position)).collect();
    assert_eq!(
        layout,
        vec![
            (before[0].id, 0),
            (inserted.id, 1),
            (before[1].id, 2),
            (before[2].id, 3),
        ]
    );
}

#[tokio::test]
async fn test_insert_stops_shifting_at_gap() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_filled_playlist(pool, "Gappy", &[0, 1, 2, 5, 6]).await;
    let track = create_test_track(pool, "Inserted").await;

    entries::insert(pool, playlist.id, 1, EntryContent::Track(track.id), false)
        .await
        .unwrap();

    assert_eq!(positions(pool, playlist.id).await, vec![0, 1, 2, 3, 5, 6]);
}

#[tokio::test]
async fn test_insert_into_gap_shifts_nothing() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_filled_playlist(pool, "Gappy", &[0, 4]).await;
    let track = create_test_track(pool, "Inserted").await;

    entries::insert(pool, playlist.id, 2, EntryContent::Track(track.id), false)
        .await
        .unwrap();

    assert_eq!(positions(pool, playlist.id).await, vec![0, 2, 4]);
}

#[tokio::test]
async fn test_insert_at_last_position_twice_is_refused() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_test_playlist(pool, "Edge").await;
    let first = create_test_track(pool, "First").await;
    let second = create_test_track(pool, "Second").await;

    entries::insert(pool, playlist.id, u32::MAX, EntryContent::Track(first.id), false)
        .await
        .unwrap();
    let result =
        entries::insert(pool, playlist.id, u32::MAX, EntryContent::Track(second.id), false).await;
    assert!(matches!(result, Err(MixtapeError::InvalidInput(_))));

    // The listing still decodes and the refused insert left nothing behind
    let listed = entries::get_by_playlist(pool, playlist.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].position, u32::MAX);
    assert_eq!(listed[0].content, EntryContent::Track(first.id));
}

#[tokio::test]
async fn test_concurrent_inserts_at_same_position_serialize() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool().clone();

    let playlist = create_test_playlist(&pool, "Crowded").await;
    let track = create_test_track(&pool, "Repeated").await;

    let mut handles = Vec::new();
    for _ in 0..100 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            entries::insert(&pool, playlist.id, 0, EntryContent::Track(track.id), false)
                .await
                .expect("Failed to insert entry")
        }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        let entry = handle.await.unwrap();
        assert!(ids.insert(entry.id));
    }
    assert_eq!(ids.len(), 100);

    assert_eq!(positions(&pool, playlist.id).await, (0..100).collect::<Vec<u32>>());
}

#[tokio::test]
async fn test_remove_leaves_gap() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_filled_playlist(pool, "Mix", &[0, 1, 2]).await;
    let listed = entries::get_by_playlist(pool, playlist.id).await.unwrap();

    entries::remove(pool, listed[1].id).await.unwrap();

    assert_eq!(positions(pool, playlist.id).await, vec![0, 2]);
    assert!(entries::get_by_id(pool, listed[1].id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_remove_unknown_entry() {
    let test_db = TestDb::new().await;

    let result = entries::remove(test_db.pool(), EntryId::generate()).await;
    assert!(matches!(result, Err(MixtapeError::UnknownReference { .. })));
}

#[tokio::test]
async fn test_move_entry_keeps_id() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_filled_playlist(pool, "Mix", &[0, 1, 2]).await;
    let listed = entries::get_by_playlist(pool, playlist.id).await.unwrap();

    // Lifting the last entry out frees slot 2, then the run 0..=1 shifts
    let moved = entries::move_to(pool, listed[2].id, 0, false).await.unwrap();
    assert_eq!(moved.id, listed[2].id);
    assert_eq!(moved.position, 0);
    assert_eq!(moved.content, listed[2].content);

    let after = entries::get_by_playlist(pool, playlist.id).await.unwrap();
    let ids: Vec<EntryId> = after.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![listed[2].id, listed[0].id, listed[1].id]);
    assert_eq!(positions(pool, playlist.id).await, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_move_entry_later_leaves_gap() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_filled_playlist(pool, "Mix", &[0, 1, 2]).await;
    let listed = entries::get_by_playlist(pool, playlist.id).await.unwrap();

    entries::move_to(pool, listed[0].id, 5, false).await.unwrap();

    assert_eq!(positions(pool, playlist.id).await, vec![1, 2, 5]);
}

#[tokio::test]
async fn test_move_to_same_position_is_noop() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_filled_playlist(pool, "Mix", &[0, 1]).await;
    let listed = entries::get_by_playlist(pool, playlist.id).await.unwrap();
    let stamp = playlists::get_by_id(pool, playlist.id).await.unwrap().unwrap().modified_at;

    let moved = entries::move_to(pool, listed[1].id, 1, false).await.unwrap();
    assert_eq!(moved, listed[1]);

    let after = playlists::get_by_id(pool, playlist.id).await.unwrap().unwrap();
    assert_eq!(after.modified_at, stamp);
    assert_eq!(entries::get_by_playlist(pool, playlist.id).await.unwrap(), listed);
}

#[tokio::test]
async fn test_append_after_last_entry() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_test_playlist(pool, "Fresh").await;
    let track = create_test_track(pool, "First").await;

    let first = entries::append(pool, playlist.id, EntryContent::Track(track.id), false)
        .await
        .unwrap();
    assert_eq!(first.position, 0);

    entries::insert(pool, playlist.id, 7, EntryContent::Track(track.id), false)
        .await
        .unwrap();
    let last = entries::append(pool, playlist.id, EntryContent::Track(track.id), false)
        .await
        .unwrap();
    assert_eq!(last.position, 8);
}

#[tokio::test]
async fn test_stream_entries_in_order_and_restartable() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_filled_playlist(pool, "Mix", &[3, 0, 9, 4]).await;

    let first: Vec<u32> = entries::stream(pool, playlist.id)
        .map(|entry| entry.unwrap().position)
        .collect()
        .await;
    let second: Vec<u32> = entries::stream(pool, playlist.id)
        .map(|entry| entry.unwrap().position)
        .collect()
        .await;

    assert_eq!(first, vec![0, 3, 4, 9]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_entry_writes_bump_modified_at() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_test_playlist(pool, "Mix").await;
    let track = create_test_track(pool, "Song").await;

    entries::append(pool, playlist.id, EntryContent::Track(track.id), false)
        .await
        .unwrap();

    let touched = playlists::get_by_id(pool, playlist.id).await.unwrap().unwrap();
    assert!(touched.modified_at.is_some());
}

#[tokio::test]
async fn test_insert_unknown_references() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_test_playlist(pool, "Mix").await;
    let track = create_test_track(pool, "Song").await;

    let result = entries::insert(pool, PlaylistId::generate(), 0, EntryContent::Track(track.id), false).await;
    assert!(matches!(
        result,
        Err(MixtapeError::UnknownReference { ref entity, .. }) if entity == "playlist"
    ));

    let result = entries::insert(pool, playlist.id, 0, EntryContent::Track(TrackId::generate()), false).await;
    assert!(matches!(
        result,
        Err(MixtapeError::UnknownReference { ref entity, .. }) if entity == "track"
    ));

    let result = entries::insert(
        pool,
        playlist.id,
        0,
        EntryContent::Playlist(PlaylistId::generate()),
        false,
    )
    .await;
    assert!(matches!(result, Err(MixtapeError::UnknownReference { .. })));

    // Nothing was retained by the failed writes
    assert!(positions(pool, playlist.id).await.is_empty());
    let unchanged = playlists::get_by_id(pool, playlist.id).await.unwrap().unwrap();
    assert!(unchanged.modified_at.is_none());
}

#[tokio::test]
async fn test_entry_payload_must_be_exactly_one() {
    assert!(matches!(
        EntryContent::from_parts(None, None),
        Err(MixtapeError::InvalidEntryPayload)
    ));
    assert!(matches!(
        EntryContent::from_parts(Some(TrackId::generate()), Some(PlaylistId::generate())),
        Err(MixtapeError::InvalidEntryPayload)
    ));

    // The schema refuses rows written around the store
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let playlist = create_test_playlist(pool, "Mix").await;

    let result = sqlx::query(
        "INSERT INTO playlist_entry (id, playlist_id, position, track_id, sub_playlist_id)
         VALUES (?, ?, 0, NULL, NULL)",
    )
    .bind(EntryId::generate())
    .bind(playlist.id)
    .execute(pool)
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_update_playlist_with_fresh_state() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_test_playlist(pool, "Old").await;

    let updated = playlists::update(
        pool,
        playlist.id,
        UpdatePlaylist {
            title: Some("New".to_string()),
            external: Some(Some(ExternalRef::youtube("PL123"))),
            expected_modified_at: playlist.modified_at,
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.title, "New");
    assert_eq!(updated.external, Some(ExternalRef::youtube("PL123")));
    assert!(updated.modified_at.is_some());

    // Clearing the external reference keeps the title
    let cleared = playlists::update(
        pool,
        playlist.id,
        UpdatePlaylist {
            title: None,
            external: Some(None),
            expected_modified_at: updated.modified_at,
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.title, "New");
    assert_eq!(cleared.external, None);
}

#[tokio::test]
async fn test_update_playlist_with_outdated_state() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_test_playlist(pool, "Shared").await;
    let seen = playlist.modified_at;

    // Someone else edits the entries in between
    let track = create_test_track(pool, "Song").await;
    entries::append(pool, playlist.id, EntryContent::Track(track.id), false)
        .await
        .unwrap();
    let stored = playlists::get_by_id(pool, playlist.id).await.unwrap().unwrap();

    let result = playlists::update(
        pool,
        playlist.id,
        UpdatePlaylist {
            title: Some("Mine".to_string()),
            external: None,
            expected_modified_at: seen,
        },
    )
    .await;

    match result {
        Err(MixtapeError::OutdatedState(at)) => assert_eq!(Some(at), stored.modified_at),
        other => panic!("expected OutdatedState, got {other:?}"),
    }

    let unchanged = playlists::get_by_id(pool, playlist.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Shared");
}

#[tokio::test]
async fn test_duplicate_playlist() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let source = create_filled_playlist(pool, "Original", &[0, 2, 3]).await;
    let copy = playlists::duplicate(pool, source.id, "Copy".to_string())
        .await
        .unwrap();

    assert_ne!(copy.id, source.id);
    assert_ne!(copy.code, source.code);
    assert_eq!(copy.title, "Copy");

    let original = entries::get_by_playlist(pool, source.id).await.unwrap();
    let copied = entries::get_by_playlist(pool, copy.id).await.unwrap();
    assert_eq!(copied.len(), original.len());
    for (a, b) in original.iter().zip(&copied) {
        assert_ne!(a.id, b.id);
        assert_eq!(a.position, b.position);
        assert_eq!(a.content, b.content);
    }
}

#[tokio::test]
async fn test_delete_playlist_cascades() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let inner = create_filled_playlist(pool, "Inner", &[0]).await;
    let outer = create_filled_playlist(pool, "Outer", &[0, 2]).await;
    entries::insert(pool, outer.id, 1, EntryContent::Playlist(inner.id), false)
        .await
        .unwrap();

    playlists::delete(pool, inner.id).await.unwrap();

    assert!(playlists::get_by_id(pool, inner.id).await.unwrap().is_none());
    assert!(positions(pool, inner.id).await.is_empty());
    // Embedding entry removed, the rest keep their positions
    assert_eq!(positions(pool, outer.id).await, vec![0, 2]);

    let result = playlists::delete(pool, inner.id).await;
    assert!(matches!(result, Err(MixtapeError::UnknownReference { .. })));
}

#[tokio::test]
async fn test_delete_track_removes_its_entries() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = create_filled_playlist(pool, "Mix", &[0, 1, 2]).await;
    let listed = entries::get_by_playlist(pool, playlist.id).await.unwrap();
    let middle = listed[1].content.track().unwrap();

    mixtape_storage::tracks::delete(pool, middle).await.unwrap();

    assert_eq!(positions(pool, playlist.id).await, vec![0, 2]);
}
