//! Integration tests for the tracks vertical slice
//!
//! Tests track operations including:
//! - Insert / duplicate detection
//! - Bulk insert with and without conflict skipping
//! - Title search (case-insensitive, ordered, wildcard-safe)
//! - Play timestamps that never move backwards


use airtime_core::{AirtimeError, CatalogStore, TrackId};
use airtime_storage::{tracks, SqliteCatalogStore};
use chrono::{Duration, TimeZone, Utc};
use test_helpers::*;

#[tokio::test]
async fn test_insert_and_get_track() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let track = sample_track("abc123", "Test Song");
    tracks::insert(pool, &track).await.expect("Failed to insert");

    let retrieved = tracks::get_by_id(pool, &track.id)
        .await
        .unwrap()
        .expect("Track should exist");

    assert_eq!(retrieved, track);
    assert!(tracks::exists(pool, &track.id).await.unwrap());
    assert!(!tracks::exists(pool, &TrackId::new("missing")).await.unwrap());
}

#[tokio::test]
async fn test_unknown_duration_round_trips_as_none() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let mut track = sample_track("nodur", "Unknown Length");
    track.duration_seconds = None;
    track.thumbnail_url = None;
    tracks::insert(pool, &track).await.unwrap();

    let retrieved = tracks::get_by_id(pool, &track.id).await.unwrap().unwrap();
    assert_eq!(retrieved.duration_seconds, None);
    assert_eq!(retrieved.thumbnail_url, None);
}

#[tokio::test]
async fn test_duplicate_insert_is_reported() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    tracks::insert(pool, &sample_track("dup", "First")).await.unwrap();
    let result = tracks::insert(pool, &sample_track("dup", "Second")).await;

    match result {
        Err(AirtimeError::Duplicate(id)) => assert_eq!(id.as_str(), "dup"),
        other => panic!("expected Duplicate, got {other:?}"),
    }

    // Original row is untouched
    let stored = tracks::get_by_id(pool, &TrackId::new("dup")).await.unwrap().unwrap();
    assert_eq!(stored.title, "First");
    assert_eq!(tracks::count(pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_insert_many_skip_conflicts_is_idempotent() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let batch = vec![
        sample_track("a", "Alpha"),
        sample_track("b", "Bravo"),
        sample_track("c", "Charlie"),
    ];

    let first = tracks::insert_many(pool, &batch, true).await.unwrap();
    let second = tracks::insert_many(pool, &batch, true).await.unwrap();

    assert_eq!(first, 3);
    assert_eq!(second, 0);
    assert_eq!(tracks::count(pool).await.unwrap(), 3);
}

#[tokio::test]
async fn test_insert_many_without_skip_rolls_back_whole_batch() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    tracks::insert(pool, &sample_track("b", "Bravo")).await.unwrap();

    let batch = vec![sample_track("a", "Alpha"), sample_track("b", "Bravo again")];
    let result = tracks::insert_many(pool, &batch, false).await;

    assert!(matches!(result, Err(AirtimeError::Duplicate(_))));
    // "a" was inserted inside the aborted transaction, so it must be gone
    assert!(!tracks::exists(pool, &TrackId::new("a")).await.unwrap());
    assert_eq!(tracks::count(pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_ordered() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let batch = vec![
        sample_track("1", "Lofi Beats to Study"),
        sample_track("2", "Another LOFI mix"),
        sample_track("3", "Jazz Hop"),
    ];
    tracks::insert_many(pool, &batch, false).await.unwrap();

    let results = tracks::search(pool, "lofi").await.unwrap();
    let titles: Vec<&str> = results.iter().map(|t| t.title.as_str()).collect();

    assert_eq!(titles, vec!["Another LOFI mix", "Lofi Beats to Study"]);
}

#[tokio::test]
async fn test_title_order_ignores_case() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let batch = vec![
        sample_track("1", "Moonlight Sonata"),
        sample_track("2", "blue moon"),
        sample_track("3", "Clair de Lune"),
    ];
    tracks::insert_many(pool, &batch, false).await.unwrap();

    let searched = tracks::search(pool, "moon").await.unwrap();
    let titles: Vec<&str> = searched.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["blue moon", "Moonlight Sonata"]);

    let all = tracks::get_all(pool).await.unwrap();
    let titles: Vec<&str> = all.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["blue moon", "Clair de Lune", "Moonlight Sonata"]);
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    tracks::insert_many(
        pool,
        &[sample_track("1", "100% Chill"), sample_track("2", "1000 Chill")],
        false,
    )
    .await
    .unwrap();

    let results = tracks::search(pool, "100%").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "100% Chill");
}

#[tokio::test]
async fn test_mark_played_never_decreases() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let track = sample_track("p", "Played");
    tracks::insert(pool, &track).await.unwrap();

    let played = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    tracks::mark_played(pool, &track.id, played).await.unwrap();
    tracks::mark_played(pool, &track.id, played - Duration::hours(2))
        .await
        .unwrap();

    let stored = tracks::get_by_id(pool, &track.id).await.unwrap().unwrap();
    assert_eq!(stored.last_played_at, Some(played));
}

#[tokio::test]
async fn test_mark_played_unknown_track() {
    let test_db = TestDb::new().await;
    let result = tracks::mark_played(test_db.pool(), &TrackId::new("ghost"), Utc::now()).await;

    assert!(matches!(result, Err(AirtimeError::NotFound { .. })));
}

#[tokio::test]
async fn test_catalog_store_trait_round_trip() {
    let test_db = TestDb::new().await;
    let store = SqliteCatalogStore::new(test_db.pool().clone());

    store.insert(&sample_track("z", "Zulu")).await.unwrap();
    store.insert(&sample_track("y", "Yankee")).await.unwrap();

    let all = store.load_all().await.unwrap();
    let titles: Vec<&str> = all.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Yankee", "Zulu"]);

    assert!(store.contains(&TrackId::new("z")).await.unwrap());
    assert_eq!(store.search("ULU").await.unwrap().len(), 1);
}
