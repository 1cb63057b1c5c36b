use javshelf::db::{ManualClock, PurgeReport, Store};
use javshelf::models::{Actor, Movie, StarRef};
use std::sync::Arc;

const DAY: i64 = 86_400;
const T0: i64 = 1_700_000_000;

async fn store_at(now: i64) -> (Store, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(now));
    let store = Store::in_memory()
        .await
        .expect("Failed to open in-memory store")
        .with_clock(clock.clone());
    (store, clock)
}

fn movie(id: &str, date: &str, stars: &[&str]) -> Movie {
    let mut movie = Movie::new(id, format!("Title of {id}"));
    movie.date = Some(date.to_string());
    movie.stars = stars
        .iter()
        .map(|s| StarRef::new(*s, format!("Star {s}")))
        .collect();
    movie
}

fn ids(movies: &[Movie]) -> Vec<&str> {
    movies.iter().map(|m| m.id.as_str()).collect()
}

#[tokio::test]
async fn test_actor_freshness_boundary() {
    let (store, clock) = store_at(T0).await;
    assert!(store.save_actor(&Actor::new("okq", "Name")).await);

    clock.advance(7 * DAY);
    let actor = store.get_actor("okq", 7).await;
    assert_eq!(actor.map(|a| a.name), Some("Name".to_string()));

    clock.advance(1);
    assert!(store.get_actor("okq", 7).await.is_none());

    // Stale is not gone: a longer window still sees it.
    assert!(store.get_actor("okq", 8).await.is_some());
}

#[tokio::test]
async fn test_actor_upsert_refreshes() {
    let (store, clock) = store_at(T0).await;
    store.save_actor(&Actor::new("okq", "Old")).await;

    clock.advance(10 * DAY);
    assert!(store.get_actor("okq", 7).await.is_none());

    let mut actor = Actor::new("okq", "New");
    actor.height = Some("160cm".to_string());
    store.save_actor(&actor).await;

    let cached = store.get_actor("okq", 7).await.expect("actor is fresh again");
    assert_eq!(cached.name, "New");
    assert_eq!(cached.height.as_deref(), Some("160cm"));
}

#[tokio::test]
async fn test_records_without_id_are_rejected() {
    let (store, _) = store_at(T0).await;
    assert!(!store.save_actor(&Actor::new("  ", "Nobody")).await);
    assert!(!store.save_movie(&Movie::new("", "Nothing")).await);
    assert!(store.recent_movies(10).await.is_empty());
}

#[tokio::test]
async fn test_search_actors_by_name() {
    let (store, clock) = store_at(T0).await;
    store.save_actor(&Actor::new("a1", "Yua Mikami")).await;
    store.save_actor(&Actor::new("a2", "Mikami Other")).await;
    store.save_actor(&Actor::new("a3", "Someone")).await;

    let mut found: Vec<String> = store
        .search_actors("Mikami", 7)
        .await
        .into_iter()
        .map(|a| a.id)
        .collect();
    found.sort();
    assert_eq!(found, vec!["a1", "a2"]);

    clock.advance(8 * DAY);
    assert!(store.search_actors("Mikami", 7).await.is_empty());
}

#[tokio::test]
async fn test_search_actors_matches_wildcards_literally() {
    let (store, _) = store_at(T0).await;
    store.save_actor(&Actor::new("a1", "Alice")).await;
    store.save_actor(&Actor::new("a2", "100% Real_Name")).await;

    for keyword in ["_", "%", "0% r", "l_n"] {
        let found: Vec<String> = store
            .search_actors(keyword, 7)
            .await
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(found, vec!["a2"], "keyword {keyword:?}");
    }
}

#[tokio::test]
async fn test_search_actors_underscore_matches_nothing_without_one() {
    let (store, _) = store_at(T0).await;
    store.save_actor(&Actor::new("a1", "Alice")).await;
    store.save_actor(&Actor::new("a2", "Bob")).await;

    assert!(store.search_actors("_", 7).await.is_empty());
    assert!(store.search_actors("%", 7).await.is_empty());
    assert_eq!(store.search_actors("ALI", 7).await.len(), 1);
}

#[tokio::test]
async fn test_movie_round_trip_keeps_unknown_fields() {
    let (store, _) = store_at(T0).await;

    let json = r#"{
        "id": "ABP-123",
        "title": "Title",
        "date": "2020-01-01",
        "publisher": "Label",
        "stars": [{"id": "s1", "name": "A"}],
        "videoLength": 120
    }"#;
    let original: Movie = serde_json::from_str(json).unwrap();
    assert!(store.save_movie(&original).await);

    let cached = store.get_movie("ABP-123", 30).await.expect("movie cached");
    assert_eq!(cached, original);
    assert_eq!(cached.extra["videoLength"], 120);
}

#[tokio::test]
async fn test_actor_movies_sorted_and_fresh_only() {
    let (store, clock) = store_at(T0).await;
    store.save_movie(&movie("OLD-001", "2019-05-01", &["x"])).await;

    clock.advance(20 * DAY);
    store.save_movie(&movie("NEW-001", "2021-01-01", &["x"])).await;
    store.save_movie(&movie("MID-001", "2020-03-01", &["x", "y"])).await;

    let movies = store.get_actor_movies("x", 30).await;
    assert_eq!(ids(&movies), vec!["NEW-001", "MID-001", "OLD-001"]);

    clock.advance(15 * DAY);
    let movies = store.get_actor_movies("x", 30).await;
    assert_eq!(ids(&movies), vec!["NEW-001", "MID-001"]);

    assert_eq!(ids(&store.get_actor_movies("y", 30).await), vec!["MID-001"]);
    assert!(store.get_actor_movies("nobody", 30).await.is_empty());
}

#[tokio::test]
async fn test_association_replace_on_upsert() {
    let (store, _) = store_at(T0).await;
    store.save_movie(&movie("ABC-001", "2020-01-01", &["x"])).await;
    store.save_movie(&movie("ABC-001", "2020-01-01", &["y"])).await;

    assert!(store.get_actor_movies("x", 30).await.is_empty());
    assert_eq!(ids(&store.get_actor_movies("y", 30).await), vec!["ABC-001"]);

    // A record without cast keeps the known associations.
    store.save_movie(&movie("ABC-001", "2020-01-01", &[])).await;
    assert_eq!(ids(&store.get_actor_movies("y", 30).await), vec!["ABC-001"]);
}

#[tokio::test]
async fn test_cascade_delete_removes_only_orphans() {
    let (store, _) = store_at(T0).await;
    store.save_actor(&Actor::new("x", "X")).await;
    store.save_actor(&Actor::new("y", "Y")).await;
    store.save_movie(&movie("A-001", "2020-01-01", &["x", "y"])).await;
    store.save_movie(&movie("B-001", "2020-01-02", &["x"])).await;

    assert_eq!(store.delete_actor_cascade("x").await, Some(1));

    assert!(store.get_actor("x", 7).await.is_none());
    assert!(store.get_actor("y", 7).await.is_some());
    assert!(store.get_movie("A-001", 30).await.is_some());
    assert!(store.get_movie("B-001", 30).await.is_none());
    assert!(store.get_actor_movies("x", 30).await.is_empty());
    assert_eq!(ids(&store.get_actor_movies("y", 30).await), vec!["A-001"]);
}

#[tokio::test]
async fn test_cascade_delete_unknown_actor() {
    let (store, _) = store_at(T0).await;
    assert_eq!(store.delete_actor_cascade("ghost").await, Some(0));
}

#[tokio::test]
async fn test_purge_expired() {
    let (store, clock) = store_at(T0).await;
    store.save_actor(&Actor::new("x", "X")).await;
    store.save_movie(&movie("M1-001", "2020-01-01", &["x", "y"])).await;

    clock.advance(40 * DAY);
    store.save_actor(&Actor::new("y", "Y")).await;
    store.save_movie(&movie("M2-001", "2021-01-01", &["y"])).await;

    let report = store.purge_expired(30, 90).await.expect("purge succeeds");
    assert_eq!(
        report,
        PurgeReport {
            actors: 1,
            movies: 0,
            associations: 1,
        }
    );
    assert_eq!(ids(&store.get_actor_movies("y", 90).await), vec!["M2-001", "M1-001"]);

    clock.advance(60 * DAY);
    let report = store.purge_expired(30, 90).await.expect("purge succeeds");
    assert_eq!(
        report,
        PurgeReport {
            actors: 1,
            movies: 1,
            associations: 2,
        }
    );
    assert!(store.get_movie("M1-001", 365).await.is_none());
    assert!(store.get_movie("M2-001", 365).await.is_some());
}

#[tokio::test]
async fn test_purge_is_strictly_older_than_ttl() {
    let (store, clock) = store_at(T0).await;
    store.save_actor(&Actor::new("x", "X")).await;

    clock.advance(30 * DAY);
    assert_eq!(store.purge_expired(30, 90).await.map(|r| r.actors), Some(0));

    clock.advance(1);
    assert_eq!(store.purge_expired(30, 90).await.map(|r| r.actors), Some(1));
}

#[tokio::test]
async fn test_recent_movies() {
    let (store, clock) = store_at(T0).await;
    for id in ["A-001", "B-001", "C-001"] {
        store.save_movie(&movie(id, "2020-01-01", &[])).await;
        clock.advance(60);
    }

    assert_eq!(ids(&store.recent_movies(2).await), vec!["C-001", "B-001"]);

    // Re-saving moves a movie to the front.
    store.save_movie(&movie("A-001", "2020-01-01", &[])).await;
    assert_eq!(ids(&store.recent_movies(4).await), vec!["A-001", "C-001", "B-001"]);
}

#[tokio::test]
async fn test_translation_keeps_freshness() {
    let (store, clock) = store_at(T0).await;
    store.save_movie(&movie("ABP-123", "2020-01-01", &["x"])).await;

    clock.advance(29 * DAY);
    assert!(
        store
            .update_movie_translation("ABP-123", Some("标题"), None)
            .await
    );

    let cached = store.get_movie("ABP-123", 30).await.expect("still fresh");
    assert_eq!(cached.translated_title.as_deref(), Some("标题"));
    assert!(cached.translated_description.is_none());

    clock.advance(2 * DAY);
    assert!(store.get_movie("ABP-123", 30).await.is_none());

    assert!(
        !store
            .update_movie_translation("MISSING-1", Some("x"), None)
            .await
    );
}

#[tokio::test]
async fn test_search_history() {
    let (store, clock) = store_at(T0).await;
    for keyword in ["alpha", "beta", "alpha", "gamma"] {
        assert!(store.save_search_history(keyword).await);
        clock.advance(1);
    }
    assert!(!store.save_search_history("   ").await);

    assert_eq!(store.search_history(10).await, vec!["gamma", "alpha", "beta"]);
    assert_eq!(store.search_history(1).await, vec!["gamma"]);
}
