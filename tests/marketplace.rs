mod common;

use common::TestStore;
use stayfeed::core::strong_types::{DayRange, ListingId, Point};
use stayfeed::domains::MarketplaceService;
use stayfeed::error::AppError;

async fn seed_users(svc: &MarketplaceService) {
    for (name, email) in [
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
        ("carol", "carol@example.com"),
    ] {
        svc.database().insert_user(name, email).await.unwrap();
    }
}

fn days(start: i64, end: i64) -> DayRange {
    DayRange::new(start, end).unwrap()
}

#[tokio::test]
async fn test_add_listing_then_search_finds_it_at_distance_zero() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;

    let id = svc
        .add_listing("alice", "Cabin", "cozy", Point::new(0.0, 0.0))
        .await
        .unwrap();

    let found = svc.search_radius(Point::new(0.0, 0.0), 5.0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, id);
    assert_eq!(found[0].title, "Cabin");
    assert_eq!(found[0].owner_name, "alice");
    assert_eq!(found[0].distance, 0.0);
    assert_eq!(found[0].avg_rating, None);
    assert_eq!(store.count("Locations").await, 1);
}

#[tokio::test]
async fn test_radius_search_is_strict_and_ordered() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;

    let far = svc.add_listing("alice", "Far", "edge", Point::new(3.0, 4.0)).await.unwrap();
    let near = svc.add_listing("alice", "Near", "close", Point::new(1.0, 1.0)).await.unwrap();
    let mid = svc.add_listing("bob", "Mid", "between", Point::new(-2.0, 2.0)).await.unwrap();
    svc.add_listing("bob", "Away", "outside", Point::new(10.0, 10.0)).await.unwrap();

    let origin = Point::new(0.0, 0.0);
    let found = svc.search_radius(origin, 5.0).await.unwrap();
    let ids: Vec<ListingId> = found.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![near, mid]);
    assert!(!ids.contains(&far), "distance exactly equal to radius is outside");

    let everything = svc.search_all(origin).await.unwrap();
    for m in &everything {
        let p = Point::new(m.x, m.y);
        assert_eq!(ids.contains(&m.id), origin.within_radius(&p, 5.0));
        assert!((m.distance - p.distance_to(&origin)).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_radius_must_be_positive() {
    let store = TestStore::new().await;
    let svc = store.marketplace();

    for radius in [0.0, -5.0, f64::NAN] {
        assert!(matches!(
            svc.search_radius(Point::new(0.0, 0.0), radius).await,
            Err(AppError::ValidationFailed(_))
        ));
    }
}

#[tokio::test]
async fn test_search_all_orders_by_distance_with_average_rating() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;

    let a = svc.add_listing("alice", "A", "a", Point::new(5.0, 0.0)).await.unwrap();
    let b = svc.add_listing("alice", "B", "b", Point::new(0.0, 1.0)).await.unwrap();
    svc.rate("bob", a, 4, "fine").await.unwrap();
    svc.rate("carol", a, 5, "great").await.unwrap();

    let found = svc.search_all(Point::new(0.0, 0.0)).await.unwrap();
    assert_eq!(found.iter().map(|m| m.id).collect::<Vec<_>>(), vec![b, a]);
    assert_eq!(found[1].avg_rating, Some(4.5));
    assert_eq!(found[1].distance, 5.0);
}

#[tokio::test]
async fn test_add_listing_for_unknown_user_writes_nothing() {
    let store = TestStore::new().await;
    let svc = store.marketplace();

    let err = svc
        .add_listing("ghost", "Cabin", "cozy", Point::new(0.0, 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(store.count("Listings").await, 0);
    assert_eq!(store.count("Locations").await, 0);
}

#[tokio::test]
async fn test_overlapping_reservation_is_rejected() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;
    let listing = svc.add_listing("alice", "Cabin", "cozy", Point::new(0.0, 0.0)).await.unwrap();

    svc.reserve("alice", listing, days(10, 20)).await.unwrap();
    let err = svc.reserve("bob", listing, days(15, 25)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(!err.is_fatal());
    assert_eq!(store.count("Reservations").await, 1);
}

#[tokio::test]
async fn test_touching_endpoints_overlap_but_adjacent_days_do_not() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;
    let listing = svc.add_listing("alice", "Cabin", "cozy", Point::new(0.0, 0.0)).await.unwrap();

    svc.reserve("alice", listing, days(10, 20)).await.unwrap();
    assert!(matches!(
        svc.reserve("bob", listing, days(20, 22)).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        svc.reserve("bob", listing, days(5, 10)).await,
        Err(AppError::Conflict(_))
    ));
    svc.reserve("bob", listing, days(21, 25)).await.unwrap();
    svc.reserve("carol", listing, days(1, 9)).await.unwrap();
    assert_eq!(store.count("Reservations").await, 3);
}

#[tokio::test]
async fn test_reservations_on_different_listings_do_not_conflict() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;
    let one = svc.add_listing("alice", "One", "1", Point::new(0.0, 0.0)).await.unwrap();
    let two = svc.add_listing("alice", "Two", "2", Point::new(1.0, 0.0)).await.unwrap();

    svc.reserve("bob", one, days(1, 5)).await.unwrap();
    svc.reserve("bob", two, days(1, 5)).await.unwrap();

    let mine = svc.user_reservations("bob").await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].listing_title, "One");

    let on_one = svc.listing_reservations(one).await.unwrap();
    assert_eq!(on_one.len(), 1);
    assert_eq!(on_one[0].user_name, "bob");
    assert_eq!((on_one[0].day1, on_one[0].day2), (1, 5));
}

#[tokio::test]
async fn test_reserve_unknown_listing_is_not_found() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;

    let err = svc.reserve("bob", ListingId::new(42), days(1, 2)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_requires_ownership() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;
    let listing = svc.add_listing("alice", "Cabin", "cozy", Point::new(0.0, 0.0)).await.unwrap();

    assert!(!svc.delete_listing("bob", listing).await.unwrap());
    assert_eq!(store.count("Listings").await, 1);

    assert!(svc.delete_listing("alice", listing).await.unwrap());
    assert_eq!(store.count("Listings").await, 0);
}

#[tokio::test]
async fn test_delete_cascades_to_dependents() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;
    let listing = svc.add_listing("alice", "Cabin", "cozy", Point::new(0.0, 0.0)).await.unwrap();
    svc.reserve("bob", listing, days(1, 3)).await.unwrap();
    svc.rate("bob", listing, 5, "lovely").await.unwrap();

    assert!(svc.delete_listing("alice", listing).await.unwrap());
    assert_eq!(store.count("Locations").await, 0);
    assert_eq!(store.count("Reservations").await, 0);
    assert_eq!(store.count("Ratings").await, 0);
}

#[tokio::test]
async fn test_cancel_removes_only_own_reservations() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;
    let listing = svc.add_listing("alice", "Cabin", "cozy", Point::new(0.0, 0.0)).await.unwrap();
    svc.reserve("bob", listing, days(1, 3)).await.unwrap();
    svc.reserve("bob", listing, days(5, 6)).await.unwrap();
    svc.reserve("carol", listing, days(8, 9)).await.unwrap();

    assert_eq!(svc.cancel("bob", listing).await.unwrap(), 2);
    assert_eq!(svc.cancel("bob", listing).await.unwrap(), 0);
    assert_eq!(store.count("Reservations").await, 1);
}

#[tokio::test]
async fn test_see_whos_reserved_is_owner_only() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;
    let listing = svc.add_listing("alice", "Cabin", "cozy", Point::new(0.0, 0.0)).await.unwrap();
    svc.reserve("bob", listing, days(1, 3)).await.unwrap();

    let seen = svc.reservations_for_owner("alice", listing).await.unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].user_name, "bob");

    let err = svc.reservations_for_owner("carol", listing).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_ratings_allow_duplicates_and_average() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;
    let listing = svc.add_listing("alice", "Cabin", "cozy", Point::new(0.0, 0.0)).await.unwrap();

    let empty = svc.listing_ratings(listing).await.unwrap();
    assert!(empty.ratings.is_empty());
    assert_eq!(empty.average, None);

    svc.rate("bob", listing, 2, "meh").await.unwrap();
    svc.rate("bob", listing, 4, "better second time").await.unwrap();

    let summary = svc.listing_ratings(listing).await.unwrap();
    assert_eq!(summary.ratings.len(), 2);
    assert_eq!(summary.average, Some(3.0));
    assert_eq!(summary.ratings[1].comment, "better second time");
}

#[tokio::test]
async fn test_search_available_excludes_overlapping_bookings() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;
    let booked = svc.add_listing("alice", "Booked", "b", Point::new(0.0, 0.0)).await.unwrap();
    let free = svc.add_listing("alice", "Free", "f", Point::new(2.0, 0.0)).await.unwrap();
    svc.reserve("bob", booked, days(10, 20)).await.unwrap();
    svc.reserve("bob", free, days(30, 40)).await.unwrap();

    let found = svc.search_available(Point::new(0.0, 0.0), days(20, 25)).await.unwrap();
    assert_eq!(found.iter().map(|m| m.id).collect::<Vec<_>>(), vec![free]);

    let found = svc.search_available(Point::new(0.0, 0.0), days(21, 29)).await.unwrap();
    assert_eq!(found.iter().map(|m| m.id).collect::<Vec<_>>(), vec![booked, free]);

    for wanted in [days(20, 25), days(21, 29), days(35, 50), days(1, 9)] {
        let available = svc.search_available(Point::new(0.0, 0.0), wanted).await.unwrap();
        for listing in [booked, free] {
            let clash = svc
                .listing_reservations(listing)
                .await
                .unwrap()
                .iter()
                .any(|r| days(r.day1, r.day2).overlaps(&wanted));
            let listed = available.iter().any(|m| m.id == listing);
            assert_eq!(listed, !clash, "listing {} for {}", listing, wanted);
        }
    }
}

#[tokio::test]
async fn test_user_listings() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;
    svc.add_listing("alice", "One", "1", Point::new(0.0, 0.0)).await.unwrap();
    svc.add_listing("bob", "Two", "2", Point::new(1.0, 2.0)).await.unwrap();

    let bobs = svc.user_listings("bob").await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!((bobs[0].x, bobs[0].y), (1.0, 2.0));
    assert!(matches!(
        svc.user_listings("ghost").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_recommendations_follow_common_reservations() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;
    svc.database().insert_user("dave", "dave@example.com").await.unwrap();

    let shared = svc.add_listing("dave", "Shared", "s", Point::new(0.0, 0.0)).await.unwrap();
    let bob_pick = svc.add_listing("dave", "BobPick", "b", Point::new(1.0, 0.0)).await.unwrap();
    let carol_pick = svc.add_listing("dave", "CarolPick", "c", Point::new(2.0, 0.0)).await.unwrap();
    let busy = svc.add_listing("dave", "Busy", "x", Point::new(3.0, 0.0)).await.unwrap();
    let own = svc.add_listing("alice", "Own", "o", Point::new(4.0, 0.0)).await.unwrap();

    // alice and bob share one listing; alice and carol share the same one too.
    svc.reserve("alice", shared, days(1, 1)).await.unwrap();
    svc.reserve("bob", shared, days(2, 2)).await.unwrap();
    svc.reserve("carol", shared, days(3, 3)).await.unwrap();

    svc.reserve("bob", bob_pick, days(1, 1)).await.unwrap();
    svc.reserve("carol", bob_pick, days(2, 2)).await.unwrap();
    svc.reserve("carol", carol_pick, days(1, 1)).await.unwrap();
    svc.reserve("bob", busy, days(50, 60)).await.unwrap();
    svc.reserve("bob", own, days(1, 1)).await.unwrap();

    let recs = svc.recommended_listings("alice", days(40, 55)).await.unwrap();
    let ids: Vec<ListingId> = recs.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![bob_pick, carol_pick]);
    assert_eq!(recs[0].score, 2);
    assert_eq!(recs[1].score, 1);
    assert!(!ids.contains(&shared), "already reserved by alice");
    assert!(!ids.contains(&own), "owned by alice");
    assert!(!ids.contains(&busy), "booked during the requested days");
}

#[tokio::test]
async fn test_recommendations_empty_without_history() {
    let store = TestStore::new().await;
    let svc = store.marketplace();
    seed_users(&svc).await;
    svc.add_listing("bob", "Cabin", "c", Point::new(0.0, 0.0)).await.unwrap();

    assert!(svc.recommended_listings("alice", days(1, 2)).await.unwrap().is_empty());
}
