// Row types returned by the data-access layer
//
// Column aliases in the queries are snake_case so the derives map 1:1.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::core::strong_types::{
    AccountId, ListingId, PostId, RatingId, ReservationId, UserId,
};

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Listing {
    pub id: ListingId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub x: f64,
    pub y: f64,
}

/// A listing found by a geo search, with its distance from the query point
/// and the mean of its ratings.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ListingMatch {
    pub id: ListingId,
    pub user_id: UserId,
    pub owner_name: String,
    pub title: String,
    pub description: String,
    pub x: f64,
    pub y: f64,
    #[serde(skip)]
    pub distance_sq: f64,
    /// Filled from `distance_sq` after the row is fetched.
    #[sqlx(default)]
    pub distance: f64,
    pub avg_rating: Option<f64>,
}

impl ListingMatch {
    pub(crate) fn with_distance(mut self) -> Self {
        self.distance = self.distance_sq.sqrt();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Reservation {
    pub id: ReservationId,
    pub user_id: UserId,
    pub user_name: String,
    pub listing_id: ListingId,
    pub listing_title: String,
    pub day1: i64,
    pub day2: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Rating {
    pub id: RatingId,
    pub user_id: UserId,
    pub user_name: String,
    pub listing_id: ListingId,
    pub rating: i64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRatings {
    pub listing_id: ListingId,
    pub average: Option<f64>,
    pub ratings: Vec<Rating>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Recommendation {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    /// Sum of common-reservation counts of the similar users who booked it.
    pub score: i64,
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Account {
    pub id: AccountId,
    pub user_id: UserId,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Post {
    pub id: PostId,
    pub poster_id: AccountId,
    pub poster_name: String,
    pub title: String,
    pub text_body: String,
    /// Unix seconds.
    pub created: i64,
    pub likes: i64,
    pub comments: i64,
}

/// A followee's post as shown in a feed. `comments` is every
/// `"commenter: text"` pair joined by `", "`, or `None` when there are none.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct FeedItem {
    pub id: PostId,
    pub poster_id: AccountId,
    pub poster_name: String,
    pub title: String,
    pub text_body: String,
    pub created: i64,
    pub likes: i64,
    pub comments: Option<String>,
}

/// Renders a stored Unix-seconds timestamp; out-of-range values fall back to the raw number.
pub fn format_timestamp(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}
