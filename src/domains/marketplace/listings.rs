use sqlx::{QueryBuilder, Sqlite};
use tracing::{debug, info};

use super::MarketplaceService;
use crate::core::strong_types::{DayRange, ListingId, Point};
use crate::error::{AppError, AppResult};
use crate::models::{Listing, ListingMatch};

/// Starts a `ListingMatch` query. Callers may push extra `AND ...` filters on
/// the inner select (aliases `l`, `loc`), then must call `finish_match_query`.
fn match_query<'a>(origin: Point) -> QueryBuilder<'a, Sqlite> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT * FROM (SELECT l.id AS id, l.userId AS user_id, u.name AS owner_name, \
         l.title AS title, l.description AS description, loc.x AS x, loc.y AS y, \
         (loc.x - ",
    );
    qb.push_bind(origin.x);
    qb.push(") * (loc.x - ");
    qb.push_bind(origin.x);
    qb.push(") + (loc.y - ");
    qb.push_bind(origin.y);
    qb.push(") * (loc.y - ");
    qb.push_bind(origin.y);
    qb.push(
        ") AS distance_sq, r.avg_rating AS avg_rating \
         FROM Listings l \
         JOIN Locations loc ON loc.listingId = l.id \
         JOIN Users u ON u.id = l.userId \
         LEFT JOIN (SELECT listingId, AVG(rating) AS avg_rating FROM Ratings GROUP BY listingId) r \
         ON r.listingId = l.id \
         WHERE 1 = 1",
    );
    qb
}

/// Closes the inner select, applies the optional strict radius bound and
/// orders nearest first.
fn finish_match_query(qb: &mut QueryBuilder<'_, Sqlite>, radius: Option<f64>) {
    qb.push(") AS m");
    if let Some(radius) = radius {
        qb.push(" WHERE m.distance_sq < ");
        qb.push_bind(radius * radius);
    }
    qb.push(" ORDER BY m.distance_sq, m.id");
}

/// Inclusive interval overlap against `Reservations` rows aliased `res`.
/// Binds `start` then `end`.
pub(crate) const OVERLAP_PREDICATE: &str = "NOT (res.day2 < ? OR res.day1 > ?)";

/// Pushes `OVERLAP_PREDICATE` with `days` bound to its placeholders.
fn push_overlap(qb: &mut QueryBuilder<'_, Sqlite>, days: DayRange) {
    let binds = [days.start, days.end];
    for (i, part) in OVERLAP_PREDICATE.split('?').enumerate() {
        qb.push(part);
        if let Some(day) = binds.get(i) {
            qb.push_bind(*day);
        }
    }
}

impl MarketplaceService {
    /// Inserts the listing and its location in one transaction so a failure
    /// between the two writes leaves neither behind.
    pub async fn add_listing(
        &self,
        user_name: &str,
        title: &str,
        description: &str,
        location: Point,
    ) -> AppResult<ListingId> {
        let user_id = self.database().resolve_user(user_name).await?;
        let mut tx = self.database().begin_transaction().await?;

        let result =
            sqlx::query("INSERT INTO Listings (userId, title, description) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(title)
                .bind(description)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::from_sqlx("Failed to create listing", e))?;
        let listing_id = ListingId::new(result.last_insert_rowid());

        sqlx::query("INSERT INTO Locations (listingId, x, y) VALUES (?, ?, ?)")
            .bind(listing_id)
            .bind(location.x)
            .bind(location.y)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to create listing location", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit listing: {}", e)))?;

        info!(%listing_id, %user_id, %location, "listing created");
        Ok(listing_id)
    }

    /// Listings strictly inside `radius` of `origin`, nearest first. The
    /// radius must be a positive number.
    pub async fn search_radius(&self, origin: Point, radius: f64) -> AppResult<Vec<ListingMatch>> {
        if !(radius > 0.0) {
            return Err(AppError::ValidationFailed(format!(
                "search radius must be positive, got {}",
                radius
            )));
        }
        debug!(%origin, radius, "radius search");
        let mut qb = match_query(origin);
        finish_match_query(&mut qb, Some(radius));
        self.fetch_matches(qb).await
    }

    /// Every listing, nearest first.
    pub async fn search_all(&self, origin: Point) -> AppResult<Vec<ListingMatch>> {
        debug!(%origin, "unbounded search");
        let mut qb = match_query(origin);
        finish_match_query(&mut qb, None);
        self.fetch_matches(qb).await
    }

    /// Listings with no reservation overlapping `days`, nearest first.
    pub async fn search_available(
        &self,
        origin: Point,
        days: DayRange,
    ) -> AppResult<Vec<ListingMatch>> {
        debug!(%origin, %days, "availability search");
        let mut qb = match_query(origin);
        qb.push(" AND NOT EXISTS (SELECT 1 FROM Reservations res WHERE res.listingId = l.id AND ");
        push_overlap(&mut qb, days);
        qb.push(")");
        finish_match_query(&mut qb, None);
        self.fetch_matches(qb).await
    }

    async fn fetch_matches(&self, mut qb: QueryBuilder<'_, Sqlite>) -> AppResult<Vec<ListingMatch>> {
        let rows = qb
            .build_query_as::<ListingMatch>()
            .fetch_all(self.database().pool())
            .await
            .map_err(|e| AppError::from_sqlx("Failed to search listings", e))?;
        Ok(rows.into_iter().map(ListingMatch::with_distance).collect())
    }

    pub async fn user_listings(&self, user_name: &str) -> AppResult<Vec<Listing>> {
        let user_id = self.database().resolve_user(user_name).await?;
        sqlx::query_as::<_, Listing>(
            "SELECT l.id AS id, l.userId AS user_id, l.title AS title, l.description AS description, \
             loc.x AS x, loc.y AS y \
             FROM Listings l JOIN Locations loc ON loc.listingId = l.id \
             WHERE l.userId = ? ORDER BY l.id",
        )
        .bind(user_id)
        .fetch_all(self.database().pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list user listings", e))
    }

    /// Deletes the listing only when `user_name` owns it. Returns whether a
    /// row was removed; locations, reservations and ratings cascade.
    pub async fn delete_listing(&self, user_name: &str, listing_id: ListingId) -> AppResult<bool> {
        let user_id = self.database().resolve_user(user_name).await?;
        let result = sqlx::query("DELETE FROM Listings WHERE id = ? AND userId = ?")
            .bind(listing_id)
            .bind(user_id)
            .execute(self.database().pool())
            .await
            .map_err(|e| AppError::from_sqlx("Failed to delete listing", e))?;

        let deleted = result.rows_affected() > 0;
        info!(%listing_id, %user_id, deleted, "listing delete");
        Ok(deleted)
    }
}
