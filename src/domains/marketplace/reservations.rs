use sqlx::Row;
use tracing::{info, warn};

use super::listings::OVERLAP_PREDICATE;
use super::MarketplaceService;
use crate::core::strong_types::{DayRange, ListingId, ReservationId};
use crate::error::{AppError, AppResult};
use crate::models::Reservation;

const RESERVATION_COLUMNS: &str = "SELECT r.id AS id, r.userId AS user_id, u.name AS user_name, \
     r.listingId AS listing_id, l.title AS listing_title, r.day1 AS day1, r.day2 AS day2 \
     FROM Reservations r \
     JOIN Users u ON u.id = r.userId \
     JOIN Listings l ON l.id = r.listingId";

impl MarketplaceService {
    /// Books `days` on a listing. Any existing reservation on the same listing
    /// whose interval is not strictly disjoint (touching endpoints included)
    /// rejects the request with `Conflict`. Check and insert share a transaction.
    pub async fn reserve(
        &self,
        user_name: &str,
        listing_id: ListingId,
        days: DayRange,
    ) -> AppResult<ReservationId> {
        let user_id = self.database().resolve_user(user_name).await?;
        self.listing_owner(listing_id).await?;

        let mut tx = self.database().begin_transaction().await?;

        let overlapping: i64 = sqlx::query(&format!(
            "SELECT COUNT(*) AS n FROM Reservations res WHERE res.listingId = ? AND {}",
            OVERLAP_PREDICATE
        ))
        .bind(listing_id)
        .bind(days.start)
        .bind(days.end)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to check reservation overlap", e))?
        .get("n");

        if overlapping > 0 {
            warn!(%listing_id, %days, overlapping, "reservation rejected");
            return Err(AppError::Conflict(format!(
                "There are overlapping reservations for listing {} in {}",
                listing_id, days
            )));
        }

        let result = sqlx::query(
            "INSERT INTO Reservations (userId, listingId, day1, day2) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(listing_id)
        .bind(days.start)
        .bind(days.end)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to create reservation", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit reservation: {}", e)))?;

        let id = ReservationId::new(result.last_insert_rowid());
        info!(%id, %user_id, %listing_id, %days, "reservation created");
        Ok(id)
    }

    pub async fn user_reservations(&self, user_name: &str) -> AppResult<Vec<Reservation>> {
        let user_id = self.database().resolve_user(user_name).await?;
        sqlx::query_as::<_, Reservation>(&format!(
            "{} WHERE r.userId = ? ORDER BY r.day1, r.id",
            RESERVATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.database().pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list user reservations", e))
    }

    pub async fn listing_reservations(&self, listing_id: ListingId) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(&format!(
            "{} WHERE r.listingId = ? ORDER BY r.day1, r.id",
            RESERVATION_COLUMNS
        ))
        .bind(listing_id)
        .fetch_all(self.database().pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list listing reservations", e))
    }

    /// Reservations on a listing, visible only to the listing's owner.
    pub async fn reservations_for_owner(
        &self,
        user_name: &str,
        listing_id: ListingId,
    ) -> AppResult<Vec<Reservation>> {
        let user_id = self.database().resolve_user(user_name).await?;
        let owner = self.listing_owner(listing_id).await?;
        if owner != user_id {
            return Err(AppError::Forbidden(format!(
                "Listing {} does not belong to {}",
                listing_id, user_name
            )));
        }
        self.listing_reservations(listing_id).await
    }

    /// Removes every reservation `user_name` holds on the listing and returns
    /// how many were removed. Zero is not an error.
    pub async fn cancel(&self, user_name: &str, listing_id: ListingId) -> AppResult<u64> {
        let user_id = self.database().resolve_user(user_name).await?;
        let result = sqlx::query("DELETE FROM Reservations WHERE listingId = ? AND userId = ?")
            .bind(listing_id)
            .bind(user_id)
            .execute(self.database().pool())
            .await
            .map_err(|e| AppError::from_sqlx("Failed to cancel reservation", e))?;

        let removed = result.rows_affected();
        info!(%listing_id, %user_id, removed, "reservations cancelled");
        Ok(removed)
    }
}
