use sqlx::Row;
use tracing::info;

use super::MarketplaceService;
use crate::core::strong_types::{ListingId, RatingId};
use crate::error::{AppError, AppResult};
use crate::models::{ListingRatings, Rating};

impl MarketplaceService {
    /// Records a rating. Repeat ratings by the same user are kept as separate rows.
    pub async fn rate(
        &self,
        user_name: &str,
        listing_id: ListingId,
        rating: i64,
        comment: &str,
    ) -> AppResult<RatingId> {
        let user_id = self.database().resolve_user(user_name).await?;
        self.listing_owner(listing_id).await?;

        let result = sqlx::query(
            "INSERT INTO Ratings (userId, listingId, rating, comment) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(listing_id)
        .bind(rating)
        .bind(comment)
        .execute(self.database().pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to create rating", e))?;

        let id = RatingId::new(result.last_insert_rowid());
        info!(%id, %user_id, %listing_id, rating, "rating created");
        Ok(id)
    }

    pub async fn listing_ratings(&self, listing_id: ListingId) -> AppResult<ListingRatings> {
        let pool = self.database().pool();
        let ratings = sqlx::query_as::<_, Rating>(
            "SELECT r.id AS id, r.userId AS user_id, u.name AS user_name, r.listingId AS listing_id, \
             r.rating AS rating, r.comment AS comment \
             FROM Ratings r JOIN Users u ON u.id = r.userId \
             WHERE r.listingId = ? ORDER BY r.id",
        )
        .bind(listing_id)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list ratings", e))?;

        let average: Option<f64> =
            sqlx::query("SELECT AVG(rating) AS average FROM Ratings WHERE listingId = ?")
                .bind(listing_id)
                .fetch_one(pool)
                .await
                .map_err(|e| AppError::from_sqlx("Failed to average ratings", e))?
                .get("average");

        Ok(ListingRatings {
            listing_id,
            average,
            ratings,
        })
    }
}
