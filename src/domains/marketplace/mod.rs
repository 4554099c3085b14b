// Marketplace domain - listings with locations, reservations, ratings and recommendations

mod listings;
mod ratings;
mod recommendations;
mod reservations;

pub use recommendations::RECOMMENDATION_LIMIT;

use sqlx::Row;
use std::sync::Arc;

use crate::core::strong_types::{ListingId, UserId};
use crate::error::{AppError, AppResult};
use crate::infrastructure::SqliteDatabase;

#[derive(Clone)]
pub struct MarketplaceService {
    db: Arc<SqliteDatabase>,
}

impl MarketplaceService {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &SqliteDatabase {
        &self.db
    }

    /// Returns the owner of a listing, or `NotFound` if the id is unknown.
    pub(crate) async fn listing_owner(&self, listing_id: ListingId) -> AppResult<UserId> {
        let row = sqlx::query("SELECT userId FROM Listings WHERE id = ?")
            .bind(listing_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| AppError::from_sqlx("Failed to look up listing", e))?;

        row.map(|row| UserId::new(row.get("userId")))
            .ok_or_else(|| AppError::NotFound(format!("No listing found with id: {}", listing_id)))
    }
}
