use tracing::debug;

use super::listings::OVERLAP_PREDICATE;
use super::MarketplaceService;
use crate::core::strong_types::DayRange;
use crate::error::{AppError, AppResult};
use crate::models::Recommendation;

pub const RECOMMENDATION_LIMIT: i64 = 10;

impl MarketplaceService {
    /// Naive collaborative filtering over reservations.
    ///
    /// Users who booked any listing `user_name` booked are "similar", weighted
    /// by how many distinct listings they share. A candidate listing is one a
    /// similar user booked that `user_name` has neither booked nor owns and
    /// that is free for all of `days`. Its score is the summed weight of the
    /// similar users who booked it.
    pub async fn recommended_listings(
        &self,
        user_name: &str,
        days: DayRange,
    ) -> AppResult<Vec<Recommendation>> {
        let user_id = self.database().resolve_user(user_name).await?;
        debug!(%user_id, %days, "computing recommendations");

        let sql = format!(
            "WITH mine AS ( \
                 SELECT DISTINCT listingId FROM Reservations WHERE userId = ? \
             ), \
             similar AS ( \
                 SELECT r.userId AS userId, COUNT(DISTINCT r.listingId) AS common \
                 FROM Reservations r JOIN mine ON mine.listingId = r.listingId \
                 WHERE r.userId <> ? \
                 GROUP BY r.userId \
             ), \
             booked AS ( \
                 SELECT DISTINCT userId, listingId FROM Reservations \
             ) \
             SELECT l.id AS id, l.title AS title, l.description AS description, \
                    SUM(s.common) AS score, avg_r.avg_rating AS avg_rating \
             FROM similar s \
             JOIN booked b ON b.userId = s.userId \
             JOIN Listings l ON l.id = b.listingId \
             LEFT JOIN (SELECT listingId, AVG(rating) AS avg_rating FROM Ratings GROUP BY listingId) avg_r \
                 ON avg_r.listingId = l.id \
             WHERE l.id NOT IN (SELECT listingId FROM mine) \
               AND l.userId <> ? \
               AND NOT EXISTS (SELECT 1 FROM Reservations res WHERE res.listingId = l.id AND {}) \
             GROUP BY l.id \
             ORDER BY score DESC, l.id \
             LIMIT ?",
            OVERLAP_PREDICATE
        );

        sqlx::query_as::<_, Recommendation>(&sql)
            .bind(user_id)
            .bind(user_id)
            .bind(user_id)
            .bind(days.start)
            .bind(days.end)
            .bind(RECOMMENDATION_LIMIT)
            .fetch_all(self.database().pool())
            .await
            .map_err(|e| AppError::from_sqlx("Failed to compute recommendations", e))
    }
}
