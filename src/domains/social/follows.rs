use tracing::info;

use super::SocialService;
use crate::error::{AppError, AppResult};
use crate::models::Account;

pub const SUGGESTION_LIMIT: i64 = 10;

impl SocialService {
    /// Adds the edge `user_name -> followee_name` and returns up to
    /// `SUGGESTION_LIMIT` other accounts that already follow the followee.
    pub async fn follow(&self, user_name: &str, followee_name: &str) -> AppResult<Vec<Account>> {
        let follower_id = self.database().resolve_account(user_name).await?;
        let followee_id = self.database().resolve_account(followee_name).await?;

        sqlx::query("INSERT INTO Follows (followerId, followeeId) VALUES (?, ?)")
            .bind(follower_id)
            .bind(followee_id)
            .execute(self.database().pool())
            .await
            .map_err(|e| AppError::from_sqlx("Failed to follow account", e))?;
        info!(%follower_id, %followee_id, "follow created");

        sqlx::query_as::<_, Account>(
            "SELECT DISTINCT a.id AS id, a.userId AS user_id, a.userName AS user_name \
             FROM Follows f JOIN Accounts a ON a.id = f.followerId \
             WHERE f.followeeId = ? AND f.followerId <> ? \
             ORDER BY a.userName \
             LIMIT ?",
        )
        .bind(followee_id)
        .bind(follower_id)
        .bind(SUGGESTION_LIMIT)
        .fetch_all(self.database().pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to load follow suggestions", e))
    }

    /// Removes every `user_name -> followee_name` edge; returns how many went.
    pub async fn unfollow(&self, user_name: &str, followee_name: &str) -> AppResult<u64> {
        let follower_id = self.database().resolve_account(user_name).await?;
        let followee_id = self.database().resolve_account(followee_name).await?;

        let result = sqlx::query("DELETE FROM Follows WHERE followerId = ? AND followeeId = ?")
            .bind(follower_id)
            .bind(followee_id)
            .execute(self.database().pool())
            .await
            .map_err(|e| AppError::from_sqlx("Failed to unfollow account", e))?;

        let removed = result.rows_affected();
        info!(%follower_id, %followee_id, removed, "follow removed");
        Ok(removed)
    }

    pub async fn list_follows(&self, user_name: &str) -> AppResult<Vec<Account>> {
        let follower_id = self.database().resolve_account(user_name).await?;
        sqlx::query_as::<_, Account>(
            "SELECT DISTINCT a.id AS id, a.userId AS user_id, a.userName AS user_name \
             FROM Follows f JOIN Accounts a ON a.id = f.followeeId \
             WHERE f.followerId = ? \
             ORDER BY a.userName",
        )
        .bind(follower_id)
        .fetch_all(self.database().pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list follows", e))
    }
}
