use tracing::{info, warn};

use super::SocialService;
use crate::core::strong_types::{CommentId, PostId};
use crate::error::{AppError, AppResult};

impl SocialService {
    /// Records one like per (post, account). A repeat like is rejected with
    /// `Conflict` and leaves the store unchanged.
    pub async fn like(&self, user_name: &str, post_id: PostId) -> AppResult<()> {
        let account_id = self.database().resolve_account(user_name).await?;
        self.ensure_post_exists(post_id).await?;

        let mut tx = self.database().begin_transaction().await?;
        let existing = sqlx::query("SELECT 1 FROM Likes WHERE postId = ? AND userId = ?")
            .bind(post_id)
            .bind(account_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to check existing like", e))?;

        if existing.is_some() {
            warn!(%post_id, %account_id, "duplicate like ignored");
            return Err(AppError::Conflict(
                "You have already liked this post.".to_string(),
            ));
        }

        sqlx::query("INSERT INTO Likes (postId, userId) VALUES (?, ?)")
            .bind(post_id)
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to like post", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit like: {}", e)))?;

        info!(%post_id, %account_id, "post liked");
        Ok(())
    }

    pub async fn comment(&self, user_name: &str, post_id: PostId, text: &str) -> AppResult<CommentId> {
        let account_id = self.database().resolve_account(user_name).await?;
        self.ensure_post_exists(post_id).await?;

        let result =
            sqlx::query("INSERT INTO Comments (textBody, commenterId, postId) VALUES (?, ?, ?)")
                .bind(text)
                .bind(account_id)
                .bind(post_id)
                .execute(self.database().pool())
                .await
                .map_err(|e| AppError::from_sqlx("Failed to comment on post", e))?;

        let id = CommentId::new(result.last_insert_rowid());
        info!(%id, %post_id, %account_id, "comment created");
        Ok(id)
    }
}
