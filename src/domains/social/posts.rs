use chrono::Utc;
use tracing::{info, warn};

use super::SocialService;
use crate::core::strong_types::PostId;
use crate::error::{AppError, AppResult};
use crate::models::Post;

impl SocialService {
    pub async fn create_post(&self, user_name: &str, title: &str, body: &str) -> AppResult<PostId> {
        let poster_id = self.database().resolve_account(user_name).await?;
        let result = sqlx::query(
            "INSERT INTO Posts (posterId, title, textBody, created) VALUES (?, ?, ?, ?)",
        )
        .bind(poster_id)
        .bind(title)
        .bind(body)
        .bind(Utc::now().timestamp())
        .execute(self.database().pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to create post", e))?;

        let id = PostId::new(result.last_insert_rowid());
        info!(%id, %poster_id, "post created");
        Ok(id)
    }

    /// The account's own posts, newest first.
    pub async fn my_posts(&self, user_name: &str) -> AppResult<Vec<Post>> {
        let poster_id = self.database().resolve_account(user_name).await?;
        sqlx::query_as::<_, Post>(
            "SELECT p.id AS id, p.posterId AS poster_id, a.userName AS poster_name, \
             p.title AS title, p.textBody AS text_body, p.created AS created, \
             (SELECT COUNT(*) FROM Likes lk WHERE lk.postId = p.id) AS likes, \
             (SELECT COUNT(*) FROM Comments c WHERE c.postId = p.id) AS comments \
             FROM Posts p JOIN Accounts a ON a.id = p.posterId \
             WHERE p.posterId = ? \
             ORDER BY p.created DESC, p.id DESC",
        )
        .bind(poster_id)
        .fetch_all(self.database().pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to list posts", e))
    }

    /// Deletes a post owned by `user_name` together with its likes and
    /// comments, all in one transaction. Follow edges are untouched: they
    /// relate accounts, not posts.
    pub async fn delete_post(&self, user_name: &str, post_id: PostId) -> AppResult<()> {
        let account_id = self.database().resolve_account(user_name).await?;
        let mut tx = self.database().begin_transaction().await?;

        let owned = sqlx::query("SELECT id FROM Posts WHERE id = ? AND posterId = ?")
            .bind(post_id)
            .bind(account_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to check post ownership", e))?;

        if owned.is_none() {
            warn!(%post_id, %account_id, "delete of foreign or missing post rejected");
            return Err(AppError::Forbidden("This is not your post".to_string()));
        }

        for (table, column) in [("Likes", "postId"), ("Comments", "postId"), ("Posts", "id")] {
            sqlx::query(&format!("DELETE FROM {} WHERE {} = ?", table, column))
                .bind(post_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::from_sqlx(&format!("Failed to delete from {}", table), e))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit post delete: {}", e)))?;

        info!(%post_id, %account_id, "post deleted");
        Ok(())
    }
}
