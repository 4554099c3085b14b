use tracing::debug;

use super::SocialService;
use crate::error::{AppError, AppResult};
use crate::models::FeedItem;

impl SocialService {
    /// Posts by every account `user_name` follows, newest first, each with its
    /// like count and its comments flattened to `"commenter: text, ..."`.
    pub async fn feed(&self, user_name: &str) -> AppResult<Vec<FeedItem>> {
        let account_id = self.database().resolve_account(user_name).await?;
        debug!(%account_id, "building feed");

        sqlx::query_as::<_, FeedItem>(
            "SELECT p.id AS id, p.posterId AS poster_id, a.userName AS poster_name, \
             p.title AS title, p.textBody AS text_body, p.created AS created, \
             (SELECT COUNT(*) FROM Likes lk WHERE lk.postId = p.id) AS likes, \
             (SELECT GROUP_CONCAT(ca.userName || ': ' || c.textBody, ', ') \
                FROM Comments c JOIN Accounts ca ON ca.id = c.commenterId \
                WHERE c.postId = p.id) AS comments \
             FROM Posts p JOIN Accounts a ON a.id = p.posterId \
             WHERE p.posterId IN (SELECT followeeId FROM Follows WHERE followerId = ?) \
             ORDER BY p.created DESC, p.id DESC",
        )
        .bind(account_id)
        .fetch_all(self.database().pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to build feed", e))
    }
}
