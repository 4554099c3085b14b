// Social domain - accounts, posts, follows, likes, comments and the feed

mod accounts;
mod engagement;
mod feed;
mod follows;
mod posts;

pub use follows::SUGGESTION_LIMIT;

use std::sync::Arc;

use crate::core::strong_types::PostId;
use crate::error::{AppError, AppResult};
use crate::infrastructure::SqliteDatabase;

#[derive(Clone)]
pub struct SocialService {
    db: Arc<SqliteDatabase>,
}

impl SocialService {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &SqliteDatabase {
        &self.db
    }

    pub(crate) async fn ensure_post_exists(&self, post_id: PostId) -> AppResult<()> {
        let row = sqlx::query("SELECT 1 FROM Posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| AppError::from_sqlx("Failed to look up post", e))?;

        match row {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("No post found with id: {}", post_id))),
        }
    }
}

/// Escapes `%`, `_` and `\` so user input matches literally inside `LIKE ... ESCAPE '\'`.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
