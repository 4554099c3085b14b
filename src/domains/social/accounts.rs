use tracing::info;

use super::{escape_like, SocialService};
use crate::core::strong_types::AccountId;
use crate::error::{AppError, AppResult};
use crate::models::Account;

impl SocialService {
    /// Creates a social account bound to the user registered under `email`.
    pub async fn add_account(&self, user_name: &str, email: &str) -> AppResult<AccountId> {
        let user_id = self.database().resolve_user_by_email(email).await?;
        let result = sqlx::query("INSERT INTO Accounts (userId, userName) VALUES (?, ?)")
            .bind(user_id)
            .bind(user_name)
            .execute(self.database().pool())
            .await
            .map_err(|e| {
                AppError::from_sqlx(&format!("Failed to create account {}", user_name), e)
            })?;

        let id = AccountId::new(result.last_insert_rowid());
        info!(%id, %user_id, user_name, "account created");
        Ok(id)
    }

    /// Accounts whose user name contains `fragment` (ASCII case-insensitive).
    pub async fn search_accounts(&self, fragment: &str) -> AppResult<Vec<Account>> {
        let pattern = format!("%{}%", escape_like(fragment));
        sqlx::query_as::<_, Account>(
            "SELECT id, userId AS user_id, userName AS user_name FROM Accounts \
             WHERE userName LIKE ? ESCAPE '\\' ORDER BY userName",
        )
        .bind(pattern)
        .fetch_all(self.database().pool())
        .await
        .map_err(|e| AppError::from_sqlx("Failed to search accounts", e))
    }
}
