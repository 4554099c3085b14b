#![allow(dead_code)]

use std::sync::Arc;
use tempfile::TempDir;

use stayfeed::config::Config;
use stayfeed::domains::{MarketplaceService, SocialService};
use stayfeed::infrastructure::SqliteDatabase;

/// A freshly created store in its own temp directory. The directory lives as
/// long as this value does.
pub struct TestStore {
    pub dir: TempDir,
    pub config: Config,
    pub db: Arc<SqliteDatabase>,
}

impl TestStore {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = Config::with_database(dir.path().join("database.db"));
        let db = Arc::new(SqliteDatabase::create(&config).await.unwrap());
        Self { dir, config, db }
    }

    pub fn marketplace(&self) -> MarketplaceService {
        MarketplaceService::new(self.db.clone())
    }

    pub fn social(&self) -> SocialService {
        SocialService::new(self.db.clone())
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(self.db.pool())
            .await
            .unwrap()
    }
}
