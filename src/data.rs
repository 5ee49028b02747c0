use sqlx::{Row, SqlitePool};

/// A SQLite table keyed by article URL.
#[async_trait::async_trait]
pub trait Table {
    type Record<'a>;

    fn get_name(&self) -> &str;
    fn get_pool(&self) -> &SqlitePool;

    async fn create(&self) -> Result<(), sqlx::Error>;
    async fn insert<'a>(&self, record: Self::Record<'a>) -> Result<(), sqlx::Error>;

    async fn is_exist<I: AsRef<str> + Send + Sync>(&self, url: I) -> Result<bool, sqlx::Error> {
        let query = format!("SELECT url FROM {} WHERE url = ?", self.get_name());
        Ok(sqlx::query(&query)
            .bind(url.as_ref().trim())
            .fetch_optional(self.get_pool())
            .await?
            .is_some())
    }

    async fn count(&self) -> Result<u32, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {}", self.get_name());
        Ok(sqlx::query(&query)
            .fetch_one(self.get_pool())
            .await?
            .try_get(0)?)
    }
}
