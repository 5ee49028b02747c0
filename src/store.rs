use crate::{utils, MonitorError, Storage, Table};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::path::Path;
use tracing::debug;

/// What gets recorded once an article has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRecord {
    pub url: String,
    pub title: String,
    pub status: String,
    pub mistakes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedArticle {
    pub url: String,
    pub title: Option<String>,
    pub status: Option<String>,
    pub processed_at: DateTime<Utc>,
}

pub struct UrlTable {
    name: String,
    pool: SqlitePool,
}

#[async_trait::async_trait]
impl Table for UrlTable {
    type Record<'a> = &'a str;

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create(&self) -> Result<(), sqlx::Error> {
        let query = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                url TEXT PRIMARY KEY,
                created_at DATETIME
             )",
            &self.name
        );
        sqlx::query(query.as_str()).execute(self.get_pool()).await?;
        Ok(())
    }

    async fn insert<'a>(&self, url: Self::Record<'a>) -> Result<(), sqlx::Error> {
        let query = format!(
            "INSERT OR IGNORE INTO {} (url, created_at) VALUES (?, ?)",
            &self.name
        );
        sqlx::query(&query)
            .bind(url.trim())
            .bind(utils::get_now())
            .execute(self.get_pool())
            .await?;
        Ok(())
    }
}

pub struct ProcessedTable {
    name: String,
    pool: SqlitePool,
}

#[async_trait::async_trait]
impl Table for ProcessedTable {
    type Record<'a> = &'a VisitRecord;

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create(&self) -> Result<(), sqlx::Error> {
        let query = format!(
            r#"
                CREATE TABLE IF NOT EXISTS {} (
                    url TEXT PRIMARY KEY,
                    title TEXT,
                    processed_at DATETIME,
                    grammar_status TEXT,
                    mistakes TEXT
                )
            "#,
            &self.name
        );
        sqlx::query(query.as_str()).execute(self.get_pool()).await?;
        Ok(())
    }

    async fn insert<'a>(&self, record: Self::Record<'a>) -> Result<(), sqlx::Error> {
        let mut tx = self.get_pool().begin().await?;
        let query = format!(
            r#"INSERT OR IGNORE INTO {} (
                url,
                title,
                processed_at,
                grammar_status,
                mistakes) VALUES (?, ?, ?, ?, ?)"#,
            self.name
        );
        sqlx::query(&query)
            .bind(record.url.trim())
            .bind(record.title.as_str())
            .bind(utils::get_now())
            .bind(record.status.as_str())
            .bind(record.mistakes.as_deref())
            .execute(&mut tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Visited-URL store backed by a single SQLite file.
///
/// `processed_articles` holds every URL that finished a round of processing.
/// `warned` collects URLs whose extraction or review failed, for inspection.
pub struct SqliteStore {
    pub processed: ProcessedTable,
    pub warned: UrlTable,
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<SqliteStore, MonitorError> {
        let opt = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opt).await?;
        let store = SqliteStore {
            processed: ProcessedTable {
                name: "processed_articles".to_string(),
                pool: pool.clone(),
            },
            warned: UrlTable {
                name: "warned".to_string(),
                pool: pool.clone(),
            },
            pool,
        };

        for name in [store.processed.get_name(), store.warned.get_name()] {
            if utils::is_table_exists(&store.pool, name).await? {
                debug!("Use table {}", name);
            } else {
                debug!("Create table {}", name);
            }
        }
        store.processed.create().await?;
        store.warned.create().await?;

        Ok(store)
    }

    pub async fn count(&self) -> Result<u32, MonitorError> {
        Ok(self.processed.count().await?)
    }

    pub async fn count_since(&self, since: DateTime<Utc>) -> Result<u32, MonitorError> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE processed_at > ?",
            self.processed.get_name()
        );
        Ok(sqlx::query(&query)
            .bind(since)
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?)
    }

    pub async fn last_processed(&self) -> Result<Option<ProcessedArticle>, MonitorError> {
        let query = format!(
            "SELECT url, title, grammar_status, processed_at FROM {} ORDER BY processed_at DESC LIMIT 1",
            self.processed.get_name()
        );
        let mut rows = sqlx::query(&query).fetch(&self.pool);
        match rows.try_next().await? {
            Some(row) => Ok(Some(ProcessedArticle {
                url: row.try_get("url")?,
                title: row.try_get("title")?,
                status: row.try_get("grammar_status")?,
                processed_at: row.try_get("processed_at")?,
            })),
            None => Ok(None),
        }
    }

    pub async fn is_warned<S: AsRef<str>>(&self, url: S) -> Result<bool, MonitorError> {
        Ok(self.warned.is_exist(url.as_ref()).await?)
    }
}

#[async_trait::async_trait]
impl Storage for SqliteStore {
    async fn contains(&self, url: &str) -> Result<bool, MonitorError> {
        Ok(self.processed.is_exist(url).await?)
    }

    async fn add(&self, record: &VisitRecord) -> Result<(), MonitorError> {
        Ok(self.processed.insert(record).await?)
    }

    async fn warn(&self, url: &str) -> Result<(), MonitorError> {
        Ok(self.warned.insert(url).await?)
    }
}
