use super::{Recorded, SeenStore, StoreError};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

// Table layout is shared with databases created by earlier releases.
const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS feed2nostr (
    feed VARCHAR NOT NULL,
    guid VARCHAR NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT current_timestamp,
    PRIMARY KEY (feed, guid)
)"#;

const INSERT_SEEN: &str = "INSERT INTO feed2nostr (feed, guid) VALUES ($1, $2)";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open the store. An empty or missing DSN falls back to the libpq `PG*`
    /// environment variables.
    pub async fn connect(dsn: Option<&str>) -> Result<Self, StoreError> {
        let options = match dsn {
            Some(dsn) if !dsn.trim().is_empty() => dsn.parse::<PgConnectOptions>()?,
            _ => PgConnectOptions::new(),
        };

        // One connection for the whole run, items are processed sequentially.
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SeenStore for PgStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn record(&self, feed: &str, guid: &str) -> Result<Recorded, StoreError> {
        let result = sqlx::query(INSERT_SEEN)
            .bind(feed)
            .bind(guid)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(Recorded::New),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(Recorded::AlreadySeen),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Runs only against a real server: DATABASE_URL=postgres://... cargo test
    async fn test_store() -> Option<PgStore> {
        let dsn = std::env::var("DATABASE_URL").ok()?;
        let store = PgStore::connect(Some(&dsn)).await.unwrap();
        store.ensure_schema().await.unwrap();
        Some(store)
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_already_seen() {
        let Some(store) = test_store().await else {
            return;
        };
        let feed = format!(
            "https://example.com/feed/{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );

        assert_eq!(store.record(&feed, "guid-1").await.unwrap(), Recorded::New);
        assert_eq!(
            store.record(&feed, "guid-1").await.unwrap(),
            Recorded::AlreadySeen
        );
        // Same guid under another feed is a different pair
        assert_eq!(
            store.record(&format!("{}/other", feed), "guid-1").await.unwrap(),
            Recorded::New
        );
        // Schema creation is idempotent
        store.ensure_schema().await.unwrap();
    }
}
