pub mod schema;

use std::sync::Arc;
use std::time::Duration;

use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;

#[derive(Clone)]
pub struct Db {
    pub pool: Arc<AnyPool>,
}

impl Db {
    /// `settings` and `posting_windows` are single-row tables (`id = 1`)
    /// every tick reads and occasionally writes, so concurrent `UPDATE`s can
    /// contend for the same row. An `acquire_timeout` below the minimum tick
    /// cadence makes a stuck pool surface as a tick-level error instead of
    /// hanging the scheduler loop indefinitely.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = AnyPoolOptions::new()
            .max_connections(16)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        schema::migrate(&self.pool).await
    }
}
