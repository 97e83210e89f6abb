pub mod send_records;
pub mod templates;

pub use templates::TemplateFilter;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

#[derive(Clone)]
pub struct Database {
    pub(crate) pool: AnyPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(20)
            .min_connections(5)
            .connect(database_url)
            .await?;

        // Enable foreign keys for SQLite
        if database_url.starts_with("sqlite") {
            sqlx::query("PRAGMA foreign_keys = ON")
                .execute(&pool)
                .await?;
        }

        Ok(Self { pool })
    }

    pub async fn create_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS templates (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                provider_template_name TEXT,
                provider_template_id TEXT,
                language TEXT NOT NULL,
                category TEXT NOT NULL,
                header TEXT,
                body TEXT NOT NULL,
                footer TEXT,
                buttons TEXT NOT NULL,
                variables TEXT NOT NULL,
                status TEXT NOT NULL,
                automation_trigger TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        // One template per trigger key; NULL rows stay unconstrained.
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_templates_trigger
                 ON templates(automation_trigger)
                 WHERE automation_trigger IS NOT NULL",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS send_records (
                id TEXT PRIMARY KEY,
                number TEXT NOT NULL,
                template_name TEXT,
                payload TEXT NOT NULL,
                status TEXT NOT NULL,
                provider_response TEXT,
                error_message TEXT,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_send_records_created ON send_records(created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}
