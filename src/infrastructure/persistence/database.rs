use anyhow::{Context, Result};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Feature warehouse connection
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        // Ensure the directory exists if it's a file path
        if let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create database directory")?;
            }
        }

        // Every connection to an in-memory database sees its own empty schema
        let in_memory = db_url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(db_url)
            .context(format!("Invalid database URL: {}", db_url))?
            .create_if_missing(true);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        info!("Connected to feature database: {}", db_url);

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                app_id INTEGER PRIMARY KEY,
                name TEXT,
                release_date TEXT,
                launch_price REAL
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create games table")?;

        // One row per (game, feature); a NULL value marks a gap in the upstream data
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS game_features (
                app_id INTEGER NOT NULL,
                feature TEXT NOT NULL,
                value REAL,
                PRIMARY KEY (app_id, feature)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create game_features table")?;

        info!("Feature database schema initialized.");
        Ok(())
    }
}
