use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use wq_core::{Error, NewQuizRecord, QuizRecord, QuizStorage, Result};
use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS quizzes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        url TEXT NOT NULL,
        title TEXT NOT NULL,
        date_generated TEXT NOT NULL,
        scraped_content TEXT,
        full_quiz_data TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_quizzes_date_generated ON quizzes (date_generated)
    "#,
];

pub struct SQLiteStorage {
    pool: SqlitePool,
}

fn storage_err(action: &str, e: sqlx::Error) -> Error {
    Error::Storage(format!("Failed to {}: {}", action, e))
}

// Fixed-width UTC timestamps sort lexicographically in the same order as in time.
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_row(row: &SqliteRow) -> Result<QuizRecord> {
    let generated: String = row.try_get("date_generated").map_err(|e| storage_err("read row", e))?;
    let date_generated = DateTime::parse_from_rfc3339(&generated)
        .map_err(|e| Error::Storage(format!("Failed to parse date {:?}: {}", generated, e)))?
        .with_timezone(&Utc);

    Ok(QuizRecord {
        id: row.try_get("id").map_err(|e| storage_err("read row", e))?,
        url: row.try_get("url").map_err(|e| storage_err("read row", e))?,
        title: row.try_get("title").map_err(|e| storage_err("read row", e))?,
        date_generated,
        scraped_content: row.try_get("scraped_content").map_err(|e| storage_err("read row", e))?,
        full_quiz_data: row.try_get("full_quiz_data").map_err(|e| storage_err("read row", e))?,
    })
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create database directory: {}", e)))?;
        }
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        Self::with_options(options, false).await
    }

    async fn with_options(options: SqliteConnectOptions, in_memory: bool) -> Result<Self> {
        let pool_options = if in_memory {
            // The database lives only as long as one connection stays open
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| storage_err("connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self { pool })
    }
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "DATABASE_URL should look like sqlite://quizzes.db"
    }

    async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| storage_err("parse database URL", e))?
            .create_if_missing(true);
        Self::with_options(options, database_url.contains(":memory:")).await
    }
}

#[async_trait]
impl QuizStorage for SQLiteStorage {
    async fn save(&self, record: NewQuizRecord) -> Result<QuizRecord> {
        let date_generated = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO quizzes (url, title, date_generated, scraped_content, full_quiz_data)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.url)
        .bind(&record.title)
        .bind(encode_timestamp(&date_generated))
        .bind(record.scraped_content.as_deref())
        .bind(&record.full_quiz_data)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_err("store quiz", e))?;

        let id = result.last_insert_rowid();
        tracing::debug!("Stored quiz {} for {}", id, record.url);

        Ok(QuizRecord {
            id,
            url: record.url,
            title: record.title,
            date_generated,
            scraped_content: record.scraped_content,
            full_quiz_data: record.full_quiz_data,
        })
    }

    async fn list_recent(&self) -> Result<Vec<QuizRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM quizzes
            ORDER BY date_generated DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_err("list quizzes", e))?;

        rows.iter().map(decode_row).collect()
    }

    async fn get_record(&self, id: i64) -> Result<Option<QuizRecord>> {
        let row = sqlx::query("SELECT * FROM quizzes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_err("get quiz", e))?;

        row.as_ref().map(decode_row).transpose()
    }
}
