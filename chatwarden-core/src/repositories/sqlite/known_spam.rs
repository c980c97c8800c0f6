// File: src/repositories/sqlite/known_spam.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};

use chatwarden_common::traits::KnownSpamRepository;
use crate::Error;

#[derive(Clone)]
pub struct SqliteKnownSpamRepository {
    pool: Pool<Sqlite>,
}

impl SqliteKnownSpamRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KnownSpamRepository for SqliteKnownSpamRepository {
    async fn insert_hash(&self, content_hash: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO known_spam (content_hash, added_at)
            VALUES (?, ?)
            "#,
        )
        .bind(content_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<String>, Error> {
        let rows = sqlx::query("SELECT content_hash FROM known_spam")
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(r.try_get("content_hash")?);
        }
        Ok(out)
    }
}
