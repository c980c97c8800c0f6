// File: src/repositories/sqlite/spam_corpus.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use chatwarden_common::models::classifier::LabeledSample;
use chatwarden_common::traits::SpamCorpusRepository;
use crate::Error;

#[derive(Clone)]
pub struct SqliteSpamCorpusRepository {
    pool: Pool<Sqlite>,
}

impl SqliteSpamCorpusRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpamCorpusRepository for SqliteSpamCorpusRepository {
    async fn append(&self, sample: &LabeledSample) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO spam_corpus (sample_id, text, is_spam, added_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(sample.sample_id.to_string())
        .bind(&sample.text)
        .bind(sample.is_spam)
        .bind(sample.added_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<LabeledSample>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT sample_id, text, is_spam, added_at
            FROM spam_corpus
            ORDER BY added_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let id_str: String = r.try_get("sample_id")?;
            out.push(LabeledSample {
                sample_id: Uuid::parse_str(&id_str)
                    .map_err(|e| Error::Parse(format!("bad sample id '{}': {}", id_str, e)))?,
                text: r.try_get("text")?,
                is_spam: r.try_get("is_spam")?,
                added_at: r.try_get::<DateTime<Utc>, _>("added_at")?,
            });
        }
        Ok(out)
    }
}
