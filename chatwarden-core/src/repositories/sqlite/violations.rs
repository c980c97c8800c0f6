// File: src/repositories/sqlite/violations.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

use chatwarden_common::models::violation::{ViolationKind, ViolationRecord};
use chatwarden_common::traits::ViolationRepository;
use crate::Error;

#[derive(Clone)]
pub struct SqliteViolationRepository {
    pool: Pool<Sqlite>,
}

impl SqliteViolationRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ViolationRepository for SqliteViolationRepository {
    async fn upsert(&self, record: &ViolationRecord) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO violations (user_id, chat_id, kind, count, expires_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id, chat_id, kind) DO UPDATE SET
                count = excluded.count,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(record.user_id)
        .bind(record.chat_id)
        .bind(record.kind.as_str())
        .bind(record.count)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_all(&self, user_id: i64, chat_id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM violations WHERE user_id = ? AND chat_id = ?")
            .bind(user_id)
            .bind(chat_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM violations WHERE expires_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn load_all(&self) -> Result<Vec<ViolationRecord>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, chat_id, kind, count, expires_at
            FROM violations
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let kind_str: String = r.try_get("kind")?;
            out.push(ViolationRecord {
                user_id: r.try_get("user_id")?,
                chat_id: r.try_get("chat_id")?,
                kind: ViolationKind::parse(&kind_str)?,
                count: r.try_get("count")?,
                expires_at: r.try_get::<DateTime<Utc>, _>("expires_at")?,
            });
        }
        Ok(out)
    }
}
