// File: src/repositories/sqlite/decision_log.rs

use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use chatwarden_common::models::audit::DecisionLogEntry;
use chatwarden_common::traits::DecisionLogRepository;
use crate::Error;

#[derive(Clone)]
pub struct SqliteDecisionLogRepository {
    pool: Pool<Sqlite>,
}

impl SqliteDecisionLogRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DecisionLogRepository for SqliteDecisionLogRepository {
    async fn insert_batch(&self, entries: &[DecisionLogEntry]) -> Result<(), Error> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO decision_log (
                    entry_id, chat_id, user_id, message_id,
                    action, reason, confidence, decided_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(entry.entry_id.to_string())
            .bind(entry.chat_id)
            .bind(entry.user_id)
            .bind(entry.message_id)
            .bind(&entry.action)
            .bind(&entry.reason)
            .bind(entry.confidence as f64)
            .bind(entry.decided_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
