// File: src/repositories/sqlite/trust_state.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

use chatwarden_common::models::trust::{StoredTrustRow, TrustRecord, TRUST_SCHEMA_VERSION};
use chatwarden_common::traits::TrustStateRepository;
use crate::Error;

/// Concrete SQLite repo for trust states. State payloads are stored as JSON
/// next to their schema version so old rows can be upgraded at load time.
#[derive(Clone)]
pub struct SqliteTrustStateRepository {
    pool: Pool<Sqlite>,
}

impl SqliteTrustStateRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrustStateRepository for SqliteTrustStateRepository {
    async fn upsert(&self, record: &TrustRecord) -> Result<(), Error> {
        let state_json = serde_json::to_string(&record.state)?;
        sqlx::query(
            r#"
            INSERT INTO trust_states (user_id, chat_id, schema_version, state_json, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id, chat_id) DO UPDATE SET
                schema_version = excluded.schema_version,
                state_json = excluded.state_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(record.user_id)
        .bind(record.chat_id)
        .bind(TRUST_SCHEMA_VERSION)
        .bind(&state_json)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, user_id: i64, chat_id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM trust_states WHERE user_id = ? AND chat_id = ?")
            .bind(user_id)
            .bind(chat_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn load_all_rows(&self) -> Result<Vec<StoredTrustRow>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, chat_id, schema_version, state_json, updated_at
            FROM trust_states
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(StoredTrustRow {
                user_id: r.try_get("user_id")?,
                chat_id: r.try_get("chat_id")?,
                schema_version: r.try_get("schema_version")?,
                state_json: r.try_get("state_json")?,
                updated_at: r.try_get::<DateTime<Utc>, _>("updated_at")?,
            });
        }
        Ok(out)
    }
}
