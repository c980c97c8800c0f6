// File: src/repositories/sqlite/captcha.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

use chatwarden_common::models::captcha::CaptchaChallenge;
use chatwarden_common::traits::CaptchaRepository;
use crate::Error;

/// Durable copy of outstanding challenges so a restart can reconcile the
/// ones whose timers were lost.
#[derive(Clone)]
pub struct SqliteCaptchaRepository {
    pool: Pool<Sqlite>,
}

impl SqliteCaptchaRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaptchaRepository for SqliteCaptchaRepository {
    async fn upsert(&self, challenge: &CaptchaChallenge) -> Result<(), Error> {
        let options_json = serde_json::to_string(&challenge.options)?;
        sqlx::query(
            r#"
            INSERT INTO captcha_challenges (
                chat_id, user_id, options_json, correct_index,
                created_at, join_message_id, challenge_message_id
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(chat_id, user_id) DO UPDATE SET
                options_json = excluded.options_json,
                correct_index = excluded.correct_index,
                created_at = excluded.created_at,
                join_message_id = excluded.join_message_id,
                challenge_message_id = excluded.challenge_message_id
            "#,
        )
        .bind(challenge.chat_id)
        .bind(challenge.user_id)
        .bind(&options_json)
        .bind(challenge.correct_index as i64)
        .bind(challenge.created_at)
        .bind(challenge.join_message_id)
        .bind(challenge.challenge_message_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, user_id: i64, chat_id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM captcha_challenges WHERE chat_id = ? AND user_id = ?")
            .bind(chat_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<CaptchaChallenge>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT chat_id, user_id, options_json, correct_index,
                   created_at, join_message_id, challenge_message_id
            FROM captcha_challenges
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let options_json: String = r.try_get("options_json")?;
            out.push(CaptchaChallenge {
                chat_id: r.try_get("chat_id")?,
                user_id: r.try_get("user_id")?,
                options: serde_json::from_str(&options_json)?,
                correct_index: r.try_get::<i64, _>("correct_index")? as usize,
                created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
                join_message_id: r.try_get("join_message_id")?,
                challenge_message_id: r.try_get("challenge_message_id")?,
            });
        }
        Ok(out)
    }
}
