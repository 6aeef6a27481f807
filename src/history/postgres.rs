// src/history/postgres.rs
use super::{HistoryError, HistoryStore};
use crate::db;
use crate::models::{ChatMessage, ConversationKey, Role};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::OnceCell;

/// History log in the `chat_history` table.
pub struct PgHistoryStore {
    db_pool: PgPool,
    schema: OnceCell<()>,
}

impl PgHistoryStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self {
            db_pool,
            schema: OnceCell::new(),
        }
    }

    /// Runs the migrations once per process. A failed attempt leaves the
    /// cell empty so the next call tries again.
    pub async fn ensure_schema(&self) -> Result<(), HistoryError> {
        self.schema
            .get_or_try_init(|| async { db::run_migrations(&self.db_pool).await })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn fetch(&self, key: &ConversationKey) -> Result<Vec<ChatMessage>, HistoryError> {
        self.ensure_schema().await?;

        let rows = sqlx::query_as::<_, (String, String, DateTime<Utc>)>(
            "SELECT role, content, timestamp
             FROM chat_history
             WHERE username = $1 AND chat_id = $2
             ORDER BY timestamp ASC, id ASC",
        )
        .bind(&key.username)
        .bind(&key.chat_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(role, content, timestamp)| ChatMessage {
                role: Role::from_db(&role),
                content,
                timestamp,
            })
            .collect())
    }

    async fn append(
        &self,
        key: &ConversationKey,
        messages: &[ChatMessage],
    ) -> Result<(), HistoryError> {
        self.ensure_schema().await?;

        let mut tx = self.db_pool.begin().await?;

        for message in messages {
            let inserted = sqlx::query(
                "INSERT INTO chat_history (username, chat_id, role, content, timestamp)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&key.username)
            .bind(&key.chat_id)
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(message.timestamp)
            .execute(&mut *tx)
            .await;

            if let Err(e) = inserted {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(
                        conversation = %key,
                        error = %rollback_err,
                        "Rollback of chat history batch failed"
                    );
                }
                return Err(e.into());
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), HistoryError> {
        sqlx::query("SELECT 1").execute(&self.db_pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
