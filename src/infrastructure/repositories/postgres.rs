//! Postgres-backed message store. The schema is managed outside this
//! service; the expected tables are:
//!
//! ```sql
//! CREATE TABLE messages (
//!     id           UUID PRIMARY KEY,
//!     content      TEXT NOT NULL,
//!     status       VARCHAR(50) NOT NULL DEFAULT 'pending',
//!     scheduled_at TIMESTAMPTZ,
//!     created_at   TIMESTAMPTZ NOT NULL
//! );
//!
//! CREATE TABLE message_recipients (
//!     id                  BIGSERIAL PRIMARY KEY,
//!     message_id          UUID NOT NULL REFERENCES messages(id),
//!     phone_number        VARCHAR(50) NOT NULL,
//!     status              VARCHAR(50) NOT NULL DEFAULT 'pending',
//!     provider_message_id VARCHAR(255),
//!     delivered_at        TIMESTAMPTZ
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::domain::{
    models::{Message, MessageRecipient, MessageStatus, RecipientResult, RecipientStatus},
    repositories::MessageStore,
};

pub type PgPool = Pool<Postgres>;

#[derive(Clone)]
pub struct PostgresMessageStore {
    pool: PgPool,
}

impl PostgresMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl MessageStore for PostgresMessageStore {
    async fn insert(
        &self,
        content: String,
        scheduled_at: Option<DateTime<Utc>>,
        recipients: &[String],
    ) -> anyhow::Result<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            content,
            status: MessageStatus::Pending,
            scheduled_at,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO messages (id, content, status, scheduled_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id)
        .bind(&message.content)
        .bind(message.status.as_str())
        .bind(message.scheduled_at)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        for phone_number in recipients {
            sqlx::query(
                r#"
                INSERT INTO message_recipients (message_id, phone_number, status)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(message.id)
            .bind(phone_number)
            .bind(RecipientStatus::Pending.as_str())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(message)
    }

    async fn record_result(
        &self,
        message_id: Uuid,
        result: &RecipientResult,
    ) -> anyhow::Result<()> {
        let status = result.recipient_status();
        let delivered_at = (status == RecipientStatus::Delivered).then(Utc::now);

        let outcome = sqlx::query(
            r#"
            UPDATE message_recipients
            SET status = $1, provider_message_id = $2, delivered_at = $3
            WHERE id = (
                SELECT id FROM message_recipients
                WHERE message_id = $4 AND phone_number = $5 AND status = 'pending'
                ORDER BY id
                LIMIT 1
            )
            "#,
        )
        .bind(status.as_str())
        .bind(&result.provider_id)
        .bind(delivered_at)
        .bind(message_id)
        .bind(&result.to)
        .execute(&self.pool)
        .await?;

        if outcome.rows_affected() == 0 {
            anyhow::bail!("no pending recipient row for {}", result.to);
        }
        Ok(())
    }

    async fn finalize(&self, message_id: Uuid) -> anyhow::Result<MessageStatus> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"SELECT status FROM message_recipients WHERE message_id = $1"#,
        )
        .bind(message_id)
        .fetch_all(&self.pool)
        .await?;

        let statuses = rows
            .iter()
            .map(|(status,)| {
                RecipientStatus::from_str(status)
                    .ok_or_else(|| anyhow::anyhow!("unknown recipient status: {status}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let status = MessageStatus::aggregate(&statuses);
        sqlx::query(r#"UPDATE messages SET status = $1 WHERE id = $2"#)
            .bind(status.as_str())
            .bind(message_id)
            .execute(&self.pool)
            .await?;

        Ok(status)
    }

    async fn get(
        &self,
        message_id: Uuid,
    ) -> anyhow::Result<Option<(Message, Vec<MessageRecipient>)>> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"SELECT id, content, status, scheduled_at, created_at FROM messages WHERE id = $1"#,
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(record) = record else {
            return Ok(None);
        };
        let message: Message = record.try_into()?;

        let rows = sqlx::query_as::<_, MessageRecipientRecord>(
            r#"
            SELECT message_id, phone_number, status, provider_message_id, delivered_at
            FROM message_recipients
            WHERE message_id = $1
            ORDER BY id
            "#,
        )
        .bind(message_id)
        .fetch_all(&self.pool)
        .await?;
        let recipients = rows
            .into_iter()
            .map(MessageRecipient::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some((message, recipients)))
    }
}

#[derive(FromRow)]
struct MessageRecord {
    id: Uuid,
    content: String,
    status: String,
    scheduled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRecord> for Message {
    type Error = anyhow::Error;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        Ok(Message {
            id: record.id,
            content: record.content,
            status: MessageStatus::from_str(&record.status)
                .ok_or_else(|| anyhow::anyhow!("unknown message status: {}", record.status))?,
            scheduled_at: record.scheduled_at,
            created_at: record.created_at,
        })
    }
}

#[derive(FromRow)]
struct MessageRecipientRecord {
    message_id: Uuid,
    phone_number: String,
    status: String,
    provider_message_id: Option<String>,
    delivered_at: Option<DateTime<Utc>>,
}

impl TryFrom<MessageRecipientRecord> for MessageRecipient {
    type Error = anyhow::Error;

    fn try_from(record: MessageRecipientRecord) -> Result<Self, Self::Error> {
        Ok(MessageRecipient {
            message_id: record.message_id,
            phone_number: record.phone_number,
            status: RecipientStatus::from_str(&record.status)
                .ok_or_else(|| anyhow::anyhow!("unknown recipient status: {}", record.status))?,
            provider_message_id: record.provider_message_id,
            delivered_at: record.delivered_at,
        })
    }
}
