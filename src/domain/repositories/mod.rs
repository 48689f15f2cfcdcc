use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::models::{Message, MessageRecipient, MessageStatus, RecipientResult};

/// Persistence boundary for messages and their per-recipient rows.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Creates the message and one pending recipient row per entry in
    /// `recipients`, preserving their order.
    async fn insert(
        &self,
        content: String,
        scheduled_at: Option<DateTime<Utc>>,
        recipients: &[String],
    ) -> anyhow::Result<Message>;

    /// Writes one dispatch attempt's outcome to the earliest still-pending
    /// row for that phone number.
    async fn record_result(
        &self,
        message_id: Uuid,
        result: &RecipientResult,
    ) -> anyhow::Result<()>;

    /// Recomputes the message's aggregate status from its recipient rows.
    async fn finalize(&self, message_id: Uuid) -> anyhow::Result<MessageStatus>;

    async fn get(
        &self,
        message_id: Uuid,
    ) -> anyhow::Result<Option<(Message, Vec<MessageRecipient>)>>;
}
