use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    models::{Message, MessageRecipient, MessageStatus, RecipientResult, RecipientStatus},
    repositories::MessageStore,
};

/// Message store for tests and credential-less local runs.
#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: Arc<RwLock<HashMap<Uuid, (Message, Vec<MessageRecipient>)>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn only_message_id(&self) -> Uuid {
        let messages = self.messages.read().await;
        assert_eq!(messages.len(), 1, "expected exactly one stored message");
        *messages.keys().next().unwrap()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
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
        let rows = recipients
            .iter()
            .map(|phone_number| MessageRecipient {
                message_id: message.id,
                phone_number: phone_number.clone(),
                status: RecipientStatus::Pending,
                provider_message_id: None,
                delivered_at: None,
            })
            .collect();

        let mut messages = self.messages.write().await;
        messages.insert(message.id, (message.clone(), rows));
        Ok(message)
    }

    async fn record_result(
        &self,
        message_id: Uuid,
        result: &RecipientResult,
    ) -> anyhow::Result<()> {
        let mut messages = self.messages.write().await;
        let (_, recipients) = messages
            .get_mut(&message_id)
            .ok_or_else(|| anyhow::anyhow!("message not found: {message_id}"))?;

        // earliest pending row for this number, so duplicate recipients each
        // consume their own row
        let row = recipients
            .iter_mut()
            .find(|row| row.phone_number == result.to && row.status == RecipientStatus::Pending)
            .ok_or_else(|| anyhow::anyhow!("no pending recipient row for {}", result.to))?;

        row.status = result.recipient_status();
        row.provider_message_id = result.provider_id.clone();
        if row.status == RecipientStatus::Delivered {
            row.delivered_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn finalize(&self, message_id: Uuid) -> anyhow::Result<MessageStatus> {
        let mut messages = self.messages.write().await;
        let (message, recipients) = messages
            .get_mut(&message_id)
            .ok_or_else(|| anyhow::anyhow!("message not found: {message_id}"))?;

        let statuses: Vec<RecipientStatus> =
            recipients.iter().map(|row| row.status).collect();
        message.status = MessageStatus::aggregate(&statuses);
        Ok(message.status)
    }

    async fn get(
        &self,
        message_id: Uuid,
    ) -> anyhow::Result<Option<(Message, Vec<MessageRecipient>)>> {
        let messages = self.messages.read().await;
        Ok(messages.get(&message_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SendOutcome;

    #[tokio::test]
    async fn recipient_rows_preserve_input_order() {
        let store = InMemoryMessageStore::new();
        let recipients = vec!["+11".to_string(), "+12".to_string()];

        let message = store.insert("hi".to_string(), None, &recipients).await.unwrap();
        let (_, rows) = store.get(message.id).await.unwrap().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].phone_number, "+11");
        assert_eq!(rows[1].phone_number, "+12");
        assert!(rows.iter().all(|row| row.status == RecipientStatus::Pending));
    }

    #[tokio::test]
    async fn duplicate_recipients_each_get_their_own_row() {
        let store = InMemoryMessageStore::new();
        let recipients = vec!["+11".to_string(), "+11".to_string()];
        let message = store.insert("hi".to_string(), None, &recipients).await.unwrap();

        let delivered =
            RecipientResult::from_outcome("+11".to_string(), SendOutcome::Mocked);
        let errored = RecipientResult::from_outcome(
            "+11".to_string(),
            SendOutcome::Error {
                message: "nope".to_string(),
            },
        );
        store.record_result(message.id, &delivered).await.unwrap();
        store.record_result(message.id, &errored).await.unwrap();

        let (_, rows) = store.get(message.id).await.unwrap().unwrap();
        assert_eq!(rows[0].status, RecipientStatus::Delivered);
        assert_eq!(rows[1].status, RecipientStatus::Error);

        let status = store.finalize(message.id).await.unwrap();
        assert_eq!(status, MessageStatus::Sent);
    }
}
