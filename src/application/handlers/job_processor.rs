use std::sync::Arc;

use anyhow::Context;
use tracing::warn;

use crate::{
    application::dispatcher::RecipientDispatcher,
    domain::{jobs::DeliveryJob, models::RecipientResult, repositories::MessageStore},
};

/// What the worker should do with a queue entry once we are done with it.
#[derive(Debug)]
pub enum JobDisposition {
    /// Delivery was attempted and recorded; acknowledge the job.
    Completed(RecipientResult),
    /// The payload can never be processed; acknowledge it so it is removed,
    /// and drop it.
    Rejected { reason: String },
}

/// Worker-side handling of one delivery job.
pub struct JobProcessor {
    dispatcher: Arc<RecipientDispatcher>,
    store: Arc<dyn MessageStore>,
}

impl JobProcessor {
    pub fn new(dispatcher: Arc<RecipientDispatcher>, store: Arc<dyn MessageStore>) -> Self {
        Self { dispatcher, store }
    }

    /// Parse failures are absorbed into `Rejected` — redelivering bytes that
    /// can never parse would loop forever. Every other failure is returned
    /// as `Err` so the queue's redelivery and poison policy decide the
    /// job's fate.
    pub async fn process(&self, payload: &[u8]) -> anyhow::Result<JobDisposition> {
        let job = match DeliveryJob::parse(payload) {
            Ok(job) => job,
            Err(err) => {
                warn!(error = %err, "dropping unparseable delivery job");
                return Ok(JobDisposition::Rejected {
                    reason: err.to_string(),
                });
            }
        };

        let recipients = vec![job.phone_number.clone()];
        let entry = self
            .store
            .insert(job.message.clone(), None, &recipients)
            .await?;

        let mut results = self.dispatcher.dispatch(&job.message, &recipients).await;
        let result = results.pop().context("dispatcher returned no result")?;

        self.store.record_result(entry.id, &result).await?;
        self.store.finalize(entry.id).await?;

        Ok(JobDisposition::Completed(result))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::{
        application::services::provider::SmsProvider,
        domain::models::{
            DeliveryStatus, Message, MessageRecipient, MessageStatus, SendOutcome,
        },
        infrastructure::repositories::in_memory::InMemoryMessageStore,
    };

    struct CountingMockProvider {
        calls: AtomicUsize,
    }

    impl CountingMockProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SmsProvider for CountingMockProvider {
        async fn send(&self, _to: &str, _body: &str) -> SendOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SendOutcome::Mocked
        }
    }

    struct FailingStore;

    #[async_trait]
    impl MessageStore for FailingStore {
        async fn insert(
            &self,
            _content: String,
            _scheduled_at: Option<DateTime<Utc>>,
            _recipients: &[String],
        ) -> anyhow::Result<Message> {
            anyhow::bail!("connection refused")
        }

        async fn record_result(
            &self,
            _message_id: Uuid,
            _result: &RecipientResult,
        ) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }

        async fn finalize(&self, _message_id: Uuid) -> anyhow::Result<MessageStatus> {
            anyhow::bail!("connection refused")
        }

        async fn get(
            &self,
            _message_id: Uuid,
        ) -> anyhow::Result<Option<(Message, Vec<MessageRecipient>)>> {
            anyhow::bail!("connection refused")
        }
    }

    fn processor(
        provider: Arc<CountingMockProvider>,
        store: Arc<dyn MessageStore>,
    ) -> JobProcessor {
        JobProcessor::new(Arc::new(RecipientDispatcher::new(provider)), store)
    }

    #[tokio::test]
    async fn valid_job_dispatches_one_send() {
        let provider = CountingMockProvider::new();
        let processor = processor(provider.clone(), Arc::new(InMemoryMessageStore::new()));

        let disposition = processor
            .process(br#"{"phoneNumber": "+1", "message": "x"}"#)
            .await
            .unwrap();

        let JobDisposition::Completed(result) = disposition else {
            panic!("expected Completed, got {disposition:?}");
        };
        assert_eq!(result.to, "+1");
        assert_eq!(result.status, DeliveryStatus::Mocked);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_job_is_rejected_without_dispatching() {
        let provider = CountingMockProvider::new();
        let processor = processor(provider.clone(), Arc::new(InMemoryMessageStore::new()));

        let disposition = processor.process(b"not-json").await.unwrap();

        assert!(matches!(disposition, JobDisposition::Rejected { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_failure_propagates_for_redelivery() {
        let provider = CountingMockProvider::new();
        let processor = processor(provider.clone(), Arc::new(FailingStore));

        let result = processor
            .process(br#"{"phoneNumber": "+1", "message": "x"}"#)
            .await;

        assert!(result.is_err());
        // the store failed before any provider call was made
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
