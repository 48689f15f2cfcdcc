use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::{
    application::{dispatcher::RecipientDispatcher, services::queue::DeliveryQueue},
    config::DispatchMode,
    domain::{
        errors::DomainError,
        jobs::DeliveryJob,
        models::{RecipientResult, SendOutcome},
        repositories::MessageStore,
    },
};

/// One SMS segment chain; anything longer is rejected before dispatch.
pub const MAX_MESSAGE_LEN: usize = 1600;

pub struct SendBulkRequest {
    pub message: String,
    pub recipients: Vec<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct SendBulkResponse {
    pub sent: usize,
    pub results: Vec<RecipientResult>,
}

/// The submission core. Validates the request, persists the message and
/// its recipient rows, then either dispatches inline or enqueues one
/// delivery job per recipient.
pub struct SendBulkUseCase {
    dispatcher: Arc<RecipientDispatcher>,
    store: Arc<dyn MessageStore>,
    queue: Option<Arc<dyn DeliveryQueue>>,
    mode: DispatchMode,
}

impl SendBulkUseCase {
    pub fn new(
        dispatcher: Arc<RecipientDispatcher>,
        store: Arc<dyn MessageStore>,
        queue: Option<Arc<dyn DeliveryQueue>>,
        mode: DispatchMode,
    ) -> Self {
        Self {
            dispatcher,
            store,
            queue,
            mode,
        }
    }

    pub async fn execute(&self, request: SendBulkRequest) -> Result<SendBulkResponse, DomainError> {
        if request.recipients.is_empty() {
            return Err(DomainError::Validation("recipients required".to_string()));
        }
        if request.message.chars().count() > MAX_MESSAGE_LEN {
            return Err(DomainError::Validation(format!(
                "message exceeds {MAX_MESSAGE_LEN} characters"
            )));
        }

        let entry = self
            .store
            .insert(
                request.message.clone(),
                request.scheduled_at,
                &request.recipients,
            )
            .await?;

        let results = match self.mode {
            DispatchMode::Inline => {
                self.dispatcher
                    .dispatch(&request.message, &request.recipients)
                    .await
            }
            DispatchMode::Queue => self.enqueue_all(&request).await,
        };

        for result in &results {
            self.store.record_result(entry.id, result).await?;
        }
        self.store.finalize(entry.id).await?;

        Ok(SendBulkResponse {
            sent: results.len(),
            results,
        })
    }

    async fn enqueue_all(&self, request: &SendBulkRequest) -> Vec<RecipientResult> {
        let Some(queue) = &self.queue else {
            // Queue mode without a configured queue is a wiring bug; surface
            // it per recipient instead of failing the whole request.
            return request
                .recipients
                .iter()
                .map(|to| {
                    RecipientResult::from_outcome(
                        to.clone(),
                        SendOutcome::Error {
                            message: "delivery queue not configured".to_string(),
                        },
                    )
                })
                .collect();
        };

        let mut results = Vec::with_capacity(request.recipients.len());
        for to in &request.recipients {
            let job = DeliveryJob {
                phone_number: to.clone(),
                message: request.message.clone(),
            };
            let result = match queue.publish(&job).await {
                Ok(()) => RecipientResult::enqueued(to.clone()),
                Err(err) => {
                    warn!(to = %to, error = %err, "failed to enqueue delivery job");
                    RecipientResult::from_outcome(
                        to.clone(),
                        SendOutcome::Error {
                            message: err.to_string(),
                        },
                    )
                }
            };
            results.push(result);
        }
        results
    }
}
