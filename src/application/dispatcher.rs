use std::sync::Arc;

use futures::{StreamExt, stream};

use crate::{application::services::provider::SmsProvider, domain::models::RecipientResult};

/// Cap on in-flight provider calls within one dispatch, so large recipient
/// lists bound request latency without hammering the provider.
pub const MAX_IN_FLIGHT: usize = 20;

/// Fans one message out to its recipient list, one provider call per
/// recipient.
pub struct RecipientDispatcher {
    provider: Arc<dyn SmsProvider>,
    max_in_flight: usize,
}

impl RecipientDispatcher {
    pub fn new(provider: Arc<dyn SmsProvider>) -> Self {
        Self {
            provider,
            max_in_flight: MAX_IN_FLIGHT,
        }
    }

    /// Returns exactly one result per recipient, in input order, whatever
    /// the mix of outcomes. No retries happen here; retry policy belongs to
    /// the caller.
    pub async fn dispatch(&self, message: &str, recipients: &[String]) -> Vec<RecipientResult> {
        stream::iter(recipients.iter().cloned())
            .map(|to| async move {
                let outcome = self.provider.send(&to, message).await;
                RecipientResult::from_outcome(to, outcome)
            })
            .buffered(self.max_in_flight)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::models::{DeliveryStatus, SendOutcome};

    struct ScriptedProvider {
        calls: AtomicUsize,
        failing: HashSet<String>,
    }

    impl ScriptedProvider {
        fn new(failing: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                failing: failing.iter().map(|to| to.to_string()).collect(),
            })
        }
    }

    #[async_trait]
    impl SmsProvider for ScriptedProvider {
        async fn send(&self, to: &str, _body: &str) -> SendOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(to) {
                SendOutcome::Error {
                    message: "provider rejected".to_string(),
                }
            } else {
                SendOutcome::Queued {
                    provider_id: format!("SM-{to}"),
                }
            }
        }
    }

    fn recipients(numbers: &[&str]) -> Vec<String> {
        numbers.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn results_come_back_in_input_order() {
        let provider = ScriptedProvider::new(&[]);
        let dispatcher = RecipientDispatcher::new(provider.clone());
        let list = recipients(&["+11", "+12", "+13", "+14", "+15"]);

        let results = dispatcher.dispatch("hi", &list).await;

        assert_eq!(results.len(), list.len());
        for (result, to) in results.iter().zip(&list) {
            assert_eq!(&result.to, to);
            assert_eq!(result.provider_id.as_deref(), Some(format!("SM-{to}").as_str()));
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), list.len());
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_rest() {
        let provider = ScriptedProvider::new(&["+12"]);
        let dispatcher = RecipientDispatcher::new(provider.clone());
        let list = recipients(&["+11", "+12", "+13"]);

        let results = dispatcher.dispatch("hi", &list).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].status, DeliveryStatus::Queued);
        assert_eq!(results[1].status, DeliveryStatus::Error);
        assert_eq!(results[1].error.as_deref(), Some("provider rejected"));
        assert_eq!(results[2].status, DeliveryStatus::Queued);
        // every recipient got exactly one attempt, no retries
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn total_failure_still_returns_the_full_sequence() {
        let provider = ScriptedProvider::new(&["+11", "+12"]);
        let dispatcher = RecipientDispatcher::new(provider);
        let list = recipients(&["+11", "+12"]);

        let results = dispatcher.dispatch("hi", &list).await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.status == DeliveryStatus::Error));
    }
}
