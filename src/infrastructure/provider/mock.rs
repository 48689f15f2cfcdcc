use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::{application::services::provider::SmsProvider, domain::models::SendOutcome};

/// Stands in for the carrier when no credentials are configured. Every send
/// succeeds and no state is kept between calls, so local runs work offline.
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Arc<dyn SmsProvider> {
        Arc::new(Self) as Arc<dyn SmsProvider>
    }
}

#[async_trait]
impl SmsProvider for MockProvider {
    async fn send(&self, to: &str, body: &str) -> SendOutcome {
        info!(to = %to, body = %body, "(mock) send");
        SendOutcome::Mocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RecipientResult;

    #[tokio::test]
    async fn repeated_identical_sends_always_mock() {
        let provider = MockProvider::new();

        let first = provider.send("+15551230000", "hi").await;
        let second = provider.send("+15551230000", "hi").await;

        assert_eq!(first, SendOutcome::Mocked);
        assert_eq!(second, SendOutcome::Mocked);

        let result = RecipientResult::from_outcome("+15551230000".to_string(), second);
        assert_eq!(result.provider_id, None);
    }
}
