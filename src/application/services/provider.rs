use async_trait::async_trait;

use crate::domain::models::SendOutcome;

/// A single outbound-SMS capability. Implementations capture every failure
/// into the returned outcome; this method must never panic or error out of
/// band, because one recipient's failure must not abort a fan-out.
#[async_trait]
pub trait SmsProvider: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> SendOutcome;
}
