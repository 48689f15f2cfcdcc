use serde::{Deserialize, Serialize};

use super::message::RecipientStatus;

/// What one provider call produced. Returned by value, never thrown, so
/// callers have to handle every case and a single recipient failure can
/// never abort a fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The provider accepted the message; `provider_id` is its opaque
    /// correlation token.
    Queued { provider_id: String },
    /// No live provider is configured; the send trivially succeeds.
    Mocked,
    Error { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Queued,
    Mocked,
    Error,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Queued => "queued",
            DeliveryStatus::Mocked => "mocked",
            DeliveryStatus::Error => "error",
        }
    }
}

/// Outcome of one delivery attempt to one recipient. Built once, never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientResult {
    pub to: String,
    pub status: DeliveryStatus,
    pub provider_id: Option<String>,
    pub error: Option<String>,
}

impl RecipientResult {
    pub fn from_outcome(to: String, outcome: SendOutcome) -> Self {
        match outcome {
            SendOutcome::Queued { provider_id } => Self {
                to,
                status: DeliveryStatus::Queued,
                provider_id: Some(provider_id),
                error: None,
            },
            SendOutcome::Mocked => Self {
                to,
                status: DeliveryStatus::Mocked,
                provider_id: None,
                error: None,
            },
            SendOutcome::Error { message } => Self {
                to,
                status: DeliveryStatus::Error,
                provider_id: None,
                error: Some(message),
            },
        }
    }

    /// Result for a recipient whose job was placed on the delivery queue.
    /// Acknowledges enqueuing only, not delivery.
    pub fn enqueued(to: String) -> Self {
        Self {
            to,
            status: DeliveryStatus::Queued,
            provider_id: None,
            error: None,
        }
    }

    /// Persisted status for the matching recipient row. A mocked send has
    /// no carrier behind it, so it counts as delivered immediately.
    pub fn recipient_status(&self) -> RecipientStatus {
        match self.status {
            DeliveryStatus::Queued => RecipientStatus::Queued,
            DeliveryStatus::Mocked => RecipientStatus::Delivered,
            DeliveryStatus::Error => RecipientStatus::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_is_captured_in_the_result() {
        let result = RecipientResult::from_outcome(
            "+1".to_string(),
            SendOutcome::Error {
                message: "rate limited".to_string(),
            },
        );
        assert_eq!(result.status, DeliveryStatus::Error);
        assert_eq!(result.provider_id, None);
        assert_eq!(result.error.as_deref(), Some("rate limited"));
    }

    #[test]
    fn mocked_outcome_has_no_provider_id() {
        let result = RecipientResult::from_outcome("+1".to_string(), SendOutcome::Mocked);
        assert_eq!(result.status, DeliveryStatus::Mocked);
        assert_eq!(result.provider_id, None);
        assert_eq!(result.error, None);
        assert_eq!(result.recipient_status(), RecipientStatus::Delivered);
    }
}
