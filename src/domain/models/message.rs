use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One logical send: the content plus the roll-up of its recipients.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub status: MessageStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One recipient's slice of a message. Each row is written by exactly one
/// dispatch attempt.
#[derive(Debug, Clone)]
pub struct MessageRecipient {
    pub message_id: Uuid,
    pub phone_number: String,
    pub status: RecipientStatus,
    pub provider_message_id: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientStatus {
    Pending,
    Queued,
    Delivered,
    Error,
}

impl RecipientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientStatus::Pending => "pending",
            RecipientStatus::Queued => "queued",
            RecipientStatus::Delivered => "delivered",
            RecipientStatus::Error => "error",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RecipientStatus::Pending),
            "queued" => Some(RecipientStatus::Queued),
            "delivered" => Some(RecipientStatus::Delivered),
            "error" => Some(RecipientStatus::Error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RecipientStatus::Delivered | RecipientStatus::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Pending,
    Sent,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Sent => "sent",
            MessageStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(MessageStatus::Pending),
            "sent" => Some(MessageStatus::Sent),
            "failed" => Some(MessageStatus::Failed),
            _ => None,
        }
    }

    /// A message's status is a pure function of its recipients' statuses:
    /// `Sent` once every recipient is terminal and at least one was
    /// delivered, `Failed` once every recipient is terminal and none was.
    pub fn aggregate(recipients: &[RecipientStatus]) -> MessageStatus {
        if recipients.is_empty() || !recipients.iter().all(RecipientStatus::is_terminal) {
            return MessageStatus::Pending;
        }
        if recipients.contains(&RecipientStatus::Delivered) {
            MessageStatus::Sent
        } else {
            MessageStatus::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_is_pending_while_any_recipient_is_open() {
        let statuses = [RecipientStatus::Delivered, RecipientStatus::Queued];
        assert_eq!(MessageStatus::aggregate(&statuses), MessageStatus::Pending);
    }

    #[test]
    fn aggregate_is_sent_once_all_terminal_with_a_success() {
        let statuses = [RecipientStatus::Delivered, RecipientStatus::Error];
        assert_eq!(MessageStatus::aggregate(&statuses), MessageStatus::Sent);
    }

    #[test]
    fn aggregate_is_failed_when_every_recipient_errored() {
        let statuses = [RecipientStatus::Error, RecipientStatus::Error];
        assert_eq!(MessageStatus::aggregate(&statuses), MessageStatus::Failed);
    }

    #[test]
    fn aggregate_of_no_recipients_stays_pending() {
        assert_eq!(MessageStatus::aggregate(&[]), MessageStatus::Pending);
    }
}
