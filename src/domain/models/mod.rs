mod delivery;
mod message;

pub use delivery::{DeliveryStatus, RecipientResult, SendOutcome};
pub use message::{Message, MessageRecipient, MessageStatus, RecipientStatus};
