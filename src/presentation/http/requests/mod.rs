use chrono::{DateTime, Utc};
use poem_openapi::Object;

#[derive(Object, Debug)]
pub struct SendRequestDto {
    pub message: String,
    pub recipients: Vec<String>,
    /// Optional future-delivery timestamp. Stored with the message; the
    /// send itself is not deferred.
    pub scheduled_at: Option<DateTime<Utc>>,
}
