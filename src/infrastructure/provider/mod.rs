use std::sync::Arc;

pub mod mock;
pub mod twilio;

use crate::{application::services::provider::SmsProvider, config::TwilioCredentials};

/// Live Twilio when the full credential trio is configured, mock otherwise.
pub fn from_credentials(credentials: Option<&TwilioCredentials>) -> Arc<dyn SmsProvider> {
    match credentials {
        Some(credentials) => twilio::TwilioProvider::new(credentials.clone()),
        None => mock::MockProvider::new(),
    }
}
