use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    application::services::provider::SmsProvider, config::TwilioCredentials,
    domain::models::SendOutcome,
};

/// Adapter over the Twilio Messages REST API. Every failure — transport,
/// auth, rate limit — is captured into `SendOutcome::Error` at this
/// boundary and never propagates further.
pub struct TwilioProvider {
    http: Client,
    credentials: TwilioCredentials,
    base_url: String,
}

impl TwilioProvider {
    pub fn new(credentials: TwilioCredentials) -> Arc<dyn SmsProvider> {
        Arc::new(Self {
            http: Client::builder()
                .user_agent("slidesms/twilio")
                .build()
                .expect("failed to build twilio client"),
            credentials,
            base_url: "https://api.twilio.com".to_string(),
        }) as Arc<dyn SmsProvider>
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.credentials.account_sid
        )
    }

    async fn create_message(&self, to: &str, body: &str) -> anyhow::Result<String> {
        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&[
                ("To", to),
                ("From", self.credentials.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let payload: TwilioErrorResponse = response.json().await.unwrap_or_default();
            anyhow::bail!(
                "twilio api returned {}: {}",
                status,
                payload
                    .message
                    .unwrap_or_else(|| "unknown error".to_string())
            );
        }

        let payload: TwilioMessageResponse = response.json().await?;
        Ok(payload.sid)
    }
}

#[async_trait]
impl SmsProvider for TwilioProvider {
    async fn send(&self, to: &str, body: &str) -> SendOutcome {
        match self.create_message(to, body).await {
            Ok(sid) => {
                info!(to = %to, provider_id = %sid, "message accepted by twilio");
                SendOutcome::Queued { provider_id: sid }
            }
            Err(err) => {
                warn!(to = %to, error = %err, "twilio send failed");
                SendOutcome::Error {
                    message: err.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
}

#[derive(Debug, Default, Deserialize)]
struct TwilioErrorResponse {
    message: Option<String>,
}
