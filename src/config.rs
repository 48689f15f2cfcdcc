use std::env::var;

use dotenvy::dotenv;

/// How the submission API hands messages to the delivery pipeline: inline
/// provider calls, or one queue job per recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Inline,
    Queue,
}

#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub url: String,
    pub stream: String,
    pub subject: String,
    pub durable: String,
    pub pull_batch: usize,
    pub ack_wait_seconds: u64,
    pub max_deliver: i64,
}

/// Process-wide configuration, read from the environment exactly once at
/// startup and passed into components from there.
pub struct Config {
    pub port: u16,
    pub scheme: String,
    pub host: String,
    pub dispatch_mode: DispatchMode,
    pub database_url: Option<String>,
    pub queue: Option<QueueConfig>,
    pub twilio: Option<TwilioCredentials>,
}

impl Config {
    pub fn try_parse() -> Result<Config, &'static str> {
        let _ = dotenv();

        let port = match var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| "An error occured while parsing PORT env param")?,
            Err(_) => 8000,
        };

        let dispatch_mode = match var("DISPATCH_MODE").as_deref() {
            Ok("queue") => DispatchMode::Queue,
            Ok("inline") | Err(_) => DispatchMode::Inline,
            Ok(_) => return Err("An error occured while parsing DISPATCH_MODE env param"),
        };

        Ok(Config {
            port,
            scheme: var("SCHEME").unwrap_or_else(|_| "http".to_string()),
            host: var("HOST").unwrap_or_else(|_| "localhost".to_string()),
            dispatch_mode,
            database_url: var("DATABASE_URL").ok(),
            queue: queue_from_env()?,
            twilio: twilio_from_env(),
        })
    }
}

/// The full credential trio is required for live sends; if any one is
/// missing the provider runs in mock mode so the service works without
/// an account.
fn twilio_from_env() -> Option<TwilioCredentials> {
    match (
        var("TWILIO_ACCOUNT_SID"),
        var("TWILIO_AUTH_TOKEN"),
        var("TWILIO_FROM_NUMBER"),
    ) {
        (Ok(account_sid), Ok(auth_token), Ok(from_number)) => Some(TwilioCredentials {
            account_sid,
            auth_token,
            from_number,
        }),
        _ => None,
    }
}

fn queue_from_env() -> Result<Option<QueueConfig>, &'static str> {
    let Ok(url) = var("QUEUE_URL") else {
        return Ok(None);
    };

    let pull_batch = match var("QUEUE_PULL_BATCH") {
        Ok(value) => value
            .parse::<usize>()
            .map_err(|_| "An error occured while parsing QUEUE_PULL_BATCH env param")?,
        Err(_) => 16,
    };
    let ack_wait_seconds = match var("QUEUE_ACK_WAIT_SECONDS") {
        Ok(value) => value
            .parse::<u64>()
            .map_err(|_| "An error occured while parsing QUEUE_ACK_WAIT_SECONDS env param")?,
        Err(_) => 30,
    };
    let max_deliver = match var("QUEUE_MAX_DELIVER") {
        Ok(value) => value
            .parse::<i64>()
            .map_err(|_| "An error occured while parsing QUEUE_MAX_DELIVER env param")?,
        Err(_) => 5,
    };

    Ok(Some(QueueConfig {
        url,
        stream: var("QUEUE_STREAM").unwrap_or_else(|_| "slidesms-send-queue".to_string()),
        subject: var("QUEUE_SUBJECT").unwrap_or_else(|_| "slidesms.send".to_string()),
        durable: var("QUEUE_DURABLE").unwrap_or_else(|_| "slidesms-worker".to_string()),
        pull_batch,
        ack_wait_seconds,
        max_deliver,
    }))
}
