//! Bulk SMS dispatch service: an HTTP submission API that fans one message
//! out to a list of phone-number recipients, a JetStream-backed delivery
//! queue with a separate worker process, and a Twilio provider adapter that
//! falls back to a mock when no credentials are configured.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
