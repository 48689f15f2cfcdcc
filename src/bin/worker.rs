use std::process;
use std::sync::Arc;

use tracing::{error, info};

use slidesms::{
    application::{dispatcher::RecipientDispatcher, handlers::job_processor::JobProcessor},
    config::Config,
    domain::{errors::QueueError, repositories::MessageStore},
    infrastructure::{
        provider,
        queue::jetstream::JetstreamWorker,
        repositories::{in_memory::InMemoryMessageStore, postgres::PostgresMessageStore},
    },
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        error!(error = %err, "worker terminating");
        // process control lives here, not in the validation logic
        process::exit(exit_code(&err));
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::try_parse().map_err(anyhow::Error::msg)?;
    let queue_config = config
        .queue
        .clone()
        .ok_or_else(|| anyhow::anyhow!("QUEUE_URL is required for the worker"))?;

    // fail fast: a worker with no queue to read from must not run silently
    let worker = JetstreamWorker::connect(&queue_config).await?;
    info!(stream = %queue_config.stream, "queue validated, worker running");

    let provider = provider::from_credentials(config.twilio.as_ref());
    let dispatcher = Arc::new(RecipientDispatcher::new(provider));
    let store: Arc<dyn MessageStore> = match &config.database_url {
        Some(url) => Arc::new(PostgresMessageStore::connect(url).await?),
        None => Arc::new(InMemoryMessageStore::new()),
    };
    let processor = Arc::new(JobProcessor::new(dispatcher, store));

    worker.run(processor).await
}

/// 1 when the delivery queue is missing or unreachable at startup, 2 for
/// any other startup failure, 0 (by returning Ok) on graceful shutdown.
fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<QueueError>().is_some() {
        1
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_queue_maps_to_exit_code_one() {
        let err = anyhow::Error::new(QueueError::Missing {
            name: "slidesms-send-queue".to_string(),
        });
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn unreachable_queue_maps_to_exit_code_one() {
        let err = anyhow::Error::new(QueueError::Unavailable {
            reason: "connection refused".to_string(),
        });
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn other_startup_failures_map_to_exit_code_two() {
        let err = anyhow::anyhow!("QUEUE_URL is required for the worker");
        assert_eq!(exit_code(&err), 2);
    }
}
