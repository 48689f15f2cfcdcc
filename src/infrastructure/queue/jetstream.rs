use std::sync::Arc;
use std::time::Duration;

use async_nats::jetstream::{
    self,
    consumer::{AckPolicy, PullConsumer, pull},
    ErrorCode,
    context::GetStreamErrorKind,
    stream::Stream,
};
use async_trait::async_trait;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};

use crate::{
    application::{
        handlers::job_processor::{JobDisposition, JobProcessor},
        services::queue::DeliveryQueue,
    },
    config::QueueConfig,
    domain::{errors::QueueError, jobs::DeliveryJob},
};

/// Producer half of the delivery queue. Creates the stream when it is
/// absent so the API can enqueue before any worker has ever run.
pub struct JetstreamQueue {
    context: jetstream::Context,
    subject: String,
}

impl JetstreamQueue {
    pub async fn connect(config: &QueueConfig) -> anyhow::Result<Self> {
        let client = async_nats::connect(&config.url).await?;
        let context = jetstream::new(client);

        context
            .get_or_create_stream(jetstream::stream::Config {
                name: config.stream.clone(),
                subjects: vec![config.subject.clone()],
                retention: jetstream::stream::RetentionPolicy::WorkQueue,
                ..Default::default()
            })
            .await?;

        Ok(Self {
            context,
            subject: config.subject.clone(),
        })
    }
}

#[async_trait]
impl DeliveryQueue for JetstreamQueue {
    async fn publish(&self, job: &DeliveryJob) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(job)?;
        self.context
            .publish(self.subject.clone(), payload.into())
            .await?;
        Ok(())
    }
}

/// Looks the stream up without creating it. A worker with no queue to read
/// from must not run, so "missing" is reported as its own error and left
/// for the process entry point to act on — no exit happens here.
pub async fn validate_queue_exists(
    context: &jetstream::Context,
    name: &str,
) -> Result<Stream, QueueError> {
    match context.get_stream(name).await {
        Ok(stream) => Ok(stream),
        Err(err) => match err.kind() {
            GetStreamErrorKind::JetStream(api_err)
                if api_err.error_code() == ErrorCode::STREAM_NOT_FOUND =>
            {
                Err(QueueError::Missing {
                    name: name.to_string(),
                })
            }
            _ => Err(QueueError::Unavailable {
                reason: err.to_string(),
            }),
        },
    }
}

/// Consumer half: a durable pull consumer with explicit acks. Redelivery
/// and the poison-message cutoff come from `ack_wait` and `max_deliver` on
/// the consumer, not from anything this worker does.
pub struct JetstreamWorker {
    consumer: PullConsumer,
    pull_batch: usize,
}

impl JetstreamWorker {
    pub async fn connect(config: &QueueConfig) -> Result<Self, QueueError> {
        let client =
            async_nats::connect(&config.url)
                .await
                .map_err(|err| QueueError::Unavailable {
                    reason: err.to_string(),
                })?;
        let context = jetstream::new(client);

        let stream = validate_queue_exists(&context, &config.stream).await?;

        let consumer = stream
            .get_or_create_consumer(
                &config.durable,
                pull::Config {
                    durable_name: Some(config.durable.clone()),
                    ack_policy: AckPolicy::Explicit,
                    ack_wait: Duration::from_secs(config.ack_wait_seconds),
                    max_deliver: config.max_deliver,
                    ..Default::default()
                },
            )
            .await
            .map_err(|err| QueueError::Unavailable {
                reason: err.to_string(),
            })?;

        Ok(Self {
            consumer,
            pull_batch: config.pull_batch,
        })
    }

    /// Pull loop; runs until ctrl-c. A job is acked only after the
    /// processor is done with it, so anything in flight at a crash is
    /// redelivered to some worker.
    pub async fn run(self, processor: Arc<JobProcessor>) -> anyhow::Result<()> {
        loop {
            let mut batch = tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received, stopping worker");
                    return Ok(());
                }
                batch = self.consumer.batch().max_messages(self.pull_batch).messages() => batch?,
            };
            while let Some(message) = batch.next().await {
                match message {
                    Ok(message) => {
                        if let Err(err) = Self::process_message(message, &processor).await {
                            error!(error = ?err, "job failed, leaving it for redelivery");
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "error while pulling from queue");
                    }
                }
            }
        }
    }

    async fn process_message(
        message: jetstream::Message,
        processor: &JobProcessor,
    ) -> anyhow::Result<()> {
        match processor.process(&message.payload).await? {
            JobDisposition::Completed(result) => {
                info!(to = %result.to, status = result.status.as_str(), "delivery job processed");
            }
            JobDisposition::Rejected { reason } => {
                warn!(reason = %reason, "malformed delivery job removed from queue");
            }
        }
        // both dispositions remove the job; a processing Err above skips
        // the ack so the queue redelivers
        message
            .ack()
            .await
            .map_err(|err| anyhow::anyhow!("failed to ack message: {err}"))?;
        Ok(())
    }
}
