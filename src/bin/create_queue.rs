//! Operator tool: provisions the delivery queue stream and publishes one
//! test job so a running worker can be verified end to end.

use slidesms::{
    application::services::queue::DeliveryQueue, config::Config, domain::jobs::DeliveryJob,
    infrastructure::queue::jetstream::JetstreamQueue,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::try_parse().map_err(anyhow::Error::msg)?;
    let queue_config = config
        .queue
        .ok_or_else(|| anyhow::anyhow!("QUEUE_URL is required"))?;

    println!("Creating queue: {}...", queue_config.stream);
    let queue = JetstreamQueue::connect(&queue_config).await?;
    println!("Queue created successfully!");

    println!("Sending test message...");
    queue
        .publish(&DeliveryJob {
            phone_number: "+1234567890".to_string(),
            message: "Test message from SlideSMS".to_string(),
        })
        .await?;
    println!("Test message sent successfully!");

    Ok(())
}
