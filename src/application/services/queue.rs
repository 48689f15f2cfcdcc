use async_trait::async_trait;

use crate::domain::jobs::DeliveryJob;

/// Producer half of the delivery queue. The queue is durable and
/// at-least-once: a published job will reach a worker one or more times.
#[async_trait]
pub trait DeliveryQueue: Send + Sync {
    async fn publish(&self, job: &DeliveryJob) -> anyhow::Result<()>;
}
