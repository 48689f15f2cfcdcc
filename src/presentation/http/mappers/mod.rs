use crate::{
    domain::models::{DeliveryStatus, RecipientResult},
    presentation::http::responses::{DeliveryStatusDto, RecipientResultDto},
};

pub fn map_result(result: &RecipientResult) -> RecipientResultDto {
    RecipientResultDto {
        to: result.to.clone(),
        status: match result.status {
            DeliveryStatus::Queued => DeliveryStatusDto::Queued,
            DeliveryStatus::Mocked => DeliveryStatusDto::Mocked,
            DeliveryStatus::Error => DeliveryStatusDto::Error,
        },
        provider_id: result.provider_id.clone(),
        error: result.error.clone(),
    }
}
