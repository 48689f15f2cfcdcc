use std::sync::Arc;

use poem_openapi::Tags;

use crate::application::usecases::send_bulk::SendBulkUseCase;

pub struct ApiState {
    pub send_usecase: Arc<SendBulkUseCase>,
}

/// Endpoint set for routes that need no state.
pub struct Endpoints;

/// Enum of API sections (tags)
#[derive(Tags)]
pub enum EndpointsTags {
    Health,
    Send,
}
