use std::sync::Arc;

use poem_openapi::{ApiResponse, OpenApi, payload::Json};

use crate::{
    application::usecases::send_bulk::SendBulkRequest,
    domain::errors::DomainError,
    presentation::http::{
        endpoints::root::{ApiState, EndpointsTags},
        mappers::map_result,
        requests::SendRequestDto,
        responses::{ErrorDetailDto, SendResponseDto},
    },
};

pub struct SendEndpoints {
    state: Arc<ApiState>,
}

impl SendEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[derive(ApiResponse)]
pub enum SendResponse {
    /// The request was processed. Per-recipient failures are reported in
    /// the body, never as an HTTP-level error.
    #[oai(status = 200)]
    Ok(Json<SendResponseDto>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorDetailDto>),
    #[oai(status = 500)]
    InternalError(Json<ErrorDetailDto>),
}

#[OpenApi]
impl SendEndpoints {
    #[oai(path = "/send", method = "post", tag = EndpointsTags::Send)]
    pub async fn send(&self, request: Json<SendRequestDto>) -> SendResponse {
        let payload = SendBulkRequest {
            message: request.0.message,
            recipients: request.0.recipients,
            scheduled_at: request.0.scheduled_at,
        };

        match self.state.send_usecase.execute(payload).await {
            Ok(response) => SendResponse::Ok(Json(SendResponseDto {
                sent: response.sent as u32,
                results: response.results.iter().map(map_result).collect(),
            })),
            Err(DomainError::Validation(detail)) => {
                SendResponse::BadRequest(Json(ErrorDetailDto { detail }))
            }
            Err(err) => SendResponse::InternalError(Json(ErrorDetailDto {
                detail: err.to_string(),
            })),
        }
    }
}
