use poem_openapi::{Enum, Object};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[oai(rename_all = "snake_case")]
pub enum DeliveryStatusDto {
    Queued,
    Mocked,
    Error,
}

#[derive(Object, Debug)]
pub struct RecipientResultDto {
    pub to: String,
    pub status: DeliveryStatusDto,
    pub provider_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Object, Debug)]
pub struct SendResponseDto {
    pub sent: u32,
    pub results: Vec<RecipientResultDto>,
}

#[derive(Object, Debug)]
pub struct ErrorDetailDto {
    pub detail: String,
}
