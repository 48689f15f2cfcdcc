use std::str::Utf8Error;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Queue payload for one recipient. The wire form is a flat camelCase
/// JSON document: `{"phoneNumber": "...", "message": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryJob {
    pub phone_number: String,
    pub message: String,
}

/// A payload that fails to parse is permanently unprocessable: its bytes
/// never change, so retrying it would loop forever. The worker drops such
/// jobs instead of letting them redeliver.
#[derive(Debug, Error)]
pub enum JobParseError {
    #[error("payload is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),
    #[error("payload is not a delivery job document: {0}")]
    Document(#[from] serde_json::Error),
}

impl DeliveryJob {
    pub fn parse(payload: &[u8]) -> Result<Self, JobParseError> {
        let text = std::str::from_utf8(payload)?;
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_document() {
        let job = DeliveryJob::parse(br#"{"phoneNumber": "+1", "message": "x"}"#).unwrap();
        assert_eq!(job.phone_number, "+1");
        assert_eq!(job.message, "x");
    }

    #[test]
    fn serializes_phone_number_as_camel_case() {
        let job = DeliveryJob {
            phone_number: "+15551230000".to_string(),
            message: "hi".to_string(),
        };
        let wire = serde_json::to_string(&job).unwrap();
        assert!(wire.contains(r#""phoneNumber":"+15551230000""#));
        assert!(wire.contains(r#""message":"hi""#));
    }

    #[test]
    fn rejects_non_json_payload() {
        let err = DeliveryJob::parse(b"not-json").unwrap_err();
        assert!(matches!(err, JobParseError::Document(_)));
    }

    #[test]
    fn rejects_invalid_utf8_payload() {
        let err = DeliveryJob::parse(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, JobParseError::Encoding(_)));
    }

    #[test]
    fn rejects_document_missing_fields() {
        let err = DeliveryJob::parse(br#"{"phoneNumber": "+1"}"#).unwrap_err();
        assert!(matches!(err, JobParseError::Document(_)));
    }
}
