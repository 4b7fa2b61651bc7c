use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FORWARD_SUCCESS_MESSAGE: &str = "Messages processed successfully.";
pub const FORWARD_FAILURE_MESSAGE: &str = "Failed to process messages.";

/// Result returned to the invoking system, in the Lambda proxy shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: Value::from(FORWARD_SUCCESS_MESSAGE).to_string(),
        }
    }

    pub fn failure() -> Self {
        Self {
            status_code: 500,
            body: Value::from(FORWARD_FAILURE_MESSAGE).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Extracts the record array from a trigger event. An event without a
/// `Records` array is malformed; an empty array is a valid, empty batch.
pub fn queue_records(event: &Value) -> Result<&Vec<Value>, ValidationError> {
    event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| ValidationError::new("trigger event must include a Records array"))
}

pub fn record_body(record: &Value) -> Result<&str, ValidationError> {
    record
        .get("body")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new("queue record body must be a string"))
}

/// Parses a record's JSON-encoded body into the structured payload that gets
/// republished to the broker.
pub fn decode_record_payload(record: &Value) -> Result<Value, ValidationError> {
    let body = record_body(record)?;
    serde_json::from_str(body)
        .map_err(|error| ValidationError::new(format!("queue record body is not valid JSON: {error}")))
}

pub fn record_message_id(record: &Value) -> Option<&str> {
    record.get("messageId").and_then(Value::as_str)
}
