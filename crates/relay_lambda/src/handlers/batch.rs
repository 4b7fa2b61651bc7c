use std::time::Instant;

use serde_json::{json, Value};

use relay_core::contract::{
    decode_record_payload, queue_records, record_message_id, InvocationResponse,
};

use crate::adapters::credentials::CredentialSource;
use crate::adapters::forward::MessageForwarder;

/// Drains one trigger batch: resolves broker credentials once, then decodes
/// and forwards each record's payload in input order. The first credential,
/// decode, or delivery failure aborts the remaining records and the whole
/// invocation reports failure.
pub fn handle_queue_event(
    event: Value,
    credentials: &dyn CredentialSource,
    forwarder: &dyn MessageForwarder,
) -> InvocationResponse {
    let started_at = Instant::now();

    match forward_batch(&event, credentials, forwarder) {
        Ok(records_forwarded) => {
            log_relay_info(
                "batch_completed",
                json!({
                    "records_forwarded": records_forwarded,
                    "duration_ms": started_at.elapsed().as_millis() as u64,
                }),
            );
            InvocationResponse::success()
        }
        Err(error) => {
            log_relay_error(
                "batch_failed",
                json!({
                    "duration_ms": started_at.elapsed().as_millis() as u64,
                    "error": error,
                }),
            );
            InvocationResponse::failure()
        }
    }
}

fn forward_batch(
    event: &Value,
    credentials: &dyn CredentialSource,
    forwarder: &dyn MessageForwarder,
) -> Result<usize, String> {
    let config = credentials.fetch().map_err(|error| {
        log_relay_error("credential_fetch_failed", json!({"error": error.message()}));
        error.to_string()
    })?;

    let records = queue_records(event).map_err(|error| {
        log_relay_error("event_decode_failed", json!({"error": error.message()}));
        error.to_string()
    })?;

    log_relay_info(
        "batch_started",
        json!({
            "records": records.len(),
            "queue": config.queue.clone(),
        }),
    );

    for (record_index, record) in records.iter().enumerate() {
        let message_id = record_message_id(record).map(str::to_string);

        let payload = decode_record_payload(record).map_err(|error| {
            log_relay_error(
                "record_decode_failed",
                json!({
                    "record_index": record_index,
                    "message_id": message_id.clone(),
                    "error": error.message(),
                }),
            );
            error.to_string()
        })?;
        log_relay_info(
            "record_received",
            json!({
                "record_index": record_index,
                "message_id": message_id.clone(),
            }),
        );

        let body = serde_json::to_vec(&payload)
            .map_err(|error| format!("failed to encode broker payload: {error}"))?;

        forwarder.forward(&config, &body).map_err(|error| {
            log_relay_error(
                "record_forward_failed",
                json!({
                    "record_index": record_index,
                    "message_id": message_id.clone(),
                    "queue": config.queue.clone(),
                    "error": error.message(),
                }),
            );
            error.to_string()
        })?;
        log_relay_info(
            "record_forwarded",
            json!({
                "record_index": record_index,
                "message_id": message_id.clone(),
                "queue": config.queue.clone(),
                "bytes": body.len(),
            }),
        );
    }

    Ok(records.len())
}

fn log_relay_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "relay_handler",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_relay_error(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "relay_handler",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
