use serde::Deserialize;

/// Broker connection parameters held by the secrets store as a JSON object.
/// Resolved once per invocation and reused for every record in the batch.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub queue: String,
}

/// Failure to produce a usable broker configuration: the secrets store was
/// unreachable, the secret was missing, or its payload did not decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalError {
    message: String,
}

impl RetrievalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for RetrievalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RetrievalError {}

pub fn parse_broker_config(secret_string: &str) -> Result<BrokerConfig, RetrievalError> {
    serde_json::from_str(secret_string).map_err(|error| {
        RetrievalError::new(format!(
            "broker secret is not a valid configuration document: {error}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_secret_document() {
        let secret = r#"{
            "host": "broker.internal",
            "port": 5672,
            "username": "relay",
            "password": "s3cret",
            "queue": "orders"
        }"#;

        let config = parse_broker_config(secret).expect("secret should parse");
        assert_eq!(
            config,
            BrokerConfig {
                host: "broker.internal".to_string(),
                port: 5672,
                username: "relay".to_string(),
                password: "s3cret".to_string(),
                queue: "orders".to_string(),
            }
        );
    }

    #[test]
    fn rejects_secret_missing_connection_fields() {
        let error = parse_broker_config(r#"{"host": "broker.internal"}"#)
            .expect_err("incomplete secret should fail");
        assert!(error
            .message()
            .starts_with("broker secret is not a valid configuration document"));
    }

    #[test]
    fn rejects_secret_that_is_not_json() {
        let error =
            parse_broker_config("host=broker.internal").expect_err("non-JSON secret should fail");
        assert!(error
            .message()
            .starts_with("broker secret is not a valid configuration document"));
    }

    #[test]
    fn rejects_port_outside_u16_range() {
        let secret = r#"{
            "host": "broker.internal",
            "port": 99999,
            "username": "relay",
            "password": "s3cret",
            "queue": "orders"
        }"#;

        parse_broker_config(secret).expect_err("out-of-range port should fail");
    }
}
