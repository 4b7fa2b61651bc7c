use relay_core::credentials::BrokerConfig;

/// Failure to deliver a message: the broker was unreachable, the queue could
/// not be declared, or the publish itself failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryError {
    message: String,
}

impl DeliveryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DeliveryError {}

pub trait MessageForwarder {
    /// Publishes one message durably to the configured queue. The broker
    /// connection is scoped to this call and released on every exit path.
    fn forward(&self, config: &BrokerConfig, payload: &[u8]) -> Result<(), DeliveryError>;
}
