use relay_core::credentials::{BrokerConfig, RetrievalError};

pub trait CredentialSource {
    fn fetch(&self) -> Result<BrokerConfig, RetrievalError>;
}
