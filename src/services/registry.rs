use crate::credentials::CredentialError;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Could not authorize registry call: {0}")]
    Unauthorized(#[from] CredentialError),

    #[error("Registry unreachable: {0}")]
    Unavailable(String),

    #[error("Registry call failed: {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait RegistryService: Send + Sync {
    /// Addresses (`ip:port`) of every live instance registered under `service_name`.
    async fn discover(&self, service_name: &str) -> Result<Vec<String>, RegistryError>;
}
