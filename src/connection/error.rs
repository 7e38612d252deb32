use crate::services::{AuthError, ConnectError, RegistryError};
use std::error::Error;
use tokio::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Invalid connection options: {0}")]
    InvalidOptions(&'static str),

    #[error("None of the {0} configured endpoints could be connected and authenticated")]
    NoReachableEndpoint(usize),

    #[error("Operation failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        source: Box<dyn Error + Send + Sync>,
    },

    #[error("No active channel to the cluster")]
    NotConnected,

    #[error("Connection manager has been stopped")]
    Stopped,

    #[error("Failed to switch to endpoint '{endpoint}': {source}")]
    SwitchFailed { endpoint: String, source: ProbeError },

    #[error("Connection manager is already started")]
    AlreadyStarted,

    #[error("Endpoint discovery failed: {0}")]
    Discovery(#[from] RegistryError),
}

/// Why a single endpoint could not be brought up.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("{0}")]
    Connect(#[from] ConnectError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}
