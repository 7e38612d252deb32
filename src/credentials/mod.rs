mod provider;

pub use provider::ClientIdentity;
pub use provider::CredentialConfig;
pub use provider::CredentialError;
pub use provider::CredentialProvider;
pub use provider::AUTHORIZATION_METADATA_KEY;
pub use provider::DEFAULT_REFRESH_MARGIN;
