use crate::credentials::{CredentialError, CredentialProvider};
use std::collections::HashMap;
use std::sync::Arc;

/// A transport bound to one cluster endpoint, paired with the credential provider that
/// authorizes every call made over it.
#[derive(Clone)]
pub struct AuthenticatedChannel<C> {
    endpoint: String,
    channel: C,
    credentials: Arc<CredentialProvider>,
}

impl<C> AuthenticatedChannel<C> {
    pub(crate) fn new(endpoint: String, channel: C, credentials: Arc<CredentialProvider>) -> Self {
        AuthenticatedChannel {
            endpoint,
            channel,
            credentials,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn credentials(&self) -> &Arc<CredentialProvider> {
        &self.credentials
    }

    pub async fn authorize<T>(&self, request: &mut tonic::Request<T>) -> Result<(), CredentialError> {
        self.credentials.authorize(request).await
    }

    pub async fn request_metadata(&self) -> Result<HashMap<&'static str, String>, CredentialError> {
        self.credentials.request_metadata().await
    }
}
