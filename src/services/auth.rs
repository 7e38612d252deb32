use tokio::time::Duration;

/// A bearer token handed out by the cluster's auth service.
#[derive(Clone, Eq, PartialEq)]
pub struct AccessToken {
    pub token: String,
    /// Lifetime as reported by the server, relative to when the reply was received.
    pub expires_in: Duration,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Client ID or secret was rejected")]
    InvalidCredentials,

    #[error("Auth service unreachable: {0}")]
    Unavailable(String),

    #[error("Auth call failed: {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange a client identity for a short-lived bearer token.
    async fn authenticate(&self, client_id: &str, client_secret: &str) -> Result<AccessToken, AuthError>;
}
