use crate::services::{AccessToken, AuthError, AuthService};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tonic::metadata::MetadataValue;

pub const AUTHORIZATION_METADATA_KEY: &str = "authorization";

/// A cached token is refreshed once it is within this margin of its expiry.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Server-granted lifetimes are capped here so the expiry always fits in an `Instant`.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Clone, Eq, PartialEq)]
pub struct ClientIdentity {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

pub struct CredentialConfig {
    pub logger: slog::Logger,
    pub identity: ClientIdentity,
    pub auth_service: Arc<dyn AuthService>,
    pub refresh_margin: Duration,
    pub require_transport_security: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Authentication failed: {0}")]
    AuthFailure(#[from] AuthError),

    #[error("Access token cannot be sent as request metadata")]
    MalformedToken,
}

/// CredentialProvider owns a client identity and the bearer token issued for it, and supplies
/// the per-call authorization metadata for every outbound RPC.
///
/// The token is refreshed just-in-time: callers first look at the cache under the read lock and
/// only contend on the refresh gate when the token is missing or about to expire. The gate is
/// re-checked after it is acquired, so any number of concurrent callers that all see an expired
/// token result in a single call to the auth service.
pub struct CredentialProvider {
    logger: slog::Logger,
    identity: ClientIdentity,
    auth_service: Arc<dyn AuthService>,
    cached: RwLock<CachedToken>,
    refresh_gate: Mutex<()>,
    refresh_margin: Duration,
    require_transport_security: bool,
}

#[derive(Default)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn needs_refresh(&self, now: Instant, refresh_margin: Duration) -> bool {
        match self.expires_at {
            _ if self.access_token.is_empty() => true,
            Some(expires_at) => match now.checked_add(refresh_margin) {
                Some(refresh_at) => refresh_at > expires_at,
                None => true,
            },
            None => true,
        }
    }
}

impl CredentialProvider {
    pub fn new(config: CredentialConfig) -> Self {
        CredentialProvider {
            logger: config
                .logger
                .new(slog::o!("Component" => "CredentialProvider", "ClientId" => config.identity.client_id.clone())),
            identity: config.identity,
            auth_service: config.auth_service,
            cached: RwLock::new(CachedToken::default()),
            refresh_gate: Mutex::new(()),
            refresh_margin: config.refresh_margin,
            require_transport_security: config.require_transport_security,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.identity.client_id
    }

    /// `{ "authorization": "Bearer <token>" }`, refreshing the token first if needed.
    pub async fn request_metadata(&self) -> Result<HashMap<&'static str, String>, CredentialError> {
        let token = self.access_token().await?;

        let mut metadata = HashMap::with_capacity(1);
        metadata.insert(AUTHORIZATION_METADATA_KEY, format!("Bearer {}", token));

        Ok(metadata)
    }

    /// Attach the authorization metadata to a gRPC request.
    pub async fn authorize<T>(&self, request: &mut tonic::Request<T>) -> Result<(), CredentialError> {
        let token = self.access_token().await?;
        let value =
            MetadataValue::from_str(&format!("Bearer {}", token)).map_err(|_| CredentialError::MalformedToken)?;
        request.metadata_mut().insert(AUTHORIZATION_METADATA_KEY, value);

        Ok(())
    }

    /// A token that is valid for at least the refresh margin, when the server grants one that
    /// long.
    pub async fn access_token(&self) -> Result<String, CredentialError> {
        if let Some(token) = self.cached_token_if_fresh() {
            return Ok(token);
        }

        let _gate = self.refresh_gate.lock().await;

        // Someone else may have refreshed while we were waiting on the gate.
        if let Some(token) = self.cached_token_if_fresh() {
            return Ok(token);
        }

        slog::debug!(self.logger, "Access token missing or about to expire. Authenticating.");
        let fresh = self
            .auth_service
            .authenticate(&self.identity.client_id, &self.identity.client_secret)
            .await
            .map_err(|e| {
                slog::warn!(self.logger, "Token refresh failed: {}", e);
                CredentialError::AuthFailure(e)
            })?;

        let token = fresh.token.clone();
        self.store_token(fresh);

        Ok(token)
    }

    /// Seed the cache with a token obtained outside of `access_token()`, e.g. while probing an
    /// endpoint.
    pub fn store_token(&self, token: AccessToken) {
        let expires_at = Instant::now() + token.expires_in.min(MAX_TOKEN_LIFETIME);
        let mut cached = self.cached.write().expect("CredentialProvider.store_token() lock poison");
        cached.access_token = token.token;
        cached.expires_at = Some(expires_at);
        slog::debug!(self.logger, "Stored access token valid for {:?}", token.expires_in);
    }

    /// Best-effort check for readiness probes. Never triggers a refresh.
    pub fn is_token_valid(&self) -> bool {
        match self.cached.try_read() {
            Ok(cached) => !cached.needs_refresh(Instant::now(), self.refresh_margin),
            Err(_) => false,
        }
    }

    pub fn require_transport_security(&self) -> bool {
        self.require_transport_security
    }

    fn cached_token_if_fresh(&self) -> Option<String> {
        let cached = self.cached.read().expect("CredentialProvider cache lock poison");
        if cached.needs_refresh(Instant::now(), self.refresh_margin) {
            None
        } else {
            Some(cached.access_token.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAuth {
        calls: AtomicUsize,
        ttl: Duration,
        reject: bool,
    }

    impl CountingAuth {
        fn new(ttl: Duration) -> Arc<Self> {
            Arc::new(CountingAuth {
                calls: AtomicUsize::new(0),
                ttl,
                reject: false,
            })
        }

        fn rejecting() -> Arc<Self> {
            Arc::new(CountingAuth {
                calls: AtomicUsize::new(0),
                ttl: Duration::from_secs(3600),
                reject: true,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl AuthService for CountingAuth {
        async fn authenticate(&self, client_id: &str, client_secret: &str) -> Result<AccessToken, AuthError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            // Widen the window in which concurrent callers can pile up on the refresh gate.
            tokio::time::sleep(Duration::from_millis(20)).await;

            if self.reject || client_secret != "s3cret" {
                return Err(AuthError::InvalidCredentials);
            }

            Ok(AccessToken {
                token: format!("{}-token-{}", client_id, n),
                expires_in: self.ttl,
            })
        }
    }

    fn provider(auth: Arc<CountingAuth>) -> Arc<CredentialProvider> {
        Arc::new(CredentialProvider::new(CredentialConfig {
            logger: slog::Logger::root(slog::Discard, slog::o!()),
            identity: ClientIdentity {
                client_id: "svc-a".into(),
                client_secret: "s3cret".into(),
            },
            auth_service: auth,
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            require_transport_security: false,
        }))
    }

    #[tokio::test]
    async fn metadata_carries_bearer_token() {
        let auth = CountingAuth::new(Duration::from_secs(3600));
        let provider = provider(auth.clone());

        let metadata = provider.request_metadata().await.unwrap();

        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[AUTHORIZATION_METADATA_KEY], "Bearer svc-a-token-1");
        assert_eq!(auth.calls(), 1);
    }

    #[tokio::test]
    async fn fresh_token_is_reused() {
        let auth = CountingAuth::new(Duration::from_secs(3600));
        let provider = provider(auth.clone());

        for _ in 0..5 {
            provider.access_token().await.unwrap();
        }

        assert_eq!(auth.calls(), 1);
        assert!(provider.is_token_valid());
    }

    #[tokio::test]
    async fn oversized_token_lifetime_is_capped() {
        let auth = CountingAuth::new(Duration::from_secs(i64::MAX as u64));
        let provider = provider(auth.clone());

        let metadata = provider.request_metadata().await.unwrap();
        provider.request_metadata().await.unwrap();

        assert_eq!(metadata[AUTHORIZATION_METADATA_KEY], "Bearer svc-a-token-1");
        assert_eq!(auth.calls(), 1);
        assert!(provider.is_token_valid());
    }

    #[tokio::test]
    async fn token_inside_refresh_margin_is_refreshed() {
        // 30s of validity is less than the 1 minute margin, so every call re-authenticates.
        let auth = CountingAuth::new(Duration::from_secs(30));
        let provider = provider(auth.clone());

        assert_eq!(provider.access_token().await.unwrap(), "svc-a-token-1");
        assert_eq!(provider.access_token().await.unwrap(), "svc-a-token-2");
        assert_eq!(auth.calls(), 2);
        assert!(!provider.is_token_valid());
    }

    #[tokio::test]
    async fn concurrent_refreshes_collapse_into_one_auth_call() {
        let auth = CountingAuth::new(Duration::from_secs(3600));
        let provider = provider(auth.clone());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let provider = provider.clone();
            handles.push(tokio::spawn(async move { provider.request_metadata().await }));
        }

        for handle in handles {
            let metadata = handle.await.unwrap().unwrap();
            assert_eq!(metadata[AUTHORIZATION_METADATA_KEY], "Bearer svc-a-token-1");
        }
        assert_eq!(auth.calls(), 1);
    }

    #[tokio::test]
    async fn auth_failure_is_surfaced_and_not_cached() {
        let auth = CountingAuth::rejecting();
        let provider = provider(auth.clone());

        match provider.request_metadata().await {
            Err(CredentialError::AuthFailure(AuthError::InvalidCredentials)) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
        assert!(!provider.is_token_valid());

        // The next call tries again instead of serving a cached failure.
        let _ = provider.access_token().await;
        assert_eq!(auth.calls(), 2);
    }

    #[tokio::test]
    async fn seeded_token_skips_authentication() {
        let auth = CountingAuth::new(Duration::from_secs(3600));
        let provider = provider(auth.clone());

        provider.store_token(AccessToken {
            token: "seeded".into(),
            expires_in: Duration::from_secs(600),
        });

        assert!(provider.is_token_valid());
        assert_eq!(provider.access_token().await.unwrap(), "seeded");
        assert_eq!(auth.calls(), 0);
    }

    #[tokio::test]
    async fn authorize_inserts_grpc_metadata() {
        let auth = CountingAuth::new(Duration::from_secs(3600));
        let provider = provider(auth);
        let mut request = tonic::Request::new(());

        provider.authorize(&mut request).await.unwrap();

        let value = request.metadata().get(AUTHORIZATION_METADATA_KEY).unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer svc-a-token-1");
    }
}
