use crate::connection::discovery::{self, DiscoveryTask};
use crate::connection::options::ConnectionOptionsValidated;
use crate::connection::{AuthenticatedChannel, ConnectionError, ConnectionOptions, Connector, GrpcConnector, ProbeError};
use crate::credentials::{ClientIdentity, CredentialConfig, CredentialProvider};
use crate::services::{AccessToken, AuthError, AuthService};
use std::error::Error;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Maintains a single authenticated channel to one endpoint of the cluster and fails over to
/// the other known endpoints when calls over it keep failing.
///
/// The endpoint pool, the current endpoint and the channel live behind one async read-write
/// lock. Callers only ever take clones of the channel under the read lock; connecting and
/// switching hold the write lock for the whole probe, so no caller can observe a half-switched
/// manager.
pub struct ConnectionManager<C: Connector = GrpcConnector> {
    logger: slog::Logger,
    settings: ConnectionOptionsValidated,
    connector: Arc<C>,
    credentials: Arc<CredentialProvider>,
    state: Arc<RwLock<ConnectionState<C::Channel>>>,
    started: AtomicBool,
    stop_token: CancellationToken,
}

pub(super) struct ConnectionState<Ch> {
    pub endpoints: Vec<String>,
    pub current_endpoint: Option<String>,
    pub channel: Option<AuthenticatedChannel<Ch>>,
}

impl ConnectionManager<GrpcConnector> {
    pub fn new(logger: &slog::Logger, options: ConnectionOptions) -> Self {
        Self::with_connector(logger, options, GrpcConnector)
    }
}

impl<C: Connector> ConnectionManager<C> {
    pub fn with_connector(logger: &slog::Logger, options: ConnectionOptions, connector: C) -> Self {
        let logger = logger.new(slog::o!("Component" => "ConnectionManager"));
        let settings = ConnectionOptionsValidated::from(options);
        let connector = Arc::new(connector);
        let state = Arc::new(RwLock::new(ConnectionState {
            endpoints: settings.endpoints.clone(),
            current_endpoint: None,
            channel: None,
        }));

        let credentials = Arc::new(CredentialProvider::new(CredentialConfig {
            logger: logger.clone(),
            identity: ClientIdentity {
                client_id: settings.client_id.clone(),
                client_secret: settings.client_secret.clone(),
            },
            auth_service: Arc::new(CurrentChannelAuth {
                state: Arc::downgrade(&state),
                connector: connector.clone(),
            }),
            refresh_margin: settings.refresh_margin,
            require_transport_security: settings.require_transport_security,
        }));

        ConnectionManager {
            logger,
            settings,
            connector,
            credentials,
            state,
            started: AtomicBool::new(false),
            stop_token: CancellationToken::new(),
        }
    }

    /// Connect to the first endpoint, in configured order, that both accepts a connection and
    /// authenticates this client, then start background endpoint discovery.
    pub async fn start(&self) -> Result<(), ConnectionError> {
        self.settings.validate().map_err(ConnectionError::InvalidOptions)?;
        if self.stop_token.is_cancelled() {
            return Err(ConnectionError::Stopped);
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ConnectionError::AlreadyStarted);
        }

        let mut state = self.state.write().await;
        for endpoint in state.endpoints.clone() {
            match self.probe(&endpoint).await {
                Ok(channel) => {
                    slog::info!(self.logger, "Connected to {}", endpoint);
                    state.current_endpoint = Some(endpoint);
                    state.channel = Some(channel);
                    break;
                }
                Err(e) => slog::warn!(self.logger, "Endpoint {} unusable: {}", endpoint, e),
            }
        }

        if state.channel.is_none() {
            let attempted = state.endpoints.len();
            drop(state);
            self.started.store(false, Ordering::SeqCst);
            return Err(ConnectionError::NoReachableEndpoint(attempted));
        }
        drop(state);

        self.spawn_discovery_loop();
        Ok(())
    }

    /// Run `op` against the current channel, retrying up to `max_retries` more times. Each retry
    /// waits `retry_delay` and then switches to the next endpoint.
    pub async fn execute_with_retry<F, Fut, T, E>(&self, mut op: F) -> Result<T, ConnectionError>
    where
        F: FnMut(AuthenticatedChannel<C::Channel>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        let attempts = self.settings.max_retries.saturating_add(1);
        let mut last_error: Box<dyn Error + Send + Sync> = Box::new(ConnectionError::NotConnected);

        for attempt in 1..=attempts {
            if self.stop_token.is_cancelled() {
                return Err(ConnectionError::Stopped);
            }

            match self.channel().await {
                Some(channel) => match op(channel).await {
                    Ok(value) => return Ok(value),
                    Err(e) => last_error = e.into(),
                },
                None => last_error = Box::new(ConnectionError::NotConnected),
            }
            slog::debug!(self.logger, "Attempt {}/{} failed: {}", attempt, attempts, last_error);

            if attempt == attempts {
                break;
            }

            tokio::select! {
                _ = self.stop_token.cancelled() => return Err(ConnectionError::Stopped),
                _ = tokio::time::sleep(self.settings.retry_delay) => {}
            }
            if let Err(e) = self.switch_endpoint().await {
                slog::warn!(self.logger, "{}", e);
            }
        }

        Err(ConnectionError::RetriesExhausted {
            attempts,
            source: last_error,
        })
    }

    /// Move to the next endpoint in the pool that differs from the current one. A no-op when
    /// there is nothing to move to.
    ///
    /// On failure the manager is left without a channel and with the failed endpoint recorded as
    /// current, so the next switch moves past it.
    pub async fn switch_endpoint(&self) -> Result<(), ConnectionError> {
        let mut state = self.state.write().await;

        let next = match next_endpoint(&state.endpoints, state.current_endpoint.as_deref()) {
            Some(next) => next.to_string(),
            None => return Ok(()),
        };
        slog::info!(self.logger, "Switching endpoint {:?} -> {}", state.current_endpoint, next);

        // Drop the old transport before the new one becomes visible.
        state.channel = None;
        state.current_endpoint = Some(next.clone());

        match self.probe(&next).await {
            Ok(channel) => {
                state.channel = Some(channel);
                Ok(())
            }
            Err(source) => Err(ConnectionError::SwitchFailed { endpoint: next, source }),
        }
    }

    /// Ask the registry for the current instance list now, instead of waiting for the next
    /// discovery tick. Returns whether the pool was replaced.
    pub async fn refresh_endpoints(&self) -> Result<bool, ConnectionError> {
        discovery::refresh_endpoints(&self.logger, &self.state, &*self.connector, &self.settings.service_name).await
    }

    pub async fn get_endpoints(&self) -> Vec<String> {
        self.state.read().await.endpoints.clone()
    }

    pub async fn get_current_endpoint(&self) -> Option<String> {
        self.state.read().await.current_endpoint.clone()
    }

    pub async fn channel(&self) -> Option<AuthenticatedChannel<C::Channel>> {
        self.state.read().await.channel.clone()
    }

    pub fn credentials(&self) -> &Arc<CredentialProvider> {
        &self.credentials
    }

    /// Stop discovery, abort pending retry waits and close the channel.
    pub async fn stop(&self) {
        self.stop_token.cancel();
        let mut state = self.state.write().await;
        state.channel = None;
        slog::info!(self.logger, "Stopped");
    }

    fn spawn_discovery_loop(&self) {
        if self.settings.service_name.is_empty() {
            slog::debug!(self.logger, "No service name configured, endpoint discovery disabled");
            return;
        }

        let task = DiscoveryTask::new(
            &self.logger,
            self.state.clone(),
            self.connector.clone(),
            self.settings.service_name.clone(),
            self.settings.discovery_interval,
            self.stop_token.child_token(),
        );
        tokio::task::spawn(task.run());
    }

    /// Connect and authenticate, both inside the probe timeout. The issued token seeds the
    /// credential cache so the first real call does not authenticate again.
    async fn probe(&self, endpoint: &str) -> Result<AuthenticatedChannel<C::Channel>, ProbeError> {
        let attempt = async {
            let channel = self
                .connector
                .connect(endpoint, self.settings.require_transport_security)
                .await?;
            let token = self
                .connector
                .auth_service(&channel)
                .authenticate(&self.settings.client_id, &self.settings.client_secret)
                .await?;
            Ok::<_, ProbeError>((channel, token))
        };

        let (channel, token) = tokio::time::timeout(self.settings.probe_timeout, attempt)
            .await
            .map_err(|_| ProbeError::Timeout(self.settings.probe_timeout))??;
        self.credentials.store_token(token);

        Ok(AuthenticatedChannel::new(
            endpoint.to_string(),
            channel,
            self.credentials.clone(),
        ))
    }
}

impl<C: Connector> Drop for ConnectionManager<C> {
    fn drop(&mut self) {
        self.stop_token.cancel();
    }
}

/// Endpoint after `current` in pool order that is not `current` itself, wrapping around. When
/// `current` is not in the pool the scan starts from the front.
fn next_endpoint<'a>(endpoints: &'a [String], current: Option<&str>) -> Option<&'a str> {
    let start = current
        .and_then(|c| endpoints.iter().position(|e| e == c))
        .map(|i| i + 1)
        .unwrap_or(0);

    (0..endpoints.len())
        .map(|offset| endpoints[(start + offset) % endpoints.len()].as_str())
        .find(|e| Some(*e) != current)
}

/// Token refreshes go to the auth service on whichever channel is current at the time.
struct CurrentChannelAuth<C: Connector> {
    state: Weak<RwLock<ConnectionState<C::Channel>>>,
    connector: Arc<C>,
}

#[async_trait::async_trait]
impl<C: Connector> AuthService for CurrentChannelAuth<C> {
    async fn authenticate(&self, client_id: &str, client_secret: &str) -> Result<AccessToken, AuthError> {
        let state = self
            .state
            .upgrade()
            .ok_or_else(|| AuthError::Unavailable("connection manager dropped".into()))?;
        let channel = state
            .read()
            .await
            .channel
            .as_ref()
            .map(|c| c.channel().clone())
            .ok_or_else(|| AuthError::Unavailable("no active channel".into()))?;

        self.connector
            .auth_service(&channel)
            .authenticate(client_id, client_secret)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{ConnectError, RegistryError, RegistryService};
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::time::Duration;

    const A: &str = "10.0.0.1:8500";
    const B: &str = "10.0.0.2:8500";
    const C: &str = "10.0.0.3:8500";

    #[derive(Clone, Debug)]
    struct MockChannel {
        endpoint: String,
    }

    #[derive(Default)]
    struct MockConnector {
        unreachable: HashSet<String>,
        rejecting_auth: HashSet<String>,
        connects: Arc<Mutex<Vec<String>>>,
        auth_calls: Arc<AtomicUsize>,
        registry_reply: Arc<Mutex<Vec<String>>>,
    }

    impl MockConnector {
        fn connects(&self) -> Arc<Mutex<Vec<String>>> {
            self.connects.clone()
        }
    }

    struct MockAuth {
        reject: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl AuthService for MockAuth {
        async fn authenticate(&self, client_id: &str, _client_secret: &str) -> Result<AccessToken, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                return Err(AuthError::InvalidCredentials);
            }
            Ok(AccessToken {
                token: format!("{}-token", client_id),
                expires_in: Duration::from_secs(3600),
            })
        }
    }

    struct MockRegistry {
        channel: AuthenticatedChannel<MockChannel>,
        reply: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl RegistryService for MockRegistry {
        async fn discover(&self, _service_name: &str) -> Result<Vec<String>, RegistryError> {
            self.channel.request_metadata().await?;
            Ok(self.reply.lock().unwrap().clone())
        }
    }

    #[async_trait::async_trait]
    impl Connector for MockConnector {
        type Channel = MockChannel;

        async fn connect(&self, endpoint: &str, _require_transport_security: bool) -> Result<MockChannel, ConnectError> {
            self.connects.lock().unwrap().push(endpoint.to_string());
            if self.unreachable.contains(endpoint) {
                return Err(ConnectError::ConnectFailure("connection refused".into()));
            }
            Ok(MockChannel {
                endpoint: endpoint.to_string(),
            })
        }

        fn auth_service(&self, channel: &MockChannel) -> Arc<dyn AuthService> {
            Arc::new(MockAuth {
                reject: self.rejecting_auth.contains(&channel.endpoint),
                calls: self.auth_calls.clone(),
            })
        }

        fn registry_service(&self, channel: &AuthenticatedChannel<MockChannel>) -> Arc<dyn RegistryService> {
            Arc::new(MockRegistry {
                channel: channel.clone(),
                reply: self.registry_reply.clone(),
            })
        }
    }

    fn logger() -> slog::Logger {
        slog::Logger::root(slog::Discard, slog::o!())
    }

    fn options(endpoints: &[&str]) -> ConnectionOptions {
        ConnectionOptions {
            endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
            client_id: "svc-a".into(),
            client_secret: "s3cret".into(),
            retry_delay: Some(Duration::from_millis(1)),
            ..Default::default()
        }
    }

    #[test]
    fn next_endpoint_rotates_past_current() {
        let endpoints: Vec<String> = vec![A.into(), B.into(), C.into()];

        assert_eq!(next_endpoint(&endpoints, None), Some(A));
        assert_eq!(next_endpoint(&endpoints, Some(A)), Some(B));
        assert_eq!(next_endpoint(&endpoints, Some(B)), Some(C));
        assert_eq!(next_endpoint(&endpoints, Some(C)), Some(A));
        // Current endpoint dropped out of the pool by discovery.
        assert_eq!(next_endpoint(&endpoints, Some("10.0.0.9:8500")), Some(A));
    }

    #[test]
    fn next_endpoint_noop_with_single_endpoint() {
        let endpoints: Vec<String> = vec![A.into()];

        assert_eq!(next_endpoint(&endpoints, Some(A)), None);
        assert_eq!(next_endpoint(&[], Some(A)), None);
    }

    #[tokio::test]
    async fn start_skips_endpoint_that_fails_auth() {
        // -- setup --
        let mut connector = MockConnector::default();
        connector.rejecting_auth.insert(A.into());
        let auth_calls = connector.auth_calls.clone();
        let manager = ConnectionManager::with_connector(&logger(), options(&[A, B]), connector);

        // -- execute --
        manager.start().await.unwrap();

        // -- verify --
        assert_eq!(manager.get_current_endpoint().await.as_deref(), Some(B));
        let channel = manager.channel().await.unwrap();
        assert_eq!(channel.endpoint(), B);
        assert_eq!(channel.channel().endpoint, B);
        assert!(manager.credentials().is_token_valid());

        // Token from the probe is reused for calls.
        let metadata = channel.request_metadata().await.unwrap();
        assert_eq!(metadata["authorization"], "Bearer svc-a-token");
        assert_eq!(auth_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn start_fails_when_no_endpoint_usable() {
        let mut connector = MockConnector::default();
        connector.unreachable.insert(A.into());
        connector.rejecting_auth.insert(B.into());
        let manager = ConnectionManager::with_connector(&logger(), options(&[A, B]), connector);

        match manager.start().await {
            Err(ConnectionError::NoReachableEndpoint(2)) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
        assert!(manager.channel().await.is_none());
    }

    #[tokio::test]
    async fn start_rejects_invalid_options() {
        let manager = ConnectionManager::with_connector(&logger(), options(&[]), MockConnector::default());
        match manager.start().await {
            Err(ConnectionError::InvalidOptions(_)) => {}
            other => panic!("Unexpected result: {:?}", other),
        }

        let mut missing_id = options(&[A]);
        missing_id.client_id = String::new();
        let manager = ConnectionManager::with_connector(&logger(), missing_id, MockConnector::default());
        match manager.start().await {
            Err(ConnectionError::InvalidOptions(_)) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let manager = ConnectionManager::with_connector(&logger(), options(&[A]), MockConnector::default());
        manager.start().await.unwrap();

        match manager.start().await {
            Err(ConnectionError::AlreadyStarted) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn retries_exhaust_after_max_retries_plus_one_attempts() {
        // -- setup --
        let connector = MockConnector::default();
        let connects = connector.connects();
        let manager = ConnectionManager::with_connector(&logger(), options(&[A, B]), connector);
        manager.start().await.unwrap();
        let attempts = AtomicUsize::new(0);

        // -- execute --
        let result: Result<(), _> = manager
            .execute_with_retry(|_channel| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>("boom") }
            })
            .await;

        // -- verify --
        match result {
            Err(ConnectionError::RetriesExhausted { attempts: 4, source }) => assert_eq!(source.to_string(), "boom"),
            other => panic!("Unexpected result: {:?}", other),
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        // One connect at start plus one per switch.
        assert_eq!(*connects.lock().unwrap(), vec![A, B, A, B]);
    }

    #[tokio::test]
    async fn unbounded_max_retries_does_not_overflow() {
        let mut options = options(&[A, B]);
        options.max_retries = Some(u32::MAX);
        let manager = ConnectionManager::with_connector(&logger(), options, MockConnector::default());
        manager.start().await.unwrap();

        let result = manager
            .execute_with_retry(|channel| async move { Ok::<_, ConnectionError>(channel.endpoint().to_string()) })
            .await;

        assert_eq!(result.unwrap(), A);
    }

    #[tokio::test]
    async fn retry_succeeds_on_next_endpoint() {
        let manager = ConnectionManager::with_connector(&logger(), options(&[A, B]), MockConnector::default());
        manager.start().await.unwrap();

        let result = manager
            .execute_with_retry(|channel| async move {
                if channel.endpoint() == A {
                    Err("unavailable")
                } else {
                    Ok(channel.endpoint().to_string())
                }
            })
            .await;

        assert_eq!(result.unwrap(), B);
        assert_eq!(manager.get_current_endpoint().await.as_deref(), Some(B));
    }

    #[tokio::test]
    async fn failed_switch_leaves_failed_endpoint_current() {
        // -- setup --
        let mut connector = MockConnector::default();
        connector.unreachable.insert(B.into());
        let manager = ConnectionManager::with_connector(&logger(), options(&[A, B, C]), connector);
        manager.start().await.unwrap();

        // -- execute & verify --
        match manager.switch_endpoint().await {
            Err(ConnectionError::SwitchFailed { endpoint, .. }) => assert_eq!(endpoint, B),
            other => panic!("Unexpected result: {:?}", other),
        }
        assert!(manager.channel().await.is_none());
        assert_eq!(manager.get_current_endpoint().await.as_deref(), Some(B));

        manager.switch_endpoint().await.unwrap();
        assert_eq!(manager.get_current_endpoint().await.as_deref(), Some(C));
        assert!(manager.channel().await.is_some());
    }

    #[tokio::test]
    async fn missing_channel_counts_as_failed_attempt() {
        let mut connector = MockConnector::default();
        connector.unreachable.insert(B.into());
        let mut opts = options(&[A, B]);
        opts.max_retries = Some(1);
        let manager = ConnectionManager::with_connector(&logger(), opts, connector);
        manager.start().await.unwrap();
        let attempts = AtomicUsize::new(0);

        // First attempt fails on A, the switch to B fails, so the second attempt has no channel.
        let result = manager
            .execute_with_retry(|_channel| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>("boom") }
            })
            .await;

        match result {
            Err(ConnectionError::RetriesExhausted { attempts: 2, source }) => {
                assert_eq!(source.to_string(), ConnectionError::NotConnected.to_string())
            }
            other => panic!("Unexpected result: {:?}", other),
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_aborts_retry_wait() {
        let mut opts = options(&[A, B]);
        opts.retry_delay = Some(Duration::from_secs(3600));
        let manager = ConnectionManager::with_connector(&logger(), opts, MockConnector::default());
        manager.start().await.unwrap();

        let (result, _) = tokio::join!(
            manager.execute_with_retry(|_channel| async { Err::<(), _>("boom") }),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                manager.stop().await;
            }
        );

        match result {
            Err(ConnectionError::Stopped) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
        assert!(manager.channel().await.is_none());
    }

    #[tokio::test]
    async fn discovery_replaces_endpoints_but_ignores_empty_reply() {
        // -- setup --
        let connector = MockConnector::default();
        let registry_reply = connector.registry_reply.clone();
        let mut opts = options(&[A]);
        opts.service_name = "billing".into();
        let manager = ConnectionManager::with_connector(&logger(), opts, connector);
        manager.start().await.unwrap();

        // -- execute & verify --
        assert!(!manager.refresh_endpoints().await.unwrap());
        assert_eq!(manager.get_endpoints().await, vec![A]);

        *registry_reply.lock().unwrap() = vec![B.to_string(), C.to_string()];
        assert!(manager.refresh_endpoints().await.unwrap());
        assert_eq!(manager.get_endpoints().await, vec![B, C]);

        // Replacing the pool does not move the active channel.
        assert_eq!(manager.get_current_endpoint().await.as_deref(), Some(A));
    }

    #[tokio::test]
    async fn discovery_loop_runs_on_interval() {
        let connector = MockConnector::default();
        *connector.registry_reply.lock().unwrap() = vec![B.to_string()];
        let mut opts = options(&[A]);
        opts.service_name = "billing".into();
        opts.discovery_interval = Some(Duration::from_millis(10));
        let manager = ConnectionManager::with_connector(&logger(), opts, connector);

        manager.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(manager.get_endpoints().await, vec![B]);
        manager.stop().await;
    }
}
