use crate::connection::manager::ConnectionState;
use crate::connection::{ConnectionError, Connector};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

/// Background loop that periodically asks the registry for the live instances of this service
/// and replaces the endpoint pool with the answer.
pub(super) struct DiscoveryTask<C: Connector> {
    logger: slog::Logger,
    state: Arc<RwLock<ConnectionState<C::Channel>>>,
    connector: Arc<C>,
    service_name: String,
    interval: Duration,
    stop_token: CancellationToken,
}

impl<C: Connector> DiscoveryTask<C> {
    pub fn new(
        logger: &slog::Logger,
        state: Arc<RwLock<ConnectionState<C::Channel>>>,
        connector: Arc<C>,
        service_name: String,
        interval: Duration,
        stop_token: CancellationToken,
    ) -> Self {
        DiscoveryTask {
            logger: logger.new(slog::o!("Component" => "EndpointDiscovery")),
            state,
            connector,
            service_name,
            interval,
            stop_token,
        }
    }

    pub async fn run(self) {
        loop {
            tokio::select! {
                _ = self.stop_token.cancelled() => {
                    slog::debug!(self.logger, "Stopping endpoint discovery");
                    return;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            if let Err(e) = refresh_endpoints(&self.logger, &self.state, &*self.connector, &self.service_name).await {
                slog::warn!(self.logger, "Endpoint discovery failed, keeping previous endpoints: {}", e);
            }
        }
    }
}

/// Query the registry over the current channel. A non-empty answer atomically replaces the
/// endpoint pool; an empty one is ignored. Never switches the active endpoint.
///
/// Returns whether the pool was replaced.
pub(super) async fn refresh_endpoints<C: Connector>(
    logger: &slog::Logger,
    state: &RwLock<ConnectionState<C::Channel>>,
    connector: &C,
    service_name: &str,
) -> Result<bool, ConnectionError> {
    // The read guard is released before the call, since authorizing it may need a token refresh
    // that reads the same state.
    let channel = match state.read().await.channel.clone() {
        Some(channel) => channel,
        None => return Err(ConnectionError::NotConnected),
    };

    let discovered = connector.registry_service(&channel).discover(service_name).await?;
    if discovered.is_empty() {
        slog::debug!(logger, "Registry returned no instances for '{}'", service_name);
        return Ok(false);
    }

    let mut state = state.write().await;
    if state.endpoints != discovered {
        slog::info!(logger, "Endpoints updated: {:?} -> {:?}", state.endpoints, discovered);
    }
    state.endpoints = discovered;

    Ok(true)
}
