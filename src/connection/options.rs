use crate::credentials::DEFAULT_REFRESH_MARGIN;
use tokio::time::Duration;

#[derive(Clone, Default)]
pub struct ConnectionOptions {
    /// Seed endpoints, tried in order at start. `ip:port` or a full URI.
    pub endpoints: Vec<String>,
    pub client_id: String,
    pub client_secret: String,
    /// Name this instance registers under. Empty disables background endpoint discovery.
    pub service_name: String,
    pub max_retries: Option<u32>,
    pub retry_delay: Option<Duration>,
    pub probe_timeout: Option<Duration>,
    pub discovery_interval: Option<Duration>,
    pub refresh_margin: Option<Duration>,
    pub require_transport_security: Option<bool>,
}

pub(super) struct ConnectionOptionsValidated {
    pub endpoints: Vec<String>,
    pub client_id: String,
    pub client_secret: String,
    pub service_name: String,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub probe_timeout: Duration,
    pub discovery_interval: Duration,
    pub refresh_margin: Duration,
    pub require_transport_security: bool,
}

impl ConnectionOptionsValidated {
    /// Checked at `start()` rather than at construction, so a manager can be wired up before its
    /// configuration is complete.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("Client ID must not be empty");
        }
        if self.client_secret.is_empty() {
            return Err("Client secret must not be empty");
        }
        if self.endpoints.is_empty() {
            return Err("At least one endpoint must be configured");
        }
        if self.endpoints.iter().any(|e| e.trim().is_empty()) {
            return Err("Endpoints must not be blank");
        }
        if self.probe_timeout == Duration::from_secs(0) {
            return Err("Probe timeout must be greater than zero");
        }
        if self.discovery_interval == Duration::from_secs(0) {
            return Err("Discovery interval must be greater than zero");
        }

        Ok(())
    }
}

impl From<ConnectionOptions> for ConnectionOptionsValidated {
    fn from(options: ConnectionOptions) -> Self {
        ConnectionOptionsValidated {
            endpoints: options.endpoints,
            client_id: options.client_id,
            client_secret: options.client_secret,
            service_name: options.service_name,
            max_retries: options.max_retries.unwrap_or(3),
            retry_delay: options.retry_delay.unwrap_or(Duration::from_secs(2)),
            probe_timeout: options.probe_timeout.unwrap_or(Duration::from_secs(5)),
            discovery_interval: options.discovery_interval.unwrap_or(Duration::from_secs(5 * 60)),
            refresh_margin: options.refresh_margin.unwrap_or(DEFAULT_REFRESH_MARGIN),
            require_transport_security: options.require_transport_security.unwrap_or(false),
        }
    }
}
