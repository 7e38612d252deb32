use std::error::Error;
use tonic::codegen::http::uri;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

/// Open a channel to `address`, which is either `ip:port` or a full URI. `https://` addresses
/// get TLS verified against the system roots; plaintext is refused when security is required.
pub async fn connect_channel(address: &str, require_transport_security: bool) -> Result<Channel, ConnectError> {
    let url = endpoint_uri(address);
    let use_tls = url.starts_with("https://");
    if require_transport_security && !use_tls {
        return Err(ConnectError::InsecureTransport(address.to_string()));
    }

    let mut endpoint = Endpoint::from_shared(url)?;
    if use_tls {
        endpoint = endpoint
            .tls_config(ClientTlsConfig::new())
            .map_err(|e| ConnectError::TlsConfig(e.into()))?;
    }
    let channel = endpoint.connect().await?;

    Ok(channel)
}

/// `ip:port` part of an address, whether or not it carries a scheme.
pub fn host_port(address: &str) -> &str {
    let without_scheme = address
        .strip_prefix("http://")
        .or_else(|| address.strip_prefix("https://"))
        .unwrap_or(address);

    without_scheme.trim_end_matches('/')
}

fn endpoint_uri(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Invalid endpoint URI: {0}")]
    InvalidUri(uri::InvalidUri),

    #[error("Endpoint '{0}' is plaintext but the credential requires transport security")]
    InsecureTransport(String),

    #[error("Invalid TLS settings: {0}")]
    TlsConfig(Box<dyn Error + Send + Sync>),

    #[error("Failed to connect: {0}")]
    ConnectFailure(Box<dyn Error + Send + Sync>),
}

impl From<uri::InvalidUri> for ConnectError {
    fn from(e: uri::InvalidUri) -> Self {
        ConnectError::InvalidUri(e)
    }
}

impl From<tonic::transport::Error> for ConnectError {
    fn from(e: tonic::transport::Error) -> Self {
        ConnectError::ConnectFailure(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_port_strips_scheme_and_slash() {
        assert_eq!(host_port("10.0.0.1:8500"), "10.0.0.1:8500");
        assert_eq!(host_port("http://10.0.0.1:8500"), "10.0.0.1:8500");
        assert_eq!(host_port("https://10.0.0.1:8500/"), "10.0.0.1:8500");
    }

    #[test]
    fn endpoint_uri_defaults_to_http() {
        assert_eq!(endpoint_uri("10.0.0.1:8500"), "http://10.0.0.1:8500");
        assert_eq!(endpoint_uri("https://cp.internal:443"), "https://cp.internal:443");
    }

    #[tokio::test]
    async fn plaintext_endpoint_refused_when_security_required() {
        let result = connect_channel("127.0.0.1:1", true).await;

        match result {
            Err(ConnectError::InsecureTransport(address)) => assert_eq!(address, "127.0.0.1:1"),
            other => panic!("Unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
