use bytes::Bytes;
use std::fmt;

/// Identifies one open connection in a peer connection table.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        ConnectionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeerConnection {
    pub id: ConnectionId,
    /// `ip:port` of the peer on the other end.
    pub address: String,
}

/// An outbound request. The payload encoding belongs to the caller; the router only decides which
/// connection it goes out on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeerMessage {
    pub connection_id: Option<ConnectionId>,
    pub message_type: String,
    pub payload: Bytes,
}

impl PeerMessage {
    pub fn new(message_type: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        PeerMessage {
            connection_id: None,
            message_type: message_type.into(),
            payload: payload.into(),
        }
    }

    /// Copy of this message addressed to `connection_id`.
    pub(crate) fn stamped(&self, connection_id: ConnectionId) -> Self {
        PeerMessage {
            connection_id: Some(connection_id),
            ..self.clone()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PeerCallError {
    /// Connection-level failure. The same request may succeed on another connection.
    #[error("Connection {0} unavailable: {1}")]
    Unavailable(ConnectionId, String),

    /// The peer received and refused the request.
    #[error("Request rejected by peer: {0}")]
    Rejected(String),
}

impl PeerCallError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, PeerCallError::Unavailable(..))
    }
}

/// A table of already-open peer connections plus the means to send on one of them.
#[async_trait::async_trait]
pub trait PeerTransport: Send + Sync {
    /// Snapshot of the open connections, in table order.
    fn connections(&self) -> Vec<PeerConnection>;

    /// Send `message` on the connection it is stamped with and wait for the reply payload.
    async fn call(&self, message: PeerMessage) -> Result<Bytes, PeerCallError>;

    /// Send `message` without waiting for a reply payload.
    async fn send_oneway(&self, message: PeerMessage) -> Result<(), PeerCallError>;
}
