use crate::grpc::control_plane_peer_client::ControlPlanePeerClient;
use crate::grpc::ProtoPeerMessage;
use crate::services::grpc::connect::{connect_channel, ConnectError};
use crate::services::grpc::is_connection_failure;
use crate::services::{ConnectionId, PeerCallError, PeerConnection, PeerMessage, PeerTransport};
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tonic::transport::Channel;
use tonic::Status;

/// Connection table of gRPC channels to cluster peers.
pub struct GrpcPeerTransport {
    logger: slog::Logger,
    peers: RwLock<Vec<GrpcPeer>>,
    next_connection_seq: AtomicU64,
}

struct GrpcPeer {
    id: ConnectionId,
    address: String,
    channel: Channel,
}

impl GrpcPeerTransport {
    pub fn new(logger: slog::Logger) -> Self {
        GrpcPeerTransport {
            logger: logger.new(slog::o!("Component" => "GrpcPeerTransport")),
            peers: RwLock::new(Vec::new()),
            next_connection_seq: AtomicU64::new(1),
        }
    }

    /// Connect to `address` and add the connection to the table.
    pub async fn open(&self, address: &str) -> Result<ConnectionId, ConnectError> {
        let channel = connect_channel(address, false).await?;
        let seq = self.next_connection_seq.fetch_add(1, Ordering::Relaxed);
        let id = ConnectionId::new(format!("conn-{}", seq));

        slog::info!(self.logger, "Opened peer connection {} to {}", id, address);
        self.peers
            .write()
            .expect("GrpcPeerTransport.open() lock poison")
            .push(GrpcPeer {
                id: id.clone(),
                address: address.to_string(),
                channel,
            });

        Ok(id)
    }

    /// Drop a connection from the table. Returns false if it was not open.
    pub fn close(&self, id: &ConnectionId) -> bool {
        let mut peers = self.peers.write().expect("GrpcPeerTransport.close() lock poison");
        let before = peers.len();
        peers.retain(|peer| &peer.id != id);

        peers.len() != before
    }

    fn channel_for(&self, message: &PeerMessage) -> Result<(ConnectionId, Channel), PeerCallError> {
        let id = message
            .connection_id
            .clone()
            .ok_or_else(|| PeerCallError::Rejected("Message is not addressed to a connection".into()))?;

        let peers = self.peers.read().expect("GrpcPeerTransport.channel_for() lock poison");
        match peers.iter().find(|peer| peer.id == id) {
            Some(peer) => Ok((id, peer.channel.clone())),
            None => Err(PeerCallError::Unavailable(id, "connection is closed".into())),
        }
    }
}

#[async_trait::async_trait]
impl PeerTransport for GrpcPeerTransport {
    fn connections(&self) -> Vec<PeerConnection> {
        self.peers
            .read()
            .expect("GrpcPeerTransport.connections() lock poison")
            .iter()
            .map(|peer| PeerConnection {
                id: peer.id.clone(),
                address: peer.address.clone(),
            })
            .collect()
    }

    async fn call(&self, message: PeerMessage) -> Result<Bytes, PeerCallError> {
        let (id, channel) = self.channel_for(&message)?;
        let mut client = ControlPlanePeerClient::new(channel);

        slog::debug!(self.logger, "ClientWire - {:?}", message);
        let rpc_reply = client.forward(ProtoPeerMessage::from(message)).await;
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_reply);

        rpc_reply
            .map(|reply| Bytes::from(reply.into_inner().payload))
            .map_err(|status| convert_status(id, status))
    }

    async fn send_oneway(&self, message: PeerMessage) -> Result<(), PeerCallError> {
        let (id, channel) = self.channel_for(&message)?;
        let mut client = ControlPlanePeerClient::new(channel);

        slog::debug!(self.logger, "ClientWire - {:?}", message);
        client
            .notify(ProtoPeerMessage::from(message))
            .await
            .map(|_| ())
            .map_err(|status| convert_status(id, status))
    }
}

// ------- Conversions --------

impl From<PeerMessage> for ProtoPeerMessage {
    fn from(message: PeerMessage) -> Self {
        ProtoPeerMessage {
            connection_id: message.connection_id.map(ConnectionId::into_inner).unwrap_or_default(),
            message_type: message.message_type,
            payload: message.payload.to_vec(),
        }
    }
}

fn convert_status(id: ConnectionId, status: Status) -> PeerCallError {
    if is_connection_failure(&status) {
        PeerCallError::Unavailable(id, status.message().to_string())
    } else {
        PeerCallError::Rejected(format!("{:?}: {}", status.code(), status.message()))
    }
}
