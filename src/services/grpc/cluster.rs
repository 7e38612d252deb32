use crate::grpc::control_plane_cluster_client::ControlPlaneClusterClient;
use crate::grpc::{ProtoAwaitLeaderReq, ProtoGetLeaderReq, ProtoLeaderInfo};
use crate::services::grpc::is_connection_failure;
use crate::services::{LeaderAnnouncement, LeaderQuery, LeaderQueryError};
use tokio::sync::mpsc;
use tokio::time::Duration;
use tonic::transport::Channel;
use tonic::Status;

/// `LeaderQuery` backed by the `ControlPlaneCluster` gRPC service. Leader-change pushes are
/// received through a long-poll loop that runs until the subscriber drops its receiver.
#[derive(Clone)]
pub struct GrpcLeaderQuery {
    logger: slog::Logger,
    channel: Channel,
    retry_backoff: Duration,
}

impl GrpcLeaderQuery {
    pub fn new(logger: slog::Logger, channel: Channel) -> Self {
        GrpcLeaderQuery {
            logger: logger.new(slog::o!("Component" => "GrpcLeaderQuery")),
            channel,
            retry_backoff: Duration::from_secs(1),
        }
    }

    async fn run_watch_loop(self, message_type: String, sink: mpsc::Sender<LeaderAnnouncement>) {
        let mut known_node_id = String::new();

        loop {
            let mut client = ControlPlaneClusterClient::new(self.channel.clone());
            let rpc_request = ProtoAwaitLeaderReq {
                message_type: message_type.clone(),
                known_node_id: known_node_id.clone(),
            };

            let rpc_reply = tokio::select! {
                _ = sink.closed() => {
                    slog::debug!(self.logger, "Leader watch subscriber went away");
                    return;
                }
                rpc_reply = client.await_leader_change(rpc_request) => rpc_reply,
            };

            match rpc_reply.map(|r| r.into_inner()) {
                Ok(leader) if leader.node_id.is_empty() => {
                    slog::debug!(self.logger, "Leader change notification without a leader");
                }
                Ok(leader) => {
                    known_node_id = leader.node_id.clone();
                    if sink.send(LeaderAnnouncement::from(leader)).await.is_err() {
                        return;
                    }
                }
                Err(status) => {
                    slog::warn!(self.logger, "Leader watch call failed: {:?}", status);
                    tokio::time::sleep(self.retry_backoff).await;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl LeaderQuery for GrpcLeaderQuery {
    async fn get_leader(&self) -> Result<LeaderAnnouncement, LeaderQueryError> {
        let mut client = ControlPlaneClusterClient::new(self.channel.clone());
        let leader = client.get_leader(ProtoGetLeaderReq {}).await?.into_inner();

        if leader.node_id.is_empty() {
            return Err(LeaderQueryError::NoLeader);
        }

        Ok(LeaderAnnouncement::from(leader))
    }

    async fn watch_leader(
        &self,
        message_type: &str,
        sink: mpsc::Sender<LeaderAnnouncement>,
    ) -> Result<(), LeaderQueryError> {
        tokio::spawn(self.clone().run_watch_loop(message_type.to_string(), sink));
        Ok(())
    }
}

// ------- Conversions --------

impl From<ProtoLeaderInfo> for LeaderAnnouncement {
    fn from(leader: ProtoLeaderInfo) -> Self {
        LeaderAnnouncement {
            node_id: leader.node_id,
            address: leader.address,
        }
    }
}

impl From<Status> for LeaderQueryError {
    fn from(status: Status) -> Self {
        if is_connection_failure(&status) {
            LeaderQueryError::Unavailable(status.message().to_string())
        } else {
            LeaderQueryError::Other(format!("{:?}: {}", status.code(), status.message()))
        }
    }
}
