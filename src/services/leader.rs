use tokio::sync::mpsc;

/// What the cluster says about its leader. The router turns this into a `LeaderInfo` by resolving
/// the address against its own connection table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeaderAnnouncement {
    pub node_id: String,
    pub address: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LeaderQueryError {
    #[error("Cluster has no leader")]
    NoLeader,

    #[error("Leader query unreachable: {0}")]
    Unavailable(String),

    #[error("Leader query failed: {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait LeaderQuery: Send + Sync {
    async fn get_leader(&self) -> Result<LeaderAnnouncement, LeaderQueryError>;

    /// Subscribe to unsolicited leader-change notifications tagged with `message_type`. Every
    /// notification is pushed into `sink` in the order the cluster produced it. The subscription
    /// ends once `sink` is closed.
    async fn watch_leader(
        &self,
        message_type: &str,
        sink: mpsc::Sender<LeaderAnnouncement>,
    ) -> Result<(), LeaderQueryError>;
}
