use crate::router::leader::{LeaderListener, LeaderTracker};
use crate::router::options::RouterOptionsValidated;
use crate::router::{LeaderChangeCallback, LeaderInfo, RouterOptions};
use crate::services::{LeaderAnnouncement, LeaderQuery, LeaderQueryError, PeerCallError, PeerMessage, PeerTransport};
use bytes::Bytes;
use std::convert::TryFrom;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Message type the cluster tags unsolicited leader-change pushes with.
pub const LEADER_CHANGED_MESSAGE_TYPE: &str = "cluster.leader.changed";

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("Request rejected: {0}")]
    Rejected(#[source] PeerCallError),

    #[error("No peer connection could take the request")]
    NoAvailablePeer,

    #[error("Failed to decode reply: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Leader query failed: {0}")]
    LeaderQuery(#[source] LeaderQueryError),

    #[error("Cluster has no leader")]
    NoLeader,

    #[error("Invalid router options: {0}")]
    InvalidOptions(&'static str),
}

/// Sends requests over a table of open peer connections, preferring the connection to the
/// current cluster leader.
///
/// A request goes to the leader connection first, if one is known. When that connection is
/// unavailable, every other connection is tried in connection-ID order until one accepts the
/// request. Errors from a peer that received the request are returned as is, without trying
/// another peer.
pub struct RequestRouter {
    logger: slog::Logger,
    options: RouterOptionsValidated,
    transport: Arc<dyn PeerTransport>,
    leader_query: Arc<dyn LeaderQuery>,
    tracker: Arc<LeaderTracker>,
    leader_watch_registered: AtomicBool,
    stop_token: CancellationToken,
}

#[derive(Clone, Copy)]
enum Delivery {
    Call,
    OneWay,
}

impl RequestRouter {
    pub fn new(
        logger: &slog::Logger,
        options: RouterOptions,
        transport: Arc<dyn PeerTransport>,
        leader_query: Arc<dyn LeaderQuery>,
    ) -> Result<Self, RouterError> {
        let options = RouterOptionsValidated::try_from(options).map_err(RouterError::InvalidOptions)?;
        let logger = logger.new(slog::o!("Component" => "RequestRouter"));

        Ok(RequestRouter {
            tracker: Arc::new(LeaderTracker::new(&logger)),
            logger,
            options,
            transport,
            leader_query,
            leader_watch_registered: AtomicBool::new(false),
            stop_token: CancellationToken::new(),
        })
    }

    /// Send `message` and decode the reply as `R`.
    pub async fn request<R>(&self, message: PeerMessage) -> Result<R, RouterError>
    where
        R: prost::Message + Default,
    {
        let reply = self.request_raw(message).await?;
        Ok(R::decode(reply)?)
    }

    /// Send `message` and return the undecoded reply payload.
    pub async fn request_raw(&self, message: PeerMessage) -> Result<Bytes, RouterError> {
        self.route(message, Delivery::Call).await
    }

    /// Send `message` one-way. Success means some connection accepted it.
    pub async fn request_ignore(&self, message: PeerMessage) -> Result<(), RouterError> {
        self.route(message, Delivery::OneWay).await.map(|_| ())
    }

    /// Ask the cluster for its leader now, and make sure leader-change pushes are being
    /// followed from here on. The push subscription is set up at most once per router.
    pub async fn request_leader(&self) -> Result<LeaderInfo, RouterError> {
        let queried = self.leader_query.get_leader().await;
        self.ensure_leader_watch().await?;

        self.update_leader_info(queried?);
        self.tracker.current().ok_or(RouterError::NoLeader)
    }

    /// Record a leader announcement. Returns whether it changed the leader.
    pub fn update_leader_info(&self, announcement: LeaderAnnouncement) -> bool {
        self.tracker.update(announcement, &self.transport.connections())
    }

    /// Register `callback` to run once per leader change, after the router has switched over.
    pub fn on_leader_change<F>(&self, callback: F)
    where
        F: Fn(&LeaderInfo) + Send + Sync + 'static,
    {
        let callback: LeaderChangeCallback = Arc::new(callback);
        self.tracker.register(callback);
    }

    pub fn leader_listener(&self) -> LeaderListener {
        self.tracker.listener()
    }

    pub fn current_leader(&self) -> Option<LeaderInfo> {
        self.tracker.current()
    }

    /// Stop following leader-change pushes.
    pub fn stop(&self) {
        self.stop_token.cancel();
    }

    async fn ensure_leader_watch(&self) -> Result<(), RouterError> {
        if self
            .leader_watch_registered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }

        let (sink, notifications) = mpsc::channel(self.options.leader_queue_capacity);
        if let Err(e) = self.leader_query.watch_leader(LEADER_CHANGED_MESSAGE_TYPE, sink).await {
            // Let the next request_leader() try again.
            self.leader_watch_registered.store(false, Ordering::SeqCst);
            return Err(e.into());
        }

        let drain = LeaderNotificationDrain {
            logger: self.logger.clone(),
            notifications,
            tracker: self.tracker.clone(),
            transport: self.transport.clone(),
            stop_token: self.stop_token.child_token(),
        };
        tokio::task::spawn(drain.run());
        slog::debug!(self.logger, "Following '{}' notifications", LEADER_CHANGED_MESSAGE_TYPE);

        Ok(())
    }

    async fn route(&self, message: PeerMessage, delivery: Delivery) -> Result<Bytes, RouterError> {
        let leader_connection = self.tracker.leader_connection(&self.transport.connections());

        if let Some(leader_connection) = &leader_connection {
            match self.send(message.stamped(leader_connection.clone()), delivery).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_unavailable() => {
                    slog::debug!(self.logger, "Leader connection unavailable, trying other peers: {}", e);
                }
                Err(e) => return Err(RouterError::Rejected(e)),
            }
        }

        let mut connections = self.transport.connections();
        connections.sort_by(|a, b| a.id.cmp(&b.id));

        for connection in connections {
            if Some(&connection.id) == leader_connection.as_ref() {
                continue;
            }

            match self.send(message.stamped(connection.id), delivery).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_unavailable() => {
                    slog::debug!(self.logger, "{}", e);
                }
                Err(e) => return Err(RouterError::Rejected(e)),
            }
        }

        slog::warn!(self.logger, "No peer connection accepted '{}'", message.message_type);
        Err(RouterError::NoAvailablePeer)
    }

    async fn send(&self, message: PeerMessage, delivery: Delivery) -> Result<Bytes, PeerCallError> {
        match delivery {
            Delivery::Call => self.transport.call(message).await,
            Delivery::OneWay => self.transport.send_oneway(message).await.map(|_| Bytes::new()),
        }
    }
}

impl Drop for RequestRouter {
    fn drop(&mut self) {
        self.stop_token.cancel();
    }
}

/// Single consumer of the bounded leader notification queue.
struct LeaderNotificationDrain {
    logger: slog::Logger,
    notifications: mpsc::Receiver<LeaderAnnouncement>,
    tracker: Arc<LeaderTracker>,
    transport: Arc<dyn PeerTransport>,
    stop_token: CancellationToken,
}

impl LeaderNotificationDrain {
    async fn run(mut self) {
        loop {
            let announcement = tokio::select! {
                _ = self.stop_token.cancelled() => return,
                announcement = self.notifications.recv() => match announcement {
                    Some(announcement) => announcement,
                    None => {
                        slog::debug!(self.logger, "Leader notification source closed");
                        return;
                    }
                },
            };

            self.tracker.update(announcement, &self.transport.connections());
        }
    }
}

// ------- Conversions --------

impl From<LeaderQueryError> for RouterError {
    fn from(e: LeaderQueryError) -> Self {
        match e {
            LeaderQueryError::NoLeader => RouterError::NoLeader,
            e => RouterError::LeaderQuery(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grpc::ProtoLeaderInfo;
    use crate::services::{ConnectionId, PeerConnection};
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Mutex, Weak};
    use tokio::time::Duration;

    #[derive(Clone)]
    enum Behavior {
        Reply(Bytes),
        Unavailable,
        Reject,
    }

    #[derive(Default)]
    struct MockTransport {
        connections: Vec<PeerConnection>,
        behavior: HashMap<ConnectionId, Behavior>,
        attempts: Mutex<Vec<ConnectionId>>,
    }

    impl MockTransport {
        fn with_peer(mut self, id: &str, address: &str, behavior: Behavior) -> Self {
            self.connections.push(PeerConnection {
                id: ConnectionId::new(id),
                address: address.into(),
            });
            self.behavior.insert(ConnectionId::new(id), behavior);
            self
        }

        fn attempts(&self) -> Vec<String> {
            self.attempts
                .lock()
                .unwrap()
                .iter()
                .map(|id| id.as_str().to_string())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl PeerTransport for MockTransport {
        fn connections(&self) -> Vec<PeerConnection> {
            self.connections.clone()
        }

        async fn call(&self, message: PeerMessage) -> Result<Bytes, PeerCallError> {
            let id = message.connection_id.unwrap();
            self.attempts.lock().unwrap().push(id.clone());
            match self.behavior[&id].clone() {
                Behavior::Reply(payload) => Ok(payload),
                Behavior::Unavailable => Err(PeerCallError::Unavailable(id, "connection reset".into())),
                Behavior::Reject => Err(PeerCallError::Rejected("not leader".into())),
            }
        }

        async fn send_oneway(&self, message: PeerMessage) -> Result<(), PeerCallError> {
            self.call(message).await.map(|_| ())
        }
    }

    #[derive(Default)]
    struct MockLeaderQuery {
        leader: Option<LeaderAnnouncement>,
        watch_registrations: AtomicUsize,
        sink: Mutex<Option<mpsc::Sender<LeaderAnnouncement>>>,
    }

    impl MockLeaderQuery {
        fn leading(node_id: &str, address: &str) -> Self {
            MockLeaderQuery {
                leader: Some(LeaderAnnouncement {
                    node_id: node_id.into(),
                    address: address.into(),
                }),
                ..Default::default()
            }
        }

        fn sink(&self) -> mpsc::Sender<LeaderAnnouncement> {
            self.sink.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl LeaderQuery for MockLeaderQuery {
        async fn get_leader(&self) -> Result<LeaderAnnouncement, LeaderQueryError> {
            self.leader.clone().ok_or(LeaderQueryError::NoLeader)
        }

        async fn watch_leader(
            &self,
            message_type: &str,
            sink: mpsc::Sender<LeaderAnnouncement>,
        ) -> Result<(), LeaderQueryError> {
            assert_eq!(message_type, LEADER_CHANGED_MESSAGE_TYPE);
            self.watch_registrations.fetch_add(1, Ordering::SeqCst);
            *self.sink.lock().unwrap() = Some(sink);
            Ok(())
        }
    }

    fn logger() -> slog::Logger {
        slog::Logger::root(slog::Discard, slog::o!())
    }

    fn router(transport: Arc<MockTransport>, leader_query: Arc<MockLeaderQuery>) -> RequestRouter {
        RequestRouter::new(&logger(), RouterOptions::default(), transport, leader_query).unwrap()
    }

    fn leader(node_id: &str, address: &str) -> LeaderAnnouncement {
        LeaderAnnouncement {
            node_id: node_id.into(),
            address: address.into(),
        }
    }

    fn message() -> PeerMessage {
        PeerMessage::new("config.get", Bytes::from_static(b"key"))
    }

    #[tokio::test]
    async fn leader_is_tried_first() {
        let transport = Arc::new(
            MockTransport::default()
                .with_peer("conn-1", "10.0.0.1:8500", Behavior::Reply(Bytes::from_static(b"one")))
                .with_peer("conn-2", "10.0.0.2:8500", Behavior::Reply(Bytes::from_static(b"two"))),
        );
        let router = router(transport.clone(), Arc::new(MockLeaderQuery::default()));
        router.update_leader_info(leader("node-2", "10.0.0.2:8500"));

        let reply = router.request_raw(message()).await.unwrap();

        assert_eq!(reply, Bytes::from_static(b"two"));
        assert_eq!(transport.attempts(), vec!["conn-2"]);
    }

    #[tokio::test]
    async fn unavailable_leader_falls_back_exactly_once() {
        // -- setup --
        let transport = Arc::new(
            MockTransport::default()
                .with_peer("conn-1", "10.0.0.1:8500", Behavior::Unavailable)
                .with_peer("conn-2", "10.0.0.2:8500", Behavior::Reply(Bytes::from_static(b"two")))
                .with_peer("conn-3", "10.0.0.3:8500", Behavior::Reply(Bytes::from_static(b"three"))),
        );
        let router = router(transport.clone(), Arc::new(MockLeaderQuery::default()));
        router.update_leader_info(leader("node-1", "10.0.0.1:8500"));

        // -- execute --
        let reply = router.request_raw(message()).await.unwrap();

        // -- verify --
        assert_eq!(reply, Bytes::from_static(b"two"));
        // The leader is not attempted a second time during the scan.
        assert_eq!(transport.attempts(), vec!["conn-1", "conn-2"]);
    }

    #[tokio::test]
    async fn rejection_is_returned_without_fallback() {
        let transport = Arc::new(
            MockTransport::default()
                .with_peer("conn-1", "10.0.0.1:8500", Behavior::Reject)
                .with_peer("conn-2", "10.0.0.2:8500", Behavior::Reply(Bytes::from_static(b"two"))),
        );
        let router = router(transport.clone(), Arc::new(MockLeaderQuery::default()));
        router.update_leader_info(leader("node-1", "10.0.0.1:8500"));

        match router.request_raw(message()).await {
            Err(RouterError::Rejected(PeerCallError::Rejected(_))) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
        assert_eq!(transport.attempts(), vec!["conn-1"]);
    }

    #[tokio::test]
    async fn exhausted_scan_reports_no_available_peer() {
        let transport = Arc::new(
            MockTransport::default()
                .with_peer("conn-2", "10.0.0.2:8500", Behavior::Unavailable)
                .with_peer("conn-1", "10.0.0.1:8500", Behavior::Unavailable),
        );
        let router = router(transport.clone(), Arc::new(MockLeaderQuery::default()));

        match router.request_ignore(message()).await {
            Err(RouterError::NoAvailablePeer) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
        // No leader known, so the scan covers every connection in ID order.
        assert_eq!(transport.attempts(), vec!["conn-1", "conn-2"]);
    }

    #[tokio::test]
    async fn reply_is_decoded() {
        let mut encoded = Vec::new();
        prost::Message::encode(
            &ProtoLeaderInfo {
                node_id: "node-7".into(),
                address: "10.0.0.7:8500".into(),
            },
            &mut encoded,
        )
        .unwrap();
        let transport =
            Arc::new(MockTransport::default().with_peer("conn-1", "10.0.0.1:8500", Behavior::Reply(encoded.into())));
        let router = router(transport, Arc::new(MockLeaderQuery::default()));

        let reply: ProtoLeaderInfo = router.request(message()).await.unwrap();

        assert_eq!(reply.node_id, "node-7");
    }

    #[tokio::test]
    async fn request_leader_registers_watch_once() {
        // -- setup --
        let transport = Arc::new(MockTransport::default().with_peer(
            "conn-1",
            "10.0.0.1:8500",
            Behavior::Reply(Bytes::new()),
        ));
        let leader_query = Arc::new(MockLeaderQuery::leading("node-1", "10.0.0.1:8500"));
        let router = router(transport, leader_query.clone());

        // -- execute --
        let first = router.request_leader().await.unwrap();
        let second = router.request_leader().await.unwrap();

        // -- verify --
        assert_eq!(first.node_id, "node-1");
        assert_eq!(first.connection_id, Some(ConnectionId::new("conn-1")));
        assert_eq!(second, first);
        assert_eq!(leader_query.watch_registrations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_leader_still_follows_pushes() {
        let transport = Arc::new(MockTransport::default().with_peer(
            "conn-2",
            "10.0.0.2:8500",
            Behavior::Reply(Bytes::new()),
        ));
        let leader_query = Arc::new(MockLeaderQuery::default());
        let router = router(transport, leader_query.clone());
        let mut listener = router.leader_listener();

        match router.request_leader().await {
            Err(RouterError::NoLeader) => {}
            other => panic!("Unexpected result: {:?}", other),
        }

        leader_query.sink().send(leader("node-2", "10.0.0.2:8500")).await.unwrap();

        let leader = listener.next().await.unwrap();
        assert_eq!(leader.node_id, "node-2");
        assert_eq!(leader.connection_id, Some(ConnectionId::new("conn-2")));
    }

    #[tokio::test]
    async fn pushed_changes_invoke_callbacks_once_each() {
        // -- setup --
        let transport = Arc::new(MockTransport::default());
        let leader_query = Arc::new(MockLeaderQuery::leading("node-1", "10.0.0.1:8500"));
        let router = router(transport, leader_query.clone());
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        router.on_leader_change(move |leader| {
            let _ = seen_tx.send(leader.node_id.clone());
        });

        // -- execute --
        router.request_leader().await.unwrap();
        let sink = leader_query.sink();
        for node_id in &["node-1", "node-2", "node-2", "node-3"] {
            sink.send(leader(node_id, "10.0.0.9:8500")).await.unwrap();
        }

        // -- verify --
        for expected in &["node-1", "node-2", "node-3"] {
            let seen = tokio::time::timeout(Duration::from_secs(1), seen_rx.recv()).await.unwrap();
            assert_eq!(seen.as_deref(), Some(*expected));
        }
        assert!(tokio::time::timeout(Duration::from_millis(50), seen_rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn callback_may_reenter_router() {
        let transport = Arc::new(MockTransport::default());
        let router = Arc::new(router(transport, Arc::new(MockLeaderQuery::default())));
        let observed = Arc::new(Mutex::new(None));

        let weak_router: Weak<RequestRouter> = Arc::downgrade(&router);
        let observed_clone = observed.clone();
        router.on_leader_change(move |_leader| {
            if let Some(router) = weak_router.upgrade() {
                // Both take the tracker lock.
                router.on_leader_change(|_| {});
                *observed_clone.lock().unwrap() = router.current_leader().map(|l| l.node_id);
            }
        });

        router.update_leader_info(leader("node-4", "10.0.0.4:8500"));

        assert_eq!(observed.lock().unwrap().as_deref(), Some("node-4"));
    }

    #[test]
    fn zero_queue_capacity_rejected() {
        let result = RequestRouter::new(
            &logger(),
            RouterOptions {
                leader_queue_capacity: Some(0),
            },
            Arc::new(MockTransport::default()),
            Arc::new(MockLeaderQuery::default()),
        );

        assert!(matches!(result, Err(RouterError::InvalidOptions(_))));
    }
}
