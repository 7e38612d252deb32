use crate::services::{host_port, ConnectionId, LeaderAnnouncement, PeerConnection};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// The cluster leader as known to this router.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeaderInfo {
    pub node_id: String,
    /// `ip:port` the cluster advertised for the leader.
    pub address: String,
    /// Open connection to the leader, if the connection table has one to `address`.
    pub connection_id: Option<ConnectionId>,
    pub last_update: DateTime<Utc>,
}

pub type LeaderChangeCallback = Arc<dyn Fn(&LeaderInfo) + Send + Sync>;

/// Current leader plus everyone who wants to hear about it changing.
///
/// Callbacks are copied out under the lock and run after it is released, so a callback is free to
/// call back into the router.
pub(super) struct LeaderTracker {
    logger: slog::Logger,
    state: Mutex<TrackerState>,
    notifier: watch::Sender<Option<LeaderInfo>>,
    // Keeps the watch channel open while no listener exists.
    _listener: watch::Receiver<Option<LeaderInfo>>,
}

struct TrackerState {
    current: Option<LeaderInfo>,
    callbacks: Vec<LeaderChangeCallback>,
}

impl LeaderTracker {
    pub fn new(logger: &slog::Logger) -> Self {
        let (notifier, listener) = watch::channel(None);

        LeaderTracker {
            logger: logger.new(slog::o!("Component" => "LeaderTracker")),
            state: Mutex::new(TrackerState {
                current: None,
                callbacks: Vec::new(),
            }),
            notifier,
            _listener: listener,
        }
    }

    pub fn current(&self) -> Option<LeaderInfo> {
        self.state
            .lock()
            .expect("LeaderTracker.current() lock poison")
            .current
            .clone()
    }

    pub fn register(&self, callback: LeaderChangeCallback) {
        self.state
            .lock()
            .expect("LeaderTracker.register() lock poison")
            .callbacks
            .push(callback);
    }

    pub fn listener(&self) -> LeaderListener {
        LeaderListener {
            rcv: self.notifier.subscribe(),
        }
    }

    /// Record `announcement` as the leader. Returns false, and notifies nobody, when it names the
    /// leader we already know.
    pub fn update(&self, announcement: LeaderAnnouncement, connections: &[PeerConnection]) -> bool {
        let (leader, callbacks) = {
            let mut state = self.state.lock().expect("LeaderTracker.update() lock poison");
            if let Some(current) = &state.current {
                if current.node_id == announcement.node_id {
                    return false;
                }
            }

            let connection_id = find_connection(&announcement.address, connections);

            let leader = LeaderInfo {
                node_id: announcement.node_id,
                address: announcement.address,
                connection_id,
                last_update: Utc::now(),
            };
            state.current = Some(leader.clone());

            (leader, state.callbacks.clone())
        };

        slog::info!(
            self.logger,
            "Leader is now {} at {} (connection {:?})",
            leader.node_id,
            leader.address,
            leader.connection_id
        );
        let _ = self.notifier.send(Some(leader.clone()));
        for callback in callbacks {
            callback(&leader);
        }

        true
    }

    /// Connection to the current leader. A leader announced before its connection was opened is
    /// matched again here; that is not a leader change, so no callbacks run.
    pub fn leader_connection(&self, connections: &[PeerConnection]) -> Option<ConnectionId> {
        let mut state = self.state.lock().expect("LeaderTracker.leader_connection() lock poison");
        let leader = state.current.as_mut()?;

        if leader.connection_id.is_none() {
            leader.connection_id = find_connection(&leader.address, connections);
            if let Some(connection_id) = &leader.connection_id {
                slog::debug!(self.logger, "Leader {} reachable on {}", leader.node_id, connection_id);
            }
        }

        leader.connection_id.clone()
    }
}

fn find_connection(address: &str, connections: &[PeerConnection]) -> Option<ConnectionId> {
    let wanted = host_port(address);
    connections
        .iter()
        .find(|connection| host_port(&connection.address) == wanted)
        .map(|connection| connection.id.clone())
}

/// Await leader changes instead of registering a callback. Intermediate changes between two
/// calls to `next()` collapse into the most recent one.
#[derive(Clone)]
pub struct LeaderListener {
    rcv: watch::Receiver<Option<LeaderInfo>>,
}

impl LeaderListener {
    /// `None` once the router is gone.
    pub async fn next(&mut self) -> Option<LeaderInfo> {
        loop {
            if self.rcv.changed().await.is_err() {
                return None;
            }
            if let Some(leader) = self.rcv.borrow().clone() {
                return Some(leader);
            }
        }
    }
}
