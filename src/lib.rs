mod connection;
mod credentials;
mod logging;
mod router;
mod scheduler;
mod services;
mod grpc {
    include!("../generated/clusterlink.rs");
}

pub use connection::AuthenticatedChannel;
pub use connection::ConnectionError;
pub use connection::ConnectionManager;
pub use connection::ConnectionOptions;
pub use connection::Connector;
pub use connection::GrpcConnector;
pub use connection::ProbeError;
pub use credentials::ClientIdentity;
pub use credentials::CredentialConfig;
pub use credentials::CredentialError;
pub use credentials::CredentialProvider;
pub use credentials::AUTHORIZATION_METADATA_KEY;
pub use credentials::DEFAULT_REFRESH_MARGIN;
pub use logging::create_root_logger_for_file;
pub use logging::create_root_logger_for_stdout;
pub use router::LeaderChangeCallback;
pub use router::LeaderInfo;
pub use router::LeaderListener;
pub use router::RequestRouter;
pub use router::RouterError;
pub use router::RouterOptions;
pub use router::LEADER_CHANGED_MESSAGE_TYPE;
pub use scheduler::Clock;
pub use scheduler::RealClock;
pub use scheduler::SchedulerError;
pub use scheduler::SchedulerOptions;
pub use scheduler::TaskContext;
pub use scheduler::TaskError;
pub use scheduler::TaskId;
pub use scheduler::TaskInfo;
pub use scheduler::TaskKind;
pub use scheduler::TaskScheduler;
pub use scheduler::TaskStatus;
pub use services::connect_channel;
pub use services::AccessToken;
pub use services::AuthError;
pub use services::AuthService;
pub use services::ConnectError;
pub use services::ConnectionId;
pub use services::DistributedLock;
pub use services::GrpcAuthService;
pub use services::GrpcLeaderQuery;
pub use services::GrpcLockProvider;
pub use services::GrpcPeerTransport;
pub use services::GrpcRegistryService;
pub use services::LeaderAnnouncement;
pub use services::LeaderQuery;
pub use services::LeaderQueryError;
pub use services::LockError;
pub use services::LockProvider;
pub use services::PeerCallError;
pub use services::PeerConnection;
pub use services::PeerMessage;
pub use services::PeerTransport;
pub use services::RegistryError;
pub use services::RegistryService;
