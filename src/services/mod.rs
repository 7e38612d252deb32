//! Seams to the collaborating cluster services. Each collaborator is an async trait so the
//! runtime can be exercised against in-memory fakes; `grpc` holds the tonic-backed adapters.
mod auth;
mod grpc;
mod leader;
mod lock;
mod peer;
mod registry;

pub use auth::AccessToken;
pub use auth::AuthError;
pub use auth::AuthService;
pub use grpc::connect_channel;
pub use grpc::ConnectError;
pub use grpc::GrpcAuthService;
pub use grpc::GrpcLeaderQuery;
pub use grpc::GrpcLockProvider;
pub use grpc::GrpcPeerTransport;
pub use grpc::GrpcRegistryService;
pub use leader::LeaderAnnouncement;
pub use leader::LeaderQuery;
pub use leader::LeaderQueryError;
pub use lock::DistributedLock;
pub use lock::LockError;
pub use lock::LockProvider;
pub use peer::ConnectionId;
pub use peer::PeerCallError;
pub use peer::PeerConnection;
pub use peer::PeerMessage;
pub use peer::PeerTransport;
pub use registry::RegistryError;
pub use registry::RegistryService;

pub(crate) use grpc::host_port;
