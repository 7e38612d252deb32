//! tonic adapters for the service seams. Wire types come from `protos/clusterlink.proto`.
mod auth;
mod cluster;
mod connect;
mod lock;
mod peer;
mod registry;

pub use auth::GrpcAuthService;
pub use cluster::GrpcLeaderQuery;
pub use connect::connect_channel;
pub use connect::host_port;
pub use connect::ConnectError;
pub use lock::GrpcLockProvider;
pub use peer::GrpcPeerTransport;
pub use registry::GrpcRegistryService;

use tonic::{Code, Status};

/// True when `status` describes a failure to reach the server rather than a reply from it.
fn is_connection_failure(status: &Status) -> bool {
    match status.code() {
        Code::Unavailable | Code::DeadlineExceeded => true,
        // Channel-level failures surface as `Unknown` with the transport error as the message.
        Code::Unknown => status.message().contains("transport error"),
        _ => false,
    }
}
