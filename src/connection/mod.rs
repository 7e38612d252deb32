mod channel;
mod connector;
mod discovery;
mod error;
mod manager;
mod options;

pub use channel::AuthenticatedChannel;
pub use connector::Connector;
pub use connector::GrpcConnector;
pub use error::ConnectionError;
pub use error::ProbeError;
pub use manager::ConnectionManager;
pub use options::ConnectionOptions;
