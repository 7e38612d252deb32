use crate::connection::AuthenticatedChannel;
use crate::services::{
    connect_channel, AuthService, ConnectError, GrpcAuthService, GrpcRegistryService, RegistryService,
};
use std::sync::Arc;
use tonic::transport::Channel;

/// How a `ConnectionManager` opens transports and reaches the services it needs to keep them
/// authenticated and its endpoint list current.
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    type Channel: Clone + Send + Sync + 'static;

    async fn connect(&self, endpoint: &str, require_transport_security: bool) -> Result<Self::Channel, ConnectError>;

    /// Auth service reachable over `channel`. Used unauthenticated, since its job is to issue
    /// the token.
    fn auth_service(&self, channel: &Self::Channel) -> Arc<dyn AuthService>;

    fn registry_service(&self, channel: &AuthenticatedChannel<Self::Channel>) -> Arc<dyn RegistryService>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GrpcConnector;

#[async_trait::async_trait]
impl Connector for GrpcConnector {
    type Channel = Channel;

    async fn connect(&self, endpoint: &str, require_transport_security: bool) -> Result<Channel, ConnectError> {
        connect_channel(endpoint, require_transport_security).await
    }

    fn auth_service(&self, channel: &Channel) -> Arc<dyn AuthService> {
        Arc::new(GrpcAuthService::new(channel.clone()))
    }

    fn registry_service(&self, channel: &AuthenticatedChannel<Channel>) -> Arc<dyn RegistryService> {
        Arc::new(GrpcRegistryService::new(channel.clone()))
    }
}
