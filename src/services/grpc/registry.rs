use crate::connection::AuthenticatedChannel;
use crate::grpc::control_plane_registry_client::ControlPlaneRegistryClient;
use crate::grpc::ProtoDiscoverReq;
use crate::services::grpc::is_connection_failure;
use crate::services::{RegistryError, RegistryService};
use tonic::transport::Channel;
use tonic::{Request, Status};

/// `RegistryService` backed by the cluster's `ControlPlaneRegistry` gRPC service. Calls carry the
/// bearer token of the channel's credential provider.
#[derive(Clone)]
pub struct GrpcRegistryService {
    channel: AuthenticatedChannel<Channel>,
}

impl GrpcRegistryService {
    pub fn new(channel: AuthenticatedChannel<Channel>) -> Self {
        GrpcRegistryService { channel }
    }
}

#[async_trait::async_trait]
impl RegistryService for GrpcRegistryService {
    async fn discover(&self, service_name: &str) -> Result<Vec<String>, RegistryError> {
        let mut rpc_request = Request::new(ProtoDiscoverReq {
            service_name: service_name.to_string(),
        });
        self.channel.authorize(&mut rpc_request).await?;

        let mut client = ControlPlaneRegistryClient::new(self.channel.channel().clone());
        let rpc_reply = client.discover(rpc_request).await?.into_inner();

        Ok(rpc_reply.addresses)
    }
}

// ------- Conversions --------

impl From<Status> for RegistryError {
    fn from(status: Status) -> Self {
        if is_connection_failure(&status) {
            RegistryError::Unavailable(status.message().to_string())
        } else {
            RegistryError::Other(format!("{:?}: {}", status.code(), status.message()))
        }
    }
}
