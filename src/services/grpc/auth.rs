use crate::grpc::control_plane_auth_client::ControlPlaneAuthClient;
use crate::grpc::ProtoAuthenticateReq;
use crate::services::grpc::is_connection_failure;
use crate::services::{AccessToken, AuthError, AuthService};
use tokio::time::Duration;
use tonic::transport::Channel;
use tonic::{Code, Status};

/// `AuthService` backed by the cluster's `ControlPlaneAuth` gRPC service.
#[derive(Clone)]
pub struct GrpcAuthService {
    channel: Channel,
}

impl GrpcAuthService {
    pub fn new(channel: Channel) -> Self {
        GrpcAuthService { channel }
    }
}

#[async_trait::async_trait]
impl AuthService for GrpcAuthService {
    async fn authenticate(&self, client_id: &str, client_secret: &str) -> Result<AccessToken, AuthError> {
        let mut client = ControlPlaneAuthClient::new(self.channel.clone());
        let rpc_request = ProtoAuthenticateReq {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        };

        let rpc_reply = client.authenticate(rpc_request).await?.into_inner();
        if rpc_reply.access_token.is_empty() {
            return Err(AuthError::Other("Server returned an empty access token".into()));
        }

        Ok(AccessToken {
            token: rpc_reply.access_token,
            expires_in: Duration::from_secs(rpc_reply.expires_in_seconds.max(0) as u64),
        })
    }
}

// ------- Conversions --------

impl From<Status> for AuthError {
    fn from(status: Status) -> Self {
        match status.code() {
            Code::Unauthenticated | Code::PermissionDenied => AuthError::InvalidCredentials,
            _ if is_connection_failure(&status) => AuthError::Unavailable(status.message().to_string()),
            _ => AuthError::Other(format!("{:?}: {}", status.code(), status.message())),
        }
    }
}
