use crate::grpc::control_plane_lock_client::ControlPlaneLockClient;
use crate::grpc::ProtoLockReq;
use crate::services::grpc::is_connection_failure;
use crate::services::{DistributedLock, LockError, LockProvider};
use tokio::time::Duration;
use tonic::transport::Channel;
use tonic::Status;

/// `LockProvider` backed by the `ControlPlaneLock` gRPC service. Every lock created by one
/// provider shares the same owner token.
pub struct GrpcLockProvider {
    channel: Channel,
    owner: String,
}

impl GrpcLockProvider {
    pub fn new(channel: Channel, owner_prefix: &str) -> Self {
        let owner = format!("{}-{}-{:016x}", owner_prefix, std::process::id(), rand::random::<u64>());

        GrpcLockProvider { channel, owner }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }
}

#[async_trait::async_trait]
impl LockProvider for GrpcLockProvider {
    async fn create_lock(&self, name: &str, ttl: Duration) -> Result<Box<dyn DistributedLock>, LockError> {
        Ok(Box::new(GrpcLock {
            channel: self.channel.clone(),
            name: name.to_string(),
            owner: self.owner.clone(),
            ttl_seconds: ttl.as_secs().max(1) as i64,
        }))
    }
}

struct GrpcLock {
    channel: Channel,
    name: String,
    owner: String,
    ttl_seconds: i64,
}

impl GrpcLock {
    fn request(&self) -> ProtoLockReq {
        ProtoLockReq {
            name: self.name.clone(),
            owner: self.owner.clone(),
            ttl_seconds: self.ttl_seconds,
        }
    }

    fn client(&self) -> ControlPlaneLockClient<Channel> {
        ControlPlaneLockClient::new(self.channel.clone())
    }
}

#[async_trait::async_trait]
impl DistributedLock for GrpcLock {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lock(&self) -> Result<(), LockError> {
        let rpc_reply = self.client().acquire(self.request()).await.map_err(convert_status)?;
        if rpc_reply.into_inner().granted {
            Ok(())
        } else {
            Err(LockError::Held(self.name.clone()))
        }
    }

    async fn unlock(&self) -> Result<(), LockError> {
        let rpc_reply = self.client().release(self.request()).await.map_err(convert_status)?;
        if rpc_reply.into_inner().granted {
            Ok(())
        } else {
            Err(LockError::NotOwner(self.name.clone()))
        }
    }

    async fn refresh(&self) -> Result<(), LockError> {
        let rpc_reply = self.client().refresh(self.request()).await.map_err(convert_status)?;
        if rpc_reply.into_inner().granted {
            Ok(())
        } else {
            Err(LockError::NotOwner(self.name.clone()))
        }
    }
}

fn convert_status(status: Status) -> LockError {
    if is_connection_failure(&status) {
        LockError::Unavailable(status.message().to_string())
    } else {
        LockError::Other(format!("{:?}: {}", status.code(), status.message()))
    }
}
