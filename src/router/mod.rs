mod leader;
mod options;
mod router;

pub use leader::LeaderChangeCallback;
pub use leader::LeaderInfo;
pub use leader::LeaderListener;
pub use options::RouterOptions;
pub use router::RequestRouter;
pub use router::RouterError;
pub use router::LEADER_CHANGED_MESSAGE_TYPE;
