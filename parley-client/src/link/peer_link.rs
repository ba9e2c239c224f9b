use crate::media::{MediaTrack, TrackKind};
use anyhow::Result;
use async_trait::async_trait;
use parley_core::{IceCandidate, IceServerConfig, SessionDescription};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub id: String,
    pub stream_id: String,
    pub kind: TrackKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Events a peer link raises on its own, delivered to the session that owns it.
#[derive(Debug, Clone)]
pub enum LinkEvent {
    LocalCandidate(IceCandidate),
    RemoteTrack(RemoteTrack),
    StateChanged(LinkState),
}

/// A single media connection toward one remote member.
#[async_trait]
pub trait PeerLink: Send + Sync {
    async fn add_track(&self, track: &MediaTrack) -> Result<()>;

    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, description: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    /// Fails when no remote description is installed yet.
    async fn add_remote_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait PeerLinkFactory: Send + Sync + 'static {
    async fn create(
        &self,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Box<dyn PeerLink>>;
}
