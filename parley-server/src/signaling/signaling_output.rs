use async_trait::async_trait;
use parley_core::{PeerId, SignalMessage};

/// Delivery side of the relay: whatever owns the client connections implements this
/// so the router can push frames to a specific peer.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send_signal(&self, peer_id: PeerId, msg: SignalMessage);
}
