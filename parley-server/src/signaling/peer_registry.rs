use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use parley_core::{PeerId, SignalMessage};
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Live WebSocket connections, keyed by the identity assigned at upgrade time.
#[derive(Default)]
pub struct PeerRegistry {
    peers: DashMap<PeerId, mpsc::UnboundedSender<Message>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.peers.remove(peer_id);
    }

    pub fn is_connected(&self, peer_id: &PeerId) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[async_trait]
impl SignalingOutput for PeerRegistry {
    async fn send_signal(&self, peer_id: PeerId, msg: SignalMessage) {
        let Some(peer) = self.peers.get(&peer_id) else {
            warn!(
                "Attempted to send '{}' to disconnected peer {}",
                msg.event_name(),
                peer_id
            );
            return;
        };

        match serde_json::to_string(&msg) {
            Ok(json) => {
                if let Err(e) = peer.send(Message::Text(json.into())) {
                    error!("Failed to send WS message to {}: {:?}", peer_id, e);
                }
            }
            Err(e) => error!("Failed to serialize signal message: {}", e),
        }
    }
}
