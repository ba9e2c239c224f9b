use crate::config::ServerConfig;
use crate::room::RoomDirectory;
use crate::signaling::{MessageRouter, PeerRegistry, SignalingOutput};
use axum::extract::ws::Message;
use parley_core::{IceServerConfig, PeerId, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Shared relay state handed to every WebSocket connection.
#[derive(Clone)]
pub struct SignalingService {
    registry: Arc<PeerRegistry>,
    router: MessageRouter,
    ice_servers: Arc<Vec<IceServerConfig>>,
}

impl SignalingService {
    pub fn new(config: &ServerConfig) -> Self {
        let registry = Arc::new(PeerRegistry::new());
        let directory = Arc::new(RoomDirectory::new());
        let router = MessageRouter::new(directory, registry.clone());

        Self {
            registry,
            router,
            ice_servers: Arc::new(config.ice_servers.clone()),
        }
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.ice_servers.as_ref().clone()
    }

    pub fn directory(&self) -> &Arc<RoomDirectory> {
        self.router.directory()
    }

    pub fn registry(&self) -> &Arc<PeerRegistry> {
        &self.registry
    }

    /// Registers a fresh connection and greets it with its identity and ICE list.
    pub async fn connect(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.registry.add_peer(peer_id.clone(), tx);

        self.registry
            .send_signal(
                peer_id.clone(),
                SignalMessage::Welcome {
                    peer_id: peer_id.clone(),
                },
            )
            .await;
        self.registry
            .send_signal(
                peer_id,
                SignalMessage::IceConfig {
                    ice_servers: self.get_ice_servers(),
                },
            )
            .await;
    }

    pub async fn handle_text(&self, peer_id: &PeerId, text: &str) {
        match serde_json::from_str::<SignalMessage>(text) {
            Ok(signal) => {
                debug!("'{}' from {}", signal.event_name(), peer_id);
                self.router.route(peer_id, signal).await;
            }
            Err(e) => warn!("Invalid SignalMessage from {}: {:?}", peer_id, e),
        }
    }

    pub async fn disconnect(&self, peer_id: &PeerId) {
        self.registry.remove_peer(peer_id);
        self.router.disconnect(peer_id).await;
    }
}
