mod config;
mod coordinator;
mod link;
mod media;
mod transport;

pub use config::*;
pub use coordinator::*;
pub use link::*;
pub use media::*;
pub use transport::*;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Connects to the relay over WebSocket and starts a coordinator on the current runtime.
pub async fn connect(
    config: ClientConfig,
    media: Arc<dyn MediaSource>,
    links: Arc<dyn PeerLinkFactory>,
) -> Result<(CoordinatorHandle, mpsc::UnboundedReceiver<ClientEvent>)> {
    let (sink, signals) = WsTransport::connect(&config.server_url).await?;
    let (coordinator, handle, events) =
        Coordinator::new(config, media, links, Arc::new(sink), signals);
    tokio::spawn(coordinator.run());
    Ok((handle, events))
}
