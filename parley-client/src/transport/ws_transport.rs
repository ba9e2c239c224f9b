use crate::transport::SignalSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parley_core::{SignalMessage, SignalingError};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// WebSocket connection to the relay.
pub struct WsTransport;

impl WsTransport {
    /// Returns the sink for outgoing signals and the stream of incoming ones.
    ///
    /// The receiver closes once the relay hangs up.
    pub async fn connect(url: &str) -> Result<(WsSink, mpsc::UnboundedReceiver<SignalMessage>)> {
        let (ws_stream, _) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to relay at {}", url))?;
        info!("Connected to relay at {}", url);

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<SignalMessage>();

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                if ws_sender.send(msg).await.is_err() {
                    break;
                }
            }
            let _ = ws_sender.close().await;
            debug!("Relay writer stopped");
        });

        tokio::spawn(async move {
            while let Some(frame) = ws_receiver.next().await {
                let text = match frame {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        error!("Relay connection error: {}", e);
                        break;
                    }
                };
                match serde_json::from_str::<SignalMessage>(text.as_str()) {
                    Ok(msg) => {
                        if in_tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Unparseable frame from relay: {}", e),
                }
            }
            info!("Relay connection closed");
        });

        Ok((WsSink { tx: out_tx }, in_rx))
    }
}

#[derive(Clone)]
pub struct WsSink {
    tx: mpsc::UnboundedSender<Message>,
}

#[async_trait]
impl SignalSink for WsSink {
    async fn send(&self, msg: SignalMessage) -> Result<(), SignalingError> {
        let json = serde_json::to_string(&msg)
            .map_err(|e| SignalingError::RoutingFailure(e.to_string()))?;
        self.tx
            .send(Message::Text(json.into()))
            .map_err(|_| SignalingError::TransportClosed)
    }
}
