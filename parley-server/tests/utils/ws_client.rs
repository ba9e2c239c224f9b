use anyhow::{Context, Result, bail};
use futures::{SinkExt, StreamExt};
use parley_core::{PeerId, SignalMessage};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Timeout for a single frame to arrive (ms).
pub const FRAME_TIMEOUT_MS: u64 = 5000;

/// Raw WebSocket client speaking the relay protocol.
pub struct WsTestClient {
    pub peer_id: PeerId,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTestClient {
    /// Connects and consumes the `welcome` and `ice-config` greeting.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (stream, _) = connect_async(format!("ws://{}/ws", addr))
            .await
            .context("Failed to connect to relay")?;

        let mut client = Self {
            peer_id: PeerId::new(),
            stream,
        };

        match client.recv().await? {
            SignalMessage::Welcome { peer_id } => client.peer_id = peer_id,
            other => bail!("Expected welcome, got '{}'", other.event_name()),
        }
        match client.recv().await? {
            SignalMessage::IceConfig { .. } => {}
            other => bail!("Expected ice-config, got '{}'", other.event_name()),
        }

        Ok(client)
    }

    pub async fn send(&mut self, msg: &SignalMessage) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        self.stream.send(Message::Text(json.into())).await?;
        Ok(())
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.to_owned().into())).await?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Result<SignalMessage> {
        let timeout = Duration::from_millis(FRAME_TIMEOUT_MS);
        loop {
            let frame = tokio::time::timeout(timeout, self.stream.next())
                .await
                .context("Timeout waiting for frame")?
                .context("Relay closed the connection")??;

            if let Message::Text(text) = frame {
                return serde_json::from_str(&text).context("Invalid frame from relay");
            }
        }
    }

    /// True when nothing arrives within `ms`.
    pub async fn is_silent_for(&mut self, ms: u64) -> bool {
        tokio::time::timeout(Duration::from_millis(ms), self.stream.next())
            .await
            .is_err()
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}
