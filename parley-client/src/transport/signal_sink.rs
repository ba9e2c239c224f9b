use async_trait::async_trait;
use parley_core::{SignalMessage, SignalingError};

/// Outbound half of the relay connection.
#[async_trait]
pub trait SignalSink: Send + Sync + 'static {
    async fn send(&self, msg: SignalMessage) -> Result<(), SignalingError>;
}
