use async_trait::async_trait;
use parley_client::SignalSink;
use parley_core::{PeerId, SignalMessage, SignalingError};
use parley_server::{MessageRouter, RoomDirectory, SignalingOutput};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

type Outboxes = Arc<Mutex<HashMap<PeerId, mpsc::UnboundedSender<SignalMessage>>>>;
type DeliveryLog = Arc<Mutex<Vec<(PeerId, SignalMessage)>>>;

struct LoopbackOutput {
    outboxes: Outboxes,
    log: DeliveryLog,
}

#[async_trait]
impl SignalingOutput for LoopbackOutput {
    async fn send_signal(&self, peer_id: PeerId, msg: SignalMessage) {
        self.log.lock().unwrap().push((peer_id.clone(), msg.clone()));
        if let Some(tx) = self.outboxes.lock().unwrap().get(&peer_id) {
            let _ = tx.send(msg);
        }
    }
}

/// The relay's router wired to in-memory channels instead of sockets.
#[derive(Clone)]
pub struct LoopbackRelay {
    router: MessageRouter,
    outboxes: Outboxes,
    log: DeliveryLog,
}

impl LoopbackRelay {
    pub fn new() -> Self {
        let outboxes: Outboxes = Arc::new(Mutex::new(HashMap::new()));
        let log: DeliveryLog = Arc::new(Mutex::new(Vec::new()));
        let output = LoopbackOutput {
            outboxes: outboxes.clone(),
            log: log.clone(),
        };
        Self {
            router: MessageRouter::new(Arc::new(RoomDirectory::new()), Arc::new(output)),
            outboxes,
            log,
        }
    }

    /// Registers a connection and queues the greeting.
    pub fn connect(&self) -> (PeerId, Arc<LoopbackSink>, mpsc::UnboundedReceiver<SignalMessage>) {
        let peer_id = PeerId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(SignalMessage::Welcome {
            peer_id: peer_id.clone(),
        });
        let _ = tx.send(SignalMessage::IceConfig {
            ice_servers: Vec::new(),
        });
        self.outboxes.lock().unwrap().insert(peer_id.clone(), tx);

        let sink = Arc::new(LoopbackSink {
            router: self.router.clone(),
            peer_id: peer_id.clone(),
        });
        (peer_id, sink, rx)
    }

    /// Drops the connection as the socket layer would.
    pub async fn disconnect(&self, peer_id: &PeerId) {
        self.outboxes.lock().unwrap().remove(peer_id);
        self.router.disconnect(peer_id).await;
    }

    /// Every frame of `event` the relay delivered to `peer_id`.
    pub fn delivered_to(&self, peer_id: &PeerId, event: &str) -> Vec<SignalMessage> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, msg)| to == peer_id && msg.event_name() == event)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub fn directory(&self) -> &Arc<RoomDirectory> {
        self.router.directory()
    }
}

pub struct LoopbackSink {
    router: MessageRouter,
    peer_id: PeerId,
}

#[async_trait]
impl SignalSink for LoopbackSink {
    async fn send(&self, msg: SignalMessage) -> Result<(), SignalingError> {
        self.router.route(&self.peer_id, msg).await;
        Ok(())
    }
}

/// A relay connection driven by hand, standing in for a remote member.
pub struct ScriptedPeer {
    pub peer_id: PeerId,
    sink: Arc<LoopbackSink>,
    rx: mpsc::UnboundedReceiver<SignalMessage>,
}

impl ScriptedPeer {
    pub fn connect(relay: &LoopbackRelay) -> Self {
        let (peer_id, sink, rx) = relay.connect();
        Self { peer_id, sink, rx }
    }

    pub async fn send(&self, msg: SignalMessage) {
        let _ = self.sink.send(msg).await;
    }

    /// Next frame named `event`, skipping anything else.
    pub async fn expect(&mut self, event: &str) -> SignalMessage {
        let wait = async {
            loop {
                match self.rx.recv().await {
                    Some(msg) if msg.event_name() == event => return msg,
                    Some(_) => continue,
                    None => panic!("Relay dropped the scripted peer"),
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .unwrap_or_else(|_| panic!("Timeout waiting for '{}'", event))
    }
}

/// Sink that swallows everything, for exercising the coordinator without a relay.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<SignalMessage>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<SignalMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SignalSink for RecordingSink {
    async fn send(&self, msg: SignalMessage) -> Result<(), SignalingError> {
        self.sent.lock().unwrap().push(msg);
        Ok(())
    }
}
