use crate::room::RoomDirectory;
use crate::signaling::SignalingOutput;
use parley_core::{PeerId, RoomId, SignalMessage, SignalingError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Relay-side dispatch: join handling plus store-nothing forwarding between members.
///
/// SDP and candidate payloads are never inspected. The only state consulted is the
/// room directory.
#[derive(Clone)]
pub struct MessageRouter {
    directory: Arc<RoomDirectory>,
    output: Arc<dyn SignalingOutput>,
}

impl MessageRouter {
    pub fn new(directory: Arc<RoomDirectory>, output: Arc<dyn SignalingOutput>) -> Self {
        Self { directory, output }
    }

    pub fn directory(&self) -> &Arc<RoomDirectory> {
        &self.directory
    }

    /// Handles one inbound frame from `from`. Routing failures are logged and dropped.
    pub async fn route(&self, from: &PeerId, msg: SignalMessage) {
        match msg {
            SignalMessage::Join { room_id } => self.handle_join(from, room_id).await,
            msg if msg.route().is_some() => {
                let event = msg.event_name();
                if let Err(e) = self.forward(from, msg).await {
                    warn!("Dropping '{}' from {}: {}", event, from, e);
                }
            }
            other => warn!(
                "Dropping '{}' from {}: not a client-to-relay event",
                other.event_name(),
                from
            ),
        }
    }

    /// Removes the peer from its room and tells everyone still there.
    pub async fn disconnect(&self, peer_id: &PeerId) {
        let Some((room_id, remaining)) = self.directory.leave(peer_id) else {
            return;
        };
        info!(
            "Peer {} left room '{}', notifying {} member(s)",
            peer_id,
            room_id,
            remaining.len()
        );

        for member in remaining {
            let msg = SignalMessage::PeerLeft {
                room_id: room_id.clone(),
                peer_id: peer_id.clone(),
            };
            self.output.send_signal(member, msg).await;
        }
    }

    async fn handle_join(&self, from: &PeerId, room_id: RoomId) {
        if room_id.is_blank() {
            warn!("Peer {} tried to join with an empty room id", from);
            self.reject(from, SignalingError::EmptyRoomIdentifier).await;
            return;
        }

        if let Some(current) = self.directory.room_of(from) {
            warn!(
                "Peer {} is already in room '{}', ignoring join to '{}'",
                from, current, room_id
            );
            self.reject(from, SignalingError::AlreadyJoined(current)).await;
            return;
        }

        let outcome = self.directory.join(&room_id, from);

        if outcome.created {
            info!("Peer {} created room '{}'", from, room_id);
            self.output
                .send_signal(from.clone(), SignalMessage::RoomCreated { room_id })
                .await;
            return;
        }

        info!(
            "Peer {} joined room '{}' with {} member(s)",
            from,
            room_id,
            outcome.existing.len()
        );
        self.output
            .send_signal(
                from.clone(),
                SignalMessage::RoomJoined {
                    room_id: room_id.clone(),
                    members: outcome.existing.clone(),
                },
            )
            .await;

        for member in outcome.existing {
            let msg = SignalMessage::PeerJoined {
                room_id: room_id.clone(),
                peer_id: member.clone(),
                new_peer_id: from.clone(),
            };
            self.output.send_signal(member, msg).await;
        }
    }

    async fn forward(&self, from: &PeerId, msg: SignalMessage) -> Result<(), SignalingError> {
        let (room_id, claimed_sender, recipient) = match msg.route() {
            Some(route) => (
                route.room_id.clone(),
                route.sender_id.cloned(),
                route.recipient_id.cloned(),
            ),
            None => return Err(SignalingError::RoutingFailure("unaddressable event".into())),
        };

        if !self.directory.contains(&room_id, from) {
            return Err(SignalingError::RoutingFailure(format!(
                "sender is not a member of room '{}'",
                room_id
            )));
        }

        if let Some(claimed) = &claimed_sender {
            if claimed != from {
                warn!(
                    "Peer {} claimed to be {}, using connection identity",
                    from, claimed
                );
            }
        }

        let recipient = match recipient {
            Some(recipient) if self.directory.contains(&room_id, &recipient) => recipient,
            Some(recipient) => {
                return Err(SignalingError::RoutingFailure(format!(
                    "{} is not a member of room '{}'",
                    recipient, room_id
                )));
            }
            None => self.sole_counterpart(&room_id, from)?,
        };

        let msg = msg.addressed(from.clone(), recipient.clone());
        debug!(
            "Forwarding '{}' in room '{}': {} -> {}",
            msg.event_name(),
            room_id,
            from,
            recipient
        );
        self.output.send_signal(recipient, msg).await;
        Ok(())
    }

    /// Two-member rooms may omit the recipient; the room id alone picks the peer.
    fn sole_counterpart(&self, room_id: &RoomId, from: &PeerId) -> Result<PeerId, SignalingError> {
        let mut others: Vec<PeerId> = self
            .directory
            .members(room_id)
            .into_iter()
            .filter(|p| p != from)
            .collect();

        match others.len() {
            1 => Ok(others.remove(0)),
            n => Err(SignalingError::RoutingFailure(format!(
                "no recipient given and room '{}' has {} other member(s)",
                room_id, n
            ))),
        }
    }

    async fn reject(&self, peer_id: &PeerId, err: SignalingError) {
        let msg = SignalMessage::Error {
            message: err.to_string(),
        };
        self.output.send_signal(peer_id.clone(), msg).await;
    }
}
