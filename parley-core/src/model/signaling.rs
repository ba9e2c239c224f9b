use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use crate::model::session::IceCandidate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: &str) -> Self {
        Self {
            urls: vec![url.to_owned()],
            username: None,
            credential: None,
        }
    }
}

/// Every frame exchanged between a client and the relay.
///
/// Encoded as `{"event": "<kebab-name>", "data": {<camelCase fields>}}`.
/// Peer-to-peer messages carry `senderId`/`recipientId`; both are optional on the
/// wire so a two-member room can still be addressed by room id alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum SignalMessage {
    Welcome {
        peer_id: PeerId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    Join {
        room_id: RoomId,
    },
    RoomCreated {
        room_id: RoomId,
    },
    RoomJoined {
        room_id: RoomId,
        members: Vec<PeerId>,
    },
    PeerJoined {
        room_id: RoomId,
        peer_id: PeerId,
        new_peer_id: PeerId,
    },
    PeerLeft {
        room_id: RoomId,
        peer_id: PeerId,
    },
    Offer {
        room_id: RoomId,
        sdp: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_id: Option<PeerId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipient_id: Option<PeerId>,
    },
    Answer {
        room_id: RoomId,
        sdp: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_id: Option<PeerId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipient_id: Option<PeerId>,
    },
    IceCandidate {
        room_id: RoomId,
        candidate: String,
        #[serde(default, rename = "sdpMLineIndex")]
        sdp_m_line_index: Option<u16>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sdp_mid: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_id: Option<PeerId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipient_id: Option<PeerId>,
    },
    Ready {
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_id: Option<PeerId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipient_id: Option<PeerId>,
    },
    SignalingComplete {
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_id: Option<PeerId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipient_id: Option<PeerId>,
    },
    Error {
        message: String,
    },
}

/// Addressing of a peer-to-peer message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route<'a> {
    pub room_id: &'a RoomId,
    pub sender_id: Option<&'a PeerId>,
    pub recipient_id: Option<&'a PeerId>,
}

impl SignalMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            SignalMessage::Welcome { .. } => "welcome",
            SignalMessage::IceConfig { .. } => "ice-config",
            SignalMessage::Join { .. } => "join",
            SignalMessage::RoomCreated { .. } => "room-created",
            SignalMessage::RoomJoined { .. } => "room-joined",
            SignalMessage::PeerJoined { .. } => "peer-joined",
            SignalMessage::PeerLeft { .. } => "peer-left",
            SignalMessage::Offer { .. } => "offer",
            SignalMessage::Answer { .. } => "answer",
            SignalMessage::IceCandidate { .. } => "ice-candidate",
            SignalMessage::Ready { .. } => "ready",
            SignalMessage::SignalingComplete { .. } => "signaling-complete",
            SignalMessage::Error { .. } => "error",
        }
    }

    pub fn ice_candidate(room_id: RoomId, candidate: IceCandidate) -> Self {
        SignalMessage::IceCandidate {
            room_id,
            candidate: candidate.candidate,
            sdp_m_line_index: candidate.sdp_m_line_index,
            sdp_mid: candidate.sdp_mid,
            sender_id: None,
            recipient_id: None,
        }
    }

    /// Addressing for messages that travel between two peers; `None` for relay traffic.
    pub fn route(&self) -> Option<Route<'_>> {
        match self {
            SignalMessage::Offer {
                room_id,
                sender_id,
                recipient_id,
                ..
            }
            | SignalMessage::Answer {
                room_id,
                sender_id,
                recipient_id,
                ..
            }
            | SignalMessage::IceCandidate {
                room_id,
                sender_id,
                recipient_id,
                ..
            }
            | SignalMessage::Ready {
                room_id,
                sender_id,
                recipient_id,
            }
            | SignalMessage::SignalingComplete {
                room_id,
                sender_id,
                recipient_id,
            } => Some(Route {
                room_id,
                sender_id: sender_id.as_ref(),
                recipient_id: recipient_id.as_ref(),
            }),
            _ => None,
        }
    }

    /// Stamps sender and recipient on a peer-to-peer message. Relay traffic is returned untouched.
    pub fn addressed(mut self, sender: PeerId, recipient: PeerId) -> Self {
        match &mut self {
            SignalMessage::Offer {
                sender_id,
                recipient_id,
                ..
            }
            | SignalMessage::Answer {
                sender_id,
                recipient_id,
                ..
            }
            | SignalMessage::IceCandidate {
                sender_id,
                recipient_id,
                ..
            }
            | SignalMessage::Ready {
                sender_id,
                recipient_id,
                ..
            }
            | SignalMessage::SignalingComplete {
                sender_id,
                recipient_id,
                ..
            } => {
                *sender_id = Some(sender);
                *recipient_id = Some(recipient);
            }
            _ => {}
        }
        self
    }

    /// Extracts the candidate carried by an `ice-candidate` frame.
    pub fn candidate(&self) -> Option<IceCandidate> {
        match self {
            SignalMessage::IceCandidate {
                candidate,
                sdp_m_line_index,
                sdp_mid,
                ..
            } => Some(IceCandidate {
                candidate: candidate.clone(),
                sdp_mid: sdp_mid.clone(),
                sdp_m_line_index: *sdp_m_line_index,
            }),
            _ => None,
        }
    }
}
