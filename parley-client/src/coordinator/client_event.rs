use crate::link::RemoteTrack;
use parley_core::{PeerId, Role, RoomId, SessionState, SignalingError};

/// Everything the application gets to see of the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Connected {
        peer_id: PeerId,
    },
    RoomCreated {
        room_id: RoomId,
    },
    RoomJoined {
        room_id: RoomId,
        members: Vec<PeerId>,
    },
    PeerJoined {
        peer_id: PeerId,
    },
    PeerLeft {
        peer_id: PeerId,
    },
    SessionStateChanged {
        remote: PeerId,
        role: Role,
        state: SessionState,
    },
    RemoteTrack {
        remote: PeerId,
        track: RemoteTrack,
    },
    SessionFailed {
        remote: PeerId,
        error: SignalingError,
    },
    /// The member cannot take part in any session.
    MediaUnavailable(SignalingError),
    /// The relay answered with an `error` frame.
    RelayError(String),
    Disconnected,
}
