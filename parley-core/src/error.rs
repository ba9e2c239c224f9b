use crate::model::RoomId;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignalingError {
    /// Camera or microphone denied or absent. Ends the member's participation.
    #[error("local media unavailable: {0}")]
    MediaUnavailable(String),

    /// Offer/answer creation or installation failed. Ends one session.
    #[error("session description failed: {0}")]
    DescriptionGenerationFailed(String),

    /// Relay could not deliver a message to its room or recipient.
    #[error("routing failure: {0}")]
    RoutingFailure(String),

    #[error("please type a room id")]
    EmptyRoomIdentifier,

    #[error("already a member of room '{0}'")]
    AlreadyJoined(RoomId),

    #[error("handshake did not complete within {0:?}")]
    HandshakeTimeout(Duration),

    #[error("signaling transport closed")]
    TransportClosed,
}
