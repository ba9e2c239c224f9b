use crate::error::SignalingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-supplied room identifier. Opaque to the relay.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct RoomId(String);

impl RoomId {
    /// Validates a user-typed identifier. Blank input never leaves the client.
    pub fn parse(raw: impl Into<String>) -> Result<Self, SignalingError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SignalingError::EmptyRoomIdentifier);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
