mod peer;
mod room;
mod session;
mod signaling;

pub use peer::PeerId;
pub use room::RoomId;
pub use session::{IceCandidate, Role, SdpKind, SessionDescription, SessionState};
pub use signaling::{IceServerConfig, Route, SignalMessage};
