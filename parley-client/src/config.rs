use crate::coordinator::RolePolicy;
use crate::media::MediaConstraints;
use parley_core::IceServerConfig;
use parley_core::utils::default_ice_servers;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "ws://localhost:4000/ws";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub policy: RolePolicy,
    /// Used until the relay announces its own list in `ice-config`.
    pub ice_servers: Vec<IceServerConfig>,
    pub media: MediaConstraints,
    /// Sessions stuck in `offering` or `awaiting-offer` longer than this fail.
    /// `None` waits forever.
    pub handshake_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            policy: RolePolicy::default(),
            ice_servers: default_ice_servers(),
            media: MediaConstraints::default(),
            handshake_timeout: None,
        }
    }
}
