use crate::link::RemoteTrack;
use parley_core::{PeerId, Role, RoomId, SessionDescription, SessionState, SignalingError};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

pub(crate) enum CoordinatorCommand {
    Join {
        room_id: RoomId,
        reply: oneshot::Sender<Result<(), SignalingError>>,
    },
    Sessions {
        reply: oneshot::Sender<Vec<SessionSnapshot>>,
    },
    Shutdown,
}

/// Point-in-time view of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub remote: PeerId,
    pub role: Role,
    pub state: SessionState,
    pub local_description: Option<SessionDescription>,
    pub remote_description: Option<SessionDescription>,
    pub remote_tracks: Vec<RemoteTrack>,
}

/// Cloneable front door to a running [`Coordinator`](crate::Coordinator).
#[derive(Clone)]
pub struct CoordinatorHandle {
    pub(crate) command_tx: mpsc::Sender<CoordinatorCommand>,
}

impl CoordinatorHandle {
    /// Asks the relay to put this member in `room`.
    ///
    /// A blank identifier is rejected here, before anything is sent.
    pub async fn join(&self, room: &str) -> Result<(), SignalingError> {
        let room_id = match RoomId::parse(room) {
            Ok(id) => id,
            Err(e) => {
                warn!("Join refused: {}", e);
                return Err(e);
            }
        };

        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(CoordinatorCommand::Join { room_id, reply })
            .await
            .map_err(|_| SignalingError::TransportClosed)?;
        rx.await.map_err(|_| SignalingError::TransportClosed)?
    }

    /// Empty once the coordinator has stopped.
    pub async fn sessions(&self) -> Vec<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        if self
            .command_tx
            .send(CoordinatorCommand::Sessions { reply })
            .await
            .is_err()
        {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    pub async fn session(&self, remote: &PeerId) -> Option<SessionSnapshot> {
        self.sessions()
            .await
            .into_iter()
            .find(|s| &s.remote == remote)
    }

    /// Closes every session and stops the coordinator.
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(CoordinatorCommand::Shutdown).await;
    }

    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }
}
