use crate::config::ClientConfig;
use crate::coordinator::client_event::ClientEvent;
use crate::coordinator::coordinator_command::{
    CoordinatorCommand, CoordinatorHandle, SessionSnapshot,
};
use crate::coordinator::role_policy::RolePolicy;
use crate::coordinator::session::{
    ReportKind, Session, SessionCommand, SessionContext, SessionReport,
};
use crate::link::PeerLinkFactory;
use crate::media::{LocalMedia, MediaSource};
use crate::transport::SignalSink;
use parley_core::{
    IceServerConfig, PeerId, Role, RoomId, SessionDescription, SessionState, SignalMessage,
    SignalingError,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

struct Membership {
    room_id: RoomId,
    is_creator: bool,
}

/// Frames queued for a session that is still busy with its link.
const SESSION_QUEUE: usize = 64;

struct SessionEntry {
    command_tx: mpsc::Sender<SessionCommand>,
    snapshot: SessionSnapshot,
}

impl SessionEntry {
    /// A full queue still ends the session: dropping the sender closes it once drained.
    fn close(self) {
        let _ = self.command_tx.try_send(SessionCommand::Close);
    }
}

/// Client-side actor: owns the relay connection, the local stream and one session per
/// remote member.
pub struct Coordinator {
    policy: RolePolicy,
    handshake_timeout: Option<Duration>,
    ice_servers: Vec<IceServerConfig>,
    media: Arc<LocalMedia>,
    links: Arc<dyn PeerLinkFactory>,
    sink: Arc<dyn SignalSink>,

    /// Assigned by the relay in `welcome`.
    local_id: Option<PeerId>,
    /// Join requested before `welcome` arrived.
    pending_join: Option<(RoomId, oneshot::Sender<Result<(), SignalingError>>)>,
    membership: Option<Membership>,
    requested_room: Option<RoomId>,
    media_failed: bool,

    sessions: HashMap<PeerId, SessionEntry>,

    command_rx: mpsc::Receiver<CoordinatorCommand>,
    signal_rx: mpsc::UnboundedReceiver<SignalMessage>,
    report_rx: mpsc::UnboundedReceiver<SessionReport>,
    report_tx: mpsc::UnboundedSender<SessionReport>,
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl Coordinator {
    /// `signals` is the inbound half of the relay connection whose outbound half is `sink`.
    pub fn new(
        config: ClientConfig,
        media: Arc<dyn MediaSource>,
        links: Arc<dyn PeerLinkFactory>,
        sink: Arc<dyn SignalSink>,
        signals: mpsc::UnboundedReceiver<SignalMessage>,
    ) -> (Self, CoordinatorHandle, mpsc::UnboundedReceiver<ClientEvent>) {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let coordinator = Self {
            policy: config.policy,
            handshake_timeout: config.handshake_timeout,
            ice_servers: config.ice_servers,
            media: Arc::new(LocalMedia::new(media, config.media)),
            links,
            sink,
            local_id: None,
            pending_join: None,
            membership: None,
            requested_room: None,
            media_failed: false,
            sessions: HashMap::new(),
            command_rx,
            signal_rx: signals,
            report_rx,
            report_tx,
            events: events_tx,
        };

        (coordinator, CoordinatorHandle { command_tx }, events_rx)
    }

    /// Event loop. Should be run through `tokio::spawn`.
    pub async fn run(mut self) {
        info!("Coordinator event loop started ({} policy)", self.policy);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(CoordinatorCommand::Shutdown) | None => {
                            info!("Shutting down coordinator");
                            break;
                        }
                        Some(c) => self.handle_command(c).await,
                    }
                }

                msg = self.signal_rx.recv() => {
                    match msg {
                        Some(m) => self.handle_signal(m).await,
                        None => {
                            warn!("Relay connection lost");
                            break;
                        }
                    }
                }

                Some(report) = self.report_rx.recv() => self.handle_report(report),
            }
        }

        self.close_all_sessions();
        self.emit(ClientEvent::Disconnected);
        info!("Coordinator event loop finished");
    }

    async fn handle_command(&mut self, cmd: CoordinatorCommand) {
        match cmd {
            CoordinatorCommand::Join { room_id, reply } => {
                if let Some(current) = self.requested_room.clone() {
                    let _ = reply.send(Err(SignalingError::AlreadyJoined(current)));
                    return;
                }
                self.requested_room = Some(room_id.clone());

                if self.local_id.is_none() {
                    debug!("Join for '{}' waits for the relay greeting", room_id);
                    self.pending_join = Some((room_id, reply));
                    return;
                }
                self.send_join(room_id, reply).await;
            }

            CoordinatorCommand::Sessions { reply } => {
                let snapshots = self
                    .sessions
                    .values()
                    .map(|entry| entry.snapshot.clone())
                    .collect();
                let _ = reply.send(snapshots);
            }

            CoordinatorCommand::Shutdown => {}
        }
    }

    async fn send_join(
        &mut self,
        room_id: RoomId,
        reply: oneshot::Sender<Result<(), SignalingError>>,
    ) {
        info!("Joining room '{}'", room_id);
        let result = self.sink.send(SignalMessage::Join { room_id }).await;
        if result.is_err() {
            self.requested_room = None;
        }
        let _ = reply.send(result);
    }

    async fn handle_signal(&mut self, msg: SignalMessage) {
        if let Some(route) = msg.route() {
            let Some(membership) = &self.membership else {
                warn!("Dropping '{}' received outside of any room", msg.event_name());
                return;
            };
            if route.room_id != &membership.room_id {
                warn!(
                    "Dropping '{}' for foreign room '{}'",
                    msg.event_name(),
                    route.room_id
                );
                return;
            }
        }

        match msg {
            SignalMessage::Welcome { peer_id } => {
                info!("Relay assigned id {}", peer_id);
                self.local_id = Some(peer_id.clone());
                self.emit(ClientEvent::Connected { peer_id });
                if let Some((room_id, reply)) = self.pending_join.take() {
                    self.send_join(room_id, reply).await;
                }
            }

            SignalMessage::IceConfig { ice_servers } => {
                debug!("Relay recommends {} ICE server(s)", ice_servers.len());
                if !ice_servers.is_empty() {
                    self.ice_servers = ice_servers;
                }
            }

            SignalMessage::RoomCreated { room_id } => {
                info!("Created room '{}'", room_id);
                self.membership = Some(Membership {
                    room_id: room_id.clone(),
                    is_creator: true,
                });
                self.emit(ClientEvent::RoomCreated { room_id });
                self.prepare_media().await;
            }

            SignalMessage::RoomJoined { room_id, members } => {
                info!("Joined room '{}' with {} member(s)", room_id, members.len());
                self.membership = Some(Membership {
                    room_id: room_id.clone(),
                    is_creator: false,
                });
                self.emit(ClientEvent::RoomJoined {
                    room_id: room_id.clone(),
                    members: members.clone(),
                });
                if !self.prepare_media().await {
                    return;
                }

                let plan = self.policy.on_room_joined(&members);
                for remote in plan.answer_to {
                    self.open_session(remote, Role::Answerer);
                }
                if let Some(creator) = plan.announce_ready_to {
                    self.send_to(
                        creator,
                        SignalMessage::Ready {
                            room_id,
                            sender_id: None,
                            recipient_id: None,
                        },
                    )
                    .await;
                }
            }

            SignalMessage::PeerJoined { new_peer_id, .. } => {
                info!("Peer {} joined the room", new_peer_id);
                self.emit(ClientEvent::PeerJoined {
                    peer_id: new_peer_id.clone(),
                });
                if let Some(role) = self.policy.on_peer_joined() {
                    self.open_session(new_peer_id, role);
                }
            }

            SignalMessage::Ready { sender_id, .. } => {
                let Some(remote) = sender_id else {
                    warn!("Dropping 'ready' without sender");
                    return;
                };
                let is_creator = self.membership.as_ref().is_some_and(|m| m.is_creator);
                let live = self
                    .sessions
                    .values()
                    .filter(|e| !e.snapshot.state.is_terminal())
                    .count();
                match self.policy.on_ready(is_creator, live) {
                    Some(role) => self.open_session(remote, role),
                    None => debug!("Ignoring 'ready' from {}", remote),
                }
            }

            SignalMessage::Offer { sdp, sender_id, .. } => {
                let Some(remote) = sender_id else {
                    warn!("Dropping 'offer' without sender");
                    return;
                };
                let live = self
                    .sessions
                    .get(&remote)
                    .is_some_and(|e| !e.snapshot.state.is_terminal());
                if !live {
                    let role = self.policy.on_unsolicited_offer();
                    self.open_session(remote.clone(), role);
                }
                self.forward(
                    &remote,
                    SessionCommand::RemoteOffer(SessionDescription::offer(sdp)),
                );
            }

            SignalMessage::Answer { sdp, sender_id, .. } => {
                let Some(remote) = sender_id else {
                    warn!("Dropping 'answer' without sender");
                    return;
                };
                self.forward(
                    &remote,
                    SessionCommand::RemoteAnswer(SessionDescription::answer(sdp)),
                );
            }

            msg @ SignalMessage::IceCandidate { .. } => {
                let (Some(candidate), Some(remote)) = (
                    msg.candidate(),
                    msg.route().and_then(|r| r.sender_id.cloned()),
                ) else {
                    warn!("Dropping 'ice-candidate' without sender");
                    return;
                };
                self.forward(&remote, SessionCommand::RemoteCandidate(candidate));
            }

            SignalMessage::SignalingComplete { sender_id, .. } => {
                let Some(remote) = sender_id else {
                    return;
                };
                self.forward(&remote, SessionCommand::RemoteComplete);
            }

            SignalMessage::PeerLeft { peer_id, .. } => {
                info!("Peer {} left the room", peer_id);
                if let Some(entry) = self.sessions.remove(&peer_id) {
                    entry.close();
                }
                self.emit(ClientEvent::PeerLeft { peer_id });
            }

            SignalMessage::Error { message } => {
                warn!("Relay error: {}", message);
                if self.membership.is_none() {
                    self.requested_room = None;
                }
                self.emit(ClientEvent::RelayError(message));
            }

            SignalMessage::Join { .. } => {
                warn!("Unexpected 'join' from relay");
            }
        }
    }

    /// Acquires the local stream once a room is entered. `false` means the member is out.
    async fn prepare_media(&mut self) -> bool {
        if self.media_failed {
            return false;
        }
        match self.media.acquire().await {
            Ok(_) => true,
            Err(e) => {
                self.on_media_failure(e);
                false
            }
        }
    }

    fn on_media_failure(&mut self, e: SignalingError) {
        if self.media_failed {
            return;
        }
        error!("Leaving all sessions: {}", e);
        self.media_failed = true;
        self.emit(ClientEvent::MediaUnavailable(e));
    }

    fn open_session(&mut self, remote: PeerId, role: Role) {
        if self.media_failed {
            debug!("No media, not opening a session with {}", remote);
            return;
        }
        if let Some(existing) = self.sessions.get(&remote)
            && !existing.snapshot.state.is_terminal()
        {
            warn!(
                "Session with {} already exists as {}",
                remote, existing.snapshot.role
            );
            return;
        }
        let (Some(local_id), Some(membership)) = (self.local_id.clone(), &self.membership) else {
            warn!("Cannot open a session with {} outside of a room", remote);
            return;
        };
        if local_id == remote {
            return;
        }

        let ctx = Arc::new(SessionContext {
            local_id,
            room_id: membership.room_id.clone(),
            media: self.media.clone(),
            links: self.links.clone(),
            ice_servers: self.ice_servers.clone(),
            sink: self.sink.clone(),
            reports: self.report_tx.clone(),
            handshake_timeout: self.handshake_timeout,
        });

        let (command_tx, command_rx) = mpsc::channel(SESSION_QUEUE);
        tokio::spawn(Session::new(ctx, remote.clone(), role, command_rx).run());

        self.sessions.insert(
            remote.clone(),
            SessionEntry {
                command_tx,
                snapshot: SessionSnapshot {
                    remote: remote.clone(),
                    role,
                    state: SessionState::Idle,
                    local_description: None,
                    remote_description: None,
                    remote_tracks: Vec::new(),
                },
            },
        );
        self.emit(ClientEvent::SessionStateChanged {
            remote,
            role,
            state: SessionState::Idle,
        });
    }

    /// Never waits on the session queue. Frames beyond it are dropped.
    fn forward(&self, remote: &PeerId, cmd: SessionCommand) {
        let Some(entry) = self.sessions.get(remote) else {
            warn!("No session with {}, dropping {:?}", remote, cmd);
            return;
        };
        match entry.command_tx.try_send(cmd) {
            Ok(()) => {}
            Err(TrySendError::Full(cmd)) => {
                warn!("Session with {} is backed up, dropping {:?}", remote, cmd)
            }
            Err(TrySendError::Closed(_)) => debug!("Session with {} already ended", remote),
        }
    }

    async fn send_to(&self, recipient: PeerId, msg: SignalMessage) {
        let Some(local_id) = self.local_id.clone() else {
            return;
        };
        let event = msg.event_name();
        if let Err(e) = self.sink.send(msg.addressed(local_id, recipient)).await {
            warn!("Could not send '{}': {}", event, e);
        }
    }

    fn handle_report(&mut self, report: SessionReport) {
        let SessionReport { remote, kind } = report;

        if let ReportKind::Failed(SignalingError::MediaUnavailable(reason)) = &kind {
            self.on_media_failure(SignalingError::MediaUnavailable(reason.clone()));
        }

        let Some(entry) = self.sessions.get_mut(&remote) else {
            return;
        };
        let snapshot = &mut entry.snapshot;

        match kind {
            ReportKind::State(state) => {
                snapshot.state = state;
                let role = snapshot.role;
                self.emit(ClientEvent::SessionStateChanged {
                    remote,
                    role,
                    state,
                });
            }
            ReportKind::LocalDescription(desc) => snapshot.local_description = Some(desc),
            ReportKind::RemoteDescription(desc) => snapshot.remote_description = Some(desc),
            ReportKind::RemoteTrack(track) => {
                snapshot.remote_tracks.push(track.clone());
                self.emit(ClientEvent::RemoteTrack { remote, track });
            }
            ReportKind::Failed(error) => {
                self.emit(ClientEvent::SessionFailed { remote, error });
            }
        }
    }

    fn close_all_sessions(&mut self) {
        for (remote, entry) in self.sessions.drain() {
            debug!("Closing session with {}", remote);
            entry.close();
        }
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }
}
