use crate::link::{LinkEvent, LinkState, PeerLink, PeerLinkFactory, RemoteTrack};
use crate::media::LocalMedia;
use crate::transport::SignalSink;
use parley_core::{
    IceCandidate, IceServerConfig, PeerId, Role, RoomId, SessionDescription, SessionState,
    SignalMessage, SignalingError,
};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Candidates held back while no remote description is installed.
const MAX_PENDING_CANDIDATES: usize = 256;

/// Signals from the remote member, forwarded by the coordinator.
#[derive(Debug)]
pub(crate) enum SessionCommand {
    RemoteOffer(SessionDescription),
    RemoteAnswer(SessionDescription),
    RemoteCandidate(IceCandidate),
    RemoteComplete,
    Close,
}

#[derive(Debug)]
pub(crate) enum ReportKind {
    State(SessionState),
    LocalDescription(SessionDescription),
    RemoteDescription(SessionDescription),
    RemoteTrack(RemoteTrack),
    Failed(SignalingError),
}

/// Session progress, reported back to the coordinator.
#[derive(Debug)]
pub(crate) struct SessionReport {
    pub remote: PeerId,
    pub kind: ReportKind,
}

/// What every session of one member shares.
pub(crate) struct SessionContext {
    pub local_id: PeerId,
    pub room_id: RoomId,
    pub media: Arc<LocalMedia>,
    pub links: Arc<dyn PeerLinkFactory>,
    pub ice_servers: Vec<IceServerConfig>,
    pub sink: Arc<dyn SignalSink>,
    pub reports: mpsc::UnboundedSender<SessionReport>,
    pub handshake_timeout: Option<Duration>,
}

/// Actor driving the offer/answer exchange with one remote member.
pub(crate) struct Session {
    ctx: Arc<SessionContext>,
    remote: PeerId,
    role: Role,
    state: SessionState,
    commands: mpsc::Receiver<SessionCommand>,
    link: Option<Box<dyn PeerLink>>,
    /// Candidates that arrived before the remote description.
    pending_candidates: Vec<IceCandidate>,
    remote_description_set: bool,
}

fn describe(e: anyhow::Error) -> SignalingError {
    SignalingError::DescriptionGenerationFailed(format!("{:#}", e))
}

impl Session {
    pub(crate) fn new(
        ctx: Arc<SessionContext>,
        remote: PeerId,
        role: Role,
        commands: mpsc::Receiver<SessionCommand>,
    ) -> Self {
        Self {
            ctx,
            remote,
            role,
            state: SessionState::Idle,
            commands,
            link: None,
            pending_candidates: Vec::new(),
            remote_description_set: false,
        }
    }

    /// Runs until the session fails, is closed, or the coordinator goes away.
    pub(crate) async fn run(mut self) {
        info!("Session with {} started as {}", self.remote, self.role);

        let (link_tx, mut link_rx) = mpsc::channel(256);
        if let Err(e) = self.start(link_tx).await {
            self.fail(e).await;
            return;
        }

        let deadline = self.ctx.handshake_timeout.map(|t| (Instant::now() + t, t));

        loop {
            let waiting = deadline.is_some() && self.state.is_handshake_pending();
            let wake_at = deadline.map(|(at, _)| at).unwrap_or_else(Instant::now);

            tokio::select! {
                cmd = self.commands.recv() => {
                    let Some(cmd) = cmd else { break };
                    match self.handle_command(cmd).await {
                        Ok(ControlFlow::Continue(())) => {}
                        Ok(ControlFlow::Break(())) => break,
                        Err(e) => {
                            self.fail(e).await;
                            return;
                        }
                    }
                }

                Some(event) = link_rx.recv() => self.handle_link_event(event).await,

                _ = tokio::time::sleep_until(wake_at), if waiting => {
                    let timeout = deadline.map(|(_, t)| t).unwrap_or_default();
                    warn!("Handshake with {} stalled in {}", self.remote, self.state);
                    self.fail(SignalingError::HandshakeTimeout(timeout)).await;
                    return;
                }
            }
        }

        self.close_link().await;
        info!("Session with {} closed", self.remote);
    }

    async fn start(&mut self, link_tx: mpsc::Sender<LinkEvent>) -> Result<(), SignalingError> {
        self.transition(SessionState::AwaitingLocalMedia);
        let stream = self.ctx.media.acquire().await?;

        let link = self
            .ctx
            .links
            .create(&self.ctx.ice_servers, link_tx)
            .await
            .map_err(describe)?;
        for track in &stream.tracks {
            link.add_track(track).await.map_err(describe)?;
        }
        self.link = Some(link);

        match self.role {
            Role::Offerer => self.send_offer().await,
            Role::Answerer => {
                self.transition(SessionState::AwaitingOffer);
                Ok(())
            }
        }
    }

    fn link(&self) -> Result<&dyn PeerLink, SignalingError> {
        self.link.as_deref().ok_or_else(|| {
            SignalingError::DescriptionGenerationFailed("peer link not created".into())
        })
    }

    async fn send_offer(&mut self) -> Result<(), SignalingError> {
        self.transition(SessionState::Offering);

        let link = self.link()?;
        let offer = link.create_offer().await.map_err(describe)?;
        link.set_local_description(offer.clone())
            .await
            .map_err(describe)?;
        self.report(ReportKind::LocalDescription(offer.clone()));

        self.send(SignalMessage::Offer {
            room_id: self.ctx.room_id.clone(),
            sdp: offer.sdp,
            sender_id: None,
            recipient_id: None,
        })
        .await
    }

    async fn handle_command(
        &mut self,
        cmd: SessionCommand,
    ) -> Result<ControlFlow<()>, SignalingError> {
        match cmd {
            SessionCommand::RemoteOffer(offer) => {
                if self.role != Role::Answerer || self.state != SessionState::AwaitingOffer {
                    warn!(
                        "Ignoring offer from {} while {} in {}",
                        self.remote, self.role, self.state
                    );
                    return Ok(ControlFlow::Continue(()));
                }
                self.install_remote(offer).await?;

                let link = self.link()?;
                let answer = link.create_answer().await.map_err(describe)?;
                link.set_local_description(answer.clone())
                    .await
                    .map_err(describe)?;
                self.report(ReportKind::LocalDescription(answer.clone()));

                self.send(SignalMessage::Answer {
                    room_id: self.ctx.room_id.clone(),
                    sdp: answer.sdp,
                    sender_id: None,
                    recipient_id: None,
                })
                .await?;
                self.transition(SessionState::Answered);
            }

            SessionCommand::RemoteAnswer(answer) => {
                if self.role != Role::Offerer || self.state != SessionState::Offering {
                    warn!(
                        "Ignoring answer from {} while {} in {}",
                        self.remote, self.role, self.state
                    );
                    return Ok(ControlFlow::Continue(()));
                }
                self.install_remote(answer).await?;
                self.transition(SessionState::Connected);

                self.send(SignalMessage::SignalingComplete {
                    room_id: self.ctx.room_id.clone(),
                    sender_id: None,
                    recipient_id: None,
                })
                .await?;
            }

            SessionCommand::RemoteCandidate(candidate) => {
                if self.remote_description_set {
                    self.apply_candidate(candidate).await;
                } else if self.pending_candidates.len() >= MAX_PENDING_CANDIDATES {
                    warn!(
                        "Dropping early candidate from {}: {} already buffered",
                        self.remote, MAX_PENDING_CANDIDATES
                    );
                } else {
                    debug!("Buffering early candidate from {}", self.remote);
                    self.pending_candidates.push(candidate);
                }
            }

            SessionCommand::RemoteComplete => {
                info!("Signaling with {} complete", self.remote);
            }

            SessionCommand::Close => return Ok(ControlFlow::Break(())),
        }
        Ok(ControlFlow::Continue(()))
    }

    async fn install_remote(&mut self, description: SessionDescription) -> Result<(), SignalingError> {
        self.link()?
            .set_remote_description(description.clone())
            .await
            .map_err(describe)?;
        self.remote_description_set = true;
        self.report(ReportKind::RemoteDescription(description));

        for candidate in std::mem::take(&mut self.pending_candidates) {
            self.apply_candidate(candidate).await;
        }
        Ok(())
    }

    /// Rejected candidates, duplicates included, are logged and skipped.
    async fn apply_candidate(&self, candidate: IceCandidate) {
        let Some(link) = self.link.as_deref() else {
            return;
        };
        let Err(e) = link.add_remote_candidate(candidate).await else {
            return;
        };
        warn!("Failed to add ICE candidate from {}: {:#}", self.remote, e);
    }

    async fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::LocalCandidate(candidate) => {
                let msg = SignalMessage::ice_candidate(self.ctx.room_id.clone(), candidate);
                if let Err(e) = self.send(msg).await {
                    warn!("Could not send candidate to {}: {}", self.remote, e);
                }
            }

            LinkEvent::RemoteTrack(track) => {
                self.report(ReportKind::RemoteTrack(track));
                self.mark_connected();
            }

            LinkEvent::StateChanged(LinkState::Connected) => self.mark_connected(),

            LinkEvent::StateChanged(state) => {
                debug!("Link to {} is now {:?}", self.remote, state);
            }
        }
    }

    fn mark_connected(&mut self) {
        if self.state == SessionState::Answered {
            self.transition(SessionState::Connected);
        }
    }

    async fn send(&self, msg: SignalMessage) -> Result<(), SignalingError> {
        let msg = msg.addressed(self.ctx.local_id.clone(), self.remote.clone());
        self.ctx.sink.send(msg).await
    }

    fn transition(&mut self, state: SessionState) {
        debug!("Session with {}: {} -> {}", self.remote, self.state, state);
        self.state = state;
        self.report(ReportKind::State(state));
    }

    fn report(&self, kind: ReportKind) {
        let _ = self.ctx.reports.send(SessionReport {
            remote: self.remote.clone(),
            kind,
        });
    }

    async fn fail(&mut self, e: SignalingError) {
        error!("Session with {} failed: {}", self.remote, e);
        self.transition(SessionState::Failed);
        self.report(ReportKind::Failed(e));
        self.close_link().await;
    }

    async fn close_link(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };
        if let Err(e) = link.close().await {
            debug!("Closing link to {} failed: {:#}", self.remote, e);
        }
    }
}
