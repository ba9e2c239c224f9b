use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use parley::RoomId;
use parley::client::{
    ClientConfig, ClientEvent, DEFAULT_SERVER_URL, MediaConstraints, RolePolicy,
    SyntheticMediaSource, WebRtcLinkFactory,
};
use parley::model::{IceServerConfig, SessionState, default_ice_servers};
use parley::server::{DEFAULT_BIND_ADDR, ServerConfig};

#[derive(Parser)]
#[command(name = "parley", version, about = "WebRTC signaling relay and headless peer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Serve {
        #[arg(short, long, default_value = DEFAULT_BIND_ADDR)]
        bind: SocketAddr,

        /// STUN/TURN url announced to clients. Repeatable.
        #[arg(long = "ice-server")]
        ice_servers: Vec<String>,
    },

    /// Join a room as a headless member sending synthetic media.
    Join {
        #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
        url: String,

        /// Prompted for when omitted.
        #[arg(short, long)]
        room: Option<String>,

        #[arg(long, default_value_t = RolePolicy::Star)]
        policy: RolePolicy,

        /// Give up on a handshake after this many seconds.
        #[arg(long)]
        handshake_timeout: Option<u64>,

        #[arg(long)]
        audio_only: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Ctrl-C received");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    match Cli::parse().command {
        Commands::Serve { bind, ice_servers } => serve(bind, ice_servers).await,
        Commands::Join {
            url,
            room,
            policy,
            handshake_timeout,
            audio_only,
        } => {
            let mut media = MediaConstraints::default();
            if audio_only {
                media.video = None;
            }
            let config = ClientConfig {
                server_url: url,
                policy,
                media,
                handshake_timeout: handshake_timeout.map(Duration::from_secs),
                ..Default::default()
            };
            join(config, room).await
        }
    }
}

async fn serve(bind: SocketAddr, ice_servers: Vec<String>) -> Result<()> {
    let ice_servers = if ice_servers.is_empty() {
        default_ice_servers()
    } else {
        ice_servers.iter().map(|url| IceServerConfig::stun(url)).collect()
    };
    let config = ServerConfig {
        bind_addr: bind,
        ice_servers,
    };

    println!(
        "{} {}",
        "Relay listening on".green().bold(),
        format!("ws://{}/ws", bind).cyan()
    );
    parley::server::run(config, shutdown_signal()).await?;
    println!("{}", "Relay stopped".yellow());
    Ok(())
}

async fn join(config: ClientConfig, room: Option<String>) -> Result<()> {
    let room = match room {
        Some(room) => room,
        None => Input::<String>::new()
            .with_prompt("Room ID")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read room id")?,
    };

    if let Err(e) = RoomId::parse(room.as_str()) {
        println!("{}", "Please type a room ID".red().bold());
        bail!(e);
    }

    println!("{} {}", "Connecting to".cyan(), config.server_url);
    let (handle, mut events) = parley::client::connect(
        config,
        Arc::new(SyntheticMediaSource::default()),
        Arc::new(WebRtcLinkFactory),
    )
    .await?;

    if let Err(e) = handle.join(&room).await {
        handle.shutdown().await;
        bail!(e);
    }

    let ctrl_c = shutdown_signal();
    tokio::pin!(ctrl_c);
    let mut stopping = false;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                print_event(&event);
                if matches!(event, ClientEvent::Disconnected) {
                    break;
                }
            }
            _ = &mut ctrl_c, if !stopping => {
                stopping = true;
                handle.shutdown().await;
            }
        }
    }

    Ok(())
}

fn print_event(event: &ClientEvent) {
    match event {
        ClientEvent::Connected { peer_id } => {
            println!("{} {}", "Connected as".green(), peer_id.to_string().bold())
        }
        ClientEvent::RoomCreated { room_id } => {
            println!("{} '{}'", "Created room".green().bold(), room_id)
        }
        ClientEvent::RoomJoined { room_id, members } => println!(
            "{} '{}' ({} already inside)",
            "Joined room".green().bold(),
            room_id,
            members.len()
        ),
        ClientEvent::PeerJoined { peer_id } => println!("{} {}", "+".green(), peer_id),
        ClientEvent::PeerLeft { peer_id } => println!("{} {}", "-".red(), peer_id),
        ClientEvent::SessionStateChanged {
            remote,
            role,
            state,
        } => {
            let state = match state {
                SessionState::Connected => state.to_string().green().bold(),
                SessionState::Failed => state.to_string().red().bold(),
                _ => state.to_string().normal(),
            };
            println!("  {} [{}] {}", remote, role, state);
        }
        ClientEvent::RemoteTrack { remote, track } => {
            println!("  {} {:?} track from {}", "Receiving".cyan(), track.kind, remote)
        }
        ClientEvent::SessionFailed { remote, error } => {
            println!("  {} {}: {}", "Session failed".red(), remote, error)
        }
        ClientEvent::MediaUnavailable(error) => println!("{} {}", "Error:".red().bold(), error),
        ClientEvent::RelayError(message) => println!("{} {}", "Relay:".red(), message),
        ClientEvent::Disconnected => println!("{}", "Disconnected".yellow()),
    }
}
