use parley_client::{ClientEvent, RolePolicy};
use parley_core::{Role, RoomId, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{LoopbackRelay, ScriptedPeer, TestPeer};

#[tokio::test]
async fn test_creator_offers_after_ready() {
    init_tracing();
    let relay = LoopbackRelay::new();

    let mut a = TestPeer::spawn(&relay, RolePolicy::TwoParty);
    a.join("pair").await;
    a.next_event("room-created", |e| matches!(e, ClientEvent::RoomCreated { .. }))
        .await;

    let b = TestPeer::spawn(&relay, RolePolicy::TwoParty);
    b.join("pair").await;

    a.wait_connected(1).await;
    b.wait_connected(1).await;

    assert_eq!(a.session_with(&b.peer_id).await.role, Role::Offerer);
    assert_eq!(b.session_with(&a.peer_id).await.role, Role::Answerer);
    assert_eq!(relay.delivered_to(&a.peer_id, "ready").len(), 1);
    assert_eq!(relay.delivered_to(&b.peer_id, "offer").len(), 1);
    assert_eq!(relay.delivered_to(&a.peer_id, "offer").len(), 0);
}

#[tokio::test]
async fn test_peer_joined_alone_opens_nothing() {
    init_tracing();
    let relay = LoopbackRelay::new();

    let mut a = TestPeer::spawn(&relay, RolePolicy::TwoParty);
    a.join("pair").await;

    // Joins but never announces itself.
    let silent = ScriptedPeer::connect(&relay);
    silent
        .send(SignalMessage::Join {
            room_id: RoomId::parse("pair").unwrap(),
        })
        .await;

    a.next_event("peer-joined", |e| {
        matches!(e, ClientEvent::PeerJoined { peer_id } if peer_id == &silent.peer_id)
    })
    .await;

    assert!(a.handle.sessions().await.is_empty());
}
