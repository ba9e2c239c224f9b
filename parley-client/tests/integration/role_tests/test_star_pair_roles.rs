use parley_client::{ClientEvent, RolePolicy};
use parley_core::Role;

use crate::integration::init_tracing;
use crate::utils::{LoopbackRelay, TestPeer};

#[tokio::test]
async fn test_star_pair_has_exactly_one_offerer() {
    init_tracing();
    let relay = LoopbackRelay::new();

    let mut a = TestPeer::spawn(&relay, RolePolicy::Star);
    a.join("demo").await;
    a.next_event("room-created", |e| matches!(e, ClientEvent::RoomCreated { .. }))
        .await;

    let b = TestPeer::spawn(&relay, RolePolicy::Star);
    b.join("demo").await;

    a.wait_connected(1).await;
    b.wait_connected(1).await;

    let a_to_b = a.session_with(&b.peer_id).await;
    let b_to_a = b.session_with(&a.peer_id).await;
    assert_eq!(a_to_b.role, Role::Offerer);
    assert_eq!(b_to_a.role, Role::Answerer);
}

#[tokio::test]
async fn test_newcomer_learns_existing_members() {
    init_tracing();
    let relay = LoopbackRelay::new();

    let a = TestPeer::spawn(&relay, RolePolicy::Star);
    a.join("demo").await;

    let mut b = TestPeer::spawn(&relay, RolePolicy::Star);
    b.join("demo").await;

    let event = b
        .next_event("room-joined", |e| matches!(e, ClientEvent::RoomJoined { .. }))
        .await;
    let ClientEvent::RoomJoined { room_id, members } = event else {
        unreachable!()
    };
    assert_eq!(room_id.as_str(), "demo");
    assert_eq!(members, vec![a.peer_id.clone()]);
}
