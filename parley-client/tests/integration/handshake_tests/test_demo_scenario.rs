use parley_client::RolePolicy;
use parley_core::SessionState;

use crate::integration::init_tracing;
use crate::utils::{LoopbackRelay, TestPeer, wait_until};

#[tokio::test]
async fn test_two_members_reach_connected() {
    init_tracing();
    let relay = LoopbackRelay::new();

    let a = TestPeer::spawn(&relay, RolePolicy::Star);
    a.join("demo").await;
    let b = TestPeer::spawn(&relay, RolePolicy::Star);
    b.join("demo").await;

    a.wait_connected(1).await;
    b.wait_connected(1).await;

    assert_eq!(relay.delivered_to(&a.peer_id, "room-created").len(), 1);
    assert_eq!(relay.delivered_to(&b.peer_id, "room-joined").len(), 1);
    assert_eq!(relay.delivered_to(&a.peer_id, "peer-joined").len(), 1);
    assert_eq!(relay.delivered_to(&b.peer_id, "offer").len(), 1);
    assert_eq!(relay.delivered_to(&a.peer_id, "answer").len(), 1);
    wait_until("candidates both ways", || {
        !relay.delivered_to(&a.peer_id, "ice-candidate").is_empty()
            && !relay.delivered_to(&b.peer_id, "ice-candidate").is_empty()
    })
    .await;
    // The side that installs the answer acknowledges.
    wait_until("signaling-complete", || {
        relay.delivered_to(&b.peer_id, "signaling-complete").len() == 1
    })
    .await;
    assert!(relay.delivered_to(&a.peer_id, "signaling-complete").is_empty());
}

#[tokio::test]
async fn test_descriptions_cross_unmodified() {
    init_tracing();
    let relay = LoopbackRelay::new();

    let a = TestPeer::spawn(&relay, RolePolicy::Star);
    a.join("demo").await;
    let b = TestPeer::spawn(&relay, RolePolicy::Star);
    b.join("demo").await;

    a.wait_connected(1).await;
    b.wait_connected(1).await;

    let a_side = a.session_with(&b.peer_id).await;
    let b_side = b.session_with(&a.peer_id).await;

    assert!(a_side.local_description.is_some());
    assert!(b_side.local_description.is_some());
    assert_eq!(a_side.local_description, b_side.remote_description);
    assert_eq!(b_side.local_description, a_side.remote_description);

    // Every local candidate ended up on the other side's link.
    let a_link = &a.links.links()[0];
    let b_link = &b.links.links()[0];
    wait_until("candidates applied", || {
        a_link.candidates().len() == 2 && b_link.candidates().len() == 2
    })
    .await;
    assert_eq!(a_link.rejected_candidates(), 0);
    assert_eq!(b_link.rejected_candidates(), 0);
}

#[tokio::test]
async fn test_remote_track_reported() {
    init_tracing();
    let relay = LoopbackRelay::new();

    let a = TestPeer::spawn(&relay, RolePolicy::Star);
    a.join("demo").await;
    let b = TestPeer::spawn(&relay, RolePolicy::Star);
    b.join("demo").await;

    let sessions = b
        .wait_for("remote track", |s| {
            s.len() == 1 && !s[0].remote_tracks.is_empty()
        })
        .await;
    assert_eq!(sessions[0].remote_tracks[0].id, "audio");
    assert_eq!(sessions[0].state, SessionState::Connected);
}
