use parley_client::{ClientEvent, RolePolicy};
use parley_core::{SessionState, SignalingError};

use crate::integration::init_tracing;
use crate::utils::{LoopbackRelay, MockLinkFactory, MockMediaSource, TestPeer, test_config};

#[tokio::test]
async fn test_denied_media_is_surfaced_and_ends_participation() {
    init_tracing();
    let relay = LoopbackRelay::new();

    let mut a = TestPeer::spawn_with(
        &relay,
        test_config(RolePolicy::Star),
        MockMediaSource::denied(),
        MockLinkFactory::new(),
    );
    a.join("demo").await;

    let event = a
        .next_event("media-unavailable", |e| {
            matches!(e, ClientEvent::MediaUnavailable(_))
        })
        .await;
    let ClientEvent::MediaUnavailable(SignalingError::MediaUnavailable(reason)) = event else {
        panic!("unexpected event {:?}", event)
    };
    assert!(reason.contains("permission denied"));

    let b = TestPeer::spawn(&relay, RolePolicy::Star);
    b.join("demo").await;
    a.next_event("peer-joined", |e| matches!(e, ClientEvent::PeerJoined { .. }))
        .await;

    // a never opens a session; b waits for an offer that never comes.
    assert!(a.handle.sessions().await.is_empty());
    assert!(a.links.links().is_empty());
    assert_eq!(a.media.calls(), 1);
    b.wait_for("b awaiting offer", |s| {
        s.len() == 1 && s[0].state == SessionState::AwaitingOffer
    })
    .await;
    assert!(relay.delivered_to(&b.peer_id, "offer").is_empty());
}
