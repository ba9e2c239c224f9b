use parley_core::{PeerId, SignalMessage};

use crate::integration::{create_test_router, init_tracing, room};

#[tokio::test]
async fn test_newcomer_fans_out_peer_joined() {
    init_tracing();

    let (router, output, _) = create_test_router();
    let (a, b, c) = (PeerId::new(), PeerId::new(), PeerId::new());

    for peer in [&a, &b] {
        router
            .route(peer, SignalMessage::Join { room_id: room("demo") })
            .await;
    }
    output.clear().await;

    router
        .route(&c, SignalMessage::Join { room_id: room("demo") })
        .await;

    // The newcomer learns who is present; it receives no peer-joined of its own.
    assert_eq!(
        output.messages_for(&c).await,
        vec![SignalMessage::RoomJoined {
            room_id: room("demo"),
            members: vec![a.clone(), b.clone()],
        }]
    );

    // Exactly one peer-joined per existing member.
    for existing in [&a, &b] {
        assert_eq!(
            output.messages_for(existing).await,
            vec![SignalMessage::PeerJoined {
                room_id: room("demo"),
                peer_id: existing.clone(),
                new_peer_id: c.clone(),
            }]
        );
    }
    assert_eq!(output.count_events("peer-joined").await, 2);
    assert_eq!(output.count_events("room-created").await, 0);
}
