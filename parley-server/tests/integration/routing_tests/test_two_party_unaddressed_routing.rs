use parley_core::{PeerId, SignalMessage};

use crate::integration::{create_test_router, init_tracing, room};

fn bare_answer() -> SignalMessage {
    SignalMessage::Answer {
        room_id: room("pair"),
        sdp: "v=0".into(),
        sender_id: None,
        recipient_id: None,
    }
}

#[tokio::test]
async fn test_two_party_unaddressed_routing() {
    init_tracing();

    let (router, output, _) = create_test_router();
    let (x, y) = (PeerId::new(), PeerId::new());
    for peer in [&x, &y] {
        router
            .route(peer, SignalMessage::Join { room_id: room("pair") })
            .await;
    }
    output.clear().await;

    router.route(&y, bare_answer()).await;

    // The relay resolves the only counterpart and stamps both identities.
    assert_eq!(
        output.messages_for(&x).await,
        vec![bare_answer().addressed(y.clone(), x.clone())]
    );
}

#[tokio::test]
async fn test_unaddressed_message_in_crowded_room_is_dropped() {
    init_tracing();

    let (router, output, _) = create_test_router();
    let (x, y, z) = (PeerId::new(), PeerId::new(), PeerId::new());
    for peer in [&x, &y, &z] {
        router
            .route(peer, SignalMessage::Join { room_id: room("pair") })
            .await;
    }
    output.clear().await;

    router.route(&y, bare_answer()).await;

    assert_eq!(output.total().await, 0);
}
