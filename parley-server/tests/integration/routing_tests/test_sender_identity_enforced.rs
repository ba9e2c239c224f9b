use parley_core::{PeerId, SignalMessage};

use crate::integration::{create_test_router, init_tracing, room};

#[tokio::test]
async fn test_sender_identity_enforced() {
    init_tracing();

    let (router, output, _) = create_test_router();
    let (x, y) = (PeerId::new(), PeerId::new());
    for peer in [&x, &y] {
        router
            .route(peer, SignalMessage::Join { room_id: room("demo") })
            .await;
    }
    output.clear().await;

    let forged = SignalMessage::Ready {
        room_id: room("demo"),
        sender_id: Some(PeerId::new()),
        recipient_id: Some(y.clone()),
    };
    router.route(&x, forged).await;

    assert_eq!(
        output.messages_for(&y).await,
        vec![SignalMessage::Ready {
            room_id: room("demo"),
            sender_id: Some(x.clone()),
            recipient_id: Some(y.clone()),
        }]
    );
}
