use parley_core::{PeerId, SignalMessage};

use crate::integration::{create_test_router, init_tracing};

#[tokio::test]
async fn test_empty_room_rejected() {
    init_tracing();

    let (router, output, directory) = create_test_router();
    let x = PeerId::new();

    let blank: SignalMessage =
        serde_json::from_str(r#"{"event":"join","data":{"roomId":""}}"#).unwrap();
    router.route(&x, blank).await;

    let frames = output.messages_for(&x).await;
    assert_eq!(frames.len(), 1);
    assert!(matches!(frames[0], SignalMessage::Error { .. }));
    assert_eq!(directory.room_count(), 0);
    assert!(directory.room_of(&x).is_none());
}
