use parley_core::SignalMessage;

use crate::integration::{init_tracing, room, spawn_relay};
use crate::utils::WsTestClient;

#[tokio::test]
async fn test_disconnect_notifies_peer_left() {
    init_tracing();

    let addr = spawn_relay().await;
    let mut x = WsTestClient::connect(addr).await.expect("Failed to connect X");
    let mut y = WsTestClient::connect(addr).await.expect("Failed to connect Y");

    x.send(&SignalMessage::Join { room_id: room("demo") })
        .await
        .expect("X join failed");
    x.recv().await.expect("X got no room-created");
    y.send(&SignalMessage::Join { room_id: room("demo") })
        .await
        .expect("Y join failed");
    y.recv().await.expect("Y got no room-joined");
    x.recv().await.expect("X got no peer-joined");

    let y_id = y.peer_id.clone();
    y.close().await.expect("Failed to close Y");

    assert_eq!(
        x.recv().await.expect("X got no peer-left"),
        SignalMessage::PeerLeft {
            room_id: room("demo"),
            peer_id: y_id,
        }
    );
    assert!(x.is_silent_for(200).await);

    x.close().await.expect("Failed to close X");
}
