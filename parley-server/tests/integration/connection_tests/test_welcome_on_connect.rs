use crate::integration::{init_tracing, spawn_relay};
use crate::utils::WsTestClient;

#[tokio::test]
async fn test_welcome_on_connect() {
    init_tracing();

    let addr = spawn_relay().await;

    let first = WsTestClient::connect(addr)
        .await
        .expect("Failed to connect first client");
    let second = WsTestClient::connect(addr)
        .await
        .expect("Failed to connect second client");

    // Identity is per connection.
    assert_ne!(first.peer_id, second.peer_id);

    first.close().await.expect("Failed to close first client");
    second.close().await.expect("Failed to close second client");
}

#[tokio::test]
async fn test_garbage_frames_do_not_kill_the_connection() {
    init_tracing();

    let addr = spawn_relay().await;
    let mut client = WsTestClient::connect(addr).await.expect("Failed to connect");

    client
        .send_raw("{not json")
        .await
        .expect("Failed to send garbage");
    client
        .send_raw(r#"{"event":"join","data":{"roomId":"demo"}}"#)
        .await
        .expect("Failed to send join");

    let reply = client.recv().await.expect("No reply after garbage");
    assert_eq!(reply.event_name(), "room-created");

    client.close().await.expect("Failed to close client");
}
