use crate::fixtures::{
    seed::{issue_capability_token, test_user},
    test_app::TestApp,
};
use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

async fn next_json(
    ws: &mut (impl StreamExt<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>>
          + Unpin),
) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for hub event")
            .expect("socket closed")
            .expect("socket error");
        if let WsMessage::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn room_topic_delivers_message_events() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);
    let bob = test_user(&app.settings);

    let room: Value = app
        .auth_post("/api/room", &alice.access_token)
        .json(&serde_json::json!({ "name": "wired", "kind": "group" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let room_id = room["id"].as_str().unwrap().to_string();

    app.auth_post(&format!("/api/room/{room_id}/join"), &bob.access_token)
        .send()
        .await
        .unwrap();

    // Bob subscribes with a capability token scoped to the room topic
    // and his unread topic
    let token = issue_capability_token(
        &app.settings,
        bob.user_id,
        vec![
            format!("room/{room_id}"),
            format!("user/{}/unread", bob.user_id.to_hex()),
        ],
    );
    let (mut ws, _) = connect_async(app.ws_url(&token)).await.unwrap();

    let connected = next_json(&mut ws).await;
    assert_eq!(connected["type"], "connected");

    app.auth_post(&format!("/api/room/{room_id}/message"), &alice.access_token)
        .json(&serde_json::json!({ "content": "hello bob" }))
        .send()
        .await
        .unwrap();

    // Expect both the room event and the counter delta, in some order
    let mut seen_message = false;
    let mut seen_unread = false;
    for _ in 0..2 {
        let event = next_json(&mut ws).await;
        match event["type"].as_str().unwrap() {
            "message:create" => {
                assert_eq!(event["data"]["content"], "hello bob");
                assert_eq!(event["data"]["room_id"], room_id.as_str());
                seen_message = true;
            }
            "unread:change" => {
                assert_eq!(event["data"]["unread_count"], 1);
                assert_eq!(event["data"]["room_id"], room_id.as_str());
                seen_unread = true;
            }
            other => panic!("unexpected event type {other}"),
        }
    }
    assert!(seen_message && seen_unread);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn rejects_malformed_topic_claims() {
    let app = TestApp::spawn().await;
    let bob = test_user(&app.settings);

    let token = issue_capability_token(
        &app.settings,
        bob.user_id,
        vec!["room/not-an-id".to_string()],
    );

    let err = connect_async(app.ws_url(&token)).await;
    assert!(err.is_err(), "connection should be refused");
}
