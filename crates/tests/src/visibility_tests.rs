use crate::fixtures::{seed::test_user, test_app::TestApp};
use serde_json::Value;

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn open_room_visible_without_membership() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);
    let bob = test_user(&app.settings);

    let room: Value = app
        .auth_post("/api/room", &alice.access_token)
        .json(&serde_json::json!({ "name": "lobby", "kind": "open" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let room_id = room["id"].as_str().unwrap().to_string();

    // Bob never joined, but the lobby shows up in his room list
    let rooms: Value = app
        .auth_get("/api/room", &bob.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rooms = rooms.as_array().unwrap();
    assert!(rooms.iter().any(|r| r["id"] == room_id.as_str()));

    // Listing materialized Bob's membership — exactly one row, and a
    // second listing does not add another
    app.auth_get("/api/room", &bob.access_token)
        .send()
        .await
        .unwrap();

    let members: Value = app
        .auth_get(&format!("/api/room/{room_id}/member"), &bob.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let bob_rows = members
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["user_id"] == bob.user_id.to_hex())
        .count();
    assert_eq!(bob_rows, 1);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn closed_room_hidden_from_nonmembers() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);
    let bob = test_user(&app.settings);

    let room: Value = app
        .auth_post("/api/room", &alice.access_token)
        .json(&serde_json::json!({ "name": "private", "kind": "group" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let room_id = room["id"].as_str().unwrap();

    let rooms: Value = app
        .auth_get("/api/room", &bob.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(rooms.as_array().unwrap().is_empty());

    let resp = app
        .auth_get(&format!("/api/room/{room_id}/message"), &bob.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn grant_lists_entitled_topics() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);

    let room: Value = app
        .auth_post("/api/room", &alice.access_token)
        .json(&serde_json::json!({ "name": "mine", "kind": "group" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let room_id = room["id"].as_str().unwrap();

    let grant: Value = app
        .auth_get("/api/hub/grant", &alice.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let topics: Vec<&str> = grant["topics"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t.as_str())
        .collect();

    let uid = alice.user_id.to_hex();
    assert!(topics.contains(&format!("room/{room_id}").as_str()));
    assert!(topics.contains(&format!("user/{uid}/rooms").as_str()));
    assert!(topics.contains(&format!("user/{uid}/unread").as_str()));
}
