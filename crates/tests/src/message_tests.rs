use crate::fixtures::{seed::test_user, test_app::TestApp};
use serde_json::Value;

async fn create_room(app: &TestApp, token: &str, name: &str, kind: &str) -> String {
    let room: Value = app
        .auth_post("/api/room", token)
        .json(&serde_json::json!({ "name": name, "kind": kind }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    room["id"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn send_and_list_messages() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);
    let room_id = create_room(&app, &alice.access_token, "general", "group").await;

    for i in 1..=3 {
        let resp = app
            .auth_post(
                &format!("/api/room/{room_id}/message"),
                &alice.access_token,
            )
            .json(&serde_json::json!({ "content": format!("Hello message {i}") }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200, "Failed to send message {i}");
    }

    let resp = app
        .auth_get(&format!("/api/room/{room_id}/message"), &alice.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["total"], 3);
    assert_eq!(json["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn empty_and_oversized_content_rejected() {
    let app = TestApp::spawn_with_settings(|s| {
        s.message.max_content_len = 10;
    })
    .await;
    let alice = test_user(&app.settings);
    let room_id = create_room(&app, &alice.access_token, "strict", "group").await;

    let resp = app
        .auth_post(
            &format!("/api/room/{room_id}/message"),
            &alice.access_token,
        )
        .json(&serde_json::json!({ "content": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    let resp = app
        .auth_post(
            &format!("/api/room/{room_id}/message"),
            &alice.access_token,
        )
        .json(&serde_json::json!({ "content": "way past the ten char bound" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn nonmember_cannot_write_closed_room() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);
    let bob = test_user(&app.settings);
    let room_id = create_room(&app, &alice.access_token, "closed", "group").await;

    let resp = app
        .auth_post(&format!("/api/room/{room_id}/message"), &bob.access_token)
        .json(&serde_json::json!({ "content": "let me in" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn open_room_auto_joins_author_on_send() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);
    let bob = test_user(&app.settings);
    let room_id = create_room(&app, &alice.access_token, "lobby", "open").await;

    let resp = app
        .auth_post(&format!("/api/room/{room_id}/message"), &bob.access_token)
        .json(&serde_json::json!({ "content": "hello everyone" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let members: Value = app
        .auth_get(&format!("/api/room/{room_id}/member"), &bob.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(members
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m["user_id"] == bob.user_id.to_hex()));
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn send_restores_departed_participants() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);
    let bob = test_user(&app.settings);
    let room_id = create_room(&app, &alice.access_token, "comeback", "group").await;

    app.auth_post(&format!("/api/room/{room_id}/join"), &bob.access_token)
        .send()
        .await
        .unwrap();
    app.auth_post(&format!("/api/room/{room_id}/leave"), &bob.access_token)
        .send()
        .await
        .unwrap();

    // A new message in the room brings Bob back
    let resp = app
        .auth_post(
            &format!("/api/room/{room_id}/message"),
            &alice.access_token,
        )
        .json(&serde_json::json!({ "content": "where did you go?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let members: Value = app
        .auth_get(&format!("/api/room/{room_id}/member"), &alice.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<&str> = members
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["user_id"].as_str())
        .collect();
    assert!(ids.contains(&bob.user_id.to_hex().as_str()));
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn departed_member_cannot_write_their_way_back() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);
    let bob = test_user(&app.settings);
    let room_id = create_room(&app, &alice.access_token, "oneway", "group").await;

    app.auth_post(&format!("/api/room/{room_id}/join"), &bob.access_token)
        .send()
        .await
        .unwrap();
    app.auth_post(&format!("/api/room/{room_id}/leave"), &bob.access_token)
        .send()
        .await
        .unwrap();

    let resp = app
        .auth_post(&format!("/api/room/{room_id}/message"), &bob.access_token)
        .json(&serde_json::json!({ "content": "I'm back?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn history_paginates_newest_first() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);
    let room_id = create_room(&app, &alice.access_token, "pages", "group").await;

    for i in 1..=5 {
        app.auth_post(
            &format!("/api/room/{room_id}/message"),
            &alice.access_token,
        )
        .json(&serde_json::json!({ "content": format!("msg {i}") }))
        .send()
        .await
        .unwrap();
    }

    let json: Value = app
        .auth_get(
            &format!("/api/room/{room_id}/message?page=1&per_page=2"),
            &alice.access_token,
        )
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(json["total"], 5);
    assert_eq!(json["total_pages"], 3);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["content"], "msg 5");
}
