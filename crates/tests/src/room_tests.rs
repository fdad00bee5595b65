use crate::fixtures::{seed::test_user, test_app::TestApp};
use serde_json::Value;

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn create_join_leave_flow() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);
    let bob = test_user(&app.settings);

    let resp = app
        .auth_post("/api/room", &alice.access_token)
        .json(&serde_json::json!({ "name": "plans", "kind": "group" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let room: Value = resp.json().await.unwrap();
    let room_id = room["id"].as_str().unwrap().to_string();
    assert_eq!(room["kind"], "group");
    assert_eq!(room["unread_count"], 0);

    // Bob joins
    let resp = app
        .auth_post(&format!("/api/room/{room_id}/join"), &bob.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let member: Value = resp.json().await.unwrap();
    assert_eq!(member["role"], "member");

    // Bob leaves — and leaves again; the second is a no-op, not an error
    let resp = app
        .auth_post(&format!("/api/room/{room_id}/leave"), &bob.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["left"], true);

    let resp = app
        .auth_post(&format!("/api/room/{room_id}/leave"), &bob.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["left"], false);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn duplicate_join_is_conflict() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);
    let bob = test_user(&app.settings);

    let room: Value = app
        .auth_post("/api/room", &alice.access_token)
        .json(&serde_json::json!({ "name": "once", "kind": "group" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let room_id = room["id"].as_str().unwrap();

    let resp = app
        .auth_post(&format!("/api/room/{room_id}/join"), &bob.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_post(&format!("/api/room/{room_id}/join"), &bob.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn members_lists_active_participants_only() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);
    let bob = test_user(&app.settings);

    let room: Value = app
        .auth_post("/api/room", &alice.access_token)
        .json(&serde_json::json!({ "name": "churn", "kind": "group" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let room_id = room["id"].as_str().unwrap();

    app.auth_post(&format!("/api/room/{room_id}/join"), &bob.access_token)
        .send()
        .await
        .unwrap();
    app.auth_post(&format!("/api/room/{room_id}/leave"), &bob.access_token)
        .send()
        .await
        .unwrap();

    let members: Value = app
        .auth_get(&format!("/api/room/{room_id}/member"), &alice.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["user_id"], alice.user_id.to_hex());
    assert_eq!(members[0]["role"], "admin");
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn room_creation_validates_name() {
    let app = TestApp::spawn().await;
    let alice = test_user(&app.settings);

    let resp = app
        .auth_post("/api/room", &alice.access_token)
        .json(&serde_json::json!({ "name": "", "kind": "group" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}
