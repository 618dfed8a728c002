use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn tracks_known_action() {
    let app = TestApp::spawn().await;
    let id = app.create_product("Chair").await;

    let res = app
        .post_json(
            routes::AR_TRACK,
            &json!({
                "action": "ar_session_started",
                "product_id": id,
                "timestamp": "2025-10-09T11:16:35Z",
            }),
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body, json!({ "status": "tracked" }));
}

#[tokio::test]
async fn timestamp_is_optional() {
    let app = TestApp::spawn().await;
    let id = app.create_product("Chair").await;

    let res = app
        .post_json(
            routes::AR_TRACK,
            &json!({ "action": "model_loaded", "product_id": id }),
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
}

#[tokio::test]
async fn unknown_action_is_rejected() {
    let app = TestApp::spawn().await;
    let id = app.create_product("Chair").await;

    let res = app
        .post_json(
            routes::AR_TRACK,
            &json!({ "action": "teleported", "product_id": id }),
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app
        .post_json(
            routes::AR_TRACK,
            &json!({ "action": "model_error", "product_id": 4242 }),
        )
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.code(), "NOT_FOUND");
}
