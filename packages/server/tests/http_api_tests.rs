//! HTTP surface tests: auth gating, deck issuance, decision submission
//! with its gone/forbidden/per-item error semantics.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{create_player, PlayerSpec, TestArea, TestHarness};
use courtmatch_core::domains::auth::JwtService;
use courtmatch_core::server::build_app;
use serde_json::{json, Value};
use test_context::test_context;
use tower::ServiceExt;

const TEST_SECRET: &str = "test_secret_key";
const TEST_ISSUER: &str = "test_issuer";

fn test_app(ctx: &TestHarness) -> (Router, Arc<JwtService>) {
    let jwt = Arc::new(JwtService::new(TEST_SECRET, TEST_ISSUER.to_string()));
    let app = build_app(ctx.db_pool.clone(), ctx.redis.clone(), jwt.clone());
    (app, jwt)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unauthenticated_requests_are_rejected(ctx: &mut TestHarness) {
    let (app, _) = test_app(ctx);

    let response = app.clone().oneshot(get("/me/deck", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get("/me/conversations", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn deck_then_decision_flow(ctx: &mut TestHarness) {
    let (app, jwt) = test_app(ctx);

    let area = TestArea::new(30);
    let actor = create_player("Http1", PlayerSpec::at(&area), &ctx.db_pool)
        .await
        .unwrap();
    let target = create_player("Http2", PlayerSpec::at(&area), &ctx.db_pool)
        .await
        .unwrap();
    let actor_token = jwt
        .create_token(actor, "http1@test.example".to_string())
        .unwrap();
    let target_token = jwt
        .create_token(target, "http2@test.example".to_string())
        .unwrap();

    // Target says YES on the actor first, via their own deck.
    let response = app
        .clone()
        .oneshot(get("/me/deck", Some(&target_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let target_deck = body_json(response).await;
    let card_id = target_deck["cards"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            "/me/decision",
            &target_token,
            &json!({
                "deck_token": target_deck["deck_token"],
                "items": [{ "card_id": card_id, "decision": "YES" }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["results"][0]["matched"], json!(false));

    // Now the actor gets a deck. Cards must not leak raw target ids.
    let response = app
        .clone()
        .oneshot(get("/me/deck", Some(&actor_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let deck = body_json(response).await;
    let cards = deck["cards"].as_array().unwrap();
    assert!(!cards.is_empty());
    for card in cards {
        assert!(card.get("target_id").is_none());
        assert!(card.get("targetId").is_none());
    }

    // The actor's YES closes the loop.
    let card_id = cards[0]["id"].as_str().unwrap();
    let response = app
        .clone()
        .oneshot(post_json(
            "/me/decision",
            &actor_token,
            &json!({
                "deck_token": deck["deck_token"],
                "items": [{ "card_id": card_id, "decision": "YES", "idempotency_key": format!("http-{}", actor) }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let result = &body["results"][0];
    assert_eq!(result["matched"], json!(true));
    assert!(result["match"]["match_id"].is_i64());
    assert!(result["match"]["conversation_id"].is_i64());

    // Both inboxes now show the conversation.
    let response = app
        .oneshot(get("/me/conversations", Some(&actor_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let inbox = body_json(response).await;
    assert_eq!(inbox["conversations"].as_array().unwrap().len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_deck_token_is_gone(ctx: &mut TestHarness) {
    let (app, jwt) = test_app(ctx);
    let actor = create_player("Gone1", PlayerSpec::at(&TestArea::new(33)), &ctx.db_pool)
        .await
        .unwrap();
    let token = jwt
        .create_token(actor, "gone1@test.example".to_string())
        .unwrap();

    let response = app
        .oneshot(post_json(
            "/me/decision",
            &token,
            &json!({
                "deck_token": "not-a-real-token",
                "items": [{ "card_id": "whatever", "decision": "YES" }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GONE);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn another_users_deck_token_is_forbidden(ctx: &mut TestHarness) {
    let (app, jwt) = test_app(ctx);
    let area = TestArea::new(31);
    let owner = create_player("Own1", PlayerSpec::at(&area), &ctx.db_pool)
        .await
        .unwrap();
    let intruder = create_player("Own2", PlayerSpec::at(&area), &ctx.db_pool)
        .await
        .unwrap();
    let owner_token = jwt
        .create_token(owner, "own1@test.example".to_string())
        .unwrap();
    let intruder_token = jwt
        .create_token(intruder, "own2@test.example".to_string())
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/me/deck", Some(&owner_token)))
        .await
        .unwrap();
    let deck = body_json(response).await;

    let response = app
        .oneshot(post_json(
            "/me/decision",
            &intruder_token,
            &json!({
                "deck_token": deck["deck_token"],
                "items": [{ "card_id": "whatever", "decision": "YES" }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn bad_items_fail_per_item_without_blocking_the_rest(ctx: &mut TestHarness) {
    let (app, jwt) = test_app(ctx);
    let area = TestArea::new(32);
    let actor = create_player("Item1", PlayerSpec::at(&area), &ctx.db_pool)
        .await
        .unwrap();
    create_player("Item2", PlayerSpec::at(&area), &ctx.db_pool)
        .await
        .unwrap();
    let token = jwt
        .create_token(actor, "item1@test.example".to_string())
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/me/deck", Some(&token)))
        .await
        .unwrap();
    let deck = body_json(response).await;
    let good_card = deck["cards"][0]["id"].as_str().unwrap();

    let response = app
        .oneshot(post_json(
            "/me/decision",
            &token,
            &json!({
                "deck_token": deck["deck_token"],
                "items": [
                    { "card_id": "no-such-card", "decision": "YES" },
                    { "card_id": good_card, "decision": "MAYBE" },
                    { "card_id": good_card, "decision": "NO" }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    assert!(results[0]["error"].as_str().unwrap().contains("not part"));
    assert!(results[1]["error"].as_str().unwrap().contains("invalid decision"));
    assert_eq!(results[2]["matched"], json!(false));
    assert!(results[2].get("error").is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn preference_update_requires_valid_values(ctx: &mut TestHarness) {
    let (app, jwt) = test_app(ctx);
    let actor = create_player("Pref1", PlayerSpec::at(&TestArea::new(34)), &ctx.db_pool)
        .await
        .unwrap();
    let token = jwt
        .create_token(actor, "pref1@test.example".to_string())
        .unwrap();

    let put = |body: Value, token: String| {
        Request::builder()
            .method("PUT")
            .uri("/me/preference")
            .header("authorization", format!("Bearer {}", token))
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(put(
            json!({
                "game": "CRICKET",
                "partner_gender": "ANY",
                "session_type": "MATCH",
                "max_distance_km": 10
            }),
            token.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(put(
            json!({
                "game": "PICKLEBALL",
                "partner_gender": "ANY",
                "session_type": "MATCH",
                "max_distance_km": 10
            }),
            token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["game"], json!("PICKLEBALL"));
    assert_eq!(body["max_distance_km"], json!(10));
}
