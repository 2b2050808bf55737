use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use botkeep::api::AppState;
use botkeep::config::Config;
use botkeep::db::{MemoryStore, Repository};
use botkeep::models::{Bot, User};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn test_config() -> Config {
    let mut config = Config::default();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.observability.metrics_enabled = false;
    config
}

async fn spawn_app_with(config: Config) -> (Arc<AppState>, Router) {
    let state = botkeep::api::create_app_state(config, Arc::new(MemoryStore::new()), None)
        .expect("Failed to create app state");

    state.auth().register("alice", "secret").await.unwrap();
    state.auth().register("bob", "hunter2").await.unwrap();

    let router = botkeep::api::router(state.clone());
    (state, router)
}

async fn spawn_app() -> Router {
    spawn_app_with(test_config()).await.1
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={username}&password={password}")))
        .unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(login_request(username, password))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn bot_json(id: &str) -> Value {
    json!({
        "bot_id": id,
        "token": format!("tg-token-{id}"),
        "state": {"phase": "idle", "chat": "42"},
        "config": {"interval": 30, "enabled": true, "owners": ["x", "y"], "extra": null}
    })
}

#[tokio::test]
async fn test_index() {
    let app = spawn_app().await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!("Welcome!"));
}

#[tokio::test]
async fn test_login_and_me() {
    let app = spawn_app().await;
    let token = login(&app, "alice", "secret").await;

    let response = app
        .clone()
        .oneshot(authed("GET", "/me", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["login"], "alice");
    assert_eq!(body["bots"], "[]");
    assert!(body["password"].as_str().unwrap().starts_with("$argon2id$"));

    let response = app
        .clone()
        .oneshot(authed("GET", "/me", "not-a-token", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    assert_eq!(
        body_json(response).await["detail"],
        "Could not validate credentials"
    );
}

#[tokio::test]
async fn test_login_failures_are_identical() {
    let app = spawn_app().await;

    let wrong_password = app
        .clone()
        .oneshot(login_request("alice", "secreT"))
        .await
        .unwrap();
    let unknown_user = app
        .clone()
        .oneshot(login_request("mallory", "secret"))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.headers().get(header::WWW_AUTHENTICATE),
        unknown_user.headers().get(header::WWW_AUTHENTICATE)
    );

    let a = body_json(wrong_password).await;
    let b = body_json(unknown_user).await;
    assert_eq!(a, b);
    assert_eq!(a["detail"], "Incorrect username or password");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;

    for (method, uri) in [
        ("GET", "/bots"),
        ("POST", "/bots"),
        ("DELETE", "/bots/b1"),
        ("GET", "/me"),
        ("GET", "/metrics"),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_foreign_and_orphaned_tokens_are_rejected() {
    let (state, app) = spawn_app_with(test_config()).await;

    let foreign = botkeep::services::TokenIssuer::new(
        b"some-other-secret",
        std::time::Duration::from_secs(600),
    )
    .issue("alice")
    .unwrap();
    let orphaned = state.auth().tokens().issue("ghost").unwrap();

    for token in [foreign, orphaned] {
        let response = app
            .clone()
            .oneshot(authed("GET", "/me", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["detail"],
            "Could not validate credentials"
        );
    }
}

#[tokio::test]
async fn test_bot_lifecycle() {
    let app = spawn_app().await;
    let token = login(&app, "alice", "secret").await;

    let response = app
        .clone()
        .oneshot(authed("POST", "/bots", &token, Some(bot_json("b1"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, bot_json("b1"));

    // same id again
    let response = app
        .clone()
        .oneshot(authed("POST", "/bots", &token, Some(bot_json("b1"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["detail"],
        "Bot with id b1 already exists"
    );

    // public lookup, no token
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/bots/b1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, bot_json("b1"));

    let response = app
        .clone()
        .oneshot(authed("GET", "/me", &token, None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["bots"], r#"["b1"]"#);

    let response = app
        .clone()
        .oneshot(authed("DELETE", "/bots/b1", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["bot_id"], "b1");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/bots/b1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(authed("DELETE", "/bots/b1", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bot_listing_is_per_owner() {
    let app = spawn_app().await;
    let alice = login(&app, "alice", "secret").await;
    let bob = login(&app, "bob", "hunter2").await;

    for (token, id) in [(&alice, "a1"), (&bob, "b1"), (&alice, "a2")] {
        let response = app
            .clone()
            .oneshot(authed("POST", "/bots/", token, Some(bot_json(id))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(authed("GET", "/bots", &alice, None))
        .await
        .unwrap();
    let ids: Vec<String> = body_json(response)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["bot_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["a1", "a2"]);

    let response = app
        .clone()
        .oneshot(authed("GET", "/bots/", &bob, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["bot_id"], "b1");
}

#[tokio::test]
async fn test_invalid_bot_id_is_rejected() {
    let app = spawn_app().await;
    let token = login(&app, "alice", "secret").await;

    let response = app
        .clone()
        .oneshot(authed("POST", "/bots", &token, Some(bot_json(""))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bot_without_state_or_config_is_rejected() {
    let app = spawn_app().await;
    let token = login(&app, "alice", "secret").await;

    for body in [
        json!({"bot_id": "b1", "token": "t"}),
        json!({"bot_id": "b1", "token": "t", "state": {}}),
        json!({"bot_id": "b1", "token": "t", "config": {}}),
    ] {
        let response = app
            .clone()
            .oneshot(authed("POST", "/bots", &token, Some(body)))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/bots/b1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_private_bot_lookup() {
    let mut config = test_config();
    config.server.public_bot_lookup = false;
    let (_, app) = spawn_app_with(config).await;
    let token = login(&app, "alice", "secret").await;

    app.clone()
        .oneshot(authed("POST", "/bots", &token, Some(bot_json("b1"))))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/bots/b1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(authed("GET", "/bots/b1", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_and_trailing_slash_routes() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");

    let token = login(&app, "bob", "hunter2").await;
    let response = app
        .clone()
        .oneshot(authed("GET", "/me/", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["login"], "bob");
}

#[tokio::test]
async fn test_cors_preflight_is_open() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/bots")
                .header(header::ORIGIN, "https://example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

/// Serves nothing and fails every call, like a store whose database is gone.
struct UnreachableStore;

#[async_trait::async_trait]
impl Repository for UnreachableStore {
    async fn find_user_by_login(&self, _login: &str) -> anyhow::Result<Option<User>> {
        anyhow::bail!("connection refused")
    }

    async fn insert_user(&self, _user: &User) -> anyhow::Result<bool> {
        anyhow::bail!("connection refused")
    }

    async fn find_bot_by_id(&self, _bot_id: &str) -> anyhow::Result<Option<Bot>> {
        anyhow::bail!("connection refused")
    }

    async fn list_bots_by_owner(&self, _owner_login: &str) -> anyhow::Result<Vec<Bot>> {
        anyhow::bail!("connection refused")
    }

    async fn insert_bot(&self, _bot: &Bot) -> anyhow::Result<bool> {
        anyhow::bail!("connection refused")
    }

    async fn delete_bot(&self, _bot_id: &str) -> anyhow::Result<Option<Bot>> {
        anyhow::bail!("connection refused")
    }

    async fn ping(&self) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }
}

#[tokio::test]
async fn test_health_reports_unreachable_store() {
    let state =
        botkeep::api::create_app_state(test_config(), Arc::new(UnreachableStore), None).unwrap();
    let app = botkeep::api::router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"detail": "A database error occurred"})
    );
}
