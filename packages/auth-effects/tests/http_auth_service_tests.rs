//! HttpAuthService against an in-process admin API.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use auth_effects::domains::auth::AuthError;
use auth_effects::kernel::{BaseAuthService, HttpAuthService, SignUpForm};
use auth_effects::Config;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, put};
use axum::{Form, Json, Router};
use serde_json::{json, Value};

// ============================================================================
// Fake admin API
// ============================================================================

/// "CommonClient:password"
const CLIENT_BASIC_AUTH: &str = "Basic Q29tbW9uQ2xpZW50OnBhc3N3b3Jk";
const ACCESS_TOKEN: &str = "token-1";

#[derive(Clone, Default)]
struct FakeApi {
    requests: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl FakeApi {
    fn record(&self, request: &str) {
        self.requests.lock().unwrap().push(request.to_string());
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn issue_token(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    api.record("POST /oauth/token");

    let client_ok = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(CLIENT_BASIC_AUTH);
    if !client_ok {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "unauthorized", "error_description": "Full authentication is required"})),
        )
            .into_response();
    }

    let grant_ok = form.get("grant_type").map(String::as_str) == Some("password");
    let credentials_ok = form.get("username").map(String::as_str) == Some("ada@example.org")
        && form.get("password").map(String::as_str) == Some("secret");
    if !grant_ok || !credentials_ok {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant", "error_description": "Bad credentials"})),
        )
            .into_response();
    }

    Json(json!({"access_token": ACCESS_TOKEN, "token_type": "bearer", "expires_in": 3600}))
        .into_response()
}

async fn revoke_token(State(api): State<FakeApi>, headers: HeaderMap) -> StatusCode {
    api.record("DELETE /oauth/token");
    if bearer(&headers) == Some(ACCESS_TOKEN) {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn register(State(api): State<FakeApi>, Json(body): Json<Value>) -> Response {
    api.record("POST /user/register");
    api.bodies.lock().unwrap().push(body.clone());

    match body["email"].as_str() {
        Some("taken@example.org") => (
            StatusCode::BAD_REQUEST,
            Json(json!({"code": 4, "message": "Email is already in use"})),
        )
            .into_response(),
        Some("confirm@example.org") => StatusCode::OK.into_response(),
        _ => StatusCode::CREATED.into_response(),
    }
}

async fn change_password(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    api.record("PUT /user/me/password");
    api.bodies.lock().unwrap().push(body);

    if bearer(&headers) == Some(ACCESS_TOKEN) {
        StatusCode::OK.into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
    }
}

async fn serve(api: FakeApi) -> SocketAddr {
    let app = Router::new()
        .route("/admin/oauth/token", post(issue_token).delete(revoke_token))
        .route("/admin/user/register", post(register))
        .route("/admin/user/me/password", put(change_password))
        .with_state(api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn service() -> (HttpAuthService, FakeApi) {
    let api = FakeApi::default();
    let addr = serve(api.clone()).await;
    let config = Config::from_vars(|key| match key {
        "FRS_API_URL" => Some(format!("http://{}/admin", addr)),
        _ => None,
    })
    .unwrap();
    (HttpAuthService::new(&config).unwrap(), api)
}

fn form(email: &str) -> SignUpForm {
    SignUpForm {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        password: "secret".to_string(),
        allow_statistics: false,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_login_keeps_access_token() {
    let (service, api) = service().await;

    service.log_in("ada@example.org", "secret").await.unwrap();

    assert_eq!(service.token().as_deref(), Some(ACCESS_TOKEN));
    assert_eq!(api.requests(), vec!["POST /oauth/token"]);
}

#[tokio::test]
async fn test_login_bad_credentials_keeps_error_description() {
    let (service, _api) = service().await;

    let err = service.log_in("ada@example.org", "wrong").await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.error_description(), Some("Bad credentials"));
    assert_eq!(service.token(), None);
}

#[tokio::test]
async fn test_signup_reports_status() {
    let (service, api) = service().await;

    let confirm = service.sign_up(&form("confirm@example.org")).await.unwrap();
    let active = service.sign_up(&form("new@example.org")).await.unwrap();

    assert!(confirm.confirmation_needed());
    assert_eq!(active.status, 201);
    assert!(!active.confirmation_needed());

    let bodies = api.bodies.lock().unwrap().clone();
    assert_eq!(bodies[0]["firstName"], "Ada");
    assert_eq!(bodies[0]["isAllowStatistics"], false);
}

#[tokio::test]
async fn test_signup_in_use_keeps_code() {
    let (service, _api) = service().await;

    let err = service.sign_up(&form("taken@example.org")).await.unwrap_err();

    assert_eq!(err.code(), Some(4));
    assert_eq!(err.error_description(), None);
}

#[tokio::test]
async fn test_change_password_sends_bearer_token() {
    let (service, api) = service().await;

    let anonymous = service.change_password("old", "new").await.unwrap_err();
    match anonymous {
        AuthError::Http { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body.message.as_deref(), Some("Unauthorized"));
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }

    service.log_in("ada@example.org", "secret").await.unwrap();
    service.change_password("old", "new").await.unwrap();

    let bodies = api.bodies.lock().unwrap().clone();
    assert_eq!(bodies[1], json!({"oldPassword": "old", "newPassword": "new"}));
}

#[tokio::test]
async fn test_clear_token_revokes_once() {
    let (service, api) = service().await;
    service.log_in("ada@example.org", "secret").await.unwrap();

    service.clear_user_token().await.unwrap();
    service.clear_user_token().await.unwrap();

    assert_eq!(service.token(), None);
    assert_eq!(
        api.requests(),
        vec!["POST /oauth/token", "DELETE /oauth/token"]
    );
}

#[tokio::test]
async fn test_unreachable_api_is_network_error() {
    // Bind and drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config::from_vars(|key| match key {
        "FRS_API_URL" => Some(format!("http://{}/admin/", addr)),
        _ => None,
    })
    .unwrap();
    let service = HttpAuthService::new(&config).unwrap();

    let err = service.log_in("ada@example.org", "secret").await.unwrap_err();
    assert!(matches!(err, AuthError::Network(_)), "got {:?}", err);
}
