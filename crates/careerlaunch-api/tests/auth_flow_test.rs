//! 인증 흐름 통합 테스트.
//!
//! 전체 라우터(`create_app`)에 요청을 보내 다음을 검증합니다:
//! - 가입 → 로그인 → 내 프로필
//! - 로그인 실패 응답의 동일성
//! - Access/Refresh Token 만료 경계 (고정 시계)
//! - 토큰 종류 혼용 거부
//! - 갱신 시 최신 역할 반영
//! - 프로필 수정 (이메일/역할 불변)
//! - 개발/운영 모드의 500 응답 본문

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use careerlaunch_api::repository::{InMemoryStore, UserRepository};
use careerlaunch_api::state::{
    create_test_state, AppState, TEST_ACCESS_SECRET, TEST_BCRYPT_COST, TEST_REFRESH_SECRET,
};
use careerlaunch_api::create_app;
use careerlaunch_core::{
    AuthConfig, BoardError, BoardResult, Environment, FixedClock, NewUser, ProfileUpdate, Role,
    User,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// 테스트 헬퍼 함수
// ============================================================================

fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()))
}

fn test_app(clock: Arc<FixedClock>) -> Router {
    create_app(Arc::new(create_test_state(clock).unwrap()))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, email: &str, role: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": email,
            "password": "correct horse battery staple",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body
}

fn token<'a>(body: &'a Value, field: &str) -> &'a str {
    body[field].as_str().unwrap()
}

// ============================================================================
// 가입/로그인
// ============================================================================

#[tokio::test]
async fn test_register_login_and_fetch_profile() {
    let app = test_app(fixed_clock());

    let registered = register(&app, "  Ada@Example.COM ", "candidate").await;
    assert_eq!(registered["user"]["email"], "ada@example.com");
    assert_eq!(registered["user"]["role"], "candidate");
    assert!(registered["user"].get("passwordHash").is_none());
    assert!(registered["accessToken"].is_string());
    assert!(registered["refreshToken"].is_string());

    let (status, login) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ADA@example.com", "password": "correct horse battery staple" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user"]["id"], registered["user"]["id"]);

    let (status, me) = send(
        &app,
        Method::GET,
        "/users/me",
        Some(token(&login, "accessToken")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["firstName"], "Ada");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = test_app(fixed_clock());
    register(&app, "ada@example.com", "candidate").await;

    let (unknown_status, unknown_body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "whatever" })),
    )
    .await;
    let (wrong_status, wrong_body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong password" })),
    )
    .await;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_body, wrong_body);
    assert_eq!(wrong_body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_duplicate_email_is_case_insensitive() {
    let app = test_app(fixed_clock());
    register(&app, "ada@example.com", "candidate").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "firstName": "Other",
            "lastName": "Person",
            "email": "ADA@EXAMPLE.COM",
            "password": "another password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_EMAIL");
}

/// 이메일 사전 검사를 항상 통과시키는 저장소.
///
/// 동시 가입처럼 사전 검사와 생성 사이에 같은 이메일이 들어온 경우를 재현합니다.
struct PrecheckBlindUsers {
    inner: InMemoryStore,
}

#[async_trait]
impl UserRepository for PrecheckBlindUsers {
    async fn find_by_email(&self, _email: &str) -> BoardResult<Option<User>> {
        Ok(None)
    }

    async fn find_by_id(&self, id: Uuid) -> BoardResult<Option<User>> {
        UserRepository::find_by_id(&self.inner, id).await
    }

    async fn create(&self, user: NewUser) -> BoardResult<User> {
        UserRepository::create(&self.inner, user).await
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> BoardResult<Option<User>> {
        self.inner.update_profile(id, update).await
    }
}

#[tokio::test]
async fn test_store_uniqueness_wins_when_precheck_misses() {
    let mut state = create_test_state(fixed_clock()).unwrap();
    state.users = Arc::new(PrecheckBlindUsers {
        inner: InMemoryStore::new(),
    });
    let app = create_app(Arc::new(state));

    register(&app, "A@x.com", "candidate").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "firstName": "Other",
            "lastName": "Person",
            "email": "a@x.com",
            "password": "another password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_EMAIL");
    assert_eq!(body["error"], "Email already in use");
}

#[tokio::test]
async fn test_register_reports_missing_fields() {
    let app = test_app(fixed_clock());

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "ada@example.com", "firstName": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["details"]["missing"],
        json!(["firstName", "lastName", "password"])
    );
}

#[tokio::test]
async fn test_register_rejects_unknown_role_and_bad_email() {
    let app = test_app(fixed_clock());

    for (email, role) in [("ada@example.com", "admin"), ("not-an-email", "candidate")] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": email,
                "password": "pw",
                "role": role,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app(fixed_clock());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// 프로필 수정
// ============================================================================

#[tokio::test]
async fn test_profile_update_keeps_email_and_role() {
    let app = test_app(fixed_clock());
    let registered = register(&app, "ada@example.com", "candidate").await;
    let access = token(&registered, "accessToken");

    let (status, updated) = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(access),
        Some(json!({ "school": " KAIST ", "email": "x@y.com", "role": "recruiter" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["user"]["school"], "KAIST");

    let (status, me) = send(&app, Method::GET, "/users/me", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["school"], "KAIST");
    assert_eq!(me["user"]["email"], "ada@example.com");
    assert_eq!(me["user"]["role"], "candidate");
    assert_eq!(me["user"]["firstName"], "Ada");
}

#[tokio::test]
async fn test_profile_update_rejects_empty_and_unauthenticated() {
    let app = test_app(fixed_clock());
    let registered = register(&app, "ada@example.com", "candidate").await;
    let access = token(&registered, "accessToken");

    let (status, body) = send(&app, Method::PATCH, "/users/me", Some(access), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(access),
        Some(json!({ "lastName": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/users/me",
        None,
        Some(json!({ "school": "KAIST" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

// ============================================================================
// 토큰 만료와 갱신
// ============================================================================

#[tokio::test]
async fn test_access_token_expires_at_fifteen_minutes() {
    let clock = fixed_clock();
    let app = test_app(clock.clone());
    let registered = register(&app, "ada@example.com", "candidate").await;
    let access = token(&registered, "accessToken");

    clock.advance(Duration::minutes(14) + Duration::seconds(59));
    let (status, _) = send(&app, Method::GET, "/users/me", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::seconds(1));
    let (status, body) = send(&app, Method::GET, "/users/me", Some(access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_refresh_issues_working_access_token() {
    let clock = fixed_clock();
    let app = test_app(clock.clone());
    let registered = register(&app, "ada@example.com", "candidate").await;

    clock.advance(Duration::hours(1));
    let (status, refreshed) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": token(&registered, "refreshToken") })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(refreshed.get("refreshToken").is_none());

    let (status, _) = send(
        &app,
        Method::GET,
        "/users/me",
        Some(token(&refreshed, "accessToken")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_token_expires_after_seven_days() {
    let clock = fixed_clock();
    let app = test_app(clock.clone());
    let registered = register(&app, "ada@example.com", "candidate").await;
    let body = json!({ "refreshToken": token(&registered, "refreshToken") });

    clock.advance(Duration::days(7) - Duration::seconds(1));
    let (status, _) = send(&app, Method::POST, "/auth/refresh", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::seconds(1));
    let (status, rejected) = send(&app, Method::POST, "/auth/refresh", None, Some(body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(rejected["code"], "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_token_kinds_are_not_interchangeable() {
    let app = test_app(fixed_clock());
    let registered = register(&app, "ada@example.com", "candidate").await;

    // Refresh Token으로 보호된 리소스 접근
    let (status, _) = send(
        &app,
        Method::GET,
        "/users/me",
        Some(token(&registered, "refreshToken")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Access Token으로 갱신 요청
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": token(&registered, "accessToken") })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_missing_or_malformed_authorization_header() {
    let app = test_app(fixed_clock());

    let (status, _) = send(&app, Method::GET, "/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/users/me")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/users/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_reflects_current_role() {
    let clock = fixed_clock();
    let store = Arc::new(InMemoryStore::new());
    let state = create_test_state(clock).unwrap().with_store(store.clone());
    let app = create_app(Arc::new(state));

    let registered = register(&app, "ada@example.com", "candidate").await;
    let user_id: Uuid = registered["user"]["id"].as_str().unwrap().parse().unwrap();
    let stale_access = token(&registered, "accessToken");

    assert!(store.set_role(user_id, Role::Recruiter).await);

    let (status, refreshed) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": token(&registered, "refreshToken") })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let job = json!({ "title": "Backend", "type": "FULLTIME", "company": "Acme" });
    let (status, _) = send(&app, Method::POST, "/jobs", Some(stale_access), Some(job.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::POST,
        "/jobs",
        Some(token(&refreshed, "accessToken")),
        Some(job),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

// ============================================================================
// 500 응답
// ============================================================================

/// 항상 실패하는 사용자 저장소.
struct UnavailableUsers;

#[async_trait]
impl UserRepository for UnavailableUsers {
    async fn find_by_email(&self, _email: &str) -> BoardResult<Option<User>> {
        Err(BoardError::Database("connection refused".to_string()))
    }

    async fn find_by_id(&self, _id: Uuid) -> BoardResult<Option<User>> {
        Err(BoardError::Database("connection refused".to_string()))
    }

    async fn create(&self, _user: NewUser) -> BoardResult<User> {
        Err(BoardError::Database("connection refused".to_string()))
    }

    async fn update_profile(&self, _id: Uuid, _update: ProfileUpdate) -> BoardResult<Option<User>> {
        Err(BoardError::Database("connection refused".to_string()))
    }
}

async fn login_against_broken_store(environment: Environment) -> (StatusCode, Value) {
    let auth = AuthConfig::new(TEST_ACCESS_SECRET, TEST_REFRESH_SECRET)
        .with_bcrypt_cost(TEST_BCRYPT_COST);
    let mut state = AppState::new(&auth, environment, fixed_clock()).unwrap();
    state.users = Arc::new(UnavailableUsers);
    let app = create_app(Arc::new(state));

    send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "pw" })),
    )
    .await
}

#[tokio::test]
async fn test_development_500_includes_error_message() {
    let (status, body) = login_against_broken_store(Environment::Development).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_production_500_hides_error_message() {
    let (status, body) = login_against_broken_store(Environment::Production).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Server error");
}
