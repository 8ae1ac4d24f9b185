use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::Utc;
use quill_api::auth::{PasswordAuthority, SessionTokenIssuer};
use quill_api::config::Config;
use quill_api::router::{QuillState, quill_router};
use tower::ServiceExt;

const SECRET: &str = "router-test-secret";

async fn app(jwt_secret: Option<&str>, endpoint: Option<&str>) -> Router {
    let cfg = Config {
        cluster_endpoint: endpoint.map(str::to_string),
        jwt_secret: jwt_secret.map(str::to_string),
        ..Config::default()
    };
    let state = QuillState::from_config(&cfg).await;
    quill_router(state)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
    let resp = app.oneshot(req).await.expect("request failed");
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body = String::from_utf8(body.to_vec()).expect("response body was not utf-8");
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .expect("failed to build request")
}

#[tokio::test]
async fn health_is_ok_without_database() {
    let (status, body) = send(app(None, None).await, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""status":"ok""#));
}

#[tokio::test]
async fn out_of_range_page_arguments_are_bad_requests() {
    for uri in [
        "/api/public/blog-entries?pageNumber=0",
        "/api/public/blog-entries?pageSize=0",
        "/api/public/blog-entry-summaries?pageSize=101",
    ] {
        let (status, body) = send(app(None, None).await, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body.contains(r#""code":"INVALID_ARGUMENT""#));
    }
}

#[tokio::test]
async fn create_requires_session() {
    let payload = r#"{"title":"t","content":"c","author":"a"}"#;
    let (status, body) = send(
        app(Some(SECRET), None).await,
        post_json("/api/blog-entries", payload),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains(r#""code":"UNAUTHORIZED""#));

    let mut req = post_json("/api/blog-entries", payload);
    req.headers_mut()
        .insert("authorization", "Bearer not-a-session".parse().unwrap());
    let (status, _) = send(app(Some(SECRET), None).await, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_session_is_reported() {
    let issued = Utc::now() - chrono::Duration::hours(25);
    let token = SessionTokenIssuer::new(SECRET.as_bytes())
        .issue("ada", issued)
        .unwrap();

    let mut req = post_json(
        "/api/blog-entries",
        r#"{"title":"t","content":"c","author":"a"}"#,
    );
    req.headers_mut()
        .insert("authorization", format!("Bearer {token}").parse().unwrap());
    let (status, body) = send(app(Some(SECRET), None).await, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains(r#""code":"TOKEN_EXPIRED""#));
}

#[tokio::test]
async fn valid_session_reaches_the_database_layer() {
    let token = SessionTokenIssuer::new(SECRET.as_bytes())
        .issue("ada", Utc::now())
        .unwrap();

    let mut req = post_json(
        "/api/blog-entries",
        r#"{"title":"t","content":"c","author":"a"}"#,
    );
    req.headers_mut()
        .insert("authorization", format!("Bearer {token}").parse().unwrap());
    let (status, body) = send(app(Some(SECRET), None).await, req).await;
    // authenticated, but no cluster is configured
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains(r#""code":"INTERNAL_ERROR""#));
}

#[tokio::test]
async fn missing_endpoint_is_a_generic_server_error() {
    let (status, body) = send(app(None, None).await, get("/api/public/blog-entries/7")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Failed to process the request."));
    assert!(!body.contains("CLUSTER_ENDPOINT"));
}

#[tokio::test]
async fn login_without_secret_fails_closed() {
    let (status, body) = send(
        app(None, Some("cluster.dsql.us-east-1.on.aws")).await,
        post_json("/api/login", r#"{"username":"ada","password":"pw"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("JWT_SECRET"));
}

#[tokio::test]
async fn register_rejects_empty_password() {
    let (status, body) = send(
        app(Some(SECRET), None).await,
        post_json("/api/register", r#"{"username":"ada","password":""}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Password cannot be empty."));
}

#[tokio::test]
async fn state_can_be_built_with_explicit_parts() {
    let cfg = Config::default();
    let default_state = QuillState::from_config(&cfg).await;
    assert!(default_state.factory().endpoint().is_none());

    let state = QuillState::new(
        std::sync::Arc::new(quill_api::db::ConnectionFactory::new(
            None,
            quill_api::aws::AwsCredentialResolver::load("eu-west-1").await,
            quill_api::aws::ConnectionTokenSigner::new("eu-west-1", cfg.token_validity()),
        )),
        PasswordAuthority::default(),
        None,
    );
    let (status, _) = send(quill_router(state), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}
