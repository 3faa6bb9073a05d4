//! Integration tests driving the AppDeck router in-process.

use appdeck::api::{self, AppState};
use appdeck::catalog::Catalog;
use appdeck::config::Config;
use appdeck::session;
use appdeck::storage::{FilesystemBlobStore, FilesystemStore};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const SECRET: &str = "abc123";

/// Router + the tempdir backing it (kept alive for the test's duration).
struct TestApp {
    router: Router,
    _data_dir: TempDir,
}

async fn test_app(admin_secret: Option<&str>) -> TestApp {
    let data_dir = TempDir::new().expect("failed to create temp dir");

    let config = Config {
        admin_secret: admin_secret.map(|s| s.to_string()),
        data_dir: data_dir.path().to_path_buf(),
        ..Config::default()
    };

    let store = Arc::new(
        FilesystemStore::new(config.data_dir.clone())
            .await
            .expect("store init"),
    );
    let icons = Arc::new(
        FilesystemBlobStore::new(config.data_dir.clone())
            .await
            .expect("blob store init"),
    );
    let catalog = Arc::new(Catalog::new(store));

    let state = Arc::new(AppState {
        config: Arc::new(config),
        catalog,
        icons,
    });

    TestApp {
        router: api::router(state),
        _data_dir: data_dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> axum::response::Response {
    router.clone().oneshot(request).await.expect("request failed")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn login_request(secret: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(r#"{{"secretKey":"{}"}}"#, secret)))
        .unwrap()
}

/// Log in and return the session cookie pair (`admin_session=...`).
async fn login(router: &Router) -> String {
    let response = send(router, login_request(SECRET)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set the session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

fn json_request(method: &str, uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn draft_json(name: &str, zone: &str) -> String {
    format!(
        r#"{{"name":"{}","url":"https://example.com/{}","iconUrl":"/icons/{}.png","zone":"{}"}}"#,
        name, name, name, zone
    )
}

#[tokio::test]
async fn test_login_with_wrong_secret_is_unauthorized() {
    let app = test_app(Some(SECRET)).await;
    let response = send(&app.router, login_request("not-the-secret")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_with_empty_secret_is_bad_request() {
    let app = test_app(Some(SECRET)).await;
    let response = send(&app.router, login_request("")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_without_configured_secret_is_server_error() {
    let app = test_app(None).await;
    let response = send(&app.router, login_request(SECRET)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_login_sets_session_cookie_with_expected_attributes() {
    let app = test_app(Some(SECRET)).await;
    let response = send(&app.router, login_request(SECRET)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("admin_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Max-Age=86400"));
}

#[tokio::test]
async fn test_auth_check_round_trip() {
    let app = test_app(Some(SECRET)).await;

    // No cookie: not authenticated but still 200.
    let response = send(
        &app.router,
        Request::builder()
            .uri("/api/auth/check")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["authenticated"], false);

    let cookie = login(&app.router).await;
    let response = send(
        &app.router,
        Request::builder()
            .uri("/api/auth/check")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(json_body(response).await["authenticated"], true);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = test_app(Some(SECRET)).await;
    let response = send(
        &app.router,
        Request::builder()
            .method("POST")
            .uri("/api/auth/logout")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("admin_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_admin_route_without_session_redirects_to_login() {
    let app = test_app(Some(SECRET)).await;
    let response = send(
        &app.router,
        Request::builder()
            .method("POST")
            .uri("/admin/api/apps/normalize")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert!(response.status().is_redirection());
    let location = response.headers().get(header::LOCATION).unwrap();
    assert_eq!(location, "/?showLogin=true");
}

#[tokio::test]
async fn test_admin_route_with_expired_session_redirects_and_clears_cookie() {
    let app = test_app(Some(SECRET)).await;

    // Token issued 25 hours ago.
    let old = session::now_millis() - 25 * 60 * 60 * 1000;
    let stale = format!("admin_session={}", session::issue_token(SECRET, old));

    let response = send(
        &app.router,
        Request::builder()
            .method("POST")
            .uri("/admin/api/apps/normalize")
            .header(header::COOKIE, &stale)
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert!(response.status().is_redirection());
    let location = response.headers().get(header::LOCATION).unwrap();
    assert_eq!(location, "/?showLogin=true&expired=true");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("admin_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_garbage_cookie_outside_admin_prefix_is_ignored() {
    let app = test_app(Some(SECRET)).await;
    let response = send(
        &app.router,
        Request::builder()
            .uri("/health")
            .header(header::COOKIE, "admin_session=garbage!!!")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_crud_and_reorder_flow() {
    let app = test_app(Some(SECRET)).await;
    let cookie = login(&app.router).await;

    // Add three apps; orders are assigned 0, 1, 2.
    let mut ids = Vec::new();
    for name in ["alpha", "beta", "gamma"] {
        let response = send(
            &app.router,
            json_request(
                "POST",
                "/admin/api/apps",
                &cookie,
                &draft_json(name, "both"),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        ids.push(body["id"].as_str().unwrap().to_string());
    }

    // Public list shows them in insertion order.
    let response = send(
        &app.router,
        Request::builder()
            .uri("/api/apps")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let names: Vec<&str> = body["apps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);

    // Move beta up: alpha and beta swap.
    let response = send(
        &app.router,
        json_request(
            "POST",
            &format!("/admin/api/apps/{}/move", ids[1]),
            &cookie,
            r#"{"direction":"up"}"#,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Moving the new first record up again is a quiet no-op.
    let response = send(
        &app.router,
        json_request(
            "POST",
            &format!("/admin/api/apps/{}/move", ids[1]),
            &cookie,
            r#"{"direction":"up"}"#,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The next list reflects the swap immediately: the mutation
    // invalidated the snapshot cache.
    let response = send(
        &app.router,
        Request::builder()
            .uri("/api/apps")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let body = json_body(response).await;
    let names: Vec<&str> = body["apps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["beta", "alpha", "gamma"]);

    // Update gamma.
    let response = send(
        &app.router,
        json_request(
            "PUT",
            &format!("/admin/api/apps/{}", ids[2]),
            &cookie,
            r#"{"name":"Gamma Classroom","isEnabled":false}"#,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Delete alpha.
    let response = send(
        &app.router,
        json_request(
            "DELETE",
            &format!("/admin/api/apps/{}", ids[0]),
            &cookie,
            "",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app.router,
        Request::builder()
            .uri("/api/apps")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let body = json_body(response).await;
    let apps = body["apps"].as_array().unwrap();
    assert_eq!(apps.len(), 2);
    assert_eq!(apps[0]["name"], "beta");
    assert_eq!(apps[1]["name"], "Gamma Classroom");
    assert_eq!(apps[1]["isEnabled"], false);
}

#[tokio::test]
async fn test_zone_filter_includes_both() {
    let app = test_app(Some(SECRET)).await;
    let cookie = login(&app.router).await;

    for (name, zone) in [
        ("reading", "student"),
        ("gradebook", "teacher"),
        ("calendar", "both"),
    ] {
        let response = send(
            &app.router,
            json_request("POST", "/admin/api/apps", &cookie, &draft_json(name, zone)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(
        &app.router,
        Request::builder()
            .uri("/api/apps?zone=student")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let body = json_body(response).await;
    let names: Vec<&str> = body["apps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["reading", "calendar"]);
}

#[tokio::test]
async fn test_move_unknown_app_is_not_found() {
    let app = test_app(Some(SECRET)).await;
    let cookie = login(&app.router).await;

    let response = send(
        &app.router,
        json_request(
            "POST",
            "/admin/api/apps/ghost/move",
            &cookie,
            r#"{"direction":"down"}"#,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_icon_upload_and_delete() {
    let app = test_app(Some(SECRET)).await;
    let cookie = login(&app.router).await;

    let response = send(
        &app.router,
        Request::builder()
            .method("POST")
            .uri("/admin/api/icons?filename=logo.png")
            .header(header::CONTENT_TYPE, "image/png")
            .header(header::COOKIE, &cookie)
            .body(Body::from(&b"fake png bytes"[..]))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let url = body["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/icons/"));

    let response = send(
        &app.router,
        Request::builder()
            .method("DELETE")
            .uri(format!(
                "/admin/api/icons?url={}",
                url.replace('/', "%2F")
            ))
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
