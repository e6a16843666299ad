#![allow(dead_code)]

use api::routes::routes;
use api::state::AppState;
use axum::{
    Router,
    body::Body,
    http::{Request, header::{CONTENT_TYPE, COOKIE, SET_COOKIE}},
    response::Response,
};
use db::models::user::{self, Role};
use db::test_utils::setup_test_db;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use services::outbox::MemoryOutbox;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use util::events::EventBroadcaster;

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub outbox: MemoryOutbox,
    pub events: EventBroadcaster,
    /// Keeps the upload directory alive for the test.
    pub uploads: TempDir,
}

pub async fn make_test_app() -> TestApp {
    make_test_app_with(MemoryOutbox::new()).await
}

pub async fn make_test_app_with(outbox: MemoryOutbox) -> TestApp {
    let db = setup_test_db().await;
    let uploads = tempfile::tempdir().expect("tempdir");
    let events = EventBroadcaster::new();
    let state = AppState::new(
        db.clone(),
        events.clone(),
        Arc::new(outbox.clone()),
        uploads.path(),
    );
    let router = Router::new().nest("/api", routes(state));
    TestApp {
        router,
        db,
        outbox,
        events,
        uploads,
    }
}

impl TestApp {
    pub async fn user(&self, email: &str, role: Role) -> user::Model {
        user::Model::create(&self.db, email, "Test", "User", role, PASSWORD)
            .await
            .expect("create user")
    }

    /// Logs in and returns the `name=value` cookie pair.
    pub async fn login(&self, email: &str) -> String {
        let res = self
            .send(json_request(
                "POST",
                "/api/auth/login",
                None,
                serde_json::json!({ "email": email, "password": PASSWORD }),
            ))
            .await;
        assert_eq!(res.status(), 200, "login failed for {email}");
        session_cookie_pair(&res).expect("session cookie")
    }

    /// Creates a user and logs them in.
    pub async fn signed_in(&self, email: &str, role: Role) -> (user::Model, String) {
        let u = self.user(email, role).await;
        let cookie = self.login(email).await;
        (u, cookie)
    }

    pub async fn send(&self, req: Request<Body>) -> Response {
        self.router.clone().oneshot(req).await.unwrap()
    }
}

pub fn session_cookie_pair(res: &Response) -> Option<String> {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.split(';').next().map(str::to_owned))
}

pub fn request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

pub async fn get_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Creates a ticket through the API and returns its id.
pub async fn create_ticket(app: &TestApp, cookie: &str, title: &str) -> i64 {
    let res = app
        .send(json_request(
            "POST",
            "/api/tickets",
            Some(cookie),
            serde_json::json!({
                "title": title,
                "description": format!("{title} details"),
                "category": "hardware",
                "priority": "high",
            }),
        ))
        .await;
    assert_eq!(res.status(), 201);
    get_json_body(res).await["data"]["id"].as_i64().unwrap()
}
