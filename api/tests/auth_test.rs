mod helpers;

use axum::http::{StatusCode, header::SET_COOKIE};
use db::models::user::Role;
use helpers::{get_json_body, json_request, make_test_app, request};
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let app = make_test_app().await;
    let res = app.send(request("GET", "/api/health", None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let json = get_json_body(res).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], "OK");
}

#[tokio::test]
async fn test_login_sets_http_only_cookie() {
    let app = make_test_app().await;
    app.user("alice@example.com", Role::EndUser).await;

    let res = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "Alice@Example.com", "password": "password123" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_owned();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let json = get_json_body(res).await;
    assert_eq!(json["message"], "Login successful");
    assert_eq!(json["data"]["email"], "alice@example.com");
    assert_eq!(json["data"]["role"], "end_user");
    assert!(json["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let app = make_test_app().await;
    app.user("bob@example.com", Role::EndUser).await;

    for (email, password) in [
        ("bob@example.com", "wrong-password"),
        ("nobody@example.com", "password123"),
    ] {
        let res = app
            .send(json_request(
                "POST",
                "/api/auth/login",
                None,
                json!({ "email": email, "password": password }),
            ))
            .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let json = get_json_body(res).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INVALID_CREDENTIALS");
    }
}

#[tokio::test]
async fn test_login_validates_email_format() {
    let app = make_test_app().await;
    let res = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "not-an-email", "password": "x" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = get_json_body(res).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_current_user_requires_session() {
    let app = make_test_app().await;
    let res = app.send(request("GET", "/api/auth/user", None)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let json = get_json_body(res).await;
    assert_eq!(json["code"], "UNAUTHENTICATED");

    let res = app
        .send(request("GET", "/api/auth/user", Some("helpdesk_sid=bogus")))
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_current_user_and_logout() {
    let app = make_test_app().await;
    let (user, cookie) = app.signed_in("carol@example.com", Role::ItStaff).await;

    let res = app.send(request("GET", "/api/auth/user", Some(&cookie))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let json = get_json_body(res).await;
    assert_eq!(json["data"]["id"], user.id);
    assert_eq!(json["data"]["role"], "it_staff");

    let res = app.send(request("POST", "/api/auth/logout", Some(&cookie))).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.send(request("GET", "/api/auth/user", Some(&cookie))).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_profile_and_theme() {
    let app = make_test_app().await;
    let (_, cookie) = app.signed_in("dave@example.com", Role::EndUser).await;

    let res = app
        .send(json_request(
            "PATCH",
            "/api/auth/user",
            Some(&cookie),
            json!({ "firstName": "David", "theme": "dark" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let json = get_json_body(res).await;
    assert_eq!(json["data"]["firstName"], "David");
    assert_eq!(json["data"]["theme"], "dark");

    let res = app
        .send(json_request(
            "PATCH",
            "/api/auth/user",
            Some(&cookie),
            json!({ "theme": "neon" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_change_password() {
    let app = make_test_app().await;
    let (_, cookie) = app.signed_in("erin@example.com", Role::EndUser).await;

    let res = app
        .send(json_request(
            "POST",
            "/api/auth/change-password",
            Some(&cookie),
            json!({ "currentPassword": "wrong", "newPassword": "brand-new-pass" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .send(json_request(
            "POST",
            "/api/auth/change-password",
            Some(&cookie),
            json!({ "currentPassword": "password123", "newPassword": "brand-new-pass" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "erin@example.com", "password": "brand-new-pass" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_login_body_uses_error_envelope() {
    let app = make_test_app().await;
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"email\": \"a@example.com\", "))
        .unwrap();
    let res = app.send(req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = get_json_body(res).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["message"].as_str().is_some_and(|m| !m.is_empty()));
}
