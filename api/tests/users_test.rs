mod helpers;

use axum::http::{StatusCode, header::SET_COOKIE};
use db::models::user::Role;
use helpers::{get_json_body, json_request, make_test_app, make_test_app_with, request};
use serde_json::json;
use services::outbox::MemoryOutbox;

#[tokio::test]
async fn test_user_directory_is_role_gated() {
    let app = make_test_app().await;
    let (_, end_user) = app.signed_in("user@example.com", Role::EndUser).await;
    let (_, staff) = app.signed_in("staff@example.com", Role::ItStaff).await;
    let (_, manager) = app.signed_in("manager@example.com", Role::Manager).await;

    let res = app.send(request("GET", "/api/users", Some(&end_user))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let res = app.send(request("GET", "/api/users", Some(&staff))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.send(request("GET", "/api/users", Some(&manager))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(get_json_body(res).await["data"].as_array().unwrap().len(), 3);

    let res = app
        .send(request("GET", "/api/users?role=it_staff", Some(&manager)))
        .await;
    let json = get_json_body(res).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["email"], "staff@example.com");

    let res = app.send(request("GET", "/api/users/staff", Some(&staff))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = app.send(request("GET", "/api/users/staff", Some(&end_user))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .send(json_request(
            "POST",
            "/api/users",
            Some(&manager),
            json!({ "email": "x@example.com", "firstName": "X", "lastName": "Y", "role": "end_user" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_creates_user_with_temporary_password() {
    let app = make_test_app().await;
    let (_, admin) = app.signed_in("admin@example.com", Role::Admin).await;

    let res = app
        .send(json_request(
            "POST",
            "/api/users",
            Some(&admin),
            json!({
                "email": "New.Hire@Example.com",
                "firstName": "New",
                "lastName": "Hire",
                "role": "it_staff"
            }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = get_json_body(res).await;
    assert_eq!(json["data"]["user"]["email"], "new.hire@example.com");
    assert_eq!(json["data"]["user"]["role"], "it_staff");
    assert_eq!(json["data"]["emailSent"], false);
    let temp = json["data"]["temporaryPassword"].as_str().unwrap().to_owned();

    let res = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "new.hire@example.com", "password": temp }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .send(json_request(
            "POST",
            "/api/users",
            Some(&admin),
            json!({ "email": "new.hire@example.com", "firstName": "A", "lastName": "B", "role": "end_user" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(get_json_body(res).await["code"], "CONFLICT");

    assert_eq!(app.outbox.names(), vec!["user_created"]);
}

#[tokio::test]
async fn test_temporary_password_withheld_when_emailed() {
    let app = make_test_app_with(MemoryOutbox::delivering()).await;
    let (_, admin) = app.signed_in("admin@example.com", Role::Admin).await;

    let res = app
        .send(json_request(
            "POST",
            "/api/users",
            Some(&admin),
            json!({ "email": "mailed@example.com", "firstName": "M", "lastName": "E", "role": "end_user" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = get_json_body(res).await;
    assert_eq!(json["data"]["emailSent"], true);
    assert!(json["data"].get("temporaryPassword").is_none());
}

#[tokio::test]
async fn test_deactivation_ends_existing_sessions() {
    let app = make_test_app().await;
    let (_, admin) = app.signed_in("admin@example.com", Role::Admin).await;
    let (user, user_cookie) = app.signed_in("leaver@example.com", Role::EndUser).await;

    let res = app
        .send(json_request(
            "PUT",
            &format!("/api/users/{}/status", user.id),
            Some(&admin),
            json!({ "isActive": false }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(get_json_body(res).await["data"]["isActive"], false);

    let res = app.send(request("GET", "/api/auth/user", Some(&user_cookie))).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().get(SET_COOKIE).is_some());
    assert_eq!(get_json_body(res).await["code"], "ACCOUNT_DEACTIVATED");

    let res = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "leaver@example.com", "password": "password123" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(get_json_body(res).await["code"], "ACCOUNT_DEACTIVATED");
}

#[tokio::test]
async fn test_admin_cannot_lock_themselves_out() {
    let app = make_test_app().await;
    let (admin, cookie) = app.signed_in("admin@example.com", Role::Admin).await;

    let res = app
        .send(json_request(
            "PUT",
            &format!("/api/users/{}/status", admin.id),
            Some(&cookie),
            json!({ "isActive": false }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .send(request("DELETE", &format!("/api/users/{}", admin.id), Some(&cookie)))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .send(json_request(
            "PUT",
            &format!("/api/users/{}", admin.id),
            Some(&cookie),
            json!({ "role": "end_user" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_reset_and_delete_user() {
    let app = make_test_app().await;
    let (_, admin) = app.signed_in("admin@example.com", Role::Admin).await;
    let target = app.user("target@example.com", Role::EndUser).await;
    let uri = format!("/api/users/{}", target.id);

    let res = app
        .send(json_request(
            "PUT",
            &uri,
            Some(&admin),
            json!({ "role": "manager", "lastName": "Promoted" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let json = get_json_body(res).await;
    assert_eq!(json["data"]["role"], "manager");
    assert_eq!(json["data"]["lastName"], "Promoted");

    let res = app
        .send(request("POST", &format!("{uri}/reset-password"), Some(&admin)))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let json = get_json_body(res).await;
    assert!(json["data"]["temporaryPassword"].as_str().is_some());
    assert!(app.outbox.names().contains(&"password_reset"));

    let res = app.send(request("DELETE", &uri, Some(&admin))).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.send(request("GET", &uri, Some(&admin))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
