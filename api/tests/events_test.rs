mod helpers;

use axum::http::{StatusCode, header::CONTENT_TYPE};
use db::models::user::Role;
use futures::StreamExt;
use helpers::{json_request, make_test_app, request};
use std::time::Duration;
use tokio::time::timeout;
use util::events::{STAFF_TOPIC, emit, owner_topic};

async fn next_chunk(stream: &mut axum::body::BodyDataStream) -> String {
    let chunk = timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("stream ended")
        .expect("body error");
    String::from_utf8(chunk.to_vec()).unwrap()
}

/// Waits for the next item, returning `None` once the stream has ended.
async fn next_item(stream: &mut axum::body::BodyDataStream) -> Option<String> {
    timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("timed out waiting for the stream")
        .map(|chunk| String::from_utf8(chunk.expect("body error").to_vec()).unwrap())
}

#[tokio::test]
async fn test_event_stream_requires_session() {
    let app = make_test_app().await;
    let res = app.send(request("GET", "/api/events", None)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_receive_staff_topic_frames() {
    let app = make_test_app().await;
    let (_, staff) = app.signed_in("staff@example.com", Role::ItStaff).await;

    let res = app.send(request("GET", "/api/events", Some(&staff))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let mut body = res.into_body().into_data_stream();
    let hello = next_chunk(&mut body).await;
    assert!(hello.contains("retry:"));
    assert!(hello.contains(": connected"));

    let delivered = emit(
        &app.events,
        STAFF_TOPIC,
        "ticket_created",
        &serde_json::json!({ "ticketId": 1 }),
    )
    .await;
    assert_eq!(delivered, 1);

    let frame = next_chunk(&mut body).await;
    assert!(frame.contains("event: ticket_created"));
    assert!(frame.contains("\"ticketId\":1"));
}

#[tokio::test]
async fn test_end_users_listen_on_their_own_topic() {
    let app = make_test_app().await;
    let (user, cookie) = app.signed_in("user@example.com", Role::EndUser).await;

    let res = app.send(request("GET", "/api/events", Some(&cookie))).await;
    assert_eq!(res.status(), StatusCode::OK);

    assert!(app.events.has_topic(&owner_topic(user.id)).await);
    assert!(!app.events.has_topic(STAFF_TOPIC).await);
    drop(res);
}

#[tokio::test]
async fn test_deactivated_staff_stream_stops_delivering() {
    let app = make_test_app().await;
    let (_, admin) = app.signed_in("admin@example.com", Role::Admin).await;
    let (staff, cookie) = app.signed_in("staff@example.com", Role::ItStaff).await;

    let res = app.send(request("GET", "/api/events", Some(&cookie))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let mut body = res.into_body().into_data_stream();
    assert!(next_chunk(&mut body).await.contains(": connected"));

    let res = app
        .send(json_request(
            "PUT",
            &format!("/api/users/{}/status", staff.id),
            Some(&admin),
            serde_json::json!({ "isActive": false }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let delivered = emit(
        &app.events,
        STAFF_TOPIC,
        "ticket_commented",
        &serde_json::json!({ "ticketId": 1, "isInternal": true }),
    )
    .await;
    assert_eq!(delivered, 1);

    assert_eq!(next_item(&mut body).await, None);
}

#[tokio::test]
async fn test_demoted_staff_leave_the_staff_topic() {
    let app = make_test_app().await;
    let (_, admin) = app.signed_in("admin@example.com", Role::Admin).await;
    let (staff, cookie) = app.signed_in("staff@example.com", Role::ItStaff).await;

    let res = app.send(request("GET", "/api/events", Some(&cookie))).await;
    let mut body = res.into_body().into_data_stream();
    next_chunk(&mut body).await;

    let res = app
        .send(json_request(
            "PUT",
            &format!("/api/users/{}", staff.id),
            Some(&admin),
            serde_json::json!({ "role": "end_user" }),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    emit(&app.events, STAFF_TOPIC, "ticket_created", &serde_json::json!({ "ticketId": 2 })).await;
    assert_eq!(next_item(&mut body).await, None);
}
