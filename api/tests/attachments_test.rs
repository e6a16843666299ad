mod helpers;

use axum::{
    body::Body,
    http::{
        Request, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE},
    },
};
use db::models::user::Role;
use helpers::{create_ticket, get_json_body, make_test_app, request};

const BOUNDARY: &str = "helpdesk-test-boundary";

fn multipart_upload(uri: &str, cookie: &str, parts: &[(&str, &str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (file_name, content_type, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(COOKIE, cookie)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_and_download_round_trip() {
    let app = make_test_app().await;
    let (user, cookie) = app.signed_in("user@example.com", Role::EndUser).await;
    let id = create_ticket(&app, &cookie, "Screenshot of error").await;
    let uri = format!("/api/tickets/{id}/attachments");

    let res = app
        .send(multipart_upload(
            &uri,
            &cookie,
            &[("error log.txt", "text/plain", &b"stack trace here"[..])],
        ))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = get_json_body(res).await;
    let uploaded = &json["data"][0];
    assert_eq!(uploaded["originalName"], "error log.txt");
    assert_eq!(uploaded["sizeBytes"], 16);
    assert_eq!(uploaded["mimeType"], "text/plain");
    assert_eq!(uploaded["uploadedBy"], user.id);
    let attachment_id = uploaded["id"].as_i64().unwrap();

    let res = app.send(request("GET", &uri, Some(&cookie))).await;
    assert_eq!(get_json_body(res).await["data"].as_array().unwrap().len(), 1);

    let res = app
        .send(request(
            "GET",
            &format!("{uri}/{attachment_id}/download"),
            Some(&cookie),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "text/plain");
    let disposition = res.headers()[CONTENT_DISPOSITION].to_str().unwrap().to_owned();
    assert!(disposition.contains("error log.txt"));
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"stack trace here");
}

#[tokio::test]
async fn test_upload_rejects_disallowed_type_and_empty_body() {
    let app = make_test_app().await;
    let (_, cookie) = app.signed_in("user@example.com", Role::EndUser).await;
    let id = create_ticket(&app, &cookie, "Suspicious attachment").await;
    let uri = format!("/api/tickets/{id}/attachments");

    let res = app
        .send(multipart_upload(
            &uri,
            &cookie,
            &[("setup.exe", "application/x-msdownload", &b"MZ\x90\x00"[..])],
        ))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_json_body(res).await["code"], "VALIDATION_ERROR");

    let res = app.send(multipart_upload(&uri, &cookie, &[])).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_json_body(res).await["message"], "No file provided");
}

#[tokio::test]
async fn test_one_bad_part_stores_nothing() {
    let app = make_test_app().await;
    let (_, cookie) = app.signed_in("user@example.com", Role::EndUser).await;
    let id = create_ticket(&app, &cookie, "Two files").await;
    let uri = format!("/api/tickets/{id}/attachments");

    let res = app
        .send(multipart_upload(
            &uri,
            &cookie,
            &[
                ("notes.txt", "text/plain", &b"all good"[..]),
                ("setup.exe", "application/x-msdownload", &b"MZ\x90\x00"[..]),
            ],
        ))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_json_body(res).await["code"], "VALIDATION_ERROR");

    let res = app.send(request("GET", &uri, Some(&cookie))).await;
    assert!(get_json_body(res).await["data"].as_array().unwrap().is_empty());
    assert!(!util::paths::ticket_dir(app.uploads.path(), id).exists());
}

#[tokio::test]
async fn test_attachments_follow_ticket_visibility() {
    let app = make_test_app().await;
    let (_, owner) = app.signed_in("owner@example.com", Role::EndUser).await;
    let (_, other) = app.signed_in("other@example.com", Role::EndUser).await;
    let (_, staff) = app.signed_in("staff@example.com", Role::ItStaff).await;
    let id = create_ticket(&app, &owner, "Scanner driver").await;
    let uri = format!("/api/tickets/{id}/attachments");

    let res = app
        .send(multipart_upload(&uri, &other, &[("a.txt", "text/plain", &b"hi"[..])]))
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .send(multipart_upload(&uri, &owner, &[("a.txt", "text/plain", &b"hi"[..])]))
        .await;
    let attachment_id = get_json_body(res).await["data"][0]["id"].as_i64().unwrap();

    let res = app
        .send(request("DELETE", &format!("{uri}/{attachment_id}"), Some(&other)))
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .send(request("DELETE", &format!("{uri}/{attachment_id}"), Some(&staff)))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .send(request(
            "GET",
            &format!("{uri}/{attachment_id}/download"),
            Some(&owner),
        ))
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
