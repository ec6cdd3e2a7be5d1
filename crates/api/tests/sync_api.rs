//! End-to-end tests for the sync action endpoint
//!
//! Each test wires the real router, repositories, and Google adapter against
//! a temp SQLite database and a wiremock Google server.

mod support;

use axum::http::StatusCode;
use chorale_domain::{EventCategory, MemberRole};
use chrono::{Duration, NaiveTime, Utc};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::TestApp;

async fn mock_empty_calendar(google: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(google)
        .await;
}

#[tokio::test]
async fn unknown_action_is_rejected() {
    let app = TestApp::spawn().await;
    let (_member, token) = app.seed_member(MemberRole::Admin);

    let (status, body) =
        app.post_action(json!({ "action": "export_roster" }), Some(&token)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown action");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = TestApp::spawn().await;

    // missing the required action field
    let (status, body) = app.post_raw("{}", Some("application/json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());

    // invalid JSON syntax
    let (status, _) = app.post_raw("{not json", Some("application/json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // empty body with no content type
    let (status, _) = app.post_raw("", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_credentials_are_unauthorized() {
    let app = TestApp::spawn().await;

    let (status, body) = app.full_sync(None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn invalid_bearer_token_is_unauthorized() {
    let app = TestApp::spawn().await;
    let (status, _) = app.full_sync(Some("not-a-real-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_admin_member_is_forbidden_without_touching_provider() {
    let app = TestApp::spawn().await;
    let (member, token) = app.seed_member(MemberRole::Member);
    app.seed_oauth_token(&member.id, false);

    // any provider traffic at all is a failure
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.google)
        .await;

    let (status, _) = app.full_sync(Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn section_leader_is_forbidden() {
    let app = TestApp::spawn().await;
    let (member, token) = app.seed_member(MemberRole::SectionLeader);
    app.seed_oauth_token(&member.id, false);

    let (status, _) = app.full_sync(Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn full_sync_pulls_and_classifies_remote_events() {
    let app = TestApp::spawn().await;
    let (member, token) = app.seed_member(MemberRole::Admin);
    app.seed_oauth_token(&member.id, false);

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "g-rehearsal",
                    "summary": "Tuesday Rehearsal",
                    "location": "Choir Room",
                    "start": { "dateTime": "2026-09-01T19:00:00-04:00" },
                    "end": { "dateTime": "2026-09-01T21:00:00-04:00" }
                },
                {
                    "id": "g-break",
                    "summary": "Spring Break",
                    "start": { "date": "2026-03-09" },
                    "end": { "date": "2026-03-14" }
                }
            ]
        })))
        .mount(&app.google)
        .await;

    let (status, body) = app.full_sync(Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["stats"]["eventsFetched"], 2);
    assert_eq!(body["stats"]["eventsCreatedLocally"], 2);
    assert_eq!(body["stats"]["eventsUpdatedLocally"], 0);
    assert_eq!(body["stats"]["pushFailures"], 0);

    let rehearsal = app.find_by_provider_id("g-rehearsal").await.expect("rehearsal stored");
    assert_eq!(rehearsal.title, "Tuesday Rehearsal");
    assert_eq!(rehearsal.category, EventCategory::Rehearsal);
    assert_eq!(rehearsal.date.to_string(), "2026-09-01");
    assert_eq!(rehearsal.time, NaiveTime::from_hms_opt(19, 0, 0));
    assert!(!rehearsal.all_day);
    assert_eq!(rehearsal.location.as_deref(), Some("Choir Room"));

    let spring_break = app.find_by_provider_id("g-break").await.expect("break stored");
    assert_eq!(spring_break.category, EventCategory::Special);
    assert!(spring_break.all_day);
    assert_eq!(spring_break.time, None);
    assert_eq!(spring_break.date.to_string(), "2026-03-09");
}

#[tokio::test]
async fn second_sync_updates_instead_of_duplicating() {
    let app = TestApp::spawn().await;
    let (member, token) = app.seed_member(MemberRole::Admin);
    app.seed_oauth_token(&member.id, false);

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "g-sectional",
                "summary": "Bass Sectional",
                "start": { "dateTime": "2026-09-05T17:00:00-04:00" },
                "end": { "dateTime": "2026-09-05T18:00:00-04:00" }
            }]
        })))
        .mount(&app.google)
        .await;

    let (status, first) = app.full_sync(Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["stats"]["eventsCreatedLocally"], 1);

    let (status, second) = app.full_sync(Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["stats"]["eventsCreatedLocally"], 0);
    assert_eq!(second["stats"]["eventsUpdatedLocally"], 1);
}

#[tokio::test]
async fn expired_token_is_refreshed_exactly_once() {
    let app = TestApp::spawn().await;
    let (member, token) = app.seed_member(MemberRole::Director);
    app.seed_oauth_token(&member.id, true);

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("refresh_token=stored-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "refreshed-access",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&app.google)
        .await;

    mock_empty_calendar(&app.google).await;

    let (status, body) = app.full_sync(Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn missing_calendar_connection_is_bad_request() {
    let app = TestApp::spawn().await;
    let (_member, token) = app.seed_member(MemberRole::Admin);

    let (status, body) = app.full_sync(Some(&token)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error message").contains("connect"));
}

#[tokio::test]
async fn rejected_refresh_is_bad_request() {
    let app = TestApp::spawn().await;
    let (member, token) = app.seed_member(MemberRole::Admin);
    app.seed_oauth_token(&member.id, true);

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&app.google)
        .await;

    let (status, _) = app.full_sync(Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn provider_read_failure_is_internal_error() {
    let app = TestApp::spawn().await;
    let (member, token) = app.seed_member(MemberRole::Admin);
    app.seed_oauth_token(&member.id, false);

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&app.google)
        .await;

    let (status, _) = app.full_sync(Some(&token)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn local_only_events_are_pushed_to_provider() {
    let app = TestApp::spawn().await;
    let (member, token) = app.seed_member(MemberRole::Admin);
    app.seed_oauth_token(&member.id, false);

    let date = Utc::now().date_naive() + Duration::days(14);
    let next_day = date + Duration::days(1);
    let seeded = app.seed_local_event("Alumni Reunion", date, None).await;

    mock_empty_calendar(&app.google).await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .and(body_string_contains(format!("\"date\":\"{date}\"")))
        .and(body_string_contains(format!("\"date\":\"{next_day}\"")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "g-pushed" })))
        .expect(1)
        .mount(&app.google)
        .await;

    let (status, body) = app.full_sync(Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["eventsPushedToProvider"], 1);
    assert_eq!(body["stats"]["pushFailures"], 0);

    let pushed = app.find_by_provider_id("g-pushed").await.expect("provider id recorded");
    assert_eq!(pushed.id, seeded.id);
    assert!(pushed.synced_at.is_some());
}

#[tokio::test]
async fn push_failure_is_reported_but_sync_succeeds() {
    let app = TestApp::spawn().await;
    let (member, token) = app.seed_member(MemberRole::Admin);
    app.seed_oauth_token(&member.id, false);

    let date = Utc::now().date_naive() + Duration::days(7);
    app.seed_local_event("Cursed Event", date, NaiveTime::from_hms_opt(18, 0, 0)).await;

    mock_empty_calendar(&app.google).await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
        .mount(&app.google)
        .await;

    let (status, body) = app.full_sync(Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["stats"]["eventsPushedToProvider"], 0);
    assert_eq!(body["stats"]["pushFailures"], 1);

    // the event stays local-only and will be retried next sync
    assert_eq!(app.unpushed_events().await.len(), 1);
}

#[tokio::test]
async fn super_admin_override_token_authenticates() {
    let app = TestApp::spawn_with(|config| {
        config.server.super_admin_token = Some("override-secret".to_string());
    })
    .await;
    let (member, _token) = app.seed_member(MemberRole::SuperAdmin);
    app.seed_oauth_token(&member.id, false);

    mock_empty_calendar(&app.google).await;

    let (status, body) = app
        .post_action(
            json!({ "action": "full_sync", "superAdminToken": "override-secret" }),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn super_admin_override_without_super_admin_on_file_is_unauthorized() {
    let app = TestApp::spawn_with(|config| {
        config.server.super_admin_token = Some("override-secret".to_string());
    })
    .await;

    let (status, _) = app
        .post_action(
            json!({ "action": "full_sync", "superAdminToken": "override-secret" }),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = TestApp::spawn().await;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let response = chorale_api::app(app.ctx.clone())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request built"))
        .await
        .expect("request sent");

    assert_eq!(response.status(), StatusCode::OK);
}
