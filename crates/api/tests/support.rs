//! Shared fixtures for API integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chorale_api::{app, AppContext};
use chorale_domain::{
    CalendarEvent, Config, EventCategory, Member, MemberRole, OAuthTokenRecord,
};
use chorale_infra::{SqliteEventRepository, SqliteMemberRepository, SqliteTokenRepository};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::MockServer;

/// A fully wired application over a temp database and a mock Google server.
pub struct TestApp {
    pub ctx: AppContext,
    pub google: MockServer,
    _db_dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with extra configuration tweaks applied before wiring.
    pub async fn spawn_with(tweak: impl FnOnce(&mut Config)) -> Self {
        let google = MockServer::start().await;
        let db_dir = TempDir::new().expect("temp dir created");

        let mut config = Config::default();
        config.database.path =
            db_dir.path().join("test.db").to_string_lossy().into_owned();
        config.google.client_id = "test-client".to_string();
        config.google.client_secret = "test-secret".to_string();
        config.google.api_base_url = google.uri();
        config.google.token_url = format!("{}/token", google.uri());
        tweak(&mut config);

        let ctx = AppContext::new(&config).expect("context wired");
        Self { ctx, google, _db_dir: db_dir }
    }

    fn members(&self) -> SqliteMemberRepository {
        SqliteMemberRepository::new(self.ctx.db.clone())
    }

    fn tokens(&self) -> SqliteTokenRepository {
        SqliteTokenRepository::new(self.ctx.db.clone())
    }

    fn events(&self) -> SqliteEventRepository {
        SqliteEventRepository::new(self.ctx.db.clone())
    }

    /// Seed a member whose API token is returned for use in requests.
    pub fn seed_member(&self, role: MemberRole) -> (Member, String) {
        let member = Member {
            id: Uuid::new_v4().to_string(),
            email: format!("{}@example.edu", Uuid::new_v4()),
            name: None,
            role,
        };
        let api_token = format!("tok-{}", Uuid::new_v4());
        self.members().insert(&member, Some(&api_token)).expect("member seeded");
        (member, api_token)
    }

    /// Seed an OAuth grant for a member, fresh or already expired.
    pub fn seed_oauth_token(&self, member_id: &str, expired: bool) {
        let expires_at = if expired {
            Utc::now() - Duration::minutes(10)
        } else {
            Utc::now() + Duration::hours(1)
        };
        self.tokens()
            .upsert(&OAuthTokenRecord {
                member_id: member_id.to_string(),
                access_token: "stored-access".to_string(),
                refresh_token: Some("stored-refresh".to_string()),
                expires_at,
            })
            .expect("token seeded");
    }

    /// Seed a local event that has never been pushed to the provider.
    pub async fn seed_local_event(
        &self,
        title: &str,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> CalendarEvent {
        let event = CalendarEvent {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: None,
            location: None,
            date,
            time,
            category: EventCategory::Special,
            all_day: time.is_none(),
            created_by: None,
            provider_event_id: None,
            synced_at: None,
            created_at: Utc::now(),
        };
        use chorale_core::EventRepository;
        self.events().insert(&event).await.expect("event seeded");
        event
    }

    pub async fn find_by_provider_id(&self, provider_id: &str) -> Option<CalendarEvent> {
        use chorale_core::EventRepository;
        self.events().find_by_provider_id(provider_id).await.expect("query ok")
    }

    pub async fn unpushed_events(&self) -> Vec<CalendarEvent> {
        use chorale_core::EventRepository;
        self.events()
            .find_unpushed_since(NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid date"))
            .await
            .expect("query ok")
    }

    /// Send an action request with an optional Bearer token, returning status
    /// and parsed JSON body.
    pub async fn post_action(&self, body: Value, bearer: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json");
        if let Some(token) = bearer {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        let request =
            request.body(Body::from(body.to_string())).expect("request built");

        let response = app(self.ctx.clone()).oneshot(request).await.expect("request sent");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body read");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    /// Send a raw POST body, optionally without the JSON content type set.
    pub async fn post_raw(&self, body: &str, content_type: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            request = request.header("content-type", ct);
        }
        let request = request.body(Body::from(body.to_string())).expect("request built");

        let response = app(self.ctx.clone()).oneshot(request).await.expect("request sent");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body read");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    pub async fn full_sync(&self, bearer: Option<&str>) -> (StatusCode, Value) {
        self.post_action(json!({ "action": "full_sync" }), bearer).await
    }
}