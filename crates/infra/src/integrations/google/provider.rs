//! Google Calendar provider implementation

use async_trait::async_trait;
use chorale_domain::{ChoraleError, GoogleConfig, Result};
use chorale_core::{
    CalendarProvider, DraftWhen, RemoteEvent, RemoteEventDraft, RemoteWhen, SyncWindow,
    TokenRefresh,
};
use chrono::{DateTime, NaiveDate, SecondsFormat};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::errors::InfraError;

/// Google Calendar provider
pub struct GoogleCalendarProvider {
    client: Client,
    config: GoogleConfig,
}

impl GoogleCalendarProvider {
    pub fn new(config: GoogleConfig) -> Self {
        Self { client: Client::new(), config }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.config.api_base_url, self.config.calendar_id)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    #[instrument(skip(self, access_token))]
    async fn list_events(
        &self,
        access_token: &str,
        window: &SyncWindow,
    ) -> Result<Vec<RemoteEvent>> {
        let query = [
            ("timeMin", window.time_min.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("timeMax", window.time_max.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", window.max_results.to_string()),
        ];

        let response = self
            .client
            .get(self.events_url())
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                InfraError(ChoraleError::Network(format!("Google API request failed: {}", e)))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InfraError(ChoraleError::Network(format!(
                "Google API error ({}): {}",
                status, error_text
            )))
            .into());
        }

        let google_response: GoogleEventsResponse = response.json().await.map_err(|e| {
            InfraError(ChoraleError::InvalidInput(format!(
                "Failed to parse Google response: {}",
                e
            )))
        })?;

        let events = google_response
            .items
            .into_iter()
            .filter_map(|event| match parse_event(&event) {
                Ok(parsed) => Some(parsed),
                Err(reason) => {
                    warn!(event_id = %event.id, %reason, "skipping malformed provider event");
                    None
                }
            })
            .collect();

        Ok(events)
    }

    #[instrument(skip(self, access_token, draft), fields(summary = %draft.summary))]
    async fn create_event(&self, access_token: &str, draft: &RemoteEventDraft) -> Result<String> {
        let body = GoogleEventBody::from_draft(draft, &self.config.timezone);

        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                InfraError(ChoraleError::Network(format!("Google API request failed: {}", e)))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InfraError(ChoraleError::Network(format!(
                "Google event creation failed ({}): {}",
                status, error_text
            )))
            .into());
        }

        let created: GoogleCreatedEvent = response.json().await.map_err(|e| {
            InfraError(ChoraleError::InvalidInput(format!(
                "Failed to parse Google response: {}",
                e
            )))
        })?;

        Ok(created.id)
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenRefresh> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| {
                InfraError(ChoraleError::Auth(format!("Token refresh request failed: {}", e)))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InfraError(ChoraleError::Auth(format!(
                "Token refresh failed ({}): {}",
                status, error_text
            )))
            .into());
        }

        let refresh_response: GoogleTokenRefreshResponse = response.json().await.map_err(|e| {
            InfraError(ChoraleError::Auth(format!("Failed to parse token response: {}", e)))
        })?;

        Ok(TokenRefresh {
            access_token: refresh_response.access_token,
            expires_in: refresh_response.expires_in,
        })
    }
}

fn parse_event(event: &GoogleCalendarEvent) -> std::result::Result<RemoteEvent, String> {
    let when = if let Some(date) = &event.start.date {
        let start = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| format!("invalid all-day start: {e}"))?;
        let end = match event.end.as_ref().and_then(|e| e.date.as_deref()) {
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|e| format!("invalid all-day end: {e}"))?,
            None => start.succ_opt().ok_or_else(|| "all-day end out of range".to_string())?,
        };
        RemoteWhen::AllDay { start, end }
    } else if let Some(date_time) = &event.start.date_time {
        let start = DateTime::parse_from_rfc3339(date_time)
            .map_err(|e| format!("invalid timed start: {e}"))?;
        let end = match event.end.as_ref().and_then(|e| e.date_time.as_deref()) {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| format!("invalid timed end: {e}"))?,
            ),
            None => None,
        };
        RemoteWhen::Timed { start, end }
    } else {
        return Err("event has neither a date nor a dateTime start".to_string());
    };

    Ok(RemoteEvent {
        id: event.id.clone(),
        summary: event.summary.clone().filter(|s| !s.trim().is_empty()),
        description: event.description.clone(),
        location: event.location.clone(),
        when,
    })
}

#[derive(Debug, Deserialize)]
struct GoogleEventsResponse {
    #[serde(default)]
    items: Vec<GoogleCalendarEvent>,
}

#[derive(Debug, Deserialize)]
struct GoogleCalendarEvent {
    id: String,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start: EventDateTime,
    end: Option<EventDateTime>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EventDateTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

#[derive(Debug, Serialize)]
struct GoogleEventBody {
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    start: EventDateTime,
    end: EventDateTime,
}

impl GoogleEventBody {
    fn from_draft(draft: &RemoteEventDraft, timezone: &str) -> Self {
        let (start, end) = match &draft.when {
            DraftWhen::AllDay { start, end } => (
                EventDateTime { date: Some(start.format("%Y-%m-%d").to_string()), ..Default::default() },
                EventDateTime { date: Some(end.format("%Y-%m-%d").to_string()), ..Default::default() },
            ),
            DraftWhen::Timed { start, end } => (
                EventDateTime {
                    date_time: Some(start.format("%Y-%m-%dT%H:%M:%S").to_string()),
                    time_zone: Some(timezone.to_string()),
                    ..Default::default()
                },
                EventDateTime {
                    date_time: Some(end.format("%Y-%m-%dT%H:%M:%S").to_string()),
                    time_zone: Some(timezone.to_string()),
                    ..Default::default()
                },
            ),
        };

        Self {
            summary: draft.summary.clone(),
            description: draft.description.clone(),
            location: draft.location.clone(),
            start,
            end,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleCreatedEvent {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenRefreshResponse {
    access_token: String,
    expires_in: i64,
}
