use super::api::CalendarApi;
use super::models::{CalendarEvent, EventList, EventQuery, SendUpdates};
use crate::error::{api_error, google_calendar_error, VisitResult};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Google Calendar v3 client bound to one calendar and one access token
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    base_url: String,
    calendar_id: String,
    access_token: String,
}

impl GoogleCalendarClient {
    pub fn new(client: Client, base_url: &str, calendar_id: &str, access_token: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            calendar_id: calendar_id.to_string(),
            access_token: access_token.to_string(),
        }
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// `{base}/calendars/{calendarId}/events[/{eventId}]` with each segment escaped
    fn events_url(&self, event_id: Option<&str>) -> VisitResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| google_calendar_error("API base URL cannot take a path"))?;
            segments
                .pop_if_empty()
                .extend(["calendars", self.calendar_id.as_str(), "events"]);
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }

        Ok(url)
    }

    /// Turn a non-2xx response into an error carrying the response body
    async fn check(response: Response, action: &str) -> VisitResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        let details =
            serde_json::from_str::<Value>(&body).unwrap_or_else(|_| Value::String(body.clone()));

        // {"error": {"code": 404, "message": "Not Found", "errors": [...]}}
        let message = details
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Failed to {}: HTTP {}", action, status));

        Err(api_error(&message, status.as_u16(), Some(details)))
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_events(&self, query: &EventQuery) -> VisitResult<Vec<CalendarEvent>> {
        let url = self.events_url(None)?;
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = query.params();
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let response = self
                .client
                .get(url.clone())
                .bearer_auth(&self.access_token)
                .query(&params)
                .send()
                .await?;
            let page: EventList = Self::check(response, "fetch events").await?.json().await?;

            debug!(
                "Fetched {} events between {} and {}",
                page.items.len(),
                query.time_min,
                query.time_max
            );
            events.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(events)
    }

    async fn insert_event(
        &self,
        event: &CalendarEvent,
        send_updates: SendUpdates,
    ) -> VisitResult<CalendarEvent> {
        let response = self
            .client
            .post(self.events_url(None)?)
            .bearer_auth(&self.access_token)
            .query(&[("sendUpdates", send_updates.as_str())])
            .json(event)
            .send()
            .await?;

        let created = Self::check(response, "insert event").await?.json().await?;
        Ok(created)
    }

    async fn patch_event(
        &self,
        event_id: &str,
        event: &CalendarEvent,
        send_updates: SendUpdates,
    ) -> VisitResult<CalendarEvent> {
        let response = self
            .client
            .patch(self.events_url(Some(event_id))?)
            .bearer_auth(&self.access_token)
            .query(&[("sendUpdates", send_updates.as_str())])
            .json(event)
            .send()
            .await?;

        let updated = Self::check(response, "patch event").await?.json().await?;
        Ok(updated)
    }

    async fn delete_event(&self, event_id: &str) -> VisitResult<()> {
        let response = self
            .client
            .delete(self.events_url(Some(event_id))?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Self::check(response, "delete event").await?;
        Ok(())
    }
}
