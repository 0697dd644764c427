use super::models::{CalendarEvent, EventQuery, SendUpdates};
use crate::error::VisitResult;
use async_trait::async_trait;

/// Event operations on one calendar.
///
/// Implemented over HTTP by [`super::GoogleCalendarClient`]; tests provide
/// in-memory versions.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// All events in the query window, following pagination
    async fn list_events(&self, query: &EventQuery) -> VisitResult<Vec<CalendarEvent>>;

    /// Create an event and return it as stored
    async fn insert_event(
        &self,
        event: &CalendarEvent,
        send_updates: SendUpdates,
    ) -> VisitResult<CalendarEvent>;

    /// Overwrite the fields present in `event` on an existing event
    async fn patch_event(
        &self,
        event_id: &str,
        event: &CalendarEvent,
        send_updates: SendUpdates,
    ) -> VisitResult<CalendarEvent>;

    async fn delete_event(&self, event_id: &str) -> VisitResult<()>;
}
