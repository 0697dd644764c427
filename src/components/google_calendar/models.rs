use crate::error::{other_error, VisitResult};
use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Calendar event as exchanged with the Google Calendar v3 API.
///
/// The same shape is used for request bodies (insert/patch) and for
/// responses, so every field is optional and omitted when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
}

impl CalendarEvent {
    /// Start as reported by the API: `dateTime` for timed events, `date` for all-day ones
    pub fn start_label(&self) -> Option<&str> {
        self.start.as_ref().and_then(EventDateTime::label)
    }
}

/// Start or end of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    /// Timed instant in an IANA zone
    pub fn zoned(date_time: &str, time_zone: &str) -> Self {
        Self {
            date_time: Some(date_time.to_string()),
            date: None,
            time_zone: Some(time_zone.to_string()),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }

    /// Resolve a local `dateTime` against its `timeZone`.
    ///
    /// Offsets embedded in `dateTime` are honoured; otherwise the wall-clock
    /// value is placed in the named zone and must map to exactly one instant.
    pub fn resolve(&self) -> VisitResult<DateTime<Tz>> {
        let raw = self
            .date_time
            .as_deref()
            .ok_or_else(|| other_error("Event time has no dateTime"))?;
        let zone_name = self
            .time_zone
            .as_deref()
            .ok_or_else(|| other_error("Event time has no timeZone"))?;
        let tz: Tz = zone_name
            .parse()
            .map_err(|e| other_error(&format!("Unknown time zone {}: {}", zone_name, e)))?;

        if let Ok(fixed) = DateTime::parse_from_rfc3339(raw) {
            return Ok(fixed.with_timezone(&tz));
        }

        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
            .map_err(|e| other_error(&format!("Invalid dateTime {}: {}", raw, e)))?;
        tz.from_local_datetime(&naive)
            .single()
            .ok_or_else(|| other_error(&format!("{} is ambiguous or skipped in {}", raw, zone_name)))
    }
}

/// Reminder settings of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderOverride {
    /// `email` or `popup`
    pub method: String,
    pub minutes: u32,
}

/// One page of an `events.list` response
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
    pub next_page_token: Option<String>,
}

/// Attendee notification policy for writes. Visit changes never email guests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendUpdates {
    None,
}

impl SendUpdates {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendUpdates::None => "none",
        }
    }
}

/// Time-bounded `events.list` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// RFC 3339 lower bound (exclusive on event end)
    pub time_min: String,
    /// RFC 3339 upper bound (exclusive on event start)
    pub time_max: String,
    /// Expand recurring events into instances
    pub single_events: bool,
    /// `startTime` ordering, only valid with `single_events`
    pub order_by_start_time: bool,
}

impl EventQuery {
    pub fn between(time_min: &str, time_max: &str) -> Self {
        Self {
            time_min: time_min.to_string(),
            time_max: time_max.to_string(),
            single_events: true,
            order_by_start_time: false,
        }
    }

    pub fn ordered_by_start(mut self) -> Self {
        self.order_by_start_time = true;
        self
    }

    /// Query-string pairs understood by `events.list`
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("timeMin", self.time_min.clone()),
            ("timeMax", self.time_max.clone()),
            ("singleEvents", self.single_events.to_string()),
        ];
        if self.order_by_start_time {
            params.push(("orderBy", "startTime".to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_deserializes_google_shape() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "kind": "calendar#event",
            "id": "abc123",
            "status": "confirmed",
            "htmlLink": "https://www.google.com/calendar/event?eid=abc123",
            "summary": "Visita",
            "start": { "dateTime": "2026-03-03T09:30:00+01:00", "timeZone": "Europe/Madrid" },
            "end": { "date": "2026-03-04" }
        }))
        .unwrap();

        assert_eq!(event.id.as_deref(), Some("abc123"));
        assert_eq!(
            event.html_link.as_deref(),
            Some("https://www.google.com/calendar/event?eid=abc123")
        );
        assert_eq!(event.start_label(), Some("2026-03-03T09:30:00+01:00"));
        assert_eq!(event.end.unwrap().label(), Some("2026-03-04"));
    }

    #[test]
    fn test_all_day_start_label_falls_back_to_date() {
        let event = CalendarEvent {
            start: Some(EventDateTime {
                date: Some("2026-02-17".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(event.start_label(), Some("2026-02-17"));
        assert_eq!(CalendarEvent::default().start_label(), None);
    }

    #[test]
    fn test_unset_fields_are_not_serialized() {
        let event = CalendarEvent {
            summary: Some("Visita".to_string()),
            reminders: Some(Reminders {
                use_default: true,
                overrides: Vec::new(),
            }),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "summary": "Visita", "reminders": { "useDefault": true } })
        );
    }

    #[test]
    fn test_resolve_local_time_in_zone() {
        let start = EventDateTime::zoned("2026-03-03T09:30:00", "Europe/Madrid");
        let resolved = start.resolve().unwrap();
        // CET, one hour ahead of UTC in March before the DST switch
        assert_eq!(resolved.to_rfc3339(), "2026-03-03T09:30:00+01:00");
    }

    #[test]
    fn test_resolve_rejects_bad_input() {
        assert!(EventDateTime::zoned("2026-03-03T09:30:00", "Europe/Atlantis")
            .resolve()
            .is_err());
        assert!(EventDateTime::zoned("3 March", "Europe/Madrid").resolve().is_err());
        // Skipped hour on the 2026 spring-forward night
        assert!(EventDateTime::zoned("2026-03-29T02:30:00", "Europe/Madrid")
            .resolve()
            .is_err());
    }

    #[test]
    fn test_query_params() {
        let query = EventQuery::between("2026-03-01T00:00:00Z", "2026-03-06T00:00:00Z");
        assert_eq!(
            query.params(),
            vec![
                ("timeMin", "2026-03-01T00:00:00Z".to_string()),
                ("timeMax", "2026-03-06T00:00:00Z".to_string()),
                ("singleEvents", "true".to_string()),
            ]
        );

        let ordered = query.ordered_by_start();
        assert_eq!(
            ordered.params().last(),
            Some(&("orderBy", "startTime".to_string()))
        );
    }

    #[test]
    fn test_send_updates_wire_values() {
        assert_eq!(SendUpdates::None.as_str(), "none");
    }
}
