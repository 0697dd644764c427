use crate::components::google_calendar::{
    CalendarEvent, EventDateTime, EventQuery, ReminderOverride, Reminders,
};
use crate::error::{other_error, VisitResult};

pub const VISIT_SUMMARY: &str = "Visita MA Escola Montessori";
pub const VISIT_DESCRIPTION: &str = "Visita Niu i Cau a MA Caseta – Curs 2026-27.\n\nContacte: Naïs Cortinat (MA Escola Montessori).\nAna disponible el 3 de març. Hora 9:30 proposada per Naïs; confirmació final de Naïs pendent.";
pub const VISIT_LOCATION: &str = "c/ Encarnación 32";
pub const VISIT_START: &str = "2026-03-03T09:30:00";
pub const VISIT_END: &str = "2026-03-03T10:30:00";
pub const VISIT_TIME_ZONE: &str = "Europe/Madrid";

/// Start-date prefix an existing event needs to count as the current visit
pub const TARGET_MONTH_PREFIX: &str = "2026-03";

/// Window that held the earlier proposed date (Feb 17)
pub const SUPERSEDED_WINDOW: (&str, &str) = ("2026-02-15T00:00:00Z", "2026-02-23T00:00:00Z");

/// Window around the current proposed date (Mar 3)
pub const TARGET_WINDOW: (&str, &str) = ("2026-03-01T00:00:00Z", "2026-03-06T00:00:00Z");

/// The visit as it should appear in the calendar
pub fn visit_event() -> CalendarEvent {
    CalendarEvent {
        summary: Some(VISIT_SUMMARY.to_string()),
        description: Some(VISIT_DESCRIPTION.to_string()),
        location: Some(VISIT_LOCATION.to_string()),
        start: Some(EventDateTime::zoned(VISIT_START, VISIT_TIME_ZONE)),
        end: Some(EventDateTime::zoned(VISIT_END, VISIT_TIME_ZONE)),
        reminders: Some(Reminders {
            use_default: false,
            overrides: vec![
                ReminderOverride {
                    method: "email".to_string(),
                    minutes: 24 * 60,
                },
                ReminderOverride {
                    method: "popup".to_string(),
                    minutes: 15,
                },
            ],
        }),
        ..Default::default()
    }
}

pub fn superseded_query() -> EventQuery {
    EventQuery::between(SUPERSEDED_WINDOW.0, SUPERSEDED_WINDOW.1)
}

pub fn target_query() -> EventQuery {
    EventQuery::between(TARGET_WINDOW.0, TARGET_WINDOW.1).ordered_by_start()
}

/// Check that start and end exist in their zone and end comes after start
pub fn validate(event: &CalendarEvent) -> VisitResult<()> {
    let start = event
        .start
        .as_ref()
        .ok_or_else(|| other_error("Event has no start"))?
        .resolve()?;
    let end = event
        .end
        .as_ref()
        .ok_or_else(|| other_error("Event has no end"))?
        .resolve()?;

    if end <= start {
        return Err(other_error("Event must end after it starts"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_visit_payload_wire_shape() {
        assert_eq!(
            serde_json::to_value(visit_event()).unwrap(),
            json!({
                "summary": "Visita MA Escola Montessori",
                "description": VISIT_DESCRIPTION,
                "location": "c/ Encarnación 32",
                "start": { "dateTime": "2026-03-03T09:30:00", "timeZone": "Europe/Madrid" },
                "end": { "dateTime": "2026-03-03T10:30:00", "timeZone": "Europe/Madrid" },
                "reminders": {
                    "useDefault": false,
                    "overrides": [
                        { "method": "email", "minutes": 1440 },
                        { "method": "popup", "minutes": 15 }
                    ]
                }
            })
        );
    }

    #[test]
    fn test_visit_payload_is_valid() {
        assert!(validate(&visit_event()).is_ok());
    }

    #[test]
    fn test_reversed_times_are_rejected() {
        let mut event = visit_event();
        event.end = Some(EventDateTime::zoned("2026-03-03T09:00:00", VISIT_TIME_ZONE));
        assert!(validate(&event).is_err());

        event.end = None;
        assert!(validate(&event).is_err());
    }

    #[test]
    fn test_windows() {
        let superseded = superseded_query();
        assert_eq!(superseded.time_min, "2026-02-15T00:00:00Z");
        assert_eq!(superseded.time_max, "2026-02-23T00:00:00Z");
        assert!(superseded.single_events);
        assert!(!superseded.order_by_start_time);

        let target = target_query();
        assert_eq!(target.time_min, "2026-03-01T00:00:00Z");
        assert_eq!(target.time_max, "2026-03-06T00:00:00Z");
        assert!(target.order_by_start_time);
    }
}
