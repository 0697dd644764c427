//! Heuristics that recognise calendar entries for the school visit.
//! All comparisons are case-insensitive substring checks.

use super::event::TARGET_MONTH_PREFIX;
use crate::components::google_calendar::CalendarEvent;

const SCHOOL_KEYWORDS: [&str; 2] = ["ma escola", "montessori"];
const VISIT_KEYWORD: &str = "visita";
/// Street name with and without the accent
const LOCATION_KEYWORDS: [&str; 2] = ["encarnación", "encarnacio"];

fn lowered(field: Option<&String>) -> String {
    field.map(|s| s.to_lowercase()).unwrap_or_default()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn location_matches(location: &str) -> bool {
    contains_any(location, &LOCATION_KEYWORDS)
}

/// Event in the target window that is the current visit: a school or visit
/// keyword in the summary, or the school's street in the location, and a
/// start in March 2026
pub fn matches_march(event: &CalendarEvent) -> bool {
    let summary = lowered(event.summary.as_ref());
    let location = lowered(event.location.as_ref());

    let summary_hit = contains_any(&summary, &SCHOOL_KEYWORDS) || summary.contains(VISIT_KEYWORD);
    let in_month = event
        .start_label()
        .is_some_and(|start| start.starts_with(TARGET_MONTH_PREFIX));

    (summary_hit || location_matches(&location)) && in_month
}

/// Event describing the same real-world visit, whatever its date: a school
/// keyword in the summary, or the school's street in the location.
/// A bare "visita" summary is not enough on its own.
pub fn matches_same_visit(event: &CalendarEvent) -> bool {
    let summary = lowered(event.summary.as_ref());
    let location = lowered(event.location.as_ref());

    contains_any(&summary, &SCHOOL_KEYWORDS) || location_matches(&location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_calendar::EventDateTime;

    fn event(summary: Option<&str>, location: Option<&str>, start: Option<&str>) -> CalendarEvent {
        CalendarEvent {
            summary: summary.map(str::to_string),
            location: location.map(str::to_string),
            start: start.map(|s| EventDateTime {
                date_time: Some(s.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_march_match_requires_march_start() {
        assert!(matches_march(&event(
            Some("Visita Montessori"),
            None,
            Some("2026-03-03T09:30:00")
        )));
        assert!(!matches_march(&event(
            Some("Visita Montessori"),
            None,
            Some("2026-04-03")
        )));
        assert!(!matches_march(&event(Some("Visita Montessori"), None, None)));
    }

    #[test]
    fn test_march_match_accepts_any_keyword() {
        let march = Some("2026-03-02T10:00:00+01:00");
        assert!(matches_march(&event(Some("VISITA"), None, march)));
        assert!(matches_march(&event(Some("Reunió MA Escola"), None, march)));
        assert!(matches_march(&event(Some("Dentist"), Some("C/ ENCARNACIÓN 32"), march)));
        assert!(matches_march(&event(Some("Dentist"), Some("Encarnacio 32"), march)));
        assert!(!matches_march(&event(Some("Dentist"), Some("Gràcia"), march)));
        assert!(!matches_march(&event(None, None, march)));
    }

    #[test]
    fn test_march_match_reads_all_day_date() {
        let all_day = CalendarEvent {
            summary: Some("Montessori".to_string()),
            start: Some(EventDateTime {
                date: Some("2026-03-05".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches_march(&all_day));
    }

    #[test]
    fn test_same_visit_by_location() {
        assert!(matches_same_visit(&event(None, Some("c/ Encarnación 32"), None)));
        assert!(matches_same_visit(&event(
            Some("Anything"),
            Some("c/ Encarnación 32"),
            None
        )));
    }

    #[test]
    fn test_same_visit_by_school_keyword() {
        assert!(matches_same_visit(&event(Some("Visita MA Escola Montessori"), None, None)));
        assert!(matches_same_visit(&event(Some("montessori open day"), None, None)));
    }

    #[test]
    fn test_bare_visita_is_not_enough() {
        assert!(!matches_same_visit(&event(Some("Visita"), None, None)));
        assert!(!matches_same_visit(&event(Some("Visita"), Some("Sants"), None)));
        assert!(!matches_same_visit(&CalendarEvent::default()));
    }
}
