use super::event::{superseded_query, target_query, validate, visit_event};
use super::matching::{matches_march, matches_same_visit};
use crate::components::google_calendar::{CalendarApi, CalendarEvent, SendUpdates};
use crate::error::{google_calendar_error, VisitResult};
use std::fmt;
use std::io::{self, Write};
use tracing::{debug, info, warn};

/// What the upsert did to the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Updated,
    Created,
}

impl fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertAction::Updated => write!(f, "Existing event updated."),
            UpsertAction::Created => write!(f, "Event created successfully!"),
        }
    }
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct VisitOutcome {
    /// Superseded events that were deleted, in deletion order
    pub removed: Vec<CalendarEvent>,
    pub action: UpsertAction,
    /// The visit as returned by the API
    pub event: CalendarEvent,
}

fn event_id(event: &CalendarEvent) -> VisitResult<&str> {
    event
        .id
        .as_deref()
        .ok_or_else(|| google_calendar_error("Listed event has no id"))
}

/// Delete every event in the superseded window that describes the same visit.
/// The first failed deletion aborts; earlier deletions stay done.
pub async fn remove_superseded<A>(api: &A) -> VisitResult<Vec<CalendarEvent>>
where
    A: CalendarApi + ?Sized,
{
    let candidates = api.list_events(&superseded_query()).await?;
    debug!("{} events in the superseded window", candidates.len());

    let mut removed = Vec::new();
    for event in candidates.into_iter().filter(matches_same_visit) {
        api.delete_event(event_id(&event)?).await?;
        println!(
            "Removed superseded event: {} {}",
            event.summary.as_deref().unwrap_or_default(),
            event.start_label().unwrap_or_default()
        );
        removed.push(event);
    }

    Ok(removed)
}

/// Patch the first current-visit event in the target window with `payload`,
/// or insert `payload` when there is none. Attendees are not notified.
pub async fn upsert_visit<A>(
    api: &A,
    payload: &CalendarEvent,
) -> VisitResult<(UpsertAction, CalendarEvent)>
where
    A: CalendarApi + ?Sized,
{
    let events = api.list_events(&target_query()).await?;

    match events.iter().find(|event| matches_march(event)) {
        Some(existing) => {
            let id = event_id(existing)?;
            info!("Patching existing visit event {}", id);
            let updated = api.patch_event(id, payload, SendUpdates::None).await?;
            Ok((UpsertAction::Updated, updated))
        }
        None => {
            info!("No visit event in the target window, inserting");
            let created = api.insert_event(payload, SendUpdates::None).await?;
            Ok((UpsertAction::Created, created))
        }
    }
}

/// Remove superseded entries, then upsert the visit and print the result
pub async fn ensure_visit<A>(api: &A, calendar_label: &str) -> VisitResult<VisitOutcome>
where
    A: CalendarApi + ?Sized,
{
    let payload = visit_event();
    validate(&payload)?;

    let removed = remove_superseded(api).await?;
    let (action, event) = upsert_visit(api, &payload).await?;

    print_result(action, &event, calendar_label);

    Ok(VisitOutcome {
        removed,
        action,
        event,
    })
}

/// Human-readable report on stdout
pub fn print_result(action: UpsertAction, event: &CalendarEvent, calendar_label: &str) {
    let stdout = io::stdout();
    if let Err(e) = write_result(&mut stdout.lock(), action, event, calendar_label) {
        warn!("Failed to write the run report: {}", e);
    }
}

/// Render the run report, one `Label: value` line per field after the headline
pub fn write_result(
    out: &mut impl Write,
    action: UpsertAction,
    event: &CalendarEvent,
    calendar_label: &str,
) -> io::Result<()> {
    writeln!(out, "{}", action)?;
    writeln!(out, "Event ID: {}", event.id.as_deref().unwrap_or_default())?;
    writeln!(out, "Event URL: {}", event.html_link.as_deref().unwrap_or_default())?;
    writeln!(out, "Start: {}", event.start_label().unwrap_or_default())?;
    writeln!(out, "Summary: {}", event.summary.as_deref().unwrap_or_default())?;
    writeln!(out, "Calendar: {}", calendar_label)
}
