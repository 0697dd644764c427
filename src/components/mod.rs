// Export components
pub mod google_calendar;
pub mod school_visit;

// Re-export the calendar client seam
pub use google_calendar::{CalendarApi, GoogleCalendarClient};
