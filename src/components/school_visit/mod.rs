//! The MA Escola Montessori visit: its fixed payload, the heuristics that
//! recognise it in the calendar, and the cleanup + upsert run.

pub mod event;
pub mod matching;
mod sync;

pub use event::visit_event;
pub use matching::{matches_march, matches_same_visit};
pub use sync::{
    ensure_visit, print_result, remove_superseded, upsert_visit, write_result, UpsertAction,
    VisitOutcome,
};
