//! Deterministic menstrual-cycle calendar engine.
//!
//! Turns a history of logged cycle events into a month grid of
//! classified days: actual and predicted period spans, the estimated
//! fertile window, today/selected markers and has-log indicators. The
//! host app owns the history and the rendering; this crate is the pure
//! transform between them, so every operation is a function of its
//! arguments and nothing reads the clock or does I/O.

pub mod classify;
pub mod grid;
pub mod models;
pub mod prediction;
pub mod selection;

pub use classify::DayClassifier;
pub use grid::{build, CalendarError};
pub use models::{
    CalendarDay, CalendarSettings, CycleLog, CycleProfile, CycleStats, DayFlags, LogKind,
    MonthGrid,
};
pub use prediction::{
    cycle_stats, fertile_window, ovulation_date, predict, upcoming_period_starts, PeriodStarts,
};
pub use selection::SelectionController;
