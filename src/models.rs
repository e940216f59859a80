use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogKind {
    PeriodStart,
    PeriodDay,
    Symptom,
}

/// One recorded cycle event, owned and edited by the host app's log
/// editor. Unique per `(date, kind)`; the engine never mutates history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleLog {
    pub id: Uuid,
    pub date: NaiveDate,
    pub kind: LogKind,
    #[serde(default)]
    pub notes: String,
}

/// Cycle estimate derived from logged history; never stored by hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleProfile {
    /// Days between consecutive period starts, averaged over at most
    /// the last `max_tracked_cycles` completed cycles.
    pub average_cycle_length: i64,
    pub average_period_length: i64,
    pub last_period_start: Option<NaiveDate>,
    /// 0.5 with fewer than 2 measured cycle lengths, otherwise
    /// `1 - stddev/mean` clamped to 0.1..=0.95.
    pub confidence: f32,
}

/// Classification of a single date, before the today/selected overlay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DayFlags {
    pub is_period: bool,
    pub is_ovulation: bool,
    pub has_log: bool,
}

/// One cell of the month grid, as consumed by the rendering surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Day-of-month label.
    pub text: String,
    /// False for lead-in/lead-out days borrowed from adjacent months.
    pub in_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub is_period: bool,
    pub is_ovulation: bool,
    pub has_log: bool,
}

/// A full month view: 7 weekday headers followed by complete week rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub headers: [String; 7],
    pub weeks: Vec<[CalendarDay; 7]>,
}

/// Aggregates for the stats view, computed over the full history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleStats {
    pub total_cycles: usize,
    pub average_cycle_length: Option<f32>,
    pub average_period_length: Option<f32>,
    pub shortest_cycle: Option<i64>,
    pub longest_cycle: Option<i64>,
    pub last_period_start: Option<NaiveDate>,
}

/// Tunable constants of the engine. The luteal offset and fertile
/// window width are clinical heuristics, not hard rules, so they are
/// settings rather than literals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarSettings {
    /// First column of the grid.
    pub week_start: Weekday,
    pub luteal_phase_days: i64,
    pub fertile_window_days: i64,
    pub default_cycle_length: i64,
    pub default_period_length: i64,
    /// Completed cycles kept for averaging, oldest dropped first.
    pub max_tracked_cycles: usize,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            week_start: Weekday::Sun,
            luteal_phase_days: 14,
            fertile_window_days: 5,
            default_cycle_length: 28,
            default_period_length: 5,
            max_tracked_cycles: 6,
        }
    }
}

pub(crate) fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}
