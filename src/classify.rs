use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::{CalendarSettings, CycleLog, CycleProfile, DayFlags, LogKind};
use crate::prediction::{self, fertile_window, ovulation_date};

/// Classifies single dates by combining actual logs with the profile's
/// predictions. Pre-indexes history once so a month build does 42 cheap
/// lookups instead of 42 history scans.
pub struct DayClassifier<'a> {
    profile: &'a CycleProfile,
    settings: &'a CalendarSettings,
    starts: Vec<NaiveDate>,
    period_days: HashSet<NaiveDate>,
    logged: HashSet<NaiveDate>,
}

impl<'a> DayClassifier<'a> {
    pub fn new(
        history: &[CycleLog],
        profile: &'a CycleProfile,
        settings: &'a CalendarSettings,
    ) -> Self {
        Self {
            profile,
            settings,
            starts: prediction::period_starts(history),
            period_days: history
                .iter()
                .filter(|log| log.kind == LogKind::PeriodDay)
                .map(|log| log.date)
                .collect(),
            logged: history.iter().map(|log| log.date).collect(),
        }
    }

    pub fn flags(&self, date: NaiveDate) -> DayFlags {
        let is_period = self.is_period(date);
        DayFlags {
            is_period,
            // Period classification wins over the fertile window.
            is_ovulation: !is_period && self.in_fertile_window(date),
            has_log: self.logged.contains(&date),
        }
    }

    fn is_period(&self, date: NaiveDate) -> bool {
        // An orphan PeriodDay still marks its own date.
        if self.period_days.contains(&date) {
            return true;
        }
        let period_len = self.profile.average_period_length.max(1);
        // Actual: every logged start opens an average-length span.
        if let Some(start) = self.latest_logged_start_at_or_before(date) {
            if (date - start).num_days() < period_len {
                return true;
            }
        }
        // Predicted: spans repeating every average cycle after the last
        // logged start.
        if let Some(last) = self.profile.last_period_start {
            if date >= last {
                let cycle = self.profile.average_cycle_length.max(1);
                return (date - last).num_days().rem_euclid(cycle) < period_len;
            }
        }
        false
    }

    fn in_fertile_window(&self, date: NaiveDate) -> bool {
        let Some(start) = self.cycle_start_at_or_before(date) else {
            return false;
        };
        let ovulation = ovulation_date(start, self.profile, self.settings);
        let (from, to) = fertile_window(ovulation, self.settings);
        from <= date && date <= to
    }

    /// Start of the cycle containing `date`: the latest logged or
    /// predicted period start at or before it. None before the first
    /// logged start.
    fn cycle_start_at_or_before(&self, date: NaiveDate) -> Option<NaiveDate> {
        let last = self.profile.last_period_start?;
        if date < last {
            return self.latest_logged_start_at_or_before(date);
        }
        let cycle = self.profile.average_cycle_length.max(1);
        let k = (date - last).num_days().div_euclid(cycle);
        last.checked_add_signed(chrono::Duration::days(k * cycle))
    }

    fn latest_logged_start_at_or_before(&self, date: NaiveDate) -> Option<NaiveDate> {
        let idx = self.starts.partition_point(|&s| s <= date);
        idx.checked_sub(1).map(|i| self.starts[i])
    }
}
