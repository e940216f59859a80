use chrono::{Datelike, Duration, NaiveDate};
use thiserror::Error;

use crate::classify::DayClassifier;
use crate::models::{
    weekday_label, CalendarDay, CalendarSettings, CycleLog, CycleProfile, MonthGrid,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(u32),
    #[error("no valid calendar for year {year}, month {month}")]
    InvalidDate { year: i32, month: u32 },
}

/// Expand one month into classified week rows.
///
/// The grid always covers full weeks: lead-in days from the previous
/// month and lead-out days from the next pad the first and last row,
/// carry `in_month = false`, and are still classified so period and
/// fertile-window coloring stays continuous across month boundaries.
///
/// Deterministic: `today` is an explicit argument, never the clock, and
/// identical inputs produce identical grids.
pub fn build(
    month: u32,
    year: i32,
    history: &[CycleLog],
    profile: &CycleProfile,
    today: NaiveDate,
    selected: NaiveDate,
    settings: &CalendarSettings,
) -> Result<MonthGrid, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::MonthOutOfRange(month));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(CalendarError::InvalidDate { year, month })?;
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(CalendarError::InvalidDate { year, month })?;
    let days_in_month = (first_of_next - first).num_days();

    let week_start = settings.week_start.num_days_from_sunday();
    let lead_in = i64::from((first.weekday().num_days_from_sunday() + 7 - week_start) % 7);
    let rows = (lead_in + days_in_month + 6) / 7;

    let classifier = DayClassifier::new(history, profile, settings);
    let mut day = first - Duration::days(lead_in);
    let mut weeks = Vec::with_capacity(rows as usize);
    for _ in 0..rows {
        weeks.push(std::array::from_fn(|_| {
            let cell = make_cell(day, month, year, today, selected, &classifier);
            day += Duration::days(1);
            cell
        }));
    }

    let mut weekday = settings.week_start;
    let headers = std::array::from_fn(|_| {
        let label = weekday_label(weekday).to_owned();
        weekday = weekday.succ();
        label
    });

    Ok(MonthGrid {
        year,
        month,
        headers,
        weeks,
    })
}

fn make_cell(
    date: NaiveDate,
    month: u32,
    year: i32,
    today: NaiveDate,
    selected: NaiveDate,
    classifier: &DayClassifier<'_>,
) -> CalendarDay {
    let flags = classifier.flags(date);
    CalendarDay {
        date,
        text: date.day().to_string(),
        in_month: date.month() == month && date.year() == year,
        is_today: date == today,
        is_selected: date == selected,
        is_period: flags.is_period,
        is_ovulation: flags.is_ovulation,
        has_log: flags.has_log,
    }
}
