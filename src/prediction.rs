use chrono::{Duration, NaiveDate};

use crate::models::{CalendarSettings, CycleLog, CycleProfile, CycleStats, LogKind};

/// Sorted, deduplicated dates of all `PeriodStart` logs.
pub(crate) fn period_starts(history: &[CycleLog]) -> Vec<NaiveDate> {
    let mut starts: Vec<NaiveDate> = history
        .iter()
        .filter(|log| log.kind == LogKind::PeriodStart)
        .map(|log| log.date)
        .collect();
    starts.sort_unstable();
    starts.dedup();
    starts
}

/// Derive a cycle profile from logged history.
///
/// Cycle length averages the day-deltas between consecutive period
/// starts, keeping at most the last `max_tracked_cycles` completed
/// cycles so one outlier cannot skew the estimate forever. With zero
/// completed cycles the profile falls back to the default 28/5.
pub fn predict(history: &[CycleLog], settings: &CalendarSettings) -> CycleProfile {
    let starts = period_starts(history);
    let last_period_start = starts.last().copied();

    let mut cycle_lengths: Vec<f64> = starts
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect();
    if cycle_lengths.len() > settings.max_tracked_cycles {
        cycle_lengths.drain(..cycle_lengths.len() - settings.max_tracked_cycles);
    }

    if cycle_lengths.is_empty() {
        return CycleProfile {
            average_cycle_length: settings.default_cycle_length,
            average_period_length: settings.default_period_length,
            last_period_start,
            confidence: 0.5,
        };
    }

    let average_cycle_length = (mean(&cycle_lengths).round() as i64).max(1);

    let mut period_lengths = measured_period_lengths(history, &starts);
    if period_lengths.len() > settings.max_tracked_cycles {
        period_lengths.drain(..period_lengths.len() - settings.max_tracked_cycles);
    }
    let average_period_length = if period_lengths.is_empty() {
        settings.default_period_length
    } else {
        (mean(&period_lengths).round() as i64).max(1)
    };

    let confidence = if cycle_lengths.len() < 2 {
        0.5
    } else {
        let std_dev = std_deviation(&cycle_lengths);
        (1.0 - (std_dev / mean(&cycle_lengths)) as f32).clamp(0.1, 0.95)
    };

    CycleProfile {
        average_cycle_length,
        average_period_length,
        last_period_start,
        confidence,
    }
}

/// Period lengths that can actually be measured: a `PeriodStart` plus
/// its run of consecutive `PeriodDay` logs. A start with no following
/// `PeriodDay` gives no measurement.
fn measured_period_lengths(history: &[CycleLog], starts: &[NaiveDate]) -> Vec<f64> {
    let mut lengths = Vec::new();
    for &start in starts {
        let mut len = 1i64;
        let mut day = start + Duration::days(1);
        while history
            .iter()
            .any(|log| log.kind == LogKind::PeriodDay && log.date == day)
        {
            len += 1;
            day += Duration::days(1);
        }
        if len > 1 {
            lengths.push(len as f64);
        }
    }
    lengths
}

/// Lazy sequence of predicted period starts,
/// `last_period_start + k * average_cycle_length` for k = 0, 1, 2, ...
///
/// The first element is the earliest candidate on or after
/// `as_of - average_cycle_length`, so the immediately preceding
/// predicted cycle stays visible when paging backwards. The sequence is
/// infinite (up to the calendar's representable range) and restartable:
/// call again for a fresh iterator.
pub fn upcoming_period_starts(profile: &CycleProfile, as_of: NaiveDate) -> Option<PeriodStarts> {
    let last = profile.last_period_start?;
    let cycle = profile.average_cycle_length.max(1);
    let horizon = as_of - Duration::days(cycle);
    let gap = (horizon - last).num_days();
    let k = if gap > 0 { (gap + cycle - 1).div_euclid(cycle) } else { 0 };
    Some(PeriodStarts {
        next: last.checked_add_signed(Duration::days(k * cycle)),
        step: Duration::days(cycle),
    })
}

#[derive(Debug, Clone)]
pub struct PeriodStarts {
    next: Option<NaiveDate>,
    step: Duration,
}

impl Iterator for PeriodStarts {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = current.checked_add_signed(self.step);
        Some(current)
    }
}

/// Estimated ovulation for the cycle beginning at `period_start`:
/// the luteal phase counted back from the expected next start. Clamped
/// forward to the start itself for pathologically short averages.
pub fn ovulation_date(
    period_start: NaiveDate,
    profile: &CycleProfile,
    settings: &CalendarSettings,
) -> NaiveDate {
    let offset = profile.average_cycle_length - settings.luteal_phase_days;
    let ovulation = period_start + Duration::days(offset);
    ovulation.max(period_start)
}

/// Inclusive fertile window: `fertile_window_days` days ending on the
/// ovulation day.
pub fn fertile_window(
    ovulation: NaiveDate,
    settings: &CalendarSettings,
) -> (NaiveDate, NaiveDate) {
    let start = ovulation - Duration::days(settings.fertile_window_days - 1);
    (start, ovulation)
}

/// Compute cycle statistics for the stats view. Unlike [`predict`],
/// this aggregates the entire history.
pub fn cycle_stats(history: &[CycleLog]) -> CycleStats {
    let starts = period_starts(history);

    if starts.is_empty() {
        return CycleStats {
            total_cycles: 0,
            average_cycle_length: None,
            average_period_length: None,
            shortest_cycle: None,
            longest_cycle: None,
            last_period_start: None,
        };
    }

    let cycle_lengths: Vec<i64> = starts.windows(2).map(|w| (w[1] - w[0]).num_days()).collect();
    let period_lengths = measured_period_lengths(history, &starts);

    CycleStats {
        total_cycles: starts.len(),
        average_cycle_length: if cycle_lengths.is_empty() {
            None
        } else {
            Some(cycle_lengths.iter().sum::<i64>() as f32 / cycle_lengths.len() as f32)
        },
        average_period_length: if period_lengths.is_empty() {
            None
        } else {
            Some((period_lengths.iter().sum::<f64>() / period_lengths.len() as f64) as f32)
        },
        shortest_cycle: cycle_lengths.iter().copied().min(),
        longest_cycle: cycle_lengths.iter().copied().max(),
        last_period_start: starts.last().copied(),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
