use chrono::{Datelike, NaiveDate};

use crate::grid::{self, CalendarError};
use crate::models::{CalendarSettings, CycleLog, CycleProfile, MonthGrid};
use crate::prediction;

/// View state for a mounted calendar: the selected day and the visible
/// month, plus a snapshot of log history. Instances are independent;
/// nothing is shared between them.
pub struct SelectionController {
    today: NaiveDate,
    selected: NaiveDate,
    month: u32,
    year: i32,
    history: Vec<CycleLog>,
    history_version: u64,
    profile: CycleProfile,
    settings: CalendarSettings,
    cache: Option<CachedGrid>,
}

struct CachedGrid {
    key: (u32, i32, u64, NaiveDate),
    grid: MonthGrid,
}

impl SelectionController {
    /// Selection defaults to `today`, the visible month to today's.
    pub fn new(today: NaiveDate, history: Vec<CycleLog>, settings: CalendarSettings) -> Self {
        let profile = prediction::predict(&history, &settings);
        Self {
            today,
            selected: today,
            month: today.month(),
            year: today.year(),
            history,
            history_version: 0,
            profile,
            settings,
            cache: None,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected
    }

    /// `(month, year)` currently in view.
    pub fn visible_month(&self) -> (u32, i32) {
        (self.month, self.year)
    }

    pub fn profile(&self) -> &CycleProfile {
        &self.profile
    }

    /// Wire target for the renderer's day-pressed callback. Selecting a
    /// lead-in/out day is permitted and never moves the visible month;
    /// the month jump is the caller's UX.
    pub fn select_day(&mut self, date: NaiveDate) {
        self.selected = date;
    }

    pub fn set_visible_month(&mut self, month: u32, year: i32) -> Result<(), CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::MonthOutOfRange(month));
        }
        self.month = month;
        self.year = year;
        Ok(())
    }

    /// Move the visible month by `delta` months, carrying across year
    /// boundaries. Convenience for the host's prev/next chevrons.
    pub fn step_month(&mut self, delta: i32) {
        let months = self.year * 12 + self.month as i32 - 1 + delta;
        self.year = months.div_euclid(12);
        self.month = months.rem_euclid(12) as u32 + 1;
    }

    /// Replace the history snapshot after the log store changes. Each
    /// replacement invalidates the memoized grid and re-derives the
    /// profile; a streamed store update is just a fresh snapshot.
    pub fn set_history(&mut self, history: Vec<CycleLog>) {
        self.history = history;
        self.history_version += 1;
        self.profile = prediction::predict(&self.history, &self.settings);
    }

    /// Grid for the current view state, rebuilt only when the visible
    /// month, the selection, or the history version changed since the
    /// last call.
    pub fn current_grid(&mut self) -> Result<&MonthGrid, CalendarError> {
        let key = (self.month, self.year, self.history_version, self.selected);
        let grid = match self.cache.take().filter(|cached| cached.key == key) {
            Some(cached) => cached.grid,
            None => grid::build(
                self.month,
                self.year,
                &self.history,
                &self.profile,
                self.today,
                self.selected,
                &self.settings,
            )?,
        };
        let cached = self.cache.insert(CachedGrid { key, grid });
        Ok(&cached.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogKind;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn log(s: &str, kind: LogKind) -> CycleLog {
        CycleLog {
            id: Uuid::new_v4(),
            date: date(s),
            kind,
            notes: String::new(),
        }
    }

    fn worked_history() -> Vec<CycleLog> {
        vec![
            log("2024-01-01", LogKind::PeriodStart),
            log("2024-01-29", LogKind::PeriodStart),
        ]
    }

    fn controller() -> SelectionController {
        SelectionController::new(
            date("2024-02-10"),
            worked_history(),
            CalendarSettings::default(),
        )
    }

    #[test]
    fn defaults_follow_today() {
        let mut ctrl = controller();
        assert_eq!(ctrl.selected_date(), date("2024-02-10"));
        assert_eq!(ctrl.visible_month(), (2, 2024));
        let grid = ctrl.current_grid().unwrap();
        let selected: Vec<_> = grid
            .weeks
            .iter()
            .flatten()
            .filter(|d| d.is_selected)
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].date, date("2024-02-10"));
        assert!(selected[0].is_today);
    }

    #[test]
    fn select_day_moves_the_single_selection() {
        let mut ctrl = controller();
        ctrl.select_day(date("2024-02-03"));
        let grid = ctrl.current_grid().unwrap();
        let selected: Vec<_> = grid
            .weeks
            .iter()
            .flatten()
            .filter(|d| d.is_selected)
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].date, date("2024-02-03"));
    }

    #[test]
    fn selecting_a_lead_day_keeps_the_month() {
        let mut ctrl = controller();
        // 2024-03-01 is a lead-out day of the February grid.
        ctrl.select_day(date("2024-03-01"));
        assert_eq!(ctrl.visible_month(), (2, 2024));
        let grid = ctrl.current_grid().unwrap();
        assert_eq!(grid.month, 2);
        let selected = grid
            .weeks
            .iter()
            .flatten()
            .find(|d| d.is_selected)
            .unwrap();
        assert_eq!(selected.date, date("2024-03-01"));
        assert!(!selected.in_month);
    }

    #[test]
    fn repeated_calls_reuse_the_cached_grid() {
        let mut ctrl = controller();
        let first = ctrl.current_grid().unwrap() as *const MonthGrid;
        let second = ctrl.current_grid().unwrap() as *const MonthGrid;
        assert_eq!(first, second);
        ctrl.select_day(date("2024-02-03"));
        let third = ctrl.current_grid().unwrap().clone();
        assert!(third.weeks.iter().flatten().any(|d| d.is_selected
            && d.date == date("2024-02-03")));
    }

    #[test]
    fn set_visible_month_validates_range() {
        let mut ctrl = controller();
        assert_eq!(
            ctrl.set_visible_month(13, 2024),
            Err(CalendarError::MonthOutOfRange(13))
        );
        assert_eq!(ctrl.visible_month(), (2, 2024));
        ctrl.set_visible_month(3, 2024).unwrap();
        assert_eq!(ctrl.current_grid().unwrap().month, 3);
    }

    #[test]
    fn step_month_carries_across_years() {
        let mut ctrl = controller();
        ctrl.set_visible_month(1, 2024).unwrap();
        ctrl.step_month(-1);
        assert_eq!(ctrl.visible_month(), (12, 2023));
        ctrl.step_month(2);
        assert_eq!(ctrl.visible_month(), (2, 2024));
        ctrl.step_month(24);
        assert_eq!(ctrl.visible_month(), (2, 2026));
    }

    #[test]
    fn new_history_invalidates_the_grid() {
        let mut ctrl = SelectionController::new(
            date("2024-02-10"),
            Vec::new(),
            CalendarSettings::default(),
        );
        assert!(ctrl
            .current_grid()
            .unwrap()
            .weeks
            .iter()
            .flatten()
            .all(|d| !d.is_period));
        ctrl.set_history(worked_history());
        let grid = ctrl.current_grid().unwrap();
        assert!(grid
            .weeks
            .iter()
            .flatten()
            .any(|d| d.date == date("2024-02-26") && d.is_period));
    }
}
