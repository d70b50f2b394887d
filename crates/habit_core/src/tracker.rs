use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::calendar::{month_cells, DayCell};
use crate::clock::{Clock, SystemClock};
use crate::date::parse_date;
use crate::error::HabitResult;
use crate::habit::{Habit, ToggleOutcome};

/// Completion queries and toggles for a habit, with "today" supplied by a
/// clock and string dates validated before they reach the habit.
#[derive(Debug, Clone, Default)]
pub struct HabitCompletionTracker<C = SystemClock> {
    clock: C,
}

impl<C: Clock> HabitCompletionTracker<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn is_completed(&self, habit: &Habit, date: &str) -> HabitResult<bool> {
        Ok(habit.is_completed_on(parse_date(date)?))
    }

    /// Strictly after today, compared by calendar day.
    pub fn is_future(&self, date: &str) -> HabitResult<bool> {
        Ok(parse_date(date)? > self.today())
    }

    pub fn toggle(&self, habit: &mut Habit, date: &str) -> HabitResult<ToggleOutcome> {
        Ok(self.toggle_date(habit, parse_date(date)?))
    }

    pub fn toggle_date(&self, habit: &mut Habit, date: NaiveDate) -> ToggleOutcome {
        let outcome = habit.toggle_on(date, self.today());
        debug!(habit = %habit.id, %date, ?outcome, streak = habit.streak, "toggled completion");
        outcome
    }

    /// Snapshot variant of [`toggle`](Self::toggle): returns the updated habit
    /// and leaves the input untouched.
    pub fn toggled(&self, habit: &Habit, date: &str) -> HabitResult<(Habit, ToggleOutcome)> {
        Ok(self.toggled_date(habit, parse_date(date)?))
    }

    pub fn toggled_date(&self, habit: &Habit, date: NaiveDate) -> (Habit, ToggleOutcome) {
        let mut next = habit.clone();
        let outcome = self.toggle_date(&mut next, date);
        (next, outcome)
    }

    /// Brings a loaded snapshot up to date: completions after today are
    /// dropped and the derived fields recomputed.
    pub fn refresh(&self, habit: &mut Habit) {
        let today = self.today();
        let dropped = habit.discard_after(today);
        if !dropped.is_empty() {
            warn!(
                habit = %habit.id,
                %today,
                dropped = ?dropped,
                "discarding completions dated after today"
            );
        }
        habit.refresh(today);
    }

    pub fn visible_month_cells(
        &self,
        habit: &Habit,
        year: i32,
        month: u32,
    ) -> HabitResult<Vec<DayCell>> {
        month_cells(&habit.completed_dates, year, month, self.today())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::HabitError;
    use crate::habit::{HabitFormData, HabitId};

    fn tracker() -> HabitCompletionTracker<FixedClock> {
        HabitCompletionTracker::new(FixedClock(parse_date("2025-06-23").unwrap()))
    }

    fn habit_with(dates: &[&str]) -> Habit {
        let mut habit = Habit::from_form(HabitId::new("1"), HabitFormData::new("Stretch"));
        habit.completed_dates = dates.iter().map(|d| parse_date(d).unwrap()).collect();
        habit
    }

    #[test]
    fn toggling_today_extends_a_broken_run() {
        let tracker = tracker();
        let mut habit = habit_with(&["2025-06-20", "2025-06-22"]);
        let outcome = tracker.toggle(&mut habit, "2025-06-23").unwrap();
        assert_eq!(outcome, ToggleOutcome::Completed);
        assert!(tracker.is_completed(&habit, "2025-06-23").unwrap());
        assert_eq!(habit.streak, 2);
        assert!(habit.completed_today);
    }

    #[test]
    fn future_dates_are_inert() {
        let tracker = tracker();
        let habit = habit_with(&["2025-06-22"]);
        assert!(tracker.is_future("2025-06-30").unwrap());
        assert!(!tracker.is_future("2025-06-23").unwrap());
        let (next, outcome) = tracker.toggled(&habit, "2025-06-30").unwrap();
        assert_eq!(outcome, ToggleOutcome::IgnoredFuture);
        assert_eq!(next, habit);
    }

    #[test]
    fn empty_history_has_nothing_today() {
        let tracker = tracker();
        let mut habit = habit_with(&[]);
        habit.refresh(tracker.today());
        assert_eq!(habit.streak, 0);
        assert!(!habit.completed_today);
    }

    #[test]
    fn refresh_drops_future_completions() {
        let tracker = tracker();
        let mut habit = habit_with(&["2025-06-21", "2025-06-22", "2025-06-30"]);
        habit.streak = 7;
        tracker.refresh(&mut habit);
        assert!(!tracker.is_completed(&habit, "2025-06-30").unwrap());
        assert_eq!(habit.completed_dates.len(), 2);
        assert_eq!(habit.streak, 2);
        assert_eq!(habit.longest_streak, 2);
    }

    #[test]
    fn double_toggle_restores_history() {
        let tracker = tracker();
        let mut habit = habit_with(&[]);
        tracker.toggle(&mut habit, "2025-06-23").unwrap();
        tracker.toggle(&mut habit, "2025-06-23").unwrap();
        assert!(habit.completed_dates.is_empty());
        assert_eq!(habit.streak, 0);
        assert!(!habit.completed_today);
        // The best streak is a high-water mark and remembers the brief run.
        assert_eq!(habit.longest_streak, 1);
    }

    #[test]
    fn malformed_dates_fail_fast() {
        let tracker = tracker();
        let mut habit = habit_with(&[]);
        let before = habit.clone();
        assert_eq!(
            tracker.toggle(&mut habit, "2025-6-23"),
            Err(HabitError::InvalidDate("2025-6-23".into()))
        );
        assert!(tracker.is_completed(&habit, "June 23").is_err());
        assert!(tracker.is_future("").is_err());
        assert_eq!(habit, before);
    }

    #[test]
    fn month_cells_follow_completion() {
        let tracker = tracker();
        let habit = habit_with(&["2025-06-01", "2025-06-23"]);
        let cells = tracker.visible_month_cells(&habit, 2025, 6).unwrap();
        assert_eq!(cells.len(), 30);
        for cell in &cells {
            if let DayCell::Day { date, completed, .. } = cell {
                assert_eq!(*completed, habit.is_completed_on(*date));
            }
        }
    }
}
