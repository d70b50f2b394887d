use std::collections::HashMap;

use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    calendar::DayCell,
    clock::{Clock, SystemClock},
    error::{HabitError, HabitResult},
    habit::{Habit, HabitFormData, HabitId, ToggleOutcome},
    store::{HabitStore, InMemoryHabitStore},
    tracker::HabitCompletionTracker,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub total: usize,
    pub completed_today: usize,
    /// Share of habits completed today, as a rounded percentage.
    pub overall_progress: u32,
}

#[derive(Default)]
struct ServiceState {
    habits: Vec<Habit>,
    /// Last snapshot per habit that the store acknowledged.
    confirmed: HashMap<HabitId, Habit>,
}

impl ServiceState {
    fn replace_all(&mut self, habits: Vec<Habit>) {
        self.confirmed = habits
            .iter()
            .map(|habit| (habit.id.clone(), habit.clone()))
            .collect();
        self.habits = habits;
    }

    fn position(&self, id: &HabitId) -> HabitResult<usize> {
        self.habits
            .iter()
            .position(|habit| &habit.id == id)
            .ok_or_else(|| HabitError::NotFound(id.clone()))
    }

    fn confirm(&mut self, idx: usize, habit: Habit) {
        self.confirmed.insert(habit.id.clone(), habit.clone());
        self.habits[idx] = habit;
    }
}

/// Front door for screens: caches the habit list, applies toggles
/// optimistically and rolls back to the confirmed snapshot when the store
/// rejects a write.
pub struct HabitService {
    store: Box<dyn HabitStore>,
    tracker: HabitCompletionTracker<Box<dyn Clock>>,
    state: RwLock<ServiceState>,
}

pub struct HabitServiceBuilder {
    store: Option<Box<dyn HabitStore>>,
    clock: Option<Box<dyn Clock>>,
}

impl HabitServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            clock: None,
        }
    }

    pub fn with_store(mut self, store: impl HabitStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn build(self) -> HabitResult<HabitService> {
        let service = HabitService {
            store: self
                .store
                .unwrap_or_else(|| Box::new(InMemoryHabitStore::new())),
            tracker: HabitCompletionTracker::new(
                self.clock.unwrap_or_else(|| Box::new(SystemClock)),
            ),
            state: RwLock::new(ServiceState::default()),
        };
        service.reload_all()?;
        Ok(service)
    }
}

impl Default for HabitServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitService {
    pub fn builder() -> HabitServiceBuilder {
        HabitServiceBuilder::new()
    }

    pub fn today(&self) -> NaiveDate {
        self.tracker.today()
    }

    /// Refetches every habit, drops completions dated after today and
    /// refreshes the derived fields.
    #[instrument(skip(self))]
    pub fn reload_all(&self) -> HabitResult<()> {
        let today = self.today();
        let mut habits = self.store.list()?;
        for habit in &mut habits {
            self.tracker.refresh(habit);
        }
        info!(count = habits.len(), %today, "habits loaded");
        self.state.write().replace_all(habits);
        Ok(())
    }

    pub fn habits(&self) -> Vec<Habit> {
        self.state.read().habits.clone()
    }

    pub fn get_habit(&self, id: &HabitId) -> HabitResult<Habit> {
        let state = self.state.read();
        let idx = state.position(id)?;
        Ok(state.habits[idx].clone())
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    pub fn create_habit(&self, form: HabitFormData) -> HabitResult<Habit> {
        let form = form.validate()?;
        let mut habit = self.store.create(form)?;
        self.tracker.refresh(&mut habit);
        let mut state = self.state.write();
        state.confirmed.insert(habit.id.clone(), habit.clone());
        state.habits.insert(0, habit.clone());
        info!(id = %habit.id, "habit created");
        Ok(habit)
    }

    /// Rewrites descriptive fields; the completion history is left alone.
    #[instrument(skip(self, form))]
    pub fn update_habit(&self, id: &HabitId, form: HabitFormData) -> HabitResult<Habit> {
        let form = form.validate()?;
        let mut state = self.state.write();
        let idx = state.position(id)?;
        let mut edited = state.habits[idx].clone();
        edited.apply_edit(form);
        let mut saved = self.store.save(&edited)?;
        self.tracker.refresh(&mut saved);
        state.confirm(idx, saved.clone());
        Ok(saved)
    }

    pub fn is_completed(&self, id: &HabitId, date: &str) -> HabitResult<bool> {
        self.tracker.is_completed(&self.get_habit(id)?, date)
    }

    pub fn is_future(&self, date: &str) -> HabitResult<bool> {
        self.tracker.is_future(date)
    }

    pub fn toggle_today(&self, id: &HabitId) -> HabitResult<(Habit, ToggleOutcome)> {
        self.toggle_on(id, self.today())
    }

    /// Toggles completion of `date` (canonical `YYYY-MM-DD`).
    #[instrument(skip(self))]
    pub fn toggle_completion(
        &self,
        id: &HabitId,
        date: &str,
    ) -> HabitResult<(Habit, ToggleOutcome)> {
        self.apply_toggle(id, |tracker, habit| tracker.toggled(habit, date))
    }

    #[instrument(skip(self))]
    pub fn toggle_on(
        &self,
        id: &HabitId,
        date: NaiveDate,
    ) -> HabitResult<(Habit, ToggleOutcome)> {
        self.apply_toggle(id, |tracker, habit| Ok(tracker.toggled_date(habit, date)))
    }

    /// Applies the toggle to the cached habit first, then persists it. The
    /// write lock is held across the store call so writes stay serialized.
    fn apply_toggle<F>(&self, id: &HabitId, toggle: F) -> HabitResult<(Habit, ToggleOutcome)>
    where
        F: FnOnce(
            &HabitCompletionTracker<Box<dyn Clock>>,
            &Habit,
        ) -> HabitResult<(Habit, ToggleOutcome)>,
    {
        let mut state = self.state.write();
        let idx = state.position(id)?;

        let (optimistic, outcome) = toggle(&self.tracker, &state.habits[idx])?;
        if !outcome.changed() {
            return Ok((optimistic, outcome));
        }
        state.habits[idx] = optimistic.clone();

        match self.store.save(&optimistic) {
            Ok(mut saved) => {
                self.tracker.refresh(&mut saved);
                state.confirm(idx, saved.clone());
                info!(?outcome, streak = saved.streak, "completion saved");
                Ok((saved, outcome))
            }
            Err(err) => {
                let rollback = state
                    .confirmed
                    .get(id)
                    .cloned()
                    .ok_or_else(|| HabitError::NotFound(id.clone()))?;
                warn!(%err, "save failed, reverting to confirmed snapshot");
                state.habits[idx] = rollback;
                Err(err)
            }
        }
    }

    pub fn month_cells(&self, id: &HabitId, year: i32, month: u32) -> HabitResult<Vec<DayCell>> {
        let habit = self.get_habit(id)?;
        self.tracker.visible_month_cells(&habit, year, month)
    }

    pub fn stats(&self) -> HabitStats {
        let state = self.state.read();
        let total = state.habits.len();
        let completed_today = state
            .habits
            .iter()
            .filter(|habit| habit.completed_today)
            .count();
        let overall_progress = if total == 0 {
            0
        } else {
            ((completed_today as f64 / total as f64) * 100.0).round() as u32
        };
        HabitStats {
            total,
            completed_today,
            overall_progress,
        }
    }

    /// Looks a habit up by id or, failing that, by case-insensitive name.
    pub fn resolve(&self, key: &str) -> HabitResult<HabitId> {
        let state = self.state.read();
        if let Some(habit) = state.habits.iter().find(|habit| habit.id.as_str() == key) {
            return Ok(habit.id.clone());
        }
        let matches: Vec<&Habit> = state
            .habits
            .iter()
            .filter(|habit| habit.name.eq_ignore_ascii_case(key.trim()))
            .collect();
        match matches.as_slice() {
            [single] => Ok(single.id.clone()),
            [] => Err(HabitError::NotFound(HabitId::new(key))),
            _ => Err(HabitError::validation(format!(
                "`{key}` matches {} habits, use an id",
                matches.len()
            ))),
        }
    }
}
