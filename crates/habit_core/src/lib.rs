pub mod calendar;
pub mod clock;
pub mod date;
pub mod error;
pub mod habit;
pub mod service;
pub mod store;
pub mod streak;
pub mod tracker;

pub use crate::error::{HabitError, HabitResult};
pub use crate::habit::{Frequency, Habit, HabitFormData, HabitId, ToggleOutcome};
pub use crate::service::{HabitService, HabitServiceBuilder};
pub use crate::tracker::HabitCompletionTracker;
