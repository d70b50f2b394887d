use std::fs;

use habit_core::calendar::DayCell;
use habit_core::clock::FixedClock;
use habit_core::date::parse_date;
use habit_core::store::{HabitStore, JsonFileStore};
use habit_core::{Frequency, HabitFormData, HabitService, ToggleOutcome};
use tempfile::tempdir;

const DB_FIXTURE: &str = r##"{
  "habits": [
    {
      "id": "1",
      "name": "Drink Water",
      "description": "Stay hydrated",
      "streak": 12,
      "longestStreak": 15,
      "completedToday": true,
      "color": "#00D4AA",
      "icon": "💧",
      "completedDates": ["2025-06-20", "2025-06-21", "2025-06-22"],
      "frequency": "day",
      "goal": 8,
      "unit": "cup"
    },
    {
      "id": "2",
      "name": "Gym",
      "description": "",
      "streak": 0,
      "longestStreak": 0,
      "completedToday": false,
      "completedDates": [],
      "frequency": "week",
      "goal": 3
    }
  ]
}
"##;

#[test]
fn toggles_survive_a_restart() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("db.json");
    fs::write(&path, DB_FIXTURE).expect("write fixture");
    let clock = FixedClock(parse_date("2025-06-23").expect("date"));

    let service = HabitService::builder()
        .with_store(JsonFileStore::open(&path).expect("open store"))
        .with_clock(clock)
        .build()
        .expect("build service");

    let habits = service.habits();
    assert_eq!(habits.len(), 2);
    let water = &habits[0];
    assert_eq!(water.streak, 3, "stale stored streak is recomputed");
    assert!(!water.completed_today);
    assert_eq!(water.longest_streak, 15);
    assert_eq!(water.goal_label(), "cups per day");

    let (water, outcome) = service
        .toggle_today(&water.id)
        .expect("toggle today");
    assert_eq!(outcome, ToggleOutcome::Completed);
    assert_eq!(water.streak, 4);

    let created = service
        .create_habit(
            HabitFormData::new("Read")
                .with_frequency(Frequency::Month)
                .with_unit("book"),
        )
        .expect("create habit");
    assert_eq!(created.id.as_str(), "3");
    assert_eq!(created.goal, 8);

    let (_, ignored) = service
        .toggle_completion(&created.id, "2025-06-24")
        .expect("future toggle");
    assert_eq!(ignored, ToggleOutcome::IgnoredFuture);

    let stats = service.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed_today, 1);
    assert_eq!(stats.overall_progress, 33);

    drop(service);
    let reopened = JsonFileStore::open(&path).expect("reopen store");
    let stored = reopened.list().expect("list");
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].name, "Read");
    let water = stored
        .iter()
        .find(|habit| habit.name == "Drink Water")
        .expect("water stored");
    assert!(water.completed_dates.contains(&parse_date("2025-06-23").unwrap()));
    assert_eq!(water.icon.as_deref(), Some("💧"));

    let restarted = HabitService::builder()
        .with_store(reopened)
        .with_clock(clock)
        .build()
        .expect("rebuild service");
    let cells = restarted
        .month_cells(&water.id, 2025, 6)
        .expect("month cells");
    let completed_days: Vec<u32> = cells
        .iter()
        .filter_map(|cell| match cell {
            DayCell::Day {
                completed: true, ..
            } => cell.day_of_month(),
            _ => None,
        })
        .collect();
    assert_eq!(completed_days, vec![20, 21, 22, 23]);
}
