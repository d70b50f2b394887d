use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use habit_core::{
    clock::{FixedClock, SystemClock},
    date::{format_date, month_title, parse_date, parse_month, shift_month},
    store::{HabitStore, JsonFileStore},
    Frequency, HabitError, HabitFormData, HabitService, ToggleOutcome,
};
use tracing::{debug, info};

use crate::cli::{Cli, Command};
use crate::render::{render_calendar, render_card, render_detail, render_stats};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub(crate) db_path: PathBuf,
    pub(crate) today: Option<NaiveDate>,
    pub(crate) seed_demo: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("HABIT_DB_PATH") {
            if !path.trim().is_empty() {
                config.db_path = PathBuf::from(path);
            }
        }
        if let Ok(today) = std::env::var("HABIT_TODAY") {
            let today = parse_date(today.trim()).context("HABIT_TODAY is not a valid date")?;
            config.today = Some(today);
        }
        if let Ok(flag) = std::env::var("HABIT_SEED_DEMO") {
            config.seed_demo = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        Ok(config)
    }

    /// Command-line flags take precedence over the environment.
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        if let Some(path) = &cli.db {
            self.db_path = path.clone();
        }
        if let Some(today) = &cli.today {
            self.today = Some(parse_date(today).context("--today is not a valid date")?);
        }
        Ok(())
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn with_seed_demo(mut self, seed_demo: bool) -> Self {
        self.seed_demo = seed_demo;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("habits.json"),
            today: None,
            seed_demo: false,
        }
    }
}

fn demo_habits() -> Vec<HabitFormData> {
    vec![
        HabitFormData::new("Drink Water")
            .with_description("Stay hydrated throughout the day")
            .with_goal(8)
            .with_unit("cup"),
        HabitFormData::new("Read").with_description("Read before bed"),
        HabitFormData::new("Workout").with_frequency(Frequency::Week),
    ]
}

pub fn build_service(config: &AppConfig) -> Result<HabitService> {
    let store = JsonFileStore::open(&config.db_path)
        .with_context(|| format!("unable to open {}", config.db_path.display()))?;
    if config.seed_demo && store.list()?.is_empty() {
        for form in demo_habits() {
            store.create(form)?;
        }
        info!(path = %config.db_path.display(), "seeded demo habits");
    }

    let builder = HabitService::builder().with_store(store);
    let builder = match config.today {
        Some(today) => {
            debug!(%today, "using fixed date");
            builder.with_clock(FixedClock(today))
        }
        None => builder.with_clock(SystemClock),
    };
    builder.build().context("failed to load habits")
}

pub fn run(config: AppConfig, command: Command, out: &mut dyn Write) -> Result<()> {
    info!(db = %config.db_path.display(), ?command, "running command");
    let service = build_service(&config)?;

    match command {
        Command::List => {
            let habits = service.habits();
            if habits.is_empty() {
                writeln!(out, "No habits yet. Add one with `habits add <name>`.")?;
            }
            for habit in &habits {
                writeln!(out, "{}", render_card(habit))?;
            }
        }
        Command::Add {
            name,
            description,
            frequency,
            goal,
            unit,
        } => {
            let mut form = HabitFormData::new(name)
                .with_description(description)
                .with_frequency(frequency)
                .with_unit(unit);
            if let Some(goal) = goal {
                form = form.with_goal(goal);
            }
            let habit = service.create_habit(form)?;
            writeln!(out, "Created {}", render_card(&habit))?;
        }
        Command::Edit {
            habit,
            name,
            description,
            frequency,
            goal,
            unit,
        } => {
            let id = service.resolve(&habit)?;
            let current = service.get_habit(&id)?;
            let mut form = HabitFormData {
                name: name.unwrap_or(current.name),
                description: description.unwrap_or(current.description),
                frequency: current.frequency,
                goal: current.goal,
                unit: unit.or(current.unit).unwrap_or_default(),
            };
            if let Some(frequency) = frequency {
                form = form.with_frequency(frequency);
            }
            if let Some(goal) = goal {
                form = form.with_goal(goal);
            }
            let habit = service.update_habit(&id, form)?;
            writeln!(out, "Updated\n{}", render_detail(&habit))?;
        }
        Command::Toggle { habit, date } => {
            let id = service.resolve(&habit)?;
            let date = date.unwrap_or_else(|| format_date(service.today()));
            let (habit, outcome) = match service.toggle_completion(&id, &date) {
                Ok(result) => result,
                Err(err @ HabitError::StoreUnavailable(_)) => {
                    return Err(err)
                        .context("change was not saved and has been reverted; try again");
                }
                Err(err) => return Err(err.into()),
            };
            match outcome {
                ToggleOutcome::Completed => writeln!(
                    out,
                    "✓ {} completed on {date} · {} day streak",
                    habit.name, habit.streak
                )?,
                ToggleOutcome::Cleared => writeln!(
                    out,
                    "○ {} cleared on {date} · {} day streak",
                    habit.name, habit.streak
                )?,
                ToggleOutcome::IgnoredFuture => {
                    writeln!(out, "{date} is in the future; nothing changed")?
                }
            }
        }
        Command::Check { habit, date } => {
            let id = service.resolve(&habit)?;
            let name = service.get_habit(&id)?.name;
            let date = date.unwrap_or_else(|| format_date(service.today()));
            if service.is_future(&date)? {
                writeln!(out, "{date} is in the future")?;
            } else if service.is_completed(&id, &date)? {
                writeln!(out, "✓ {name} done on {date}")?;
            } else {
                writeln!(out, "○ {name} not done on {date}")?;
            }
        }
        Command::Show {
            habit,
            month,
            prev,
            next,
        } => {
            let id = service.resolve(&habit)?;
            let habit = service.get_habit(&id)?;
            let (year, month) = match month {
                Some(selector) => parse_month(&selector)?,
                None => {
                    let today = service.today();
                    (today.year(), today.month())
                }
            };
            let (year, month) = shift_month(year, month, i32::from(next) - i32::from(prev))?;
            let cells = service.month_cells(&id, year, month)?;
            writeln!(out, "{}", render_detail(&habit))?;
            writeln!(out)?;
            writeln!(out, "{}", render_calendar(&month_title(year, month)?, &cells))?;
        }
        Command::Stats => {
            writeln!(out, "{}", render_stats(&service.stats()))?;
        }
    }
    Ok(())
}
