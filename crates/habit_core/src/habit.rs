use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::date::canonical_dates;
use crate::error::{HabitError, HabitResult};
use crate::streak::streak_from;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HabitId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Day,
    Week,
    Month,
}

impl Frequency {
    /// Goal suggested by the creation form when this cadence is picked.
    pub fn default_goal(self) -> u32 {
        match self {
            Frequency::Day => 1,
            Frequency::Week => 3,
            Frequency::Month => 8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Day => "day",
            Frequency::Week => "week",
            Frequency::Month => "month",
        }
    }

    pub fn goal_heading(self) -> &'static str {
        match self {
            Frequency::Day => "Daily Goal",
            Frequency::Week => "Weekly Goal",
            Frequency::Month => "Monthly Goal",
        }
    }

    /// Text shown under a goal count, e.g. `3 times per week` or
    /// `8 cups per day` when a unit is set.
    pub fn describe_goal(self, goal: u32, unit: Option<&str>) -> String {
        match unit.map(str::trim).filter(|unit| !unit.is_empty()) {
            Some(unit) => {
                let plural = if goal > 1 { "s" } else { "" };
                format!("{unit}{plural} per {}", self.as_str())
            }
            None if goal == 1 => format!("time per {}", self.as_str()),
            None => format!("times per {}", self.as_str()),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Frequency {
    type Err = HabitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Frequency::Day),
            "week" | "weekly" => Ok(Frequency::Week),
            "month" | "monthly" => Ok(Frequency::Month),
            other => Err(HabitError::validation(format!(
                "unknown frequency `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_frequency")]
    pub frequency: Frequency,
    pub goal: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, with = "canonical_dates")]
    pub completed_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub completed_today: bool,
}

/// Stored cadences that are missing or unknown read as daily.
fn lenient_frequency<'de, D>(deserializer: D) -> Result<Frequency, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| value.parse().ok())
        .unwrap_or_default())
}

/// What a single toggle did to a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Completed,
    Cleared,
    /// The date lies after today; nothing changed.
    IgnoredFuture,
}

impl ToggleOutcome {
    pub fn changed(self) -> bool {
        !matches!(self, ToggleOutcome::IgnoredFuture)
    }
}

impl Habit {
    /// A fresh habit with no completion history.
    pub fn from_form(id: HabitId, form: HabitFormData) -> Self {
        Self {
            id,
            name: form.name,
            description: form.description,
            frequency: form.frequency,
            goal: form.goal,
            unit: Some(form.unit).filter(|unit| !unit.is_empty()),
            color: None,
            icon: None,
            completed_dates: BTreeSet::new(),
            streak: 0,
            longest_streak: 0,
            completed_today: false,
        }
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(&date)
    }

    /// Flips membership of `date`, then recomputes the derived fields.
    ///
    /// Dates after `today` are ignored and leave the habit untouched.
    pub fn toggle_on(&mut self, date: NaiveDate, today: NaiveDate) -> ToggleOutcome {
        if date > today {
            return ToggleOutcome::IgnoredFuture;
        }
        let outcome = if self.completed_dates.remove(&date) {
            ToggleOutcome::Cleared
        } else {
            self.completed_dates.insert(date);
            ToggleOutcome::Completed
        };
        self.refresh(today);
        outcome
    }

    /// Recomputes `completed_today` and `streak` for `today` and raises the
    /// `longest_streak` high-water mark if the current streak passed it.
    pub fn refresh(&mut self, today: NaiveDate) {
        self.completed_today = self.completed_dates.contains(&today);
        self.streak = streak_from(&self.completed_dates, today);
        self.longest_streak = self.longest_streak.max(self.streak);
    }

    /// Removes completions dated after `today` and returns them.
    pub fn discard_after(&mut self, today: NaiveDate) -> BTreeSet<NaiveDate> {
        match today.succ_opt() {
            Some(tomorrow) => self.completed_dates.split_off(&tomorrow),
            None => BTreeSet::new(),
        }
    }

    /// Applies edited descriptive fields. Completion history is kept and the
    /// goal is taken exactly as submitted.
    pub fn apply_edit(&mut self, form: HabitFormData) {
        self.name = form.name;
        self.description = form.description;
        self.frequency = form.frequency;
        self.goal = form.goal;
        self.unit = Some(form.unit).filter(|unit| !unit.is_empty());
    }

    pub fn goal_label(&self) -> String {
        self.frequency.describe_goal(self.goal, self.unit.as_deref())
    }
}

/// Input of the creation and edit forms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HabitFormData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub frequency: Frequency,
    pub goal: u32,
    #[serde(default)]
    pub unit: String,
}

impl Default for HabitFormData {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            frequency: Frequency::Day,
            goal: Frequency::Day.default_goal(),
            unit: String::new(),
        }
    }
}

impl HabitFormData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Switches cadence and resets the goal to that cadence's default.
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        if self.frequency != frequency {
            self.frequency = frequency;
            self.goal = frequency.default_goal();
        }
        self
    }

    pub fn with_goal(mut self, goal: u32) -> Self {
        self.goal = goal;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Trims text fields and rejects a blank name or a zero goal.
    pub fn validate(mut self) -> HabitResult<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(HabitError::validation("habit name must not be blank"));
        }
        if self.goal == 0 {
            return Err(HabitError::validation("goal must be at least 1"));
        }
        self.name = name.to_string();
        self.description = self.description.trim().to_string();
        self.unit = self.unit.trim().to_string();
        Ok(self)
    }
}
