use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{HabitError, HabitResult};
use crate::habit::{Habit, HabitFormData, HabitId};

/// Backing collection that owns the canonical habit list.
pub trait HabitStore: Send + Sync {
    fn list(&self) -> HabitResult<Vec<Habit>>;

    fn get(&self, id: &HabitId) -> HabitResult<Habit>;

    /// Assigns an id and stores a habit with an empty completion history.
    fn create(&self, form: HabitFormData) -> HabitResult<Habit>;

    /// Replaces the stored snapshot of `habit.id`.
    fn save(&self, habit: &Habit) -> HabitResult<Habit>;
}

/// Plain list plus id counter shared by the store implementations. New
/// habits go to the front, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HabitTable {
    #[serde(default)]
    habits: Vec<Habit>,
    /// `None` once the numeric id space is used up.
    #[serde(skip)]
    next_id: Option<u64>,
}

impl HabitTable {
    fn new(habits: Vec<Habit>) -> Self {
        let max_numeric = habits
            .iter()
            .filter_map(|habit| habit.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            habits,
            next_id: max_numeric.checked_add(1),
        }
    }

    /// Rejects snapshots no store operation could have produced.
    fn check(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for habit in &self.habits {
            ensure!(
                seen.insert(&habit.id),
                "habit id `{}` appears more than once",
                habit.id
            );
            ensure!(
                !habit.name.trim().is_empty(),
                "habit `{}` has a blank name",
                habit.id
            );
            ensure!(habit.goal > 0, "habit `{}` has a zero goal", habit.id);
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> HabitResult<HabitId> {
        loop {
            let current = self
                .next_id
                .ok_or_else(|| HabitError::store_unavailable("no numeric habit ids left"))?;
            self.next_id = current.checked_add(1);
            let candidate = HabitId::new(current.to_string());
            if !self.habits.iter().any(|habit| habit.id == candidate) {
                return Ok(candidate);
            }
        }
    }

    fn get(&self, id: &HabitId) -> HabitResult<Habit> {
        self.habits
            .iter()
            .find(|habit| &habit.id == id)
            .cloned()
            .ok_or_else(|| HabitError::NotFound(id.clone()))
    }

    fn create(&mut self, form: HabitFormData) -> HabitResult<Habit> {
        let form = form.validate()?;
        let habit = Habit::from_form(self.allocate_id()?, form);
        self.habits.insert(0, habit.clone());
        Ok(habit)
    }

    fn save(&mut self, habit: &Habit) -> HabitResult<Habit> {
        let slot = self
            .habits
            .iter_mut()
            .find(|candidate| candidate.id == habit.id)
            .ok_or_else(|| HabitError::NotFound(habit.id.clone()))?;
        *slot = habit.clone();
        Ok(habit.clone())
    }
}

#[derive(Debug)]
pub struct InMemoryHabitStore {
    table: RwLock<HabitTable>,
}

impl InMemoryHabitStore {
    pub fn new() -> Self {
        Self::with_habits(Vec::new())
    }

    pub fn with_habits(habits: Vec<Habit>) -> Self {
        Self {
            table: RwLock::new(HabitTable::new(habits)),
        }
    }
}

impl Default for InMemoryHabitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitStore for InMemoryHabitStore {
    fn list(&self) -> HabitResult<Vec<Habit>> {
        Ok(self.table.read().habits.clone())
    }

    fn get(&self, id: &HabitId) -> HabitResult<Habit> {
        self.table.read().get(id)
    }

    fn create(&self, form: HabitFormData) -> HabitResult<Habit> {
        self.table.write().create(form)
    }

    fn save(&self, habit: &Habit) -> HabitResult<Habit> {
        self.table.write().save(habit)
    }
}

/// Habits kept in a single JSON document of the form `{"habits": [...]}`.
///
/// The whole file is rewritten on every change, through a sibling temp file
/// renamed over the original. The in-memory copy only advances once the
/// write succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: RwLock<HabitTable>,
}

impl JsonFileStore {
    /// Opens `path`, treating a missing file as an empty store.
    pub fn open(path: impl AsRef<Path>) -> HabitResult<Self> {
        let path = path.as_ref().to_path_buf();
        let table = if path.exists() {
            Self::load(&path).map_err(|err| HabitError::store_unavailable(format!("{err:#}")))?
        } else {
            debug!(path = %path.display(), "habit file missing, starting empty");
            HabitTable::default()
        };
        info!(path = %path.display(), habits = table.habits.len(), "opened habit file");
        Ok(Self {
            path,
            table: RwLock::new(HabitTable::new(table.habits)),
        })
    }

    fn load(path: &Path) -> anyhow::Result<HabitTable> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        if raw.trim().is_empty() {
            return Ok(HabitTable::default());
        }
        let table: HabitTable = serde_json::from_str(&raw)
            .with_context(|| format!("unable to parse {}", path.display()))?;
        table
            .check()
            .with_context(|| format!("rejected {}", path.display()))?;
        Ok(table)
    }

    fn persist(&self, table: &HabitTable) -> HabitResult<()> {
        self.write_file(table)
            .map_err(|err| HabitError::store_unavailable(format!("{err:#}")))
    }

    fn write_file(&self, table: &HabitTable) -> anyhow::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)
                    .with_context(|| format!("unable to create {}", parent.display()))?;
                parent
            }
            _ => Path::new("."),
        };
        let mut payload = serde_json::to_string_pretty(table)?;
        payload.push('\n');

        let mut staged = NamedTempFile::new_in(dir)
            .with_context(|| format!("unable to stage a write in {}", dir.display()))?;
        staged.write_all(payload.as_bytes())?;
        staged.as_file().sync_all()?;
        staged
            .persist(&self.path)
            .with_context(|| format!("unable to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), habits = table.habits.len(), "habit file written");
        Ok(())
    }

    fn commit<T>(&self, change: impl FnOnce(&mut HabitTable) -> HabitResult<T>) -> HabitResult<T> {
        let mut table = self.table.write();
        let mut next = table.clone();
        let value = change(&mut next)?;
        self.persist(&next)?;
        *table = next;
        Ok(value)
    }
}

impl HabitStore for JsonFileStore {
    fn list(&self) -> HabitResult<Vec<Habit>> {
        Ok(self.table.read().habits.clone())
    }

    fn get(&self, id: &HabitId) -> HabitResult<Habit> {
        self.table.read().get(id)
    }

    fn create(&self, form: HabitFormData) -> HabitResult<Habit> {
        self.commit(|table| table.create(form))
    }

    fn save(&self, habit: &Habit) -> HabitResult<Habit> {
        self.commit(|table| table.save(habit))
    }
}
