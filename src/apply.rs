//! Applying a canonical mapping to a meal store.
//!
//! A store holds meals (id + name) and days whose category slots reference
//! meals by id. For every mapped name the old meal is either renamed in
//! place, when the canonical name is not stored yet, or merged into the
//! canonical meal: day references are repointed and the old meal deleted.

use crate::error::{Error, Result};
use crate::mapping::CanonicalMapping;
use crate::preview::truncate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Names in apply logs are cut to this many characters.
const LOG_NAME_CHARS: usize = 60;

pub type MealId = u64;

// ============================================================================
// Store seam
// ============================================================================

/// Storage the apply step runs against.
///
/// Implementations backed by a database map `begin`/`commit`/`rollback` to
/// a real transaction.
pub trait MealStore {
    /// Id of the first meal stored under exactly `name`.
    fn find_id(&self, name: &str) -> Result<Option<MealId>>;

    fn rename(&mut self, id: MealId, name: &str) -> Result<()>;

    /// Number of day slots that reference `id`.
    fn reference_count(&self, id: MealId) -> Result<usize>;

    /// Points every day slot holding `old` at `new`. Returns the slots changed.
    fn repoint_references(&mut self, old: MealId, new: MealId) -> Result<usize>;

    fn delete(&mut self, id: MealId) -> Result<()>;

    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
}

// ============================================================================
// Apply
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// Look everything up, change nothing.
    #[default]
    DryRun,
    /// Apply all changes in one transaction.
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// The old name is not stored.
    Skipped,
    /// The old meal took the canonical name.
    Renamed,
    /// The old meal was folded into the existing canonical meal.
    Merged,
}

/// What happened to one mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyRecord {
    pub old: String,
    pub canonical: String,
    pub outcome: ApplyOutcome,
    /// Day slots repointed (or that would be, in a dry run).
    pub references: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub mode: ApplyMode,
    pub records: Vec<ApplyRecord>,
}

impl ApplyReport {
    fn count(&self, outcome: ApplyOutcome) -> usize {
        self.records
            .iter()
            .filter(|record| record.outcome == outcome)
            .count()
    }

    pub fn renamed(&self) -> usize {
        self.count(ApplyOutcome::Renamed)
    }

    pub fn merged(&self) -> usize {
        self.count(ApplyOutcome::Merged)
    }

    pub fn skipped(&self) -> usize {
        self.count(ApplyOutcome::Skipped)
    }

    /// Renamed plus merged meals.
    pub fn updates_made(&self) -> usize {
        self.renamed() + self.merged()
    }
}

/// Applies `mapping` to `store`, in mapping order.
///
/// In [`ApplyMode::Commit`] the whole run is one transaction: the first
/// failing entry rolls everything back and its error is returned.
pub fn apply_mapping<S>(
    store: &mut S,
    mapping: &CanonicalMapping,
    mode: ApplyMode,
) -> Result<ApplyReport>
where
    S: MealStore + ?Sized,
{
    info!(entries = mapping.len(), ?mode, "applying canonical mapping");

    if mode == ApplyMode::DryRun {
        return apply_entries(store, mapping, mode);
    }

    store.begin()?;
    let result = apply_entries(store, mapping, mode).and_then(|report| {
        store.commit()?;
        Ok(report)
    });

    if let Err(err) = &result {
        warn!(error = %err, "apply failed, rolling back");
        if let Err(rollback_err) = store.rollback() {
            warn!(error = %rollback_err, "rollback failed");
        }
    }

    result
}

fn apply_entries<S>(
    store: &mut S,
    mapping: &CanonicalMapping,
    mode: ApplyMode,
) -> Result<ApplyReport>
where
    S: MealStore + ?Sized,
{
    let commit = mode == ApplyMode::Commit;
    let mut records = Vec::with_capacity(mapping.len());

    for (old, canonical) in mapping.iter() {
        if old == canonical {
            continue;
        }

        let record = |outcome, references| ApplyRecord {
            old: old.to_string(),
            canonical: canonical.to_string(),
            outcome,
            references,
        };

        let Some(old_id) = store.find_id(old)? else {
            warn!(old = %truncate(old, LOG_NAME_CHARS), "not stored, skipped");
            records.push(record(ApplyOutcome::Skipped, 0));
            continue;
        };

        match store.find_id(canonical)? {
            None => {
                if commit {
                    store.rename(old_id, canonical)?;
                }
                info!(
                    "Renamed: {} -> {}",
                    truncate(old, LOG_NAME_CHARS),
                    truncate(canonical, LOG_NAME_CHARS)
                );
                records.push(record(ApplyOutcome::Renamed, 0));
            }
            Some(canonical_id) => {
                let references = if commit {
                    let moved = store.repoint_references(old_id, canonical_id)?;
                    store.delete(old_id)?;
                    moved
                } else {
                    store.reference_count(old_id)?
                };
                info!(
                    references,
                    "Merged: {} -> {}",
                    truncate(old, LOG_NAME_CHARS),
                    truncate(canonical, LOG_NAME_CHARS)
                );
                records.push(record(ApplyOutcome::Merged, references));
            }
        }
    }

    Ok(ApplyReport { mode, records })
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub id: MealId,
    pub name: String,
}

/// One menu day with its four category slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Day {
    pub date: String,
    pub daily_special: Option<MealId>,
    pub vegetarian: Option<MealId>,
    pub pizza_pasta: Option<MealId>,
    pub wok: Option<MealId>,
}

impl Day {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Self::default()
        }
    }

    fn slots(&self) -> [Option<MealId>; 4] {
        [self.daily_special, self.vegetarian, self.pizza_pasta, self.wok]
    }

    fn slots_mut(&mut self) -> [&mut Option<MealId>; 4] {
        [
            &mut self.daily_special,
            &mut self.vegetarian,
            &mut self.pizza_pasta,
            &mut self.wok,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    meals: Vec<Meal>,
    days: Vec<Day>,
}

/// Meal store kept in memory and persisted as JSON.
///
/// `begin` snapshots the tables; `rollback` restores the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStore {
    meals: Vec<Meal>,
    days: Vec<Day>,
    #[serde(skip)]
    snapshot: Option<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Stores a meal under the next free id.
    pub fn add_meal(&mut self, name: impl Into<String>) -> MealId {
        let id = self.meals.iter().map(|meal| meal.id).max().unwrap_or(0) + 1;
        self.meals.push(Meal {
            id,
            name: name.into(),
        });
        id
    }

    pub fn add_day(&mut self, day: Day) {
        self.days.push(day);
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn meal_names(&self) -> Vec<String> {
        self.meals.iter().map(|meal| meal.name.clone()).collect()
    }

    pub fn meal(&self, id: MealId) -> Option<&Meal> {
        self.meals.iter().find(|meal| meal.id == id)
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }
}

impl MealStore for MemoryStore {
    fn find_id(&self, name: &str) -> Result<Option<MealId>> {
        Ok(self
            .meals
            .iter()
            .find(|meal| meal.name == name)
            .map(|meal| meal.id))
    }

    fn rename(&mut self, id: MealId, name: &str) -> Result<()> {
        let meal = self
            .meals
            .iter_mut()
            .find(|meal| meal.id == id)
            .ok_or(Error::UnknownMeal(id))?;
        meal.name = name.to_string();
        Ok(())
    }

    fn reference_count(&self, id: MealId) -> Result<usize> {
        Ok(self
            .days
            .iter()
            .flat_map(Day::slots)
            .filter(|slot| *slot == Some(id))
            .count())
    }

    fn repoint_references(&mut self, old: MealId, new: MealId) -> Result<usize> {
        let mut changed = 0;
        for day in &mut self.days {
            for slot in day.slots_mut() {
                if *slot == Some(old) {
                    *slot = Some(new);
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    fn delete(&mut self, id: MealId) -> Result<()> {
        let position = self
            .meals
            .iter()
            .position(|meal| meal.id == id)
            .ok_or(Error::UnknownMeal(id))?;
        self.meals.remove(position);
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(Error::Transaction("transaction already open".to_string()));
        }
        self.snapshot = Some(Snapshot {
            meals: self.meals.clone(),
            days: self.days.clone(),
        });
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| Error::Transaction("no open transaction".to_string()))
    }

    fn rollback(&mut self) -> Result<()> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| Error::Transaction("no open transaction".to_string()))?;
        self.meals = snapshot.meals;
        self.days = snapshot.days;
        Ok(())
    }
}
