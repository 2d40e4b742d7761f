//! Saved budget scenarios: the only durable state in the crate.
//!
//! The store owns the collection. Everything it hands out is a copy, so
//! editing a working scenario can never change a saved one. Every mutation
//! rewrites the whole collection before the in-memory list is updated, so a
//! failed write leaves both sides unchanged.

mod error;
mod storage;

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::{
    BudgetBreakdown, BudgetScenario, ComparisonSelection, CostPolicy, Housing, LocationCostRecord,
    MealPlan, ProgramPricing, Residency, SavedScenario, Transit, estimate_with_policy,
    scenario_from_value,
};

pub use error::StoreError;
pub use storage::{FileStorage, MemoryStorage, SCENARIOS_KEY, ScenarioStorage};

pub const FALLBACK_SCENARIO_NAME: &str = "Custom Scenario";

#[derive(Debug)]
pub struct ScenarioStore<S> {
    storage: S,
    scenarios: Vec<SavedScenario>,
    comparison: ComparisonSelection,
}

impl<S: ScenarioStorage> ScenarioStore<S> {
    /// Opens the store and reads whatever the storage currently holds.
    pub fn open(storage: S) -> Self {
        let scenarios = read_collection(&storage);
        Self {
            storage,
            scenarios,
            comparison: ComparisonSelection::default(),
        }
    }

    /// Re-reads the persisted collection. Never fails: unreadable storage
    /// yields the built-in scenarios, malformed entries are repaired or
    /// dropped one by one.
    pub fn load(&mut self) -> Vec<SavedScenario> {
        self.scenarios = read_collection(&self.storage);
        if let Some(active) = self.comparison.active().map(str::to_string) {
            if self.position(&active).is_none() {
                self.comparison.clear();
            }
        }
        self.scenarios.clone()
    }

    pub fn scenarios(&self) -> Vec<SavedScenario> {
        self.scenarios.clone()
    }

    pub fn get(&self, id: &str) -> Option<SavedScenario> {
        self.position(id).map(|idx| self.scenarios[idx].clone())
    }

    /// Snapshots `scenario` under `name`. The name is trimmed and falls back
    /// to "Custom Scenario" when empty.
    pub fn save(
        &mut self,
        name: &str,
        scenario: &BudgetScenario,
    ) -> Result<SavedScenario, StoreError> {
        let saved = SavedScenario {
            id: new_id(),
            name: normalize_name(name),
            scenario: scenario.sanitized(),
        };

        let mut next = self.scenarios.clone();
        next.push(saved.clone());
        self.persist(next)?;

        info!(id = %saved.id, name = %saved.name, "saved scenario");
        Ok(saved)
    }

    /// Removes the scenario with `id`, clearing the comparator if it pointed
    /// there. Returns `false` (and writes nothing) for an unknown id.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(idx) = self.position(id) else {
            debug!(id, "delete ignored: unknown scenario");
            return Ok(false);
        };

        let mut next = self.scenarios.clone();
        next.remove(idx);
        self.persist(next)?;

        if self.comparison.forget(id) {
            debug!(id, "cleared comparator for deleted scenario");
        }
        info!(id, "deleted scenario");
        Ok(true)
    }

    /// A fresh copy of the saved scenario, for adoption as the working one.
    pub fn load_into_working_scenario(&self, id: &str) -> Option<BudgetScenario> {
        self.position(id).map(|idx| self.scenarios[idx].scenario)
    }

    /// Toggles the comparator. Ids that are not saved leave the selection
    /// unchanged.
    pub fn set_comparator(&mut self, id: Option<&str>) -> Option<String> {
        if let Some(id) = id {
            if self.position(id).is_none() {
                debug!(id, "comparator ignored: unknown scenario");
                return self.comparison.active().map(str::to_string);
            }
        }
        self.comparison.set(id).map(str::to_string)
    }

    pub fn comparator_id(&self) -> Option<&str> {
        self.comparison.active()
    }

    pub fn comparator(&self) -> Option<SavedScenario> {
        self.comparison.active().and_then(|id| self.get(id))
    }

    /// The selected comparator with its estimate for `pricing`.
    pub fn comparison(
        &self,
        policy: &CostPolicy,
        pricing: &ProgramPricing,
        cost: Option<&LocationCostRecord>,
    ) -> Option<(SavedScenario, BudgetBreakdown)> {
        let saved = self.comparator()?;
        let breakdown = estimate_with_policy(policy, pricing, &saved.scenario, cost);
        Some((saved, breakdown))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.scenarios.iter().position(|s| s.id == id)
    }

    fn persist(&mut self, next: Vec<SavedScenario>) -> Result<(), StoreError> {
        let mut buf = serde_json::to_string_pretty(&next)?;
        buf.push('\n');
        self.storage.write(&buf)?;
        debug!(count = next.len(), "persisted saved scenarios");
        self.scenarios = next;
        Ok(())
    }
}

/// The scenarios offered before the user has saved anything.
pub fn default_scenarios() -> Vec<SavedScenario> {
    vec![
        SavedScenario {
            id: "default-shared-in-state".to_string(),
            name: "Shared apartment, in-state".to_string(),
            scenario: BudgetScenario {
                residency: Residency::InState,
                housing: Housing::OffShared,
                roommates: 2,
                meal_plan: MealPlan::SelfCook,
                transit: Transit::Public,
                misc_percent: 0.10,
            },
        },
        SavedScenario {
            id: "default-solo-out-of-state".to_string(),
            name: "Solo out-of-state, parent support".to_string(),
            scenario: BudgetScenario {
                residency: Residency::OutOfState,
                housing: Housing::OffSingle,
                roommates: 1,
                meal_plan: MealPlan::Restaurants,
                transit: Transit::Car,
                misc_percent: 0.15,
            },
        },
    ]
}

fn read_collection<S: ScenarioStorage>(storage: &S) -> Vec<SavedScenario> {
    let contents = match storage.read() {
        Ok(Some(contents)) => contents,
        Ok(None) => {
            debug!("no saved scenarios yet, using defaults");
            return default_scenarios();
        }
        Err(err) => {
            warn!(error = %err, "could not read saved scenarios, using defaults");
            return default_scenarios();
        }
    };

    match parse_collection(&contents) {
        Some(scenarios) => {
            debug!(count = scenarios.len(), "loaded saved scenarios");
            scenarios
        }
        None => {
            warn!("saved scenarios are not a JSON array, using defaults");
            default_scenarios()
        }
    }
}

/// Parses a persisted collection entry by entry. Returns `None` only when
/// the document as a whole is not a JSON array.
pub fn parse_collection(contents: &str) -> Option<Vec<SavedScenario>> {
    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(contents) else {
        return None;
    };

    let mut seen = HashSet::new();
    let mut scenarios = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        match repair_entry(entry, &mut seen) {
            Some(saved) => scenarios.push(saved),
            None => warn!(index = idx, "dropping unusable saved scenario entry"),
        }
    }
    Some(scenarios)
}

fn repair_entry(entry: &Value, seen: &mut HashSet<String>) -> Option<SavedScenario> {
    let fields = entry.as_object()?;
    let name = fields.get("name")?.as_str()?;
    let scenario = fields.get("scenario").filter(|v| v.is_object())?;

    let id = match fields.get("id").and_then(Value::as_str).map(str::trim) {
        Some(id) if !id.is_empty() && !seen.contains(id) => id.to_string(),
        _ => new_id(),
    };
    seen.insert(id.clone());

    Some(SavedScenario {
        id,
        name: normalize_name(name),
        scenario: scenario_from_value(scenario),
    })
}

fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        FALLBACK_SCENARIO_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
