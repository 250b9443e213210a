//! Saved plans keyed by a contact address.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{CalculatorInputs, CalculatorOutputs, compute};

/// Bumped whenever the stored layout changes incompatibly.
pub const PLAN_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("contact must be an email address")]
    InvalidContact,

    #[error("plan outputs contain non-finite numbers")]
    NotFinite,

    #[error("plan store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("plan store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("plan store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlan {
    #[serde(default)]
    pub name: String,
    pub inputs: CalculatorInputs,
    pub outputs: CalculatorOutputs,
    pub version: u32,
}

impl SavedPlan {
    /// Runs the projection and captures it alongside the inputs it came from.
    pub fn capture(name: impl Into<String>, inputs: CalculatorInputs) -> Self {
        let outputs = compute(&inputs);
        Self {
            name: name.into(),
            inputs,
            outputs,
            version: PLAN_VERSION,
        }
    }
}

/// Trimmed and lowercased; anything without an `@` is rejected.
pub fn normalize_contact(contact: &str) -> Result<String, StoreError> {
    let normalized = contact.trim().to_lowercase();
    if normalized.contains('@') {
        Ok(normalized)
    } else {
        Err(StoreError::InvalidContact)
    }
}

/// A non-finite number would be written as `null` and make the whole file
/// unreadable, so such plans are refused before they reach any store.
fn check_storable(plan: &SavedPlan) -> Result<(), StoreError> {
    if plan.outputs.is_finite() {
        Ok(())
    } else {
        Err(StoreError::NotFinite)
    }
}

pub trait PlanStore: Send + Sync {
    /// Stores `plan` under `contact`, replacing any earlier plan. Returns the
    /// normalized key it was stored under.
    fn save(&self, contact: &str, plan: &SavedPlan) -> Result<String, StoreError>;

    fn load(&self, contact: &str) -> Result<Option<SavedPlan>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryPlanStore {
    plans: RwLock<HashMap<String, SavedPlan>>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlanStore for MemoryPlanStore {
    fn save(&self, contact: &str, plan: &SavedPlan) -> Result<String, StoreError> {
        let key = normalize_contact(contact)?;
        check_storable(plan)?;
        self.plans
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(key.clone(), plan.clone());
        Ok(key)
    }

    fn load(&self, contact: &str) -> Result<Option<SavedPlan>, StoreError> {
        let key = normalize_contact(contact)?;
        let plans = self.plans.read().map_err(|_| StoreError::Poisoned)?;
        Ok(plans.get(&key).cloned())
    }
}

/// All plans in one JSON object on disk, rewritten in full on every save.
#[derive(Debug)]
pub struct JsonFilePlanStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFilePlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, SavedPlan>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(HashMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, plans: &HashMap<String, SavedPlan>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Write beside the target and rename so readers never see half a file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(plans)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PlanStore for JsonFilePlanStore {
    fn save(&self, contact: &str, plan: &SavedPlan) -> Result<String, StoreError> {
        let key = normalize_contact(contact)?;
        check_storable(plan)?;
        let _guard = self.lock.write().map_err(|_| StoreError::Poisoned)?;
        let mut plans = self.read_all()?;
        plans.insert(key.clone(), plan.clone());
        self.write_all(&plans)?;
        Ok(key)
    }

    fn load(&self, contact: &str) -> Result<Option<SavedPlan>, StoreError> {
        let key = normalize_contact(contact)?;
        let _guard = self.lock.read().map_err(|_| StoreError::Poisoned)?;
        Ok(self.read_all()?.remove(&key))
    }
}
