use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::status::Status;
use crate::step::StepEntry;

/// The persisted record of one workflow run, keyed by `(name, run_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub name: String,
    pub run_id: i64,
    pub steps: Vec<StepEntry>,
    #[serde(default)]
    pub cache: HashMap<String, Value>,
    pub status: Status,
}

impl State {
    pub fn new(name: impl Into<String>, run_id: i64) -> Self {
        Self {
            name: name.into(),
            run_id,
            steps: Vec::new(),
            cache: HashMap::new(),
            status: Status::InProcess,
        }
    }

    /// Index of the most recently appended step, or `None` for a brand new run.
    pub fn current_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    pub fn current_step_mut(&mut self) -> Option<&mut StepEntry> {
        let idx = self.current_index()?;
        self.steps.get_mut(idx)
    }

    /// Overlay incoming cache entries onto this state's cache, logging any
    /// key that's overwritten. Overwrite is allowed, not rejected.
    pub fn overlay_cache(&mut self, incoming: &HashMap<String, Value>) {
        for (k, v) in incoming {
            if let Some(prev) = self.cache.get(k) {
                if prev != v {
                    tracing::debug!(key = %k, "overwriting cache entry");
                }
            }
            self.cache.insert(k.clone(), v.clone());
        }
    }
}
