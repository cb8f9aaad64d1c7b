//! The per-invocation envelope passed between the invocation queue and the
//! engine.
//!
//! Deserialization is hand-rolled rather than a plain `#[derive(Deserialize)]`
//! because the validation rules are part of the contract, not an
//! implementation detail: a message missing `executed` is not "defaulted to
//! false", it's a `ContractError`. Reliance on the sentinel `ids=[-1,-1,-1]`
//! to signal a new run means missing fields must be an error, not a default.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ContractError;

pub const NEW_RUN_SENTINEL: [i64; 3] = [-1, -1, -1];

#[derive(Debug, Deserialize)]
struct RawContext {
    workflow: Option<String>,
    ids: Option<Vec<i64>>,
    executed: Option<bool>,
    completed: Option<bool>,
    success: Option<bool>,
    #[serde(default)]
    cache: Option<HashMap<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Context {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
    pub ids: [i64; 3],
    pub executed: bool,
    pub completed: bool,
    pub success: bool,
    pub cache: HashMap<String, Value>,
}

impl Context {
    pub fn new_sentinel(workflow: Option<String>) -> Self {
        Self {
            workflow,
            ids: NEW_RUN_SENTINEL,
            executed: true,
            completed: true,
            success: true,
            cache: HashMap::new(),
        }
    }

    pub fn is_new_run(&self) -> bool {
        self.ids == NEW_RUN_SENTINEL
    }

    pub fn run_id(&self) -> i64 {
        self.ids[0]
    }

    pub fn step_id(&self) -> i64 {
        self.ids[1]
    }

    pub fn task_id(&self) -> i64 {
        self.ids[2]
    }

    /// Parse and validate a raw invocation-queue message body.
    pub fn from_json(raw: &str) -> Result<Self, ContractError> {
        let parsed: RawContext =
            serde_json::from_str(raw).map_err(|e| ContractError::InvalidJson(e.to_string()))?;
        Self::from_raw(parsed)
    }

    pub fn from_value(raw: Value) -> Result<Self, ContractError> {
        let parsed: RawContext =
            serde_json::from_value(raw).map_err(|e| ContractError::InvalidJson(e.to_string()))?;
        Self::from_raw(parsed)
    }

    fn from_raw(raw: RawContext) -> Result<Self, ContractError> {
        let mut ids = raw.ids.ok_or(ContractError::MissingIds)?;
        match ids.len() {
            2 => ids.push(-1),
            3 => {}
            n => return Err(ContractError::InvalidIdsLength(n)),
        }
        let ids: [i64; 3] = [ids[0], ids[1], ids[2]];

        if ids[0] == -1 && ids != NEW_RUN_SENTINEL {
            return Err(ContractError::InvalidSentinel(ids));
        }

        let executed = raw.executed.ok_or(ContractError::MissingField("executed"))?;
        let completed = raw.completed.ok_or(ContractError::MissingField("completed"))?;
        let success = raw.success.ok_or(ContractError::MissingField("success"))?;
        let cache = raw.cache.ok_or(ContractError::MissingField("cache"))?;

        Ok(Context {
            workflow: raw.workflow,
            ids,
            executed,
            completed,
            success,
            cache,
        })
    }

    /// Re-emit only the wire fields the message contract defines.
    /// `task_key` never appears here — it lives on `ExecutorMessage`.
    pub fn to_wire(&self) -> Value {
        serde_json::to_value(self).expect("Context always serializes")
    }
}

/// The executor-queue message shape: identical to the invocation-queue
/// Context plus the one field executors require.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
    pub task_key: String,
    pub ids: [i64; 3],
    pub executed: bool,
    pub completed: bool,
    pub success: bool,
    pub cache: HashMap<String, Value>,
}

impl ExecutorMessage {
    pub fn new(workflow: impl Into<String>, task_key: impl Into<String>, context: &Context) -> Self {
        Self {
            workflow: Some(workflow.into()),
            task_key: task_key.into(),
            ids: context.ids,
            executed: context.executed,
            completed: context.completed,
            success: context.success,
            cache: context.cache.clone(),
        }
    }

    /// Strip `task_key` and recover the plain `Context` an executor hands to
    /// a task.
    pub fn into_context(self) -> Context {
        Context {
            workflow: self.workflow,
            ids: self.ids,
            executed: self.executed,
            completed: self.completed,
            success: self.success,
            cache: self.cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_the_only_legal_negative_run_id() {
        let sentinel = r#"{"ids":[-1,-1,-1],"executed":true,"completed":true,"success":true,"cache":{}}"#;
        assert!(Context::from_json(sentinel).is_ok());

        let bad = r#"{"ids":[-1,0,0],"executed":true,"completed":true,"success":true,"cache":{}}"#;
        assert_eq!(
            Context::from_json(bad).unwrap_err(),
            ContractError::InvalidSentinel([-1, 0, 0])
        );
    }

    #[test]
    fn two_element_ids_are_extended_with_task_id_sentinel() {
        let raw = r#"{"ids":[1,2],"executed":true,"completed":true,"success":true,"cache":{}}"#;
        let ctx = Context::from_json(raw).unwrap();
        assert_eq!(ctx.ids, [1, 2, -1]);
    }

    #[test]
    fn missing_required_field_is_a_contract_error() {
        let raw = r#"{"ids":[1,2,-1],"completed":true,"success":true,"cache":{}}"#;
        assert_eq!(
            Context::from_json(raw).unwrap_err(),
            ContractError::MissingField("executed")
        );
    }

    #[test]
    fn missing_cache_is_a_contract_error() {
        let raw = r#"{"ids":[1,2,-1],"executed":true,"completed":true,"success":true}"#;
        assert_eq!(
            Context::from_json(raw).unwrap_err(),
            ContractError::MissingField("cache")
        );
    }

    #[test]
    fn wire_roundtrip_omits_workflow_when_absent() {
        let ctx = Context::new_sentinel(None);
        let v = ctx.to_wire();
        assert!(v.get("workflow").is_none());
        assert_eq!(v["ids"], serde_json::json!([-1, -1, -1]));
    }
}
