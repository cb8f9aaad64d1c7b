//! `Step` / `ParallelStep` — one ordered unit of work recorded in `State`.
//!
//! `retries` is carried as the *remaining* retry budget rather than a
//! constant re-read on each invocation.

use serde::{Deserialize, Serialize};

/// Flip a flag from `false` to `true` only — never the other way around.
/// Flipping any true→false in an incoming Context is ignored.
fn monotone_or(flag: &mut bool, incoming: bool) {
    if incoming {
        *flag = true;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub step_id: i64,
    pub step_name: String,
    /// Executor lookup key — maps to a `Task` in the executor's `TaskMap`.
    pub task_key: String,
    #[serde(default)]
    pub executed: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub success: bool,
    /// `-1` unless this `Step` is a task inside a `ParallelStep`.
    #[serde(default = "default_task_id")]
    pub task_id: i64,
    /// Remaining retry attempts. Seeded from `WorkflowConfig::default_retries`
    /// when the step is first appended.
    #[serde(default)]
    pub retries: u32,
}

fn default_task_id() -> i64 {
    -1
}

impl Step {
    pub fn new(step_id: i64, step_name: impl Into<String>, task_key: impl Into<String>, default_retries: u32) -> Self {
        Self {
            step_id,
            step_name: step_name.into(),
            task_key: task_key.into(),
            executed: false,
            completed: false,
            success: false,
            task_id: -1,
            retries: default_retries,
        }
    }

    pub fn with_task_id(mut self, task_id: i64) -> Self {
        self.task_id = task_id;
        self
    }

    /// Monotonically fold an incoming outcome into this step.
    pub fn fold_outcome(&mut self, executed: bool, completed: bool, success: bool) {
        monotone_or(&mut self.executed, executed);
        monotone_or(&mut self.completed, completed);
        monotone_or(&mut self.success, success);
    }

    /// `true` once the step has run to completion, whichever way it went.
    pub fn is_settled(&self) -> bool {
        self.executed && self.completed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelStep {
    pub step_id: i64,
    pub step_name: String,
    pub tasks: Vec<Step>,
    #[serde(default)]
    pub executed: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub success: bool,
}

impl ParallelStep {
    pub fn new(step_id: i64, step_name: impl Into<String>, tasks: Vec<Step>) -> Self {
        Self {
            step_id,
            step_name: step_name.into(),
            tasks,
            executed: false,
            completed: false,
            success: false,
        }
    }

    /// Recompute this group's three outcome flags as the AND over all tasks
    /// and return the recomputed triple.
    pub fn recompute_aggregate(&mut self) -> (bool, bool, bool) {
        let executed = self.tasks.iter().all(|t| t.executed);
        let completed = self.tasks.iter().all(|t| t.completed);
        let success = self.tasks.iter().all(|t| t.success);
        self.executed = executed;
        self.completed = completed;
        self.success = success;
        (executed, completed, success)
    }

    pub fn task_mut(&mut self, task_id: i64) -> Option<&mut Step> {
        self.tasks.iter_mut().find(|t| t.task_id == task_id)
    }
}

/// A single entry in `State.steps` — either a plain `Step` or a `ParallelStep`
/// group. Tagged so the wire/storage representation can round-trip either
/// variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepEntry {
    Step(Step),
    Parallel(ParallelStep),
}

impl StepEntry {
    pub fn step_id(&self) -> i64 {
        match self {
            StepEntry::Step(s) => s.step_id,
            StepEntry::Parallel(p) => p.step_id,
        }
    }

    pub fn step_name(&self) -> &str {
        match self {
            StepEntry::Step(s) => &s.step_name,
            StepEntry::Parallel(p) => &p.step_name,
        }
    }

    pub fn outcome(&self) -> (bool, bool, bool) {
        match self {
            StepEntry::Step(s) => (s.executed, s.completed, s.success),
            StepEntry::Parallel(p) => (p.executed, p.completed, p.success),
        }
    }

    pub fn as_parallel_mut(&mut self) -> Option<&mut ParallelStep> {
        match self {
            StepEntry::Parallel(p) => Some(p),
            StepEntry::Step(_) => None,
        }
    }

    pub fn as_step_mut(&mut self) -> Option<&mut Step> {
        match self {
            StepEntry::Step(s) => Some(s),
            StepEntry::Parallel(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_outcome_never_regresses() {
        let mut s = Step::new(1, "s1", "t1", 0);
        s.fold_outcome(true, true, true);
        assert!(s.executed && s.completed && s.success);
        s.fold_outcome(false, false, false);
        assert!(s.executed && s.completed && s.success, "flags must not regress");
    }

    #[test]
    fn parallel_aggregate_is_and_over_tasks() {
        let mut p = ParallelStep::new(
            1,
            "p",
            vec![
                Step::new(1, "call", "a", 0).with_task_id(0),
                Step::new(1, "call", "b", 0).with_task_id(1),
            ],
        );
        p.tasks[0].fold_outcome(true, true, true);
        let (executed, completed, success) = p.recompute_aggregate();
        assert!(executed && completed && !success, "second task hasn't reported yet");

        p.tasks[1].fold_outcome(true, true, true);
        let (executed, completed, success) = p.recompute_aggregate();
        assert!(executed && completed && success);
    }
}
