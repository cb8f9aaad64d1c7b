//! Engine configuration: tunables for one `Workflow` instance.

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Remaining retry budget a freshly-appended `Step` is seeded with.
    /// Defaults to `0`; user-configurable per workflow.
    pub default_retries: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self { default_retries: 0 }
    }
}
