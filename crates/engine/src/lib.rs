//! `engine` crate — the replay algorithm that turns repeated invocations of
//! a straight-line program into a resumable, event-driven state machine.
//! No embedded scheduler: the workflow graph is whatever order the
//! author's program calls `call`/`parallel_call` in.

pub mod config;
pub mod engine;
pub mod error;

pub use config::WorkflowConfig;
pub use engine::Workflow;
pub use error::EngineError;
