//! `model` crate — shared wire and persistence types for switchyard.
//!
//! These are the source of truth for what a workflow invocation and a
//! workflow run look like, both on the wire (`Context`, `ExecutorMessage`)
//! and at rest (`State`, `Step`, `ParallelStep`, `Resource`). No business
//! logic lives here — see `engine` for the replay algorithm and `executor`
//! for task dispatch.

pub mod cloud;
pub mod context;
pub mod error;
pub mod resource;
pub mod state;
pub mod status;
pub mod step;

pub use cloud::{Cloud, CloudResource, CloudResourceType, Component};
pub use context::{Context, ExecutorMessage, NEW_RUN_SENTINEL};
pub use error::ContractError;
pub use resource::Resource;
pub use state::State;
pub use status::Status;
pub use step::{ParallelStep, Step, StepEntry};
