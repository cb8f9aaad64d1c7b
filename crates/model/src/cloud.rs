//! Cloud provider tags shared by the `storage` and `queue` crates.
//!
//! Kept as a plain enum (rather than per-provider marker types) because
//! `Response`/`Trigger` and the CLI need a single value they can carry
//! around and hand to whichever trait-object constructor picks the real
//! implementation. See `queue::sender_for` and `storage::postgres` for the
//! one place each performs the `match`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cloud {
    Aws,
    Gcp,
    Azure,
    Custom,
}

/// Which switchyard component a discovered endpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Component {
    InvocationQueue,
    ExecutorQueue,
}

/// The concrete cloud resource backing a discovered endpoint (informational —
/// not used for dispatch, only persisted alongside the URL for operators).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CloudResource {
    Sqs,
    DynamoDb,
    Lambda,
    EventBridge,
    Scheduler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CloudResourceType {
    Queue,
    Datastore,
    Compute,
    EventEmitter,
    Cron,
}
