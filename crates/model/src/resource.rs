use serde::{Deserialize, Serialize};

use crate::cloud::{Cloud, CloudResource, CloudResourceType, Component};

/// A discovery record, keyed by `(component, name)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub component: Component,
    pub name: String,
    pub url: String,
    pub cloud: Cloud,
    pub resource: CloudResource,
    pub resource_type: CloudResourceType,
}
