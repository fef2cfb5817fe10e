// Container group models as reported by the registry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GroupRef;

/// Lifecycle phase of a container group; only `Running` groups are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupPhase {
    Running,
    Pending,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl GroupPhase {
    /// Parse from the API's instance-view state string (e.g. "Running").
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "running" => GroupPhase::Running,
            "pending" => GroupPhase::Pending,
            "succeeded" => GroupPhase::Succeeded,
            "failed" => GroupPhase::Failed,
            _ => GroupPhase::Unknown,
        }
    }
}

/// A monitored container group: identity plus the lifecycle fields the
/// collector needs (phase filter, creation time for start_time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerGroup {
    pub name: String,
    pub namespace: String,
    pub uid: String,
    pub phase: GroupPhase,
    pub created_at: DateTime<Utc>,
}

impl ContainerGroup {
    pub fn to_ref(&self) -> GroupRef {
        GroupRef {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            uid: self.uid.clone(),
        }
    }
}
