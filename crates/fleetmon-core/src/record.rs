//! Typed records built from remote diagnostic output.
//!
//! Field values stay exactly as the remote tool printed them (`"91%"`,
//! `"40536MiB"`); nothing is coerced to numbers at parse time. Rendering
//! decides how much interpretation a value gets.

use serde::{Deserialize, Serialize};

use crate::target::ServerTarget;

/// One physical GPU reported by the GPU diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuRecord {
    pub index: String,
    pub name: String,
    pub memory_used: String,
    pub memory_total: String,
    pub utilization: String,
}

/// One mounted filesystem line from the storage diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRecord {
    pub filesystem: String,
    pub size: String,
    pub used: String,
    pub available: String,
    pub use_percent: String,
    pub mount_point: String,
}

/// Outcome of polling one target. Exactly one per target per cycle.
///
/// A `Failure` never carries records; record order matches the order rows
/// appeared in command output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchResult {
    Success {
        gpus: Vec<GpuRecord>,
        storage: Vec<StorageRecord>,
    },
    Failure {
        message: String,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }
}

/// A target identity paired with its poll outcome, ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostReport {
    pub target: ServerTarget,
    pub result: FetchResult,
}
