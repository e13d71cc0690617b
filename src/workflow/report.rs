use serde::{Deserialize, Serialize};

use crate::histogram::HistogramStats;
use crate::session::SessionSnapshot;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    Superseded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepReport {
    pub index: usize,
    pub action: String,
    pub duration_ms: u128,
    pub status: StepStatus,
    pub message: Option<String>,
    pub history_len: usize,
    pub current_index: usize,
    pub stats: Option<HistogramStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptReport {
    pub script_name: Option<String>,
    pub steps: Vec<StepReport>,
    pub failures: usize,
    pub final_state: SessionSnapshot,
}
