use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Result, ScriptError};
use crate::histogram::Channel;
use crate::model::{AdjustmentKind, OperationKind, Params, PendingOperation, Selection};
use crate::service::ExportFormat;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditScript {
    pub name: Option<String>,
    #[serde(default)]
    pub steps: Vec<EditStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditStep {
    Apply {
        op: String,
        #[serde(default)]
        params: Value,
    },
    Adjust {
        kind: AdjustmentKind,
        value: f64,
    },
    Select {
        selection: Selection,
    },
    Settle,
    Undo,
    Redo,
    Reset,
    Zoom {
        level: f64,
    },
    Compare,
    Histogram {
        #[serde(default)]
        channel: Channel,
    },
    Export {
        path: PathBuf,
        format: Option<ExportFormat>,
        quality: Option<u8>,
    },
}

impl EditStep {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Apply { .. } => "apply",
            Self::Adjust { .. } => "adjust",
            Self::Select { .. } => "select",
            Self::Settle => "settle",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Reset => "reset",
            Self::Zoom { .. } => "zoom",
            Self::Compare => "compare",
            Self::Histogram { .. } => "histogram",
            Self::Export { .. } => "export",
        }
    }

    /// Resolves an `apply` step into an operation. Parameters are checked
    /// when the step runs, so a bad value is reported against that step.
    pub(crate) fn pending_operation(op: &str, params: &Value) -> Result<PendingOperation> {
        let kind = OperationKind::from_name(op)
            .ok_or_else(|| ScriptError::Parse(format!("unknown operation `{op}`")))?;
        let params = match params {
            Value::Null => Params::new(),
            Value::Object(map) => map.clone(),
            _ => {
                return Err(ScriptError::Parse(format!(
                    "operation `{op}` parameters must be a mapping"
                )));
            }
        };
        Ok(PendingOperation::new(kind, params))
    }
}

impl EditScript {
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(ScriptError::Parse(
                "edit script must include at least one step".to_string(),
            ));
        }
        for (index, step) in self.steps.iter().enumerate() {
            match step {
                EditStep::Apply { op, params } => {
                    EditStep::pending_operation(op, params)?;
                }
                EditStep::Zoom { level } if !level.is_finite() => {
                    return Err(ScriptError::Parse(format!(
                        "step {index}: zoom level must be a finite number"
                    )));
                }
                EditStep::Adjust { value, .. } if !value.is_finite() => {
                    return Err(ScriptError::Parse(format!(
                        "step {index}: adjustment value must be a finite number"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
