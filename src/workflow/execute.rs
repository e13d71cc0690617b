use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use super::{EditScript, EditStep, Result, ScriptReport, StepReport, StepStatus};
use crate::histogram::HistogramStats;
use crate::service::ExportFormat;
use crate::session::{DispatchOutcome, EditError, EditSession};

struct StepResult {
    status: StepStatus,
    message: Option<String>,
    stats: Option<HistogramStats>,
}

impl StepResult {
    fn ok() -> Self {
        Self {
            status: StepStatus::Ok,
            message: None,
            stats: None,
        }
    }

    fn note(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok()
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Failed,
            message: Some(message.into()),
            stats: None,
        }
    }

    fn from_dispatch(outcome: DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Applied(image) => match image.dimensions() {
                Some(dimensions) => Self::note(dimensions.to_string()),
                None => Self::ok(),
            },
            DispatchOutcome::Superseded => Self {
                status: StepStatus::Superseded,
                ..Self::ok()
            },
            DispatchOutcome::Deselected => Self::note("selection cleared"),
        }
    }
}

/// Plays `script` against an already loaded session. Recoverable edit
/// errors are recorded on the step and the script carries on.
pub async fn run_script(script: &EditScript, session: &EditSession) -> Result<ScriptReport> {
    script.validate()?;

    let mut steps = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        let started = Instant::now();
        let result = match run_step(step, session).await {
            Ok(result) => result,
            Err(error) => {
                warn!(index, action = step.action(), %error, "script step failed");
                StepResult::failed(error.to_string())
            }
        };
        let snapshot = session.snapshot();
        steps.push(StepReport {
            index,
            action: step.action().to_string(),
            duration_ms: started.elapsed().as_millis(),
            status: result.status,
            message: result.message,
            history_len: snapshot.history_len,
            current_index: snapshot.current_index,
            stats: result.stats,
        });
    }

    session.settle().await;
    let failures = steps
        .iter()
        .filter(|step| step.status == StepStatus::Failed)
        .count();
    info!(steps = steps.len(), failures, "edit script finished");
    Ok(ScriptReport {
        script_name: script.name.clone(),
        steps,
        failures,
        final_state: session.snapshot(),
    })
}

async fn run_step(
    step: &EditStep,
    session: &EditSession,
) -> std::result::Result<StepResult, StepError> {
    let result = match step {
        EditStep::Apply { op, params } => {
            let operation = EditStep::pending_operation(op, params)
                .map_err(|error| StepError::Other(error.to_string()))?;
            StepResult::from_dispatch(session.dispatch(operation).await?)
        }
        EditStep::Adjust { kind, value } => {
            let ticket = session.adjust(*kind, *value)?;
            StepResult::note(format!("scheduled under `{}`", ticket.key()))
        }
        EditStep::Select { selection } => {
            StepResult::from_dispatch(session.select(*selection).await?)
        }
        EditStep::Settle => {
            session.settle().await;
            match session.take_deferred_error() {
                Some(message) => StepResult::failed(message),
                None => StepResult::ok(),
            }
        }
        EditStep::Undo => {
            session.undo()?;
            StepResult::ok()
        }
        EditStep::Redo => {
            session.redo()?;
            StepResult::ok()
        }
        EditStep::Reset => {
            session.reset().await?;
            StepResult::ok()
        }
        EditStep::Zoom { level } => {
            StepResult::note(format!("zoom {:.1}", session.set_zoom(*level)))
        }
        EditStep::Compare => {
            let compare = session.toggle_compare();
            StepResult::note(if compare { "compare on" } else { "compare off" })
        }
        EditStep::Histogram { channel } => {
            let report = session.histogram(*channel).await?;
            StepResult {
                stats: Some(report.stats),
                ..StepResult::note(format!("mean {}", report.stats.rounded_mean()))
            }
        }
        EditStep::Export {
            path,
            format,
            quality,
        } => {
            let format = format
                .or_else(|| {
                    path.extension()
                        .and_then(|ext| ext.to_str())
                        .and_then(ExportFormat::from_extension)
                })
                .unwrap_or_default();
            let bytes = session.export(format, *quality).await?;
            tokio::fs::write(path, &bytes)
                .await
                .map_err(|error| StepError::Other(error.to_string()))?;
            StepResult::note(format!("{} bytes written to {}", bytes.len(), path.display()))
        }
    };
    Ok(result)
}

#[derive(Debug, Error)]
enum StepError {
    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("{0}")]
    Other(String),
}
