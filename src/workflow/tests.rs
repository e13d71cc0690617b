use std::time::Duration;

use crate::histogram::Channel;
use crate::model::{AdjustmentKind, BlurMethod, Selection};
use crate::session::{EditSession, SessionOptions};
use crate::testing::{MockBackend, Mode};

use super::{EditScript, EditStep, StepStatus, load_script, run_script, save_report};

const SCRIPT_YAML: &str = r#"
name: demo
steps:
  - action: apply
    op: rotate
    params: {angle: 90}
  - action: adjust
    kind: brightness
    value: 25
  - action: settle
  - action: select
    selection: {group: filter, member: median}
  - action: undo
  - action: histogram
    channel: gray
  - action: zoom
    level: 2.5
  - action: compare
"#;

async fn loaded_session(backend: &std::sync::Arc<MockBackend>) -> EditSession {
    let options = SessionOptions {
        request_timeout: Duration::from_secs(5),
        debounce: Duration::from_millis(50),
    };
    let session = EditSession::new(backend.services(), options);
    session.upload("base", vec![7; 8]).await.expect("upload");
    session
}

#[test]
fn yaml_script_parses_every_step_kind() {
    let script: EditScript = serde_yaml::from_str(SCRIPT_YAML).expect("yaml");
    script.validate().expect("valid");
    assert_eq!(script.name.as_deref(), Some("demo"));
    assert_eq!(script.steps.len(), 8);
    assert_eq!(
        script.steps[1],
        EditStep::Adjust {
            kind: AdjustmentKind::Brightness,
            value: 25.0,
        }
    );
    assert_eq!(
        script.steps[3],
        EditStep::Select {
            selection: Selection::Filter(BlurMethod::Median),
        }
    );
    assert_eq!(
        script.steps[5],
        EditStep::Histogram {
            channel: Channel::Gray,
        }
    );
}

#[test]
fn empty_script_is_rejected() {
    let script = EditScript {
        name: None,
        steps: vec![],
    };
    assert!(script.validate().is_err());
}

#[test]
fn unknown_operation_is_rejected_at_load_time() {
    let script: EditScript = serde_json::from_str(
        r#"{"steps": [{"action": "apply", "op": "sharpen", "params": {}}]}"#,
    )
    .expect("json");
    let error = script.validate().expect_err("unknown op");
    assert!(error.to_string().contains("sharpen"));
}

#[test]
fn script_round_trips_through_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("script.yaml");
    std::fs::write(&path, SCRIPT_YAML).expect("write");
    let script = load_script(&path).expect("load");
    assert_eq!(script.steps.len(), 8);
}

#[tokio::test]
async fn script_runs_against_a_session_and_reports_each_step() {
    let backend = MockBackend::new();
    let session = loaded_session(&backend).await;
    let script: EditScript = serde_yaml::from_str(SCRIPT_YAML).expect("yaml");

    let report = run_script(&script, &session).await.expect("run");
    assert_eq!(report.script_name.as_deref(), Some("demo"));
    assert_eq!(report.failures, 0);
    assert_eq!(report.steps.len(), 8);

    let actions = report
        .steps
        .iter()
        .map(|step| step.action.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        actions,
        vec!["apply", "adjust", "settle", "select", "undo", "histogram", "zoom", "compare"]
    );

    assert_eq!(report.steps[0].history_len, 2);
    assert_eq!(report.steps[2].history_len, 3);
    assert_eq!(report.steps[3].history_len, 4);
    assert_eq!(report.steps[4].current_index, 2);
    let stats = report.steps[5].stats.expect("stats");
    assert_eq!(stats.dynamic_range, [0, 255]);

    assert_eq!(report.final_state.zoom, 2.5);
    assert!(report.final_state.compare);
    assert_eq!(backend.process_calls(), 3);
}

#[tokio::test]
async fn recoverable_errors_are_recorded_and_the_script_continues() {
    let backend = MockBackend::new();
    let session = loaded_session(&backend).await;
    let script: EditScript = serde_json::from_str(
        r#"{"steps": [
            {"action": "undo"},
            {"action": "apply", "op": "rotate", "params": {"angle": 720}},
            {"action": "apply", "op": "flip"},
            {"action": "redo"}
        ]}"#,
    )
    .expect("json");

    let report = run_script(&script, &session).await.expect("run");
    let statuses = report
        .steps
        .iter()
        .map(|step| step.status)
        .collect::<Vec<_>>();
    assert_eq!(
        statuses,
        vec![
            StepStatus::Failed,
            StepStatus::Failed,
            StepStatus::Ok,
            StepStatus::Failed,
        ]
    );
    assert_eq!(report.failures, 3);
    assert_eq!(report.final_state.history_len, 2);
    assert!(
        report.steps[1]
            .message
            .as_deref()
            .is_some_and(|message| message.contains("angle"))
    );
}

#[tokio::test]
async fn settle_step_surfaces_deferred_failures() {
    let backend = MockBackend::new();
    let session = loaded_session(&backend).await;
    backend.set_mode(Mode::Fail("connection reset".to_string()));
    let script: EditScript = serde_yaml::from_str(
        "steps:\n  - {action: adjust, kind: contrast, value: 10}\n  - {action: settle}\n",
    )
    .expect("yaml");

    let report = run_script(&script, &session).await.expect("run");
    assert_eq!(report.steps[0].status, StepStatus::Ok);
    assert_eq!(report.steps[1].status, StepStatus::Failed);
    assert!(
        report.steps[1]
            .message
            .as_deref()
            .is_some_and(|message| message.contains("connection reset"))
    );
}

#[tokio::test]
async fn export_step_writes_the_file_and_report_saves() {
    let backend = MockBackend::new();
    let session = loaded_session(&backend).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("result.jpg");
    let script = EditScript {
        name: Some("export".to_string()),
        steps: vec![EditStep::Export {
            path: output.clone(),
            format: None,
            quality: Some(80),
        }],
    };

    let report = run_script(&script, &session).await.expect("run");
    assert_eq!(report.failures, 0);
    assert_eq!(std::fs::read(&output).expect("read"), b"base@jpgq80".to_vec());

    let report_path = dir.path().join("report.json");
    save_report(&report_path, &report).expect("save");
    let saved: super::ScriptReport =
        serde_json::from_str(&std::fs::read_to_string(&report_path).expect("read"))
            .expect("parse");
    assert_eq!(saved.steps.len(), 1);
}
