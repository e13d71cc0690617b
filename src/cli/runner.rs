use std::path::Path;

use clap::Parser;
use serde::Serialize;
use serde_json::json;

use crate::histogram::{HistogramReport, LocalHistogramService};
use crate::model::{ImageInfo, ImageState, OperationKind, PendingOperation, parse_param_pairs};
use crate::runtime::{AppContext, AppError, EngineConfig, Result, init_logging};
use crate::service::{ExportFormat, HistogramService};
use crate::session::EditSession;
use crate::workflow::{load_script, run_script, save_report};

use super::types::{Cli, Commands, HistogramSummary, OpsCommand};

pub fn run_cli() -> std::result::Result<(), String> {
    let cli = Cli::parse();
    let config = resolve_config(&cli).map_err(|error| error.to_string())?;
    init_logging(&config.log_filter);
    let app = AppContext::new(config).map_err(|error| error.to_string())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| error.to_string())?;
    runtime
        .block_on(execute(&app, cli.command))
        .map_err(|error| error.to_string())
}

fn resolve_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(url) = &cli.service_url {
        config.service_url = url.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.request_timeout_ms = timeout_ms;
    }
    if let Some(debounce_ms) = cli.debounce_ms {
        config.debounce_ms = debounce_ms;
    }
    config.validate()?;
    Ok(config)
}

async fn execute(app: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Health => {
            let session = app.open_session(app.remote_services());
            print_json(&session.health().await?)?;
        }
        Commands::Ops { command } => match command {
            OpsCommand::List => print_json(&app.operations())?,
        },
        Commands::Histogram {
            input,
            channel,
            remote,
        } => {
            let report = if remote {
                let session = open_loaded(app, &input).await?;
                session.histogram(channel).await?
            } else {
                let bytes = tokio::fs::read(&input).await?;
                let mime = image::ImageFormat::from_path(&input)
                    .map(|format| format.to_mime_type())
                    .unwrap_or("application/octet-stream");
                let image = ImageState::from_bytes(&bytes, mime, ImageInfo::default());
                let histogram = LocalHistogramService.histogram(&image, channel).await?;
                HistogramReport::new(channel, histogram)?
            };
            print_json(&HistogramSummary {
                source: input.display().to_string(),
                channel,
                mean_display: report.stats.rounded_mean(),
                stats: report.stats,
            })?;
        }
        Commands::Apply {
            input,
            op,
            params,
            output,
            format,
            quality,
        } => {
            let kind = OperationKind::from_name(&op)
                .ok_or_else(|| AppError::UnknownOperation(op.clone()))?;
            let operation = PendingOperation::new(kind, parse_param_pairs(&params)?).validated()?;
            let session = open_loaded(app, &input).await?;
            session.dispatch(operation).await?;
            let written = export_to(&session, &output, format, quality).await?;
            print_json(&json!({
                "status": "ok",
                "operation": kind,
                "output": output,
                "bytes": written,
                "session": session.snapshot(),
            }))?;
        }
        Commands::Run {
            input,
            script,
            output,
            report,
        } => {
            let script = load_script(&script)?;
            let session = open_loaded(app, &input).await?;
            let run_report = run_script(&script, &session).await?;
            if let Some(output) = output {
                export_to(&session, &output, None, None).await?;
            }
            if let Some(report_path) = report {
                save_report(report_path, &run_report)?;
            }
            print_json(&run_report)?;
        }
    }
    Ok(())
}

async fn open_loaded(app: &AppContext, input: &Path) -> Result<EditSession> {
    let bytes = tokio::fs::read(input).await?;
    let file_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image")
        .to_string();
    let session = app.open_session(app.services());
    session.upload(file_name, bytes).await?;
    Ok(session)
}

async fn export_to(
    session: &EditSession,
    output: &Path,
    format: Option<ExportFormat>,
    quality: Option<u8>,
) -> Result<usize> {
    let format = format
        .or_else(|| {
            output
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ExportFormat::from_extension)
        })
        .unwrap_or_default();
    let bytes = session.export(format, quality).await?;
    tokio::fs::write(output, &bytes).await?;
    Ok(bytes.len())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
