use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::histogram::{Channel, HistogramStats};
use crate::service::ExportFormat;

#[derive(Debug, Parser)]
#[command(
    name = "imagelab",
    version,
    about = "Edit-session client for a remote image processing service"
)]
pub(super) struct Cli {
    /// YAML or JSON engine configuration.
    #[arg(long, global = true)]
    pub(super) config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub(super) service_url: Option<String>,
    #[arg(long, global = true)]
    pub(super) timeout_ms: Option<u64>,
    #[arg(long, global = true)]
    pub(super) debounce_ms: Option<u64>,
    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(super) enum Commands {
    Health,
    Ops {
        #[command(subcommand)]
        command: OpsCommand,
    },
    /// Prints histogram statistics. Computed locally unless `--remote` is given.
    Histogram {
        input: PathBuf,
        #[arg(long, default_value = "rgb", value_parser = parse_channel)]
        channel: Channel,
        #[arg(long)]
        remote: bool,
    },
    /// Uploads an image, applies one operation and exports the result.
    Apply {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        op: String,
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, value_parser = parse_format)]
        format: Option<ExportFormat>,
        #[arg(long)]
        quality: Option<u8>,
    },
    /// Plays an edit script against a freshly uploaded image.
    Run {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        script: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub(super) enum OpsCommand {
    List,
}

#[derive(Debug, Serialize)]
pub(super) struct HistogramSummary {
    pub(super) source: String,
    pub(super) channel: Channel,
    pub(super) mean_display: u8,
    pub(super) stats: HistogramStats,
}

fn parse_channel(raw: &str) -> Result<Channel, String> {
    [
        Channel::Rgb,
        Channel::Red,
        Channel::Green,
        Channel::Blue,
        Channel::Gray,
    ]
    .into_iter()
    .find(|channel| channel.as_str().eq_ignore_ascii_case(raw.trim()))
    .ok_or_else(|| format!("unknown channel `{raw}` (rgb, red, green, blue, gray)"))
}

fn parse_format(raw: &str) -> Result<ExportFormat, String> {
    ExportFormat::from_extension(raw.trim())
        .ok_or_else(|| format!("unknown export format `{raw}` (png, jpg, tiff)"))
}
