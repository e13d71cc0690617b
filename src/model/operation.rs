use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::params::get_number;
use super::schema::{OpSchema, ParamSpec};
use super::{Params, Result, ValidationError};

pub const FLIP_MODES: &[&str] = &["horizontal", "vertical"];
pub const BLUR_METHODS: &[&str] = &["gaussian", "median", "average", "bilateral", "motion"];
pub const THRESHOLD_TYPES: &[&str] = &["binary", "adaptive", "mean", "otsu"];
pub const SPLIT_CHANNELS: &[&str] = &["red", "green", "blue", "all"];
pub const EDGE_DETECTORS: &[&str] = &["canny", "sobel", "laplacian"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Rotate,
    Flip,
    Grayscale,
    Brightness,
    Contrast,
    Hue,
    Saturation,
    Resize,
    Blur,
    Threshold,
    ChannelSplit,
    EdgeDetection,
    Equalize,
    Crop,
}

impl OperationKind {
    pub const ALL: [OperationKind; 14] = [
        Self::Rotate,
        Self::Flip,
        Self::Grayscale,
        Self::Brightness,
        Self::Contrast,
        Self::Hue,
        Self::Saturation,
        Self::Resize,
        Self::Blur,
        Self::Threshold,
        Self::ChannelSplit,
        Self::EdgeDetection,
        Self::Equalize,
        Self::Crop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Rotate => "rotate",
            Self::Flip => "flip",
            Self::Grayscale => "grayscale",
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Resize => "resize",
            Self::Blur => "blur",
            Self::Threshold => "threshold",
            Self::ChannelSplit => "channel_split",
            Self::EdgeDetection => "edge_detection",
            Self::Equalize => "equalize",
            Self::Crop => "crop",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn schema(self) -> OpSchema {
        let (description, params) = match self {
            Self::Rotate => (
                "Rotate around the image center by an angle in degrees.",
                vec![ParamSpec::number("angle", "Rotation angle in degrees.", -360.0, 360.0)],
            ),
            Self::Flip => (
                "Mirror the image.",
                vec![ParamSpec::choice("mode", "Mirror axis.", FLIP_MODES).or_text("horizontal")],
            ),
            Self::Grayscale => (
                "Convert to grayscale.",
                vec![
                    ParamSpec::number("value", "Grayscale strength in percent.", 0.0, 100.0)
                        .or_number(100.0),
                ],
            ),
            Self::Brightness => (
                "Shift brightness.",
                vec![ParamSpec::number("value", "Brightness offset.", -100.0, 100.0)],
            ),
            Self::Contrast => (
                "Scale contrast.",
                vec![ParamSpec::number("value", "Contrast adjustment.", -100.0, 100.0)],
            ),
            Self::Hue => (
                "Rotate hue.",
                vec![ParamSpec::number("value", "Hue shift in degrees.", -180.0, 180.0)],
            ),
            Self::Saturation => (
                "Scale saturation.",
                vec![ParamSpec::number("value", "Saturation adjustment.", -100.0, 100.0)],
            ),
            Self::Resize => (
                "Resize to explicit pixel dimensions.",
                vec![
                    ParamSpec::integer("width", "Target width in pixels.", 10.0, 10_000.0),
                    ParamSpec::integer("height", "Target height in pixels.", 10.0, 10_000.0),
                ],
            ),
            Self::Blur => (
                "Smooth the image. Even kernel sizes are bumped to the next odd size.",
                vec![
                    ParamSpec::choice("method", "Blur method.", BLUR_METHODS).or_text("gaussian"),
                    ParamSpec::integer("kernel_size", "Kernel size in pixels.", 3.0, 31.0)
                        .or_number(5.0),
                ],
            ),
            Self::Threshold => (
                "Binarize the grayscale image.",
                vec![
                    ParamSpec::choice("type", "Threshold mode.", THRESHOLD_TYPES).or_text("binary"),
                    ParamSpec::number("value", "Fixed threshold for binary mode.", 0.0, 255.0)
                        .or_number(127.0),
                ],
            ),
            Self::ChannelSplit => (
                "Keep a single color channel.",
                vec![
                    ParamSpec::choice("channel", "Channel to keep.", SPLIT_CHANNELS)
                        .or_text("red"),
                ],
            ),
            Self::EdgeDetection => (
                "Detect edges on the grayscale image.",
                vec![
                    ParamSpec::choice("detector", "Edge detector.", EDGE_DETECTORS)
                        .or_text("canny"),
                    ParamSpec::number("low", "Lower hysteresis threshold.", 0.0, 255.0)
                        .or_number(50.0),
                    ParamSpec::number("high", "Upper hysteresis threshold.", 0.0, 255.0)
                        .or_number(150.0),
                ],
            ),
            Self::Equalize => ("Equalize the grayscale histogram.", vec![]),
            Self::Crop => (
                "Crop a rectangular region.",
                vec![
                    ParamSpec::integer("x", "Left edge.", 0.0, 100_000.0).or_number(0.0),
                    ParamSpec::integer("y", "Top edge.", 0.0, 100_000.0).or_number(0.0),
                    ParamSpec::integer("width", "Region width.", 1.0, 100_000.0),
                    ParamSpec::integer("height", "Region height.", 1.0, 100_000.0),
                ],
            ),
        };
        OpSchema {
            name: self.name(),
            description,
            params,
        }
    }

    /// Validates `params` against the schema and applies the cross-parameter rules.
    pub fn validate(self, params: &Params) -> Result<Params> {
        let mut checked = self.schema().validate(params)?;
        match self {
            Self::Blur => {
                if let Some(size) = get_number(&checked, "kernel_size")? {
                    let size = size as i64;
                    let odd = if size % 2 == 0 { size + 1 } else { size };
                    checked.insert("kernel_size".to_string(), json!(odd.min(31)));
                }
            }
            Self::EdgeDetection => {
                let low = get_number(&checked, "low")?.unwrap_or_default();
                let high = get_number(&checked, "high")?.unwrap_or_default();
                if low > high {
                    return Err(ValidationError::Inconsistent(format!(
                        "edge `low` ({low}) must not exceed `high` ({high})"
                    )));
                }
            }
            _ => {}
        }
        Ok(checked)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Coalescing group for debounced operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebounceKey(String);

impl DebounceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<OperationKind> for DebounceKey {
    fn from(kind: OperationKind) -> Self {
        Self(kind.name().to_string())
    }
}

impl fmt::Display for DebounceKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingOperation {
    pub kind: OperationKind,
    pub params: Params,
    pub key: DebounceKey,
}

impl PendingOperation {
    pub fn new(kind: OperationKind, params: Params) -> Self {
        Self {
            kind,
            params,
            key: DebounceKey::from(kind),
        }
    }

    /// Returns the operation with its parameters checked and defaults filled.
    pub fn validated(mut self) -> Result<Self> {
        self.params = self.kind.validate(&self.params)?;
        Ok(self)
    }
}
