use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{OperationKind, Params, PendingOperation, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Brightness,
    Contrast,
    Hue,
    Grayscale,
    Saturation,
}

impl AdjustmentKind {
    pub fn operation(self) -> OperationKind {
        match self {
            Self::Brightness => OperationKind::Brightness,
            Self::Contrast => OperationKind::Contrast,
            Self::Hue => OperationKind::Hue,
            Self::Grayscale => OperationKind::Grayscale,
            Self::Saturation => OperationKind::Saturation,
        }
    }

    /// Builds the validated operation carrying this slider value.
    pub fn to_operation(self, value: f64) -> Result<PendingOperation> {
        let mut params = Params::new();
        params.insert("value".to_string(), json!(value));
        PendingOperation::new(self.operation(), params).validated()
    }
}

/// Current slider positions of a session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Adjustments {
    pub brightness: f64,
    pub contrast: f64,
    pub hue: f64,
    pub grayscale: f64,
    pub saturation: f64,
}

impl Adjustments {
    pub fn get(&self, kind: AdjustmentKind) -> f64 {
        match kind {
            AdjustmentKind::Brightness => self.brightness,
            AdjustmentKind::Contrast => self.contrast,
            AdjustmentKind::Hue => self.hue,
            AdjustmentKind::Grayscale => self.grayscale,
            AdjustmentKind::Saturation => self.saturation,
        }
    }

    pub fn set(&mut self, kind: AdjustmentKind, value: f64) {
        let slot = match kind {
            AdjustmentKind::Brightness => &mut self.brightness,
            AdjustmentKind::Contrast => &mut self.contrast,
            AdjustmentKind::Hue => &mut self.hue,
            AdjustmentKind::Grayscale => &mut self.grayscale,
            AdjustmentKind::Saturation => &mut self.saturation,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurMethod {
    Gaussian,
    Median,
    Average,
    Bilateral,
    Motion,
}

impl BlurMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gaussian => "gaussian",
            Self::Median => "median",
            Self::Average => "average",
            Self::Bilateral => "bilateral",
            Self::Motion => "motion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    Binary,
    Adaptive,
    Mean,
    Otsu,
}

impl ThresholdMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Adaptive => "adaptive",
            Self::Mean => "mean",
            Self::Otsu => "otsu",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDetector {
    Canny,
    Sobel,
    Laplacian,
}

impl EdgeDetector {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Canny => "canny",
            Self::Sobel => "sobel",
            Self::Laplacian => "laplacian",
        }
    }
}

/// The single active member across the filter, threshold and edge groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "group", content = "member", rename_all = "snake_case")]
pub enum Selection {
    Filter(BlurMethod),
    Threshold(ThresholdMode),
    EdgeDetector(EdgeDetector),
}

impl Selection {
    pub fn to_operation(self) -> Result<PendingOperation> {
        let (kind, key, value) = match self {
            Self::Filter(method) => (OperationKind::Blur, "method", method.as_str()),
            Self::Threshold(mode) => (OperationKind::Threshold, "type", mode.as_str()),
            Self::EdgeDetector(detector) => {
                (OperationKind::EdgeDetection, "detector", detector.as_str())
            }
        };
        let mut params = Params::new();
        params.insert(key.to_string(), json!(value));
        PendingOperation::new(kind, params).validated()
    }
}
