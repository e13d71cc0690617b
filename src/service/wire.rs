use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ExportFormat, Result, ServiceError};
use crate::histogram::{Buckets, Channel, Histogram};
use crate::model::{Dimensions, ImageInfo, ImageState, OperationKind, Params};

fn ensure_success(success: bool, error: Option<String>) -> Result<()> {
    if success {
        return Ok(());
    }
    Err(ServiceError::Rejected(
        error.unwrap_or_else(|| "service reported failure".to_string()),
    ))
}

fn parse_dimensions(raw: Option<&str>) -> Option<Dimensions> {
    let raw = raw?;
    match raw.parse() {
        Ok(dimensions) => Some(dimensions),
        Err(error) => {
            warn!(%error, "ignoring unparseable dimensions");
            None
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProcessBody<'a> {
    pub operation: OperationKind,
    pub params: &'a Params,
    pub image: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProcessReply {
    #[serde(default)]
    pub success: bool,
    pub image: Option<String>,
    pub dimensions: Option<String>,
    pub error: Option<String>,
}

impl ProcessReply {
    pub fn into_image(self, source: &ImageState) -> Result<ImageState> {
        ensure_success(self.success, self.error)?;
        let handle = self.image.ok_or_else(|| {
            ServiceError::Malformed("processing reply carries no image".to_string())
        })?;
        let info = ImageInfo {
            dimensions: parse_dimensions(self.dimensions.as_deref()),
            size_bytes: None,
            color_mode: source.info().color_mode.clone(),
        };
        Ok(ImageState::from_handle(handle, info))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadReply {
    #[serde(default)]
    pub success: bool,
    pub image: Option<String>,
    pub session_id: Option<String>,
    pub dimensions: Option<String>,
    pub size: Option<u64>,
    pub color_mode: Option<String>,
    pub error: Option<String>,
}

impl UploadReply {
    pub fn into_parts(self, uploaded_len: usize) -> Result<(ImageState, Option<String>)> {
        ensure_success(self.success, self.error)?;
        let handle = self
            .image
            .ok_or_else(|| ServiceError::Malformed("upload reply carries no image".to_string()))?;
        let info = ImageInfo {
            dimensions: parse_dimensions(self.dimensions.as_deref()),
            size_bytes: Some(self.size.unwrap_or(uploaded_len as u64)),
            color_mode: self.color_mode,
        };
        Ok((ImageState::from_handle(handle, info), self.session_id))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct HistogramBody<'a> {
    pub image: &'a str,
    pub channel: Channel,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireHistogram {
    pub red: Option<Vec<f64>>,
    pub green: Option<Vec<f64>>,
    pub blue: Option<Vec<f64>>,
    pub gray: Option<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistogramReply {
    #[serde(default)]
    pub success: bool,
    pub histogram: Option<WireHistogram>,
    pub error: Option<String>,
}

impl HistogramReply {
    pub fn into_histogram(self) -> Result<Histogram> {
        ensure_success(self.success, self.error)?;
        let wire = self.histogram.ok_or_else(|| {
            ServiceError::Malformed("histogram reply carries no buckets".to_string())
        })?;
        let convert = |channel: Channel, values: Option<Vec<f64>>| {
            values
                .map(|values| Buckets::from_wire(channel, &values))
                .transpose()
        };
        Ok(Histogram {
            red: convert(Channel::Red, wire.red)?,
            green: convert(Channel::Green, wire.green)?,
            blue: convert(Channel::Blue, wire.blue)?,
            gray: convert(Channel::Gray, wire.gray)?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResetBody<'a> {
    pub session_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResetReply {
    #[serde(default)]
    pub success: bool,
    pub image: Option<String>,
    pub error: Option<String>,
}

impl ResetReply {
    pub fn into_image(self) -> Result<ImageState> {
        ensure_success(self.success, self.error)?;
        let handle = self
            .image
            .ok_or_else(|| ServiceError::Malformed("reset reply carries no image".to_string()))?;
        Ok(ImageState::from_handle(handle, ImageInfo::default()))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExportBody<'a> {
    pub image: &'a str,
    pub format: ExportFormat,
    pub quality: u8,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorReply {
    pub error: Option<String>,
}
