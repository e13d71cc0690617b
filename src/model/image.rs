use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::{Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} × {}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self> {
        let invalid = || ValidationError::InvalidDimensions(raw.to_string());
        let (width, height) = raw
            .split_once('×')
            .or_else(|| raw.split_once(['x', 'X']))
            .ok_or_else(invalid)?;
        let height = height.trim().trim_end_matches("px").trim();
        Ok(Self {
            width: width.trim().parse().map_err(|_| invalid())?,
            height: height.parse().map_err(|_| invalid())?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub dimensions: Option<Dimensions>,
    pub size_bytes: Option<u64>,
    pub color_mode: Option<String>,
}

#[derive(Debug)]
struct ImageData {
    handle: String,
    info: ImageInfo,
}

/// One encoded image version. Cloning shares the underlying handle.
#[derive(Debug, Clone)]
pub struct ImageState {
    data: Arc<ImageData>,
}

impl ImageState {
    pub fn from_handle(handle: impl Into<String>, info: ImageInfo) -> Self {
        Self {
            data: Arc::new(ImageData {
                handle: handle.into(),
                info,
            }),
        }
    }

    pub fn from_bytes(bytes: &[u8], mime: &str, info: ImageInfo) -> Self {
        let handle = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
        Self::from_handle(handle, info)
    }

    pub fn handle(&self) -> &str {
        &self.data.handle
    }

    pub fn info(&self) -> &ImageInfo {
        &self.data.info
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.data.info.dimensions
    }

    /// Decodes the base64 payload of a `data:` URL or a bare base64 handle.
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        let payload = match self.data.handle.split_once(',') {
            Some((_, payload)) => payload,
            None => self.data.handle.as_str(),
        };
        STANDARD
            .decode(payload.trim())
            .map_err(|error| ValidationError::InvalidHandle(error.to_string()))
    }

    pub fn same_version(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl PartialEq for ImageState {
    fn eq(&self, other: &Self) -> bool {
        self.same_version(other) || self.data.handle == other.data.handle
    }
}

impl Eq for ImageState {}
