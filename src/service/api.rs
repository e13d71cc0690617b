use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Result;
use crate::histogram::{Channel, Histogram};
use crate::model::{ImageState, OperationKind, Params};

#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub operation: OperationKind,
    pub params: Params,
    pub image: ImageState,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub image: ImageState,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpg,
    Tiff,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Tiff => "tiff",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpg),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.extension())
    }
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub image: ImageState,
    pub format: ExportFormat,
    pub quality: Option<u8>,
}

impl ExportRequest {
    pub const DEFAULT_QUALITY: u8 = 95;

    pub fn new(image: ImageState, format: ExportFormat, quality: Option<u8>) -> Self {
        Self {
            image,
            format,
            quality: quality.map(|value| value.min(100)),
        }
    }

    pub fn effective_quality(&self) -> u8 {
        self.quality.unwrap_or(Self::DEFAULT_QUALITY)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub modules: bool,
    #[serde(default)]
    pub timestamp: f64,
}

#[async_trait]
pub trait ProcessingService: Send + Sync {
    async fn process(&self, request: ProcessRequest) -> Result<ImageState>;
}

#[async_trait]
pub trait HistogramService: Send + Sync {
    async fn histogram(&self, image: &ImageState, channel: Channel) -> Result<Histogram>;
}

#[async_trait]
pub trait SessionService: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedImage>;
    async fn reset(&self, session_id: &str) -> Result<ImageState>;
    async fn export(&self, request: ExportRequest) -> Result<Vec<u8>>;
    async fn health(&self) -> Result<HealthStatus>;
}

/// The remote collaborators an edit session talks to.
#[derive(Clone)]
pub struct Services {
    pub processing: Arc<dyn ProcessingService>,
    pub histogram: Arc<dyn HistogramService>,
    pub session: Arc<dyn SessionService>,
}

impl Services {
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ProcessingService + HistogramService + SessionService + 'static,
    {
        Self {
            processing: backend.clone(),
            histogram: backend.clone(),
            session: backend,
        }
    }

    pub fn with_histogram(mut self, histogram: Arc<dyn HistogramService>) -> Self {
        self.histogram = histogram;
        self
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Services").finish_non_exhaustive()
    }
}
