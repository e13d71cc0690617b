use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::histogram::{Buckets, Channel, Histogram};
use crate::model::{Dimensions, ImageInfo, ImageState, OperationKind, Params};
use crate::service::{
    ExportRequest, HealthStatus, HistogramService, ProcessRequest, ProcessingService, Result,
    ServiceError, Services, SessionService, UploadRequest, UploadedImage,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) enum Mode {
    #[default]
    Succeed,
    Reject(String),
    Fail(String),
    Hang,
}

/// In-memory stand-in for the remote services. Processed images get the
/// handle `<input>><operation>` so tests can read the applied chain.
#[derive(Default)]
pub(crate) struct MockBackend {
    mode: Mutex<Mode>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    processed: Mutex<Vec<(OperationKind, Params)>>,
    process_calls: AtomicUsize,
    histogram_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    reset_calls: AtomicUsize,
    export_calls: AtomicUsize,
}

impl MockBackend {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn services(self: &Arc<Self>) -> Services {
        Services::from_backend(Arc::clone(self))
    }

    pub(crate) fn set_mode(&self, mode: Mode) {
        *self.mode.lock().expect("mode") = mode;
    }

    /// Makes every following `process` call wait for a `release`.
    pub(crate) fn gate(&self) {
        *self.gate.lock().expect("gate") = Some(Arc::new(Semaphore::new(0)));
    }

    pub(crate) fn release(&self, calls: usize) {
        if let Some(gate) = self.gate.lock().expect("gate").as_ref() {
            gate.add_permits(calls);
        }
    }

    pub(crate) fn process_calls(&self) -> usize {
        self.process_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn histogram_calls(&self) -> usize {
        self.histogram_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn export_calls(&self) -> usize {
        self.export_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn processed(&self) -> Vec<(OperationKind, Params)> {
        self.processed.lock().expect("processed").clone()
    }

    async fn respond(&self) -> Result<()> {
        let gate = self.gate.lock().expect("gate").clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate open").forget();
        }
        let mode = self.mode.lock().expect("mode").clone();
        match mode {
            Mode::Succeed => Ok(()),
            Mode::Reject(message) => Err(ServiceError::Rejected(message)),
            Mode::Fail(message) => Err(ServiceError::Transport(message)),
            Mode::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl ProcessingService for MockBackend {
    async fn process(&self, request: ProcessRequest) -> Result<ImageState> {
        self.process_calls.fetch_add(1, Ordering::SeqCst);
        self.processed
            .lock()
            .expect("processed")
            .push((request.operation, request.params.clone()));
        self.respond().await?;
        Ok(ImageState::from_handle(
            format!("{}>{}", request.image.handle(), request.operation),
            request.image.info().clone(),
        ))
    }
}

#[async_trait]
impl HistogramService for MockBackend {
    async fn histogram(&self, _image: &ImageState, channel: Channel) -> Result<Histogram> {
        self.histogram_calls.fetch_add(1, Ordering::SeqCst);
        let histogram = Histogram {
            red: Some(Buckets::from_pairs(&[(10, 4)])),
            green: Some(Buckets::from_pairs(&[(20, 4)])),
            blue: Some(Buckets::from_pairs(&[(30, 4)])),
            gray: Some(Buckets::from_pairs(&[(0, 10), (255, 10)])),
        };
        Ok(histogram.restricted_to(channel))
    }
}

#[async_trait]
impl SessionService for MockBackend {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedImage> {
        let call = self.upload_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let info = ImageInfo {
            dimensions: Some(Dimensions::new(64, 48)),
            size_bytes: Some(request.bytes.len() as u64),
            color_mode: Some("RGB".to_string()),
        };
        Ok(UploadedImage {
            image: ImageState::from_handle(request.file_name, info),
            session_id: Some(format!("session-{call}")),
        })
    }

    async fn reset(&self, session_id: &str) -> Result<ImageState> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ImageState::from_handle(
            format!("reset:{session_id}"),
            ImageInfo::default(),
        ))
    }

    async fn export(&self, request: ExportRequest) -> Result<Vec<u8>> {
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "{}@{}q{}",
            request.image.handle(),
            request.format,
            request.effective_quality()
        )
        .into_bytes())
    }

    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus {
            status: "healthy".to_string(),
            modules: true,
            timestamp: 0.0,
        })
    }
}
