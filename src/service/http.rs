use std::fmt;
use std::io::Read;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::wire::{
    ErrorReply, ExportBody, HistogramBody, HistogramReply, ProcessBody, ProcessReply, ResetBody,
    ResetReply, UploadReply,
};
use super::{
    ExportRequest, HealthStatus, HistogramService, ProcessRequest, ProcessingService, Result,
    ServiceError, SessionService, UploadRequest, UploadedImage, multipart,
};
use crate::histogram::{Channel, Histogram};
use crate::model::ImageState;

const MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

/// Blocking `ureq` transport, driven from tokio's blocking pool.
#[derive(Clone)]
pub struct HttpService {
    agent: ureq::Agent,
    base_url: String,
}

impl fmt::Debug for HttpService {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HttpService")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_string(body)?;
        debug!(endpoint = path, bytes = payload.len(), "POST");
        let response = self
            .agent
            .post(&self.endpoint(path))
            .set("Content-Type", "application/json")
            .send_string(&payload)
            .map_err(classify)?;
        read_json(response)
    }

    fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let response = self.agent.get(&self.endpoint(path)).call().map_err(classify)?;
        read_json(response)
    }

    fn upload_blocking(&self, request: &UploadRequest) -> Result<UploadReply> {
        let boundary = multipart::boundary();
        let body = multipart::file_body(
            &boundary,
            "image",
            &request.file_name,
            multipart::mime_for(&request.file_name),
            &request.bytes,
        );
        debug!(file = %request.file_name, bytes = request.bytes.len(), "upload");
        let response = self
            .agent
            .post(&self.endpoint("upload"))
            .set("Content-Type", &multipart::content_type(&boundary))
            .send_bytes(&body)
            .map_err(classify)?;
        read_json(response)
    }

    fn export_blocking(&self, request: &ExportRequest) -> Result<Vec<u8>> {
        let body = ExportBody {
            image: request.image.handle(),
            format: request.format,
            quality: request.effective_quality(),
        };
        let response = self
            .agent
            .post(&self.endpoint("download"))
            .set("Content-Type", "application/json")
            .send_string(&serde_json::to_string(&body)?)
            .map_err(classify)?;
        if response.content_type() == "application/json" {
            let reply: ErrorReply = read_json(response)?;
            return Err(ServiceError::Rejected(
                reply
                    .error
                    .unwrap_or_else(|| "export returned no image".to_string()),
            ));
        }
        read_bytes(response)
    }

    async fn blocking<T, F>(&self, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(HttpService) -> Result<T> + Send + 'static,
    {
        let service = self.clone();
        tokio::task::spawn_blocking(move || call(service))
            .await
            .map_err(|error| ServiceError::Transport(error.to_string()))?
    }
}

fn read_bytes(response: ureq::Response) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_RESPONSE_BYTES)
        .read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn read_json<R: DeserializeOwned>(response: ureq::Response) -> Result<R> {
    let bytes = read_bytes(response)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn classify(error: ureq::Error) -> ServiceError {
    match error {
        ureq::Error::Status(code, response) => {
            let body = read_bytes(response).unwrap_or_default();
            let message = serde_json::from_slice::<ErrorReply>(&body)
                .ok()
                .and_then(|reply| reply.error)
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
            ServiceError::Status { code, message }
        }
        ureq::Error::Transport(transport) => ServiceError::Transport(transport.to_string()),
    }
}

#[async_trait]
impl ProcessingService for HttpService {
    async fn process(&self, request: ProcessRequest) -> Result<ImageState> {
        self.blocking(move |service| {
            let body = ProcessBody {
                operation: request.operation,
                params: &request.params,
                image: request.image.handle(),
                session_id: request.session_id.as_deref(),
            };
            let reply: ProcessReply = service.post_json("process", &body)?;
            reply.into_image(&request.image)
        })
        .await
    }
}

#[async_trait]
impl HistogramService for HttpService {
    async fn histogram(&self, image: &ImageState, channel: Channel) -> Result<Histogram> {
        let image = image.clone();
        self.blocking(move |service| {
            let body = HistogramBody {
                image: image.handle(),
                channel,
            };
            let reply: HistogramReply = service.post_json("histogram", &body)?;
            reply.into_histogram()
        })
        .await
    }
}

#[async_trait]
impl SessionService for HttpService {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedImage> {
        self.blocking(move |service| {
            let reply = service.upload_blocking(&request)?;
            let (image, session_id) = reply.into_parts(request.bytes.len())?;
            Ok(UploadedImage { image, session_id })
        })
        .await
    }

    async fn reset(&self, session_id: &str) -> Result<ImageState> {
        let session_id = session_id.to_string();
        self.blocking(move |service| {
            let reply: ResetReply = service.post_json(
                "reset",
                &ResetBody {
                    session_id: &session_id,
                },
            )?;
            reply.into_image()
        })
        .await
    }

    async fn export(&self, request: ExportRequest) -> Result<Vec<u8>> {
        self.blocking(move |service| service.export_blocking(&request))
            .await
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.blocking(|service| service.get_json("health")).await
    }
}
