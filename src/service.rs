mod api;
mod error;
mod http;
mod multipart;
mod wire;


pub use api::{
    ExportFormat, ExportRequest, HealthStatus, HistogramService, ProcessRequest,
    ProcessingService, Services, SessionService, UploadRequest, UploadedImage,
};
pub use error::{Result, ServiceError};
pub use http::HttpService;
