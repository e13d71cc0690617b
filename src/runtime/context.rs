use std::sync::Arc;

use super::{EngineConfig, Result};
use crate::histogram::LocalHistogramService;
use crate::model::{OpSchema, OperationKind};
use crate::service::{HttpService, Services};
use crate::session::EditSession;

#[derive(Debug, Clone)]
pub struct AppContext {
    config: EngineConfig,
    http: Arc<HttpService>,
}

impl AppContext {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let http = Arc::new(HttpService::new(
            config.service_url.clone(),
            config.request_timeout(),
        ));
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn http(&self) -> &HttpService {
        &self.http
    }

    /// Every collaborator talks to the configured processing server.
    pub fn remote_services(&self) -> Services {
        Services::from_backend(Arc::clone(&self.http))
    }

    /// Remote processing with histograms computed in-process.
    pub fn services(&self) -> Services {
        self.remote_services()
            .with_histogram(Arc::new(LocalHistogramService))
    }

    pub fn open_session(&self, services: Services) -> EditSession {
        EditSession::new(services, self.config.session_options())
    }

    pub fn operations(&self) -> Vec<OpSchema> {
        let mut schemas = OperationKind::ALL
            .into_iter()
            .map(OperationKind::schema)
            .collect::<Vec<_>>();
        schemas.sort_by(|left, right| left.name.cmp(right.name));
        schemas
    }
}
