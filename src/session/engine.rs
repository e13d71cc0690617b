use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{EditError, Result, Session, SessionPhase, SessionSnapshot};
use crate::histogram::{Channel, HistogramReport};
use crate::model::{AdjustmentKind, DebounceKey, ImageState, PendingOperation, Selection};
use crate::scheduler::{Debouncer, Ticket};
use crate::service::{
    self, ExportFormat, ExportRequest, HealthStatus, ProcessRequest, ServiceError, Services,
    UploadRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub request_timeout: Duration,
    pub debounce: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            debounce: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The operation succeeded and its result is the new history tail.
    Applied(ImageState),
    /// The result arrived after a newer request or a new upload and was dropped.
    Superseded,
    /// A selection was toggled off; nothing was sent.
    Deselected,
}

impl DispatchOutcome {
    pub fn image(&self) -> Option<&ImageState> {
        match self {
            Self::Applied(image) => Some(image),
            Self::Superseded | Self::Deselected => None,
        }
    }
}

struct Inner {
    state: Mutex<Session>,
    services: Services,
    options: SessionOptions,
    debouncer: Debouncer<DebounceKey>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the in-flight slot of one dispatch. Dropping it while armed
/// (failure, timeout or a cancelled future) frees the slot and puts the
/// history top back on display.
struct InFlight<'a> {
    inner: &'a Inner,
    epoch: u64,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(inner: &'a Inner, epoch: u64) -> Self {
        Self {
            inner,
            epoch,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.lock().abort_dispatch(self.epoch);
        }
    }
}

/// Coordinates one edit session against the remote services: single-flight
/// dispatch, undo/redo history, debounced sliders and histogram queries.
#[derive(Clone)]
pub struct EditSession {
    inner: Arc<Inner>,
}

impl fmt::Debug for EditSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EditSession")
            .field("session", &*self.inner.lock())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl EditSession {
    pub fn new(services: Services, options: SessionOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(Session::default()),
                services,
                options,
                debouncer: Debouncer::new(),
            }),
        }
    }

    pub fn options(&self) -> SessionOptions {
        self.inner.options
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().snapshot()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.lock().phase()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.lock().is_busy()
    }

    pub fn current_image(&self) -> Option<ImageState> {
        self.inner.lock().current().cloned()
    }

    pub fn displayed_image(&self) -> Option<ImageState> {
        self.inner.lock().displayed().cloned()
    }

    pub fn original_image(&self) -> Option<ImageState> {
        self.inner.lock().original().cloned()
    }

    /// Returns (and clears) the last failure of a debounced operation.
    pub fn take_deferred_error(&self) -> Option<String> {
        self.inner.lock().take_deferred_error()
    }

    async fn bounded<T, F>(&self, call: F) -> service::Result<T>
    where
        F: Future<Output = service::Result<T>>,
    {
        let limit = self.inner.options.request_timeout;
        tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(ServiceError::Timeout(limit)))
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        Ok(self.bounded(self.inner.services.session.health()).await?)
    }

    /// Uploads an image and makes it the base of a fresh session. Work still
    /// in flight for the previous session is discarded when it lands.
    pub async fn upload(&self, file_name: impl Into<String>, bytes: Vec<u8>) -> Result<ImageState> {
        let request = UploadRequest {
            file_name: file_name.into(),
            bytes,
        };
        let uploaded = self
            .bounded(self.inner.services.session.upload(request))
            .await?;
        self.inner.debouncer.cancel_all();
        let image = uploaded.image.clone();
        let epoch = self.inner.lock().begin(uploaded);
        match image.dimensions() {
            Some(dimensions) => info!(epoch, %dimensions, "image uploaded"),
            None => info!(epoch, "image uploaded"),
        }
        Ok(image)
    }

    /// Sends one operation to the processing service, unless another one is
    /// already in flight.
    pub async fn dispatch(&self, operation: PendingOperation) -> Result<DispatchOutcome> {
        self.run_dispatch(operation, None, None, |_| {}).await
    }

    /// Like [`dispatch`](Self::dispatch), but the result is dropped if
    /// `ticket` has been superseded by the time it arrives.
    pub async fn dispatch_ticketed(
        &self,
        operation: PendingOperation,
        ticket: &Ticket<DebounceKey>,
    ) -> Result<DispatchOutcome> {
        self.run_dispatch(operation, Some(ticket), None, |_| {}).await
    }

    async fn run_dispatch<F>(
        &self,
        operation: PendingOperation,
        ticket: Option<&Ticket<DebounceKey>>,
        bound_epoch: Option<u64>,
        on_applied: F,
    ) -> Result<DispatchOutcome>
    where
        F: FnOnce(&mut Session) + Send,
    {
        let operation = operation.validated()?;
        let (epoch, image, session_id) = {
            let mut session = self.inner.lock();
            if bound_epoch.is_some_and(|bound| bound != session.epoch()) {
                debug!(operation = %operation.kind, "operation belongs to a replaced image");
                return Ok(DispatchOutcome::Superseded);
            }
            let (epoch, image) = session.begin_dispatch()?;
            (epoch, image, session.session_id().map(str::to_string))
        };
        let mut in_flight = InFlight::new(&self.inner, epoch);
        debug!(operation = %operation.kind, epoch, "dispatching");

        let request = ProcessRequest {
            operation: operation.kind,
            params: operation.params,
            image,
            session_id,
        };
        let result = self
            .bounded(self.inner.services.processing.process(request))
            .await;

        let image = match result {
            Ok(image) => image,
            Err(error) => {
                drop(in_flight);
                warn!(operation = %operation.kind, %error, "operation failed");
                return Err(error.into());
            }
        };

        let stale_ticket = ticket.is_some_and(|ticket| !ticket.is_current());
        let mut session = self.inner.lock();
        if stale_ticket || session.epoch() != epoch {
            session.abort_dispatch(epoch);
            in_flight.disarm();
            warn!(operation = %operation.kind, epoch, "discarding stale result");
            return Ok(DispatchOutcome::Superseded);
        }
        session.complete_dispatch(image.clone());
        on_applied(&mut *session);
        in_flight.disarm();
        info!(
            operation = %operation.kind,
            history_len = session.history().len(),
            "operation applied"
        );
        Ok(DispatchOutcome::Applied(image))
    }

    /// Arms (or re-arms) the debounce timer for the operation's key. Only the
    /// last operation scheduled within the window reaches the service.
    pub fn schedule(&self, operation: PendingOperation) -> Result<Ticket<DebounceKey>> {
        let operation = operation.validated()?;
        let epoch = {
            let session = self.inner.lock();
            session.ensure_loaded()?;
            session.epoch()
        };
        let session = self.clone();
        let key = operation.key.clone();
        Ok(self
            .inner
            .debouncer
            .schedule(key, self.inner.options.debounce, move |ticket| async move {
                session.run_debounced(operation, ticket, epoch).await;
            }))
    }

    /// Runs a fired timer's operation, retrying while the session is busy.
    /// Stops once the ticket is superseded or a new image replaces `epoch`.
    async fn run_debounced(
        &self,
        operation: PendingOperation,
        ticket: Ticket<DebounceKey>,
        epoch: u64,
    ) {
        loop {
            let outcome = self
                .run_dispatch(operation.clone(), Some(&ticket), Some(epoch), |_| {})
                .await;
            match outcome {
                Ok(_) => return,
                Err(EditError::Concurrency) if ticket.is_current() => {
                    debug!(key = %ticket.key(), "session busy, retrying after delay");
                    tokio::time::sleep(self.inner.options.debounce).await;
                    if !ticket.is_current() || self.inner.lock().epoch() != epoch {
                        return;
                    }
                }
                Err(error) => {
                    if ticket.is_current() {
                        warn!(key = %ticket.key(), %error, "debounced operation failed");
                        self.inner.lock().record_deferred_error(error.to_string());
                    }
                    return;
                }
            }
        }
    }

    /// Records a slider value and schedules the matching operation.
    pub fn adjust(&self, kind: AdjustmentKind, value: f64) -> Result<Ticket<DebounceKey>> {
        let operation = kind.to_operation(value)?;
        {
            let mut session = self.inner.lock();
            session.ensure_loaded()?;
            session.adjustments_mut().set(kind, value);
        }
        self.schedule(operation)
    }

    /// Makes `selection` the single active filter, threshold mode or edge
    /// detector and applies it. Selecting the active member again clears it.
    pub async fn select(&self, selection: Selection) -> Result<DispatchOutcome> {
        let operation = selection.to_operation()?;
        {
            let mut session = self.inner.lock();
            session.ensure_loaded()?;
            session.ensure_idle()?;
            if session.selection() == Some(selection) {
                session.set_selection(None);
                debug!(?selection, "selection cleared");
                return Ok(DispatchOutcome::Deselected);
            }
        }
        self.run_dispatch(operation, None, None, move |session| {
            session.set_selection(Some(selection));
        })
        .await
    }

    pub fn undo(&self) -> Result<ImageState> {
        let image = self.inner.lock().undo()?;
        debug!("undo");
        Ok(image)
    }

    pub fn redo(&self) -> Result<ImageState> {
        let image = self.inner.lock().redo()?;
        debug!("redo");
        Ok(image)
    }

    /// Reverts to the uploaded image. A session bound to a server-side
    /// working copy is reset remotely first.
    pub async fn reset(&self) -> Result<ImageState> {
        let (epoch, session_id, original) = {
            let mut session = self.inner.lock();
            let original = session.original().cloned().ok_or(EditError::NoImage)?;
            let (epoch, _) = session.begin_dispatch()?;
            (epoch, session.session_id().map(str::to_string), original)
        };
        let mut in_flight = InFlight::new(&self.inner, epoch);
        self.inner.debouncer.cancel_all();

        let base = match session_id {
            Some(session_id) => {
                let remote = self
                    .bounded(self.inner.services.session.reset(&session_id))
                    .await
                    .inspect_err(|error| warn!(%error, "reset failed"))?;
                ImageState::from_handle(remote.handle(), original.info().clone())
            }
            None => original,
        };

        let mut session = self.inner.lock();
        in_flight.disarm();
        if session.epoch() != epoch {
            warn!(epoch, "session replaced during reset");
            return session.current().cloned().ok_or(EditError::NoImage);
        }
        session.revert(base.clone());
        info!(epoch, "session reset");
        Ok(base)
    }

    pub fn zoom_in(&self) -> f64 {
        self.inner.lock().zoom_by(1)
    }

    pub fn zoom_out(&self) -> f64 {
        self.inner.lock().zoom_by(-1)
    }

    pub fn set_zoom(&self, zoom: f64) -> f64 {
        self.inner.lock().set_zoom(zoom)
    }

    pub fn reset_zoom(&self) -> f64 {
        self.inner.lock().set_zoom(1.0)
    }

    pub fn toggle_compare(&self) -> bool {
        self.inner.lock().toggle_compare()
    }

    /// Queries the histogram of the current image. Never blocked by an
    /// operation in flight and never touches history.
    pub async fn histogram(&self, channel: Channel) -> Result<HistogramReport> {
        let image = self.inner.lock().ensure_loaded()?.clone();
        let histogram = self
            .bounded(self.inner.services.histogram.histogram(&image, channel))
            .await?;
        HistogramReport::new(channel, histogram).map_err(|error| ServiceError::from(error).into())
    }

    pub async fn export(&self, format: ExportFormat, quality: Option<u8>) -> Result<Vec<u8>> {
        let image = self.inner.lock().ensure_loaded()?.clone();
        let request = ExportRequest::new(image, format, quality);
        Ok(self
            .bounded(self.inner.services.session.export(request))
            .await?)
    }

    /// Waits for every pending and running debounced operation.
    pub async fn settle(&self) {
        self.inner.debouncer.settle().await;
    }

    pub fn pending_keys(&self) -> Vec<DebounceKey> {
        self.inner.debouncer.pending_keys()
    }
}
