use serde::{Deserialize, Serialize};

use super::{EditError, Result};
use crate::history::HistoryStack;
use crate::model::{Adjustments, Dimensions, ImageState, Selection};
use crate::service::UploadedImage;

pub const ZOOM_MIN: f64 = 0.1;
pub const ZOOM_MAX: f64 = 5.0;
pub const ZOOM_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Empty,
    Ready,
    Processing,
}

/// The one live edit session. Replaced wholesale on upload, reverted on reset.
#[derive(Debug, Clone)]
pub struct Session {
    epoch: u64,
    session_id: Option<String>,
    original: Option<ImageState>,
    displayed: Option<ImageState>,
    history: HistoryStack<ImageState>,
    adjustments: Adjustments,
    selection: Option<Selection>,
    zoom: f64,
    compare: bool,
    busy: bool,
    deferred_error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            epoch: 0,
            session_id: None,
            original: None,
            displayed: None,
            history: HistoryStack::new(),
            adjustments: Adjustments::default(),
            selection: None,
            zoom: 1.0,
            compare: false,
            busy: false,
            deferred_error: None,
        }
    }
}

impl Session {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn original(&self) -> Option<&ImageState> {
        self.original.as_ref()
    }

    pub fn displayed(&self) -> Option<&ImageState> {
        self.displayed.as_ref()
    }

    pub fn current(&self) -> Option<&ImageState> {
        self.history.current()
    }

    pub fn history(&self) -> &HistoryStack<ImageState> {
        &self.history
    }

    pub fn adjustments(&self) -> &Adjustments {
        &self.adjustments
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn compare(&self) -> bool {
        self.compare
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn phase(&self) -> SessionPhase {
        if self.busy {
            SessionPhase::Processing
        } else if self.history.is_empty() {
            SessionPhase::Empty
        } else {
            SessionPhase::Ready
        }
    }

    /// Tears down whatever was loaded and starts a new epoch around `uploaded`.
    pub(crate) fn begin(&mut self, uploaded: UploadedImage) -> u64 {
        let epoch = self.epoch + 1;
        *self = Self {
            epoch,
            session_id: uploaded.session_id,
            original: Some(uploaded.image.clone()),
            displayed: Some(uploaded.image.clone()),
            history: HistoryStack::with_base(uploaded.image),
            ..Self::default()
        };
        epoch
    }

    pub(crate) fn ensure_loaded(&self) -> Result<&ImageState> {
        self.history.current().ok_or(EditError::NoImage)
    }

    /// Claims the single in-flight slot. Marks the session busy and hands
    /// back the image the operation must be computed against.
    pub(crate) fn begin_dispatch(&mut self) -> Result<(u64, ImageState)> {
        let image = self.ensure_loaded()?.clone();
        if self.busy {
            return Err(EditError::Concurrency);
        }
        self.busy = true;
        Ok((self.epoch, image))
    }

    pub(crate) fn complete_dispatch(&mut self, image: ImageState) {
        self.history.push(image.clone());
        self.displayed = Some(image);
        self.busy = false;
    }

    /// Releases the in-flight slot without touching history. Ignored when the
    /// session has been replaced since `epoch`.
    pub(crate) fn abort_dispatch(&mut self, epoch: u64) {
        if self.epoch != epoch {
            return;
        }
        self.busy = false;
        self.displayed = self.history.current().cloned();
    }

    pub(crate) fn undo(&mut self) -> Result<ImageState> {
        self.ensure_idle()?;
        let image = self.history.undo()?.clone();
        self.displayed = Some(image.clone());
        Ok(image)
    }

    pub(crate) fn redo(&mut self) -> Result<ImageState> {
        self.ensure_idle()?;
        let image = self.history.redo()?.clone();
        self.displayed = Some(image.clone());
        Ok(image)
    }

    /// Reverts to `base`: one-entry history and neutral view settings.
    pub(crate) fn revert(&mut self, base: ImageState) {
        self.history.reset(base.clone());
        self.displayed = Some(base);
        self.adjustments = Adjustments::default();
        self.selection = None;
        self.zoom = 1.0;
        self.compare = false;
        self.busy = false;
    }

    pub(crate) fn ensure_idle(&self) -> Result<()> {
        if self.busy {
            return Err(EditError::Concurrency);
        }
        Ok(())
    }

    pub(crate) fn adjustments_mut(&mut self) -> &mut Adjustments {
        &mut self.adjustments
    }

    pub(crate) fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub(crate) fn zoom_by(&mut self, steps: i32) -> f64 {
        self.set_zoom(self.zoom + f64::from(steps) * ZOOM_STEP)
    }

    pub(crate) fn set_zoom(&mut self, zoom: f64) -> f64 {
        let zoom = if zoom.is_finite() { zoom } else { 1.0 };
        self.zoom = ((zoom / ZOOM_STEP).round() * ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
        self.zoom
    }

    pub(crate) fn toggle_compare(&mut self) -> bool {
        self.compare = !self.compare;
        self.compare
    }

    pub(crate) fn record_deferred_error(&mut self, message: String) {
        self.deferred_error = Some(message);
    }

    pub(crate) fn take_deferred_error(&mut self) -> Option<String> {
        self.deferred_error.take()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            epoch: self.epoch,
            phase: self.phase(),
            session_id: self.session_id.clone(),
            history_len: self.history.len(),
            current_index: self.history.current_index(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            dimensions: self.displayed.as_ref().and_then(ImageState::dimensions),
            adjustments: self.adjustments,
            selection: self.selection,
            zoom: self.zoom,
            compare: self.compare,
        }
    }
}

/// Read-only view of a session, cheap to hand out while an operation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub epoch: u64,
    pub phase: SessionPhase,
    pub session_id: Option<String>,
    pub history_len: usize,
    pub current_index: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub dimensions: Option<Dimensions>,
    pub adjustments: Adjustments,
    pub selection: Option<Selection>,
    pub zoom: f64,
    pub compare: bool,
}
