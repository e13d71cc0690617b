mod engine;
mod error;
mod state;


pub use engine::{DispatchOutcome, EditSession, SessionOptions};
pub use error::{EditError, Result};
pub use state::{Session, SessionPhase, SessionSnapshot, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};
