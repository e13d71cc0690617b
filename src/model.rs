mod adjustments;
mod error;
mod image;
mod operation;
mod params;
mod schema;


pub use adjustments::{
    AdjustmentKind, Adjustments, BlurMethod, EdgeDetector, Selection, ThresholdMode,
};
pub use error::{Result, ValidationError};
pub use image::{Dimensions, ImageInfo, ImageState};
pub use operation::{
    BLUR_METHODS, DebounceKey, EDGE_DETECTORS, FLIP_MODES, OperationKind, PendingOperation,
    SPLIT_CHANNELS, THRESHOLD_TYPES,
};
pub use params::{Params, parse_param_pairs};
pub use schema::{OpSchema, ParamDefault, ParamKind, ParamSpec};
