use thiserror::Error;

use super::Channel;
use crate::model::ValidationError;

pub type Result<T> = std::result::Result<T, HistogramError>;

#[derive(Debug, Error)]
pub enum HistogramError {
    #[error("{channel} histogram has {len} buckets, expected 256")]
    BucketCount { channel: Channel, len: usize },

    #[error("{channel} bucket {index} holds invalid count {value}")]
    InvalidCount {
        channel: Channel,
        index: usize,
        value: f64,
    },

    #[error("histogram response carries no {0} data")]
    MissingChannel(Channel),

    #[error("image handle could not be read: {0}")]
    Handle(#[from] ValidationError),

    #[error("image decode failure: {0}")]
    Decode(#[from] image::ImageError),
}
