mod buckets;
mod error;
mod local;
mod stats;

#[cfg(test)]
mod tests;

pub use buckets::{BUCKETS, Buckets, Channel, Histogram};
pub use error::{HistogramError, Result};
pub use local::{LocalHistogramService, histogram_from_bytes, histogram_from_image};
pub use stats::{HistogramReport, HistogramStats};
