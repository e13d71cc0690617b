use serde::{Deserialize, Serialize};

use super::{BUCKETS, Buckets, Channel, Histogram};

/// Statistics derived from one bucket array. Every field is zero when the
/// histogram is empty.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HistogramStats {
    pub total: u64,
    pub mean: f64,
    pub std_dev: f64,
    pub entropy: f64,
    pub dynamic_range: [u8; 2],
    pub median: u8,
    pub mode: u8,
}

impl HistogramStats {
    pub fn compute(buckets: &Buckets) -> Self {
        let counts = buckets.counts();
        let total = buckets.wide_total();
        if total == 0 {
            return Self::default();
        }
        let total_f = total as f64;

        let weighted: f64 = counts
            .iter()
            .enumerate()
            .map(|(index, count)| index as f64 * *count as f64)
            .sum();
        let mean = weighted / total_f;

        let variance: f64 = counts
            .iter()
            .enumerate()
            .map(|(index, count)| {
                let delta = index as f64 - mean;
                *count as f64 * delta * delta
            })
            .sum::<f64>()
            / total_f;

        let entropy = -counts
            .iter()
            .filter(|count| **count > 0)
            .map(|count| {
                let p = *count as f64 / total_f;
                p * p.log2()
            })
            .sum::<f64>();

        let low = counts.iter().position(|count| *count > 0).unwrap_or(0);
        let high = counts.iter().rposition(|count| *count > 0).unwrap_or(0);

        let mut cumulative = 0u128;
        let mut median = BUCKETS - 1;
        for (index, count) in counts.iter().enumerate() {
            cumulative += u128::from(*count);
            if cumulative * 2 >= total {
                median = index;
                break;
            }
        }

        // `max_by_key` keeps the last maximum, so scan in reverse to favor the lowest index.
        let mode = counts
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, count)| **count)
            .map(|(index, _)| index)
            .unwrap_or(0);

        Self {
            total: buckets.total(),
            mean,
            std_dev: variance.sqrt(),
            entropy: entropy.max(0.0),
            dynamic_range: [low as u8, high as u8],
            median: median as u8,
            mode: mode as u8,
        }
    }

    /// Mean rounded half-up to a bucket index.
    pub fn rounded_mean(&self) -> u8 {
        (self.mean + 0.5).floor().clamp(0.0, 255.0) as u8
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramReport {
    pub channel: Channel,
    pub histogram: Histogram,
    pub stats: HistogramStats,
}

impl HistogramReport {
    pub fn new(channel: Channel, histogram: Histogram) -> super::Result<Self> {
        let combined = histogram.combined(channel)?;
        Ok(Self {
            channel,
            stats: HistogramStats::compute(&combined),
            histogram,
        })
    }
}
