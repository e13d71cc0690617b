use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use super::{HistogramError, Result};

pub const BUCKETS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Rgb,
    Red,
    Green,
    Blue,
    Gray,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => "rgb",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Gray => "gray",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// 256 frequency buckets for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buckets(Box<[u64; BUCKETS]>);

impl Default for Buckets {
    fn default() -> Self {
        Self(Box::new([0; BUCKETS]))
    }
}

impl Buckets {
    pub fn from_counts(channel: Channel, counts: &[u64]) -> Result<Self> {
        let array: [u64; BUCKETS] = counts.try_into().map_err(|_| HistogramError::BucketCount {
            channel,
            len: counts.len(),
        })?;
        Ok(Self(Box::new(array)))
    }

    /// Accepts counts as sent over JSON, where integral floats are common.
    /// Each count must be a whole number that fits in 32 bits.
    pub fn from_wire(channel: Channel, values: &[f64]) -> Result<Self> {
        if values.len() != BUCKETS {
            return Err(HistogramError::BucketCount {
                channel,
                len: values.len(),
            });
        }
        let mut buckets = Self::default();
        for (index, value) in values.iter().copied().enumerate() {
            if !value.is_finite()
                || value < 0.0
                || value.fract() != 0.0
                || value > f64::from(u32::MAX)
            {
                return Err(HistogramError::InvalidCount {
                    channel,
                    index,
                    value,
                });
            }
            buckets.0[index] = value as u64;
        }
        Ok(buckets)
    }

    pub fn from_pairs(pairs: &[(u8, u64)]) -> Self {
        let mut buckets = Self::default();
        for (index, count) in pairs {
            let slot = &mut buckets.0[usize::from(*index)];
            *slot = slot.saturating_add(*count);
        }
        buckets
    }

    pub fn counts(&self) -> &[u64; BUCKETS] {
        &self.0
    }

    pub(crate) fn counts_mut(&mut self) -> &mut [u64; BUCKETS] {
        &mut self.0
    }

    /// Sum of all buckets, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        u64::try_from(self.wide_total()).unwrap_or(u64::MAX)
    }

    pub(crate) fn wide_total(&self) -> u128 {
        self.0.iter().map(|count| u128::from(*count)).sum()
    }

    /// Elementwise sum, used for the combined RGB view.
    pub fn add(&mut self, other: &Self) {
        for (slot, count) in self.0.iter_mut().zip(other.0.iter()) {
            *slot = slot.saturating_add(*count);
        }
    }
}

impl Serialize for Buckets {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Histogram {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<Buckets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<Buckets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue: Option<Buckets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gray: Option<Buckets>,
}

impl Histogram {
    pub fn get(&self, channel: Channel) -> Option<&Buckets> {
        match channel {
            Channel::Rgb => None,
            Channel::Red => self.red.as_ref(),
            Channel::Green => self.green.as_ref(),
            Channel::Blue => self.blue.as_ref(),
            Channel::Gray => self.gray.as_ref(),
        }
    }

    /// Buckets for `channel`. `Rgb` sums the available color channels bucket-wise.
    pub fn combined(&self, channel: Channel) -> Result<Buckets> {
        if channel != Channel::Rgb {
            return self
                .get(channel)
                .cloned()
                .ok_or(HistogramError::MissingChannel(channel));
        }
        let mut parts = [&self.red, &self.green, &self.blue]
            .into_iter()
            .flatten()
            .peekable();
        if parts.peek().is_none() {
            return Err(HistogramError::MissingChannel(Channel::Rgb));
        }
        let mut sum = Buckets::default();
        for part in parts {
            sum.add(part);
        }
        Ok(sum)
    }

    /// Keeps only the channels a query for `channel` asked for.
    pub fn restricted_to(mut self, channel: Channel) -> Self {
        match channel {
            Channel::Rgb => self.gray = None,
            Channel::Red => (self.green, self.blue, self.gray) = (None, None, None),
            Channel::Green => (self.red, self.blue, self.gray) = (None, None, None),
            Channel::Blue => (self.red, self.green, self.gray) = (None, None, None),
            Channel::Gray => (self.red, self.green, self.blue) = (None, None, None),
        }
        self
    }
}
