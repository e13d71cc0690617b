use async_trait::async_trait;
use image::DynamicImage;
use rayon::prelude::*;

use super::{Buckets, Channel, Histogram, Result};
use crate::model::ImageState;
use crate::service::{self, HistogramService, ServiceError};

#[derive(Default)]
struct Counts {
    red: Buckets,
    green: Buckets,
    blue: Buckets,
    gray: Buckets,
}

impl Counts {
    fn add_pixel(&mut self, red: u8, green: u8, blue: u8) {
        self.red.counts_mut()[usize::from(red)] += 1;
        self.green.counts_mut()[usize::from(green)] += 1;
        self.blue.counts_mut()[usize::from(blue)] += 1;
        self.gray.counts_mut()[usize::from(luma(red, green, blue))] += 1;
    }

    fn merge(mut self, other: Self) -> Self {
        self.red.add(&other.red);
        self.green.add(&other.green);
        self.blue.add(&other.blue);
        self.gray.add(&other.gray);
        self
    }
}

// ITU-R BT.601 weights, rounded to the nearest level.
fn luma(red: u8, green: u8, blue: u8) -> u8 {
    let weighted = 299 * u32::from(red) + 587 * u32::from(green) + 114 * u32::from(blue);
    ((weighted + 500) / 1000) as u8
}

pub fn histogram_from_image(image: &DynamicImage) -> Histogram {
    let rgb = image.to_rgb8();
    let row_len = (rgb.width() as usize * 3).max(3);
    let counts = rgb
        .as_raw()
        .par_chunks(row_len)
        .fold(Counts::default, |mut counts, row| {
            for pixel in row.chunks_exact(3) {
                counts.add_pixel(pixel[0], pixel[1], pixel[2]);
            }
            counts
        })
        .reduce(Counts::default, Counts::merge);
    Histogram {
        red: Some(counts.red),
        green: Some(counts.green),
        blue: Some(counts.blue),
        gray: Some(counts.gray),
    }
}

pub fn histogram_from_bytes(bytes: &[u8]) -> Result<Histogram> {
    let image = image::load_from_memory(bytes)?;
    Ok(histogram_from_image(&image))
}

/// Computes buckets from the encoded image itself, without a remote call.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalHistogramService;

#[async_trait]
impl HistogramService for LocalHistogramService {
    async fn histogram(&self, image: &ImageState, channel: Channel) -> service::Result<Histogram> {
        let bytes = image.decode_bytes().map_err(super::HistogramError::from)?;
        let histogram = tokio::task::spawn_blocking(move || histogram_from_bytes(&bytes))
            .await
            .map_err(|error| ServiceError::Transport(error.to_string()))??;
        Ok(histogram.restricted_to(channel))
    }
}
