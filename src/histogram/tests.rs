use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};

use super::{
    BUCKETS, Buckets, Channel, Histogram, HistogramError, HistogramReport, HistogramStats,
    LocalHistogramService, histogram_from_bytes, histogram_from_image,
};
use crate::model::{ImageInfo, ImageState};
use crate::service::HistogramService;

fn close(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}

#[test]
fn two_extremes_give_full_range_and_lowest_mode() {
    let buckets = Buckets::from_pairs(&[(0, 10), (255, 10)]);
    let stats = HistogramStats::compute(&buckets);
    assert_eq!(stats.dynamic_range, [0, 255]);
    assert!(close(stats.mean, 127.5));
    assert_eq!(stats.rounded_mean(), 128);
    assert_eq!(stats.mode, 0);
    assert_eq!(stats.median, 0);
    assert!(close(stats.std_dev, 127.5));
    assert!(close(stats.entropy, 1.0));
}

#[test]
fn uniform_distribution_has_eight_bits_of_entropy() {
    let buckets = Buckets::from_counts(Channel::Gray, &[3; BUCKETS]).expect("buckets");
    let stats = HistogramStats::compute(&buckets);
    assert!((stats.entropy - 8.0).abs() < 1e-9);
    assert_eq!(stats.dynamic_range, [0, 255]);
    assert_eq!(stats.median, 127);
}

#[test]
fn single_bucket_has_zero_entropy_and_spread() {
    let stats = HistogramStats::compute(&Buckets::from_pairs(&[(42, 1000)]));
    assert_eq!(stats.entropy, 0.0);
    assert_eq!(stats.std_dev, 0.0);
    assert!(close(stats.mean, 42.0));
    assert_eq!(stats.dynamic_range, [42, 42]);
    assert_eq!((stats.median, stats.mode), (42, 42));
}

#[test]
fn empty_histogram_yields_neutral_values() {
    let stats = HistogramStats::compute(&Buckets::default());
    assert!(stats.is_empty());
    assert_eq!(stats, HistogramStats::default());
    assert!(stats.mean.is_finite() && stats.std_dev.is_finite() && stats.entropy.is_finite());
}

#[test]
fn median_is_where_cumulative_mass_reaches_half() {
    let stats = HistogramStats::compute(&Buckets::from_pairs(&[(10, 1), (20, 1), (30, 2)]));
    assert_eq!(stats.median, 20);
    assert_eq!(stats.mode, 30);
}

#[test]
fn rgb_view_sums_channels_instead_of_averaging() {
    let histogram = Histogram {
        red: Some(Buckets::from_pairs(&[(0, 4)])),
        green: Some(Buckets::from_pairs(&[(0, 2), (200, 2)])),
        blue: Some(Buckets::from_pairs(&[(200, 4)])),
        gray: None,
    };
    let combined = histogram.combined(Channel::Rgb).expect("rgb");
    assert_eq!(combined.total(), 12);
    assert_eq!(combined.counts()[0], 6);
    assert_eq!(combined.counts()[200], 6);

    let report = HistogramReport::new(Channel::Rgb, histogram).expect("report");
    assert!(close(report.stats.mean, 100.0));
}

#[test]
fn missing_channel_is_reported() {
    let histogram = Histogram {
        gray: Some(Buckets::default()),
        ..Histogram::default()
    };
    assert!(matches!(
        histogram.combined(Channel::Red),
        Err(HistogramError::MissingChannel(Channel::Red))
    ));
    assert!(histogram.combined(Channel::Rgb).is_err());
}

#[test]
fn wire_counts_are_checked() {
    assert!(matches!(
        Buckets::from_wire(Channel::Gray, &[1.0; 10]),
        Err(HistogramError::BucketCount { len: 10, .. })
    ));
    let mut values = vec![0.0; BUCKETS];
    values[3] = -1.0;
    assert!(matches!(
        Buckets::from_wire(Channel::Gray, &values),
        Err(HistogramError::InvalidCount { index: 3, .. })
    ));
    values[3] = 5.0;
    let buckets = Buckets::from_wire(Channel::Gray, &values).expect("wire");
    assert_eq!(buckets.counts()[3], 5);
}

#[test]
fn wire_counts_must_be_whole_32_bit_values() {
    let mut values = vec![0.0; BUCKETS];
    values[7] = 2.5;
    assert!(matches!(
        Buckets::from_wire(Channel::Red, &values),
        Err(HistogramError::InvalidCount { index: 7, .. })
    ));

    values[7] = 0.0;
    values[0] = 1e19;
    values[255] = 1e19;
    assert!(matches!(
        Buckets::from_wire(Channel::Gray, &values),
        Err(HistogramError::InvalidCount { index: 0, .. })
    ));

    values[0] = f64::from(u32::MAX);
    values[255] = f64::from(u32::MAX) + 1.0;
    assert!(matches!(
        Buckets::from_wire(Channel::Gray, &values),
        Err(HistogramError::InvalidCount { index: 255, .. })
    ));

    values[255] = f64::from(u32::MAX);
    let buckets = Buckets::from_wire(Channel::Gray, &values).expect("wire");
    assert_eq!(buckets.total(), 2 * u64::from(u32::MAX));
}

#[test]
fn saturated_buckets_still_produce_stats() {
    let buckets = Buckets::from_counts(Channel::Gray, &[u64::MAX; BUCKETS]).expect("buckets");
    assert_eq!(buckets.total(), u64::MAX);

    let stats = HistogramStats::compute(&buckets);
    assert_eq!(stats.total, u64::MAX);
    assert!(close(stats.mean, 127.5));
    assert_eq!(stats.median, 127);
    assert_eq!(stats.mode, 0);
    assert_eq!(stats.dynamic_range, [0, 255]);
    assert!(close(stats.entropy, 8.0));

    let mut combined = buckets.clone();
    combined.add(&buckets);
    assert_eq!(combined.counts()[0], u64::MAX);
}

fn two_pixel_image() -> DynamicImage {
    let mut buffer = ImageBuffer::<Rgb<u8>, Vec<u8>>::new(2, 1);
    buffer.put_pixel(0, 0, Rgb([255, 0, 0]));
    buffer.put_pixel(1, 0, Rgb([255, 255, 255]));
    DynamicImage::ImageRgb8(buffer)
}

#[test]
fn local_histogram_counts_every_pixel() {
    let histogram = histogram_from_image(&two_pixel_image());
    let red = histogram.red.as_ref().expect("red");
    assert_eq!(red.counts()[255], 2);
    let green = histogram.green.as_ref().expect("green");
    assert_eq!((green.counts()[0], green.counts()[255]), (1, 1));
    let gray = histogram.gray.as_ref().expect("gray");
    assert_eq!(gray.counts()[76], 1);
    assert_eq!(gray.counts()[255], 1);
}

#[tokio::test]
async fn local_service_reads_the_image_handle() {
    let mut encoded = std::io::Cursor::new(Vec::new());
    two_pixel_image()
        .write_to(&mut encoded, ImageFormat::Png)
        .expect("encode png");
    let bytes = encoded.into_inner();
    assert!(histogram_from_bytes(&bytes).is_ok());

    let state = ImageState::from_bytes(&bytes, "image/png", ImageInfo::default());
    let histogram = LocalHistogramService
        .histogram(&state, Channel::Gray)
        .await
        .expect("histogram");
    assert!(histogram.red.is_none());
    assert_eq!(histogram.gray.expect("gray").total(), 2);
}
