//! Reduction of repeated raw readings to one robust value per axis

use crate::config::MAX_READ_SAMPLES;

/// Middle element of the sorted samples.
///
/// Sorts in place, callers hand in a scratch copy. `samples` must not be
/// empty.
pub(crate) fn median(samples: &mut [i32]) -> i32 {
    samples.sort_unstable();
    samples[samples.len() / 2]
}

/// Population variance of non-empty `samples` around `center`
pub(crate) fn variance_around(samples: &[i32], center: i32) -> i32 {
    let sum: i64 = samples
        .iter()
        .map(|&s| {
            let d = (s - center) as i64;
            d * d
        })
        .sum();
    (sum / samples.len() as i64).min(i32::MAX as i64) as i32
}

/// Median of one axis' readings, or `None` when the readings are too noisy
/// to trust.
///
/// Takes between one and [`MAX_READ_SAMPLES`] readings, which
/// [`TouchConfig::validate`](crate::TouchConfig::validate) guarantees for the
/// driver's bursts.
pub(crate) fn filter_axis(samples: &[i32], variance_threshold: i32) -> Option<i32> {
    let mut scratch = [0; MAX_READ_SAMPLES];
    let scratch = &mut scratch[..samples.len()];
    scratch.copy_from_slice(samples);

    let m = median(scratch);
    if variance_around(samples, m) > variance_threshold {
        return None;
    }
    Some(m)
}

/// Plain average used by the raw read path, `samples` must not be empty
pub(crate) fn mean(samples: &[i32]) -> i32 {
    let sum: i64 = samples.iter().map(|&s| s as i64).sum();
    (sum / samples.len() as i64) as i32
}
