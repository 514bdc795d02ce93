//! Peak-preserving decimation
//!
//! One value per pixel: the largest absolute sample in that pixel's bucket.
//! Buckets are never averaged.

/// Decimate `samples` to `width` peaks
///
/// The bucket size is `max(1, samples.len() / width)`. Pixels past the end
/// of a short buffer are 0, and samples past `width` full buckets are not
/// drawn.
pub fn decimate_peaks(samples: &[f32], width: usize) -> Vec<f32> {
    if width == 0 {
        return Vec::new();
    }

    let step = (samples.len() / width).max(1);

    (0..width)
        .map(|x| {
            let start = x * step;
            if start >= samples.len() {
                return 0.0;
            }
            let end = (start + step).min(samples.len());
            peak(&samples[start..end])
        })
        .collect()
}

/// Largest absolute value in `samples` (0 for an empty slice)
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .fold(0.0f32, |max, sample| max.max(sample.abs()))
}
