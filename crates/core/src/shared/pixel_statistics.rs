//! Single-pass statistics over a rectangular block of an RGB frame.

use crate::shared::frame::Frame;

/// Mean and population variance of per-pixel intensity `(R + G + B) / 3`
/// over the block at `(x, y)` of size `w` x `h`.
///
/// Returns `(0.0, 0.0)` for an empty block. Caller guarantees bounds.
pub fn intensity_mean_variance(
    frame: &Frame,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
) -> (f64, f64) {
    let n = w * h;
    if n == 0 {
        return (0.0, 0.0);
    }

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for row in y..y + h {
        for col in x..x + w {
            let v = frame.intensity(col, row);
            sum += v;
            sum_sq += v * v;
        }
    }

    let mean = sum / n as f64;
    // Guard against tiny negative values from cancellation.
    let variance = (sum_sq / n as f64 - mean * mean).max(0.0);
    (mean, variance)
}

/// Per-channel means `[R, G, B]` over the block. Zeros for an empty block.
pub fn channel_means(frame: &Frame, x: usize, y: usize, w: usize, h: usize) -> [f64; 3] {
    let n = w * h;
    if n == 0 {
        return [0.0; 3];
    }

    let mut sums = [0u64; 3];
    for row in y..y + h {
        for col in x..x + w {
            let px = frame.rgb(col, row);
            for c in 0..3 {
                sums[c] += px[c] as u64;
            }
        }
    }
    sums.map(|s| s as f64 / n as f64)
}
