use crate::classification::domain::feature_vector::FeatureVector;
use crate::shared::frame::Frame;
use crate::shared::pixel_statistics::{channel_means, intensity_mean_variance};
use crate::shared::region::Region;
use crate::shared::settings::ScorerSettings;

/// Computes the four region statistics the heuristic classifier scores.
///
/// Pure: the output depends only on the pixels under the (clipped) region.
#[derive(Debug, Clone, Default)]
pub struct FeatureScorer {
    settings: ScorerSettings,
}

impl FeatureScorer {
    pub fn new(settings: ScorerSettings) -> Self {
        Self { settings }
    }

    pub fn score(&self, frame: &Frame, region: &Region) -> FeatureVector {
        let (x, y, w, h) = region.clip_to(frame.width(), frame.height());

        let (brightness, variance) = intensity_mean_variance(frame, x, y, w, h);
        let edge_density = self.edge_density(frame, x, y, w, h);
        let skin_tone_ratio = skin_tone_ratio(channel_means(frame, x, y, w, h));

        FeatureVector {
            brightness,
            variance,
            edge_density,
            skin_tone_ratio,
        }
    }

    /// Fraction of pixels, excluding the block's last row and column, whose
    /// summed right and down intensity differences exceed the threshold.
    fn edge_density(&self, frame: &Frame, x: usize, y: usize, w: usize, h: usize) -> f64 {
        if w < 2 || h < 2 {
            return 0.0;
        }

        let mut edges = 0usize;
        for row in y..y + h - 1 {
            for col in x..x + w - 1 {
                let here = frame.intensity(col, row);
                let dx = (frame.intensity(col + 1, row) - here).abs();
                let dy = (frame.intensity(col, row + 1) - here).abs();
                if dx + dy > self.settings.edge_threshold {
                    edges += 1;
                }
            }
        }
        edges as f64 / ((w - 1) * (h - 1)) as f64
    }
}

fn skin_tone_ratio([r, g, b]: [f64; 3]) -> f64 {
    let total = r + g + b;
    if total == 0.0 {
        return 0.0;
    }
    (r - g) / total
}
