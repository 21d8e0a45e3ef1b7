/// Number of scalar features per region.
pub const FEATURE_COUNT: usize = 4;

/// Visual statistics of one face region, in fixed order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    /// Mean of `(R + G + B) / 3`.
    pub brightness: f64,
    /// Population variance of the same per-pixel intensity.
    pub variance: f64,
    /// Fraction of interior pixels on an edge.
    pub edge_density: f64,
    /// `(meanR - meanG) / (meanR + meanG + meanB)`.
    pub skin_tone_ratio: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.brightness,
            self.variance,
            self.edge_density,
            self.skin_tone_ratio,
        ]
    }

    /// Accepts only slices of exactly [`FEATURE_COUNT`] values.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match *values {
            [brightness, variance, edge_density, skin_tone_ratio] => Some(Self {
                brightness,
                variance,
                edge_density,
                skin_tone_ratio,
            }),
            _ => None,
        }
    }
}
