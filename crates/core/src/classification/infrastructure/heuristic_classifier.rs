/// Rule-based gender guess from region statistics.
///
/// Adds fixed weights to a base score for each feature above its threshold.
/// The rule has no statistical grounding and is not a model of any real
/// signal; it exists for parity with the hand-written detector it replaces.
use crate::classification::domain::classification::{Classification, Gender};
use crate::classification::domain::feature_vector::FeatureVector;
use crate::classification::domain::gender_classifier::GenderClassifier;
use crate::classification::infrastructure::feature_scorer::FeatureScorer;
use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::shared::settings::ClassifierSettings;

pub struct HeuristicClassifier {
    scorer: FeatureScorer,
    settings: ClassifierSettings,
}

impl HeuristicClassifier {
    pub fn new(scorer: FeatureScorer, settings: ClassifierSettings) -> Self {
        Self { scorer, settings }
    }

    /// Scores a raw feature slice. Anything other than exactly four values
    /// yields the neutral `(Female, 0.5)` result.
    pub fn classify_features(&self, features: &[f64]) -> Classification {
        match FeatureVector::from_slice(features) {
            Some(fv) => self.classify_vector(&fv),
            None => Classification::neutral(),
        }
    }

    pub fn classify_vector(&self, fv: &FeatureVector) -> Classification {
        let s = &self.settings;
        let mut score = s.base_score;
        if fv.brightness > s.brightness_threshold {
            score += s.brightness_weight;
        }
        if fv.variance > s.variance_threshold {
            score += s.variance_weight;
        }
        if fv.edge_density > s.edge_density_threshold {
            score += s.edge_density_weight;
        }
        if fv.skin_tone_ratio > s.skin_tone_threshold {
            score += s.skin_tone_weight;
        }

        let score = if score.is_nan() { 0.5 } else { score.clamp(0.0, 1.0) };
        if score > 0.5 {
            Classification::new(Gender::Male, score)
        } else {
            Classification::new(Gender::Female, 1.0 - score)
        }
    }
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::new(FeatureScorer::default(), ClassifierSettings::default())
    }
}

impl GenderClassifier for HeuristicClassifier {
    fn classify(
        &mut self,
        frame: &Frame,
        region: &Region,
    ) -> Result<Classification, Box<dyn std::error::Error>> {
        let features = self.scorer.score(frame, region);
        log::debug!(
            "Region ({}, {}) {}x{} features: {:?}",
            region.x,
            region.y,
            region.width,
            region.height,
            features.to_array()
        );
        Ok(self.classify_vector(&features))
    }
}
