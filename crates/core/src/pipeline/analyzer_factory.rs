use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::classification::infrastructure::feature_scorer::FeatureScorer;
use crate::classification::infrastructure::heuristic_classifier::HeuristicClassifier;
use crate::classification::infrastructure::onnx_gender_classifier::OnnxGenderClassifier;
use crate::detection::infrastructure::onnx_face_locator::OnnxFaceLocator;
use crate::detection::infrastructure::skin_window_locator::SkinWindowLocator;
use crate::shared::settings::AnalyzerSettings;

use super::gender_analyzer::GenderAnalyzer;

/// Which analyzer implementation to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AnalyzerKind {
    /// Skin-window locator plus rule-based classifier. Needs no model files.
    #[default]
    Heuristic,
    /// Face detector and gender network run through ONNX Runtime.
    Onnx,
}

impl FromStr for AnalyzerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heuristic" => Ok(AnalyzerKind::Heuristic),
            "onnx" => Ok(AnalyzerKind::Onnx),
            other => Err(format!(
                "Analyzer must be 'heuristic' or 'onnx', got '{other}'"
            )),
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerKind::Heuristic => write!(f, "heuristic"),
            AnalyzerKind::Onnx => write!(f, "onnx"),
        }
    }
}

/// Resolved model files for the ONNX analyzer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelPaths {
    pub face: PathBuf,
    pub gender: PathBuf,
}

/// Builds the analyzer for `kind`.
///
/// The ONNX analyzer requires `models`; the heuristic one ignores it.
pub fn create_analyzer(
    kind: AnalyzerKind,
    settings: &AnalyzerSettings,
    models: Option<&ModelPaths>,
) -> Result<GenderAnalyzer, Box<dyn std::error::Error>> {
    match kind {
        AnalyzerKind::Heuristic => {
            log::info!("Using heuristic analyzer");
            let locator = SkinWindowLocator::new(settings.locator.clone());
            let classifier = HeuristicClassifier::new(
                FeatureScorer::new(settings.scorer.clone()),
                settings.classifier.clone(),
            );
            Ok(GenderAnalyzer::new(Box::new(locator), Box::new(classifier)))
        }
        AnalyzerKind::Onnx => {
            let models = models.ok_or("The ONNX analyzer needs face and gender model files")?;
            log::info!(
                "Using ONNX analyzer (face: {}, gender: {})",
                models.face.display(),
                models.gender.display()
            );
            let locator =
                OnnxFaceLocator::new(&models.face, settings.onnx.confidence, settings.onnx.nms_iou)?;
            let classifier = OnnxGenderClassifier::new(&models.gender, &settings.onnx)?;
            Ok(GenderAnalyzer::new(Box::new(locator), Box::new(classifier)))
        }
    }
}
