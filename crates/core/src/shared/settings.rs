use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Sliding-window skin locator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorSettings {
    pub window_size: u32,
    pub step: u32,
    /// Window is a candidate when its skin fraction is strictly above this.
    pub min_skin_fraction: f64,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    /// Candidates with intensity variance at or below this are dropped.
    pub min_variance: f64,
    /// IoU above which overlapping candidates are merged. `None` keeps
    /// every accepted window.
    pub dedupe_iou: Option<f64>,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            window_size: 60,
            step: 10,
            min_skin_fraction: 0.3,
            min_aspect_ratio: 0.7,
            max_aspect_ratio: 1.3,
            min_variance: 100.0,
            dedupe_iou: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerSettings {
    /// Minimum summed neighbour difference for a pixel to count as an edge.
    pub edge_threshold: f64,
}

impl Default for ScorerSettings {
    fn default() -> Self {
        Self {
            edge_threshold: 30.0,
        }
    }
}

/// Additive scoring rule for the heuristic classifier.
///
/// These thresholds and weights are folk heuristics with no validation
/// behind them. They are kept as-is for behavioural parity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub base_score: f64,
    pub brightness_threshold: f64,
    pub brightness_weight: f64,
    pub variance_threshold: f64,
    pub variance_weight: f64,
    pub edge_density_threshold: f64,
    pub edge_density_weight: f64,
    pub skin_tone_threshold: f64,
    pub skin_tone_weight: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            base_score: 0.5,
            brightness_threshold: 120.0,
            brightness_weight: 0.1,
            variance_threshold: 200.0,
            variance_weight: 0.15,
            edge_density_threshold: 0.3,
            edge_density_weight: 0.2,
            skin_tone_threshold: 0.1,
            skin_tone_weight: 0.1,
        }
    }
}

/// Parameters of the model-backed analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnnxSettings {
    /// Minimum detector score for a face box.
    pub confidence: f64,
    pub nms_iou: f64,
    pub gender_labels: Vec<String>,
    pub gender_mean_bgr: [f32; 3],
    pub gender_input_size: u32,
}

impl Default for OnnxSettings {
    fn default() -> Self {
        use super::constants::{GENDER_LABELS, GENDER_MODEL_INPUT_SIZE, GENDER_MODEL_MEAN_BGR};
        Self {
            confidence: 0.5,
            nms_iou: 0.45,
            gender_labels: GENDER_LABELS.iter().map(|s| s.to_string()).collect(),
            gender_mean_bgr: GENDER_MODEL_MEAN_BGR,
            gender_input_size: GENDER_MODEL_INPUT_SIZE,
        }
    }
}

/// Everything the analyzers need, passed in at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub locator: LocatorSettings,
    pub scorer: ScorerSettings,
    pub classifier: ClassifierSettings,
    pub onnx: OnnxSettings,
}

impl AnalyzerSettings {
    /// Reads settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Uses `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.locator.window_size == 0 {
            return Err(SettingsError::Invalid {
                field: "locator.window_size",
                reason: "must be positive".into(),
            });
        }
        if self.locator.step == 0 {
            return Err(SettingsError::Invalid {
                field: "locator.step",
                reason: "must be positive".into(),
            });
        }
        if self.locator.min_aspect_ratio > self.locator.max_aspect_ratio {
            return Err(SettingsError::Invalid {
                field: "locator.min_aspect_ratio",
                reason: format!(
                    "{} exceeds max_aspect_ratio {}",
                    self.locator.min_aspect_ratio, self.locator.max_aspect_ratio
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.onnx.confidence) {
            return Err(SettingsError::Invalid {
                field: "onnx.confidence",
                reason: format!("must be between 0.0 and 1.0, got {}", self.onnx.confidence),
            });
        }
        if self.onnx.gender_labels.is_empty() {
            return Err(SettingsError::Invalid {
                field: "onnx.gender_labels",
                reason: "must not be empty".into(),
            });
        }
        if self.onnx.gender_input_size == 0 {
            return Err(SettingsError::Invalid {
                field: "onnx.gender_input_size",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}
