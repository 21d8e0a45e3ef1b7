pub mod feature_scorer;
pub mod heuristic_classifier;
pub mod onnx_gender_classifier;
