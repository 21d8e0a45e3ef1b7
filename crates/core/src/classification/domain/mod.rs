pub mod classification;
pub mod feature_vector;
pub mod gender_classifier;
