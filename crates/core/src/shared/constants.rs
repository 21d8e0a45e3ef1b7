pub const FACE_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Caffe `gender_net` converted to ONNX. No canonical download location,
/// so it must be supplied locally or placed in the model cache.
pub const GENDER_MODEL_NAME: &str = "gender_net.onnx";

/// Output order of the gender network.
pub const GENDER_LABELS: [&str; 2] = ["Male", "Female"];

/// Per-channel means (B, G, R) the gender network was trained with.
pub const GENDER_MODEL_MEAN_BGR: [f32; 3] = [78.4263, 87.7689, 114.8958];

pub const GENDER_MODEL_INPUT_SIZE: u32 = 227;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Snapshot file names are `captured_<n>.jpg`.
pub const SNAPSHOT_PREFIX: &str = "captured_";
pub const SNAPSHOT_EXTENSION: &str = "jpg";

pub const DEFAULT_PREVIEW_PATH: &str = "preview.png";
