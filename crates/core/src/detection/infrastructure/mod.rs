pub mod math;
pub mod model_resolver;
pub mod onnx_face_locator;
pub mod onnx_session;
pub mod skin_window_locator;
