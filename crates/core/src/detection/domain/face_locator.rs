use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for proposing face regions in a frame.
///
/// Implementations may hold an inference session, hence `&mut self`.
pub trait FaceLocator: Send {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
