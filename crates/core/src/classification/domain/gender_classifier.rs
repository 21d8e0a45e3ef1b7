use crate::classification::domain::classification::Classification;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for guessing a gender label for one face region.
///
/// Model-backed implementations hold an inference session, hence `&mut self`.
pub trait GenderClassifier: Send {
    fn classify(
        &mut self,
        frame: &Frame,
        region: &Region,
    ) -> Result<Classification, Box<dyn std::error::Error>>;
}
