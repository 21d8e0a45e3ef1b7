use crate::classification::domain::classification::Classification;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Shows the analysis of one frame.
///
/// `regions[i]` pairs with `classifications[i]`. Only indices present in
/// both slices are shown; a length mismatch is not an error.
pub trait Presenter: Send {
    fn present(
        &mut self,
        frame: &Frame,
        regions: &[Region],
        classifications: &[Classification],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
