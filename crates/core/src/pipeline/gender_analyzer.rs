use crate::classification::domain::classification::Classification;
use crate::classification::domain::gender_classifier::GenderClassifier;
use crate::detection::domain::face_locator::FaceLocator;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// One located face and the guess made about it.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceReport {
    pub region: Region,
    pub classification: Classification,
}

/// Locates faces in a frame and classifies each one.
pub struct GenderAnalyzer {
    locator: Box<dyn FaceLocator>,
    classifier: Box<dyn GenderClassifier>,
}

impl GenderAnalyzer {
    pub fn new(locator: Box<dyn FaceLocator>, classifier: Box<dyn GenderClassifier>) -> Self {
        Self {
            locator,
            classifier,
        }
    }

    /// Returns one report per located face, in locator order.
    /// An empty frame yields no reports.
    pub fn analyze(&mut self, frame: &Frame) -> Result<Vec<FaceReport>, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }

        let regions = self.locator.locate(frame)?;
        log::debug!("Frame {}: {} candidate(s)", frame.index(), regions.len());

        regions
            .into_iter()
            .map(|region| {
                let classification = self.classifier.classify(frame, &region)?;
                Ok(FaceReport {
                    region,
                    classification,
                })
            })
            .collect()
    }
}

/// Splits reports into the parallel lists a presenter takes.
pub fn split_reports(reports: &[FaceReport]) -> (Vec<Region>, Vec<Classification>) {
    reports
        .iter()
        .map(|r| (r.region.clone(), r.classification))
        .unzip()
}
