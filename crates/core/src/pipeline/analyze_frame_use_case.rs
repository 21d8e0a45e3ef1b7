use std::time::Instant;

use crate::capture::domain::frame_source::FrameSource;
use crate::presentation::domain::presenter::Presenter;
use crate::shared::frame::Frame;

use super::gender_analyzer::{split_reports, FaceReport, GenderAnalyzer};
use super::pipeline_logger::PipelineLogger;

/// One pass of the frame pipeline: capture, analyze, present.
///
/// Sessions drive this once per iteration. Stage timings and the face count
/// of every processed frame go to the pipeline logger.
pub struct AnalyzeFrameUseCase {
    analyzer: GenderAnalyzer,
    logger: Box<dyn PipelineLogger>,
}

impl AnalyzeFrameUseCase {
    pub fn new(analyzer: GenderAnalyzer, logger: Box<dyn PipelineLogger>) -> Self {
        Self { analyzer, logger }
    }

    /// Pulls the next frame from `source`.
    ///
    /// Returns `None` when the source failed or signalled end of stream with
    /// an empty frame; the failure is logged here.
    pub fn capture(&mut self, source: &mut dyn FrameSource) -> Option<Frame> {
        let start = Instant::now();
        let result = source.capture();
        self.logger.timing("capture", elapsed_ms(start));

        match result {
            Ok(frame) if frame.is_empty() => {
                log::info!("{} has no more frames", source.describe());
                None
            }
            Ok(frame) => Some(frame),
            Err(e) => {
                log::warn!("Capture from {} failed: {e}", source.describe());
                None
            }
        }
    }

    /// Analyzes `frame` and hands the results to `presenter`.
    pub fn process(
        &mut self,
        frame: &Frame,
        presenter: &mut dyn Presenter,
    ) -> Result<Vec<FaceReport>, Box<dyn std::error::Error>> {
        let start = Instant::now();
        let reports = self.analyzer.analyze(frame)?;
        self.logger.timing("analyze", elapsed_ms(start));

        let (regions, classifications) = split_reports(&reports);
        let start = Instant::now();
        presenter.present(frame, &regions, &classifications)?;
        self.logger.timing("present", elapsed_ms(start));

        self.logger.frame_done(frame.index(), reports.len());
        Ok(reports)
    }

    /// Emits the session summary.
    pub fn finish(&self) {
        self.logger.summary();
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::domain::classification::{Classification, Gender};
    use crate::classification::domain::gender_classifier::GenderClassifier;
    use crate::detection::domain::face_locator::FaceLocator;
    use crate::shared::region::Region;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubLocator;

    impl FaceLocator for StubLocator {
        fn locate(&mut self, _frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            Ok(vec![Region::new(5, 5, 20, 20, 0.9)])
        }
    }

    struct StubClassifier;

    impl GenderClassifier for StubClassifier {
        fn classify(
            &mut self,
            _frame: &Frame,
            _region: &Region,
        ) -> Result<Classification, Box<dyn std::error::Error>> {
            Ok(Classification::new(Gender::Male, 0.8))
        }
    }

    struct StubSource {
        frames: Vec<Result<Frame, String>>,
    }

    impl FrameSource for StubSource {
        fn capture(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
            if self.frames.is_empty() {
                return Ok(Frame::empty());
            }
            self.frames.remove(0).map_err(|e| e.into())
        }

        fn describe(&self) -> String {
            "stub".into()
        }
    }

    #[derive(Default)]
    struct RecordingPresenter {
        calls: Arc<Mutex<Vec<(usize, usize, usize)>>>,
    }

    impl Presenter for RecordingPresenter {
        fn present(
            &mut self,
            frame: &Frame,
            regions: &[Region],
            classifications: &[Classification],
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.calls
                .lock()
                .unwrap()
                .push((frame.index(), regions.len(), classifications.len()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl PipelineLogger for RecordingLogger {
        fn frame_done(&mut self, index: usize, faces: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("frame {index} {faces}"));
        }

        fn timing(&mut self, stage: &str, _duration_ms: f64) {
            self.events.lock().unwrap().push(stage.to_string());
        }

        fn metric(&mut self, _name: &str, _value: f64) {}
    }

    // --- Helpers ---

    fn use_case() -> (AnalyzeFrameUseCase, Arc<Mutex<Vec<String>>>) {
        let logger = RecordingLogger::default();
        let events = logger.events.clone();
        let analyzer = GenderAnalyzer::new(Box::new(StubLocator), Box::new(StubClassifier));
        (AnalyzeFrameUseCase::new(analyzer, Box::new(logger)), events)
    }

    // --- Tests ---

    #[test]
    fn test_capture_returns_frame() {
        let (mut uc, events) = use_case();
        let mut source = StubSource {
            frames: vec![Ok(Frame::filled(40, 40, [1, 2, 3], 9))],
        };
        let frame = uc.capture(&mut source).unwrap();
        assert_eq!(frame.index(), 9);
        assert_eq!(events.lock().unwrap().as_slice(), ["capture"]);
    }

    #[test]
    fn test_capture_empty_frame_is_none() {
        let (mut uc, _) = use_case();
        let mut source = StubSource { frames: Vec::new() };
        assert!(uc.capture(&mut source).is_none());
    }

    #[test]
    fn test_capture_failure_is_none() {
        let (mut uc, _) = use_case();
        let mut source = StubSource {
            frames: vec![Err("camera unplugged".into())],
        };
        assert!(uc.capture(&mut source).is_none());
    }

    #[test]
    fn test_process_presents_reports_and_logs_stages() {
        let (mut uc, events) = use_case();
        let mut presenter = RecordingPresenter::default();
        let calls = presenter.calls.clone();

        let frame = Frame::filled(40, 40, [1, 2, 3], 4);
        let reports = uc.process(&frame, &mut presenter).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(calls.lock().unwrap().as_slice(), [(4, 1, 1)]);
        assert_eq!(
            events.lock().unwrap().as_slice(),
            ["analyze", "present", "frame 4 1"]
        );
    }

    #[test]
    fn test_process_empty_frame_presents_nothing_found() {
        let (mut uc, _) = use_case();
        let mut presenter = RecordingPresenter::default();
        let calls = presenter.calls.clone();

        let reports = uc.process(&Frame::empty(), &mut presenter).unwrap();
        assert!(reports.is_empty());
        assert_eq!(calls.lock().unwrap().as_slice(), [(0, 0, 0)]);
    }
}
