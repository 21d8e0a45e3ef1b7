use std::io::{BufRead, Write};
use std::path::Path;

use crate::capture::domain::frame_source::FrameSource;
use crate::capture::infrastructure::image_file_source::load_frame;
use crate::capture::infrastructure::synthetic_frame_source::SyntheticFrameSource;
use crate::presentation::domain::presenter::Presenter;
use crate::shared::frame::Frame;

use super::analyze_frame_use_case::AnalyzeFrameUseCase;

const MENU: &str = "\n=== Gender Scan ===\n\
1. Capture and analyze frame\n\
2. Load image from file\n\
3. Exit\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Capture,
    LoadFile,
    Exit,
}

impl MenuChoice {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "1" => Some(MenuChoice::Capture),
            "2" => Some(MenuChoice::LoadFile),
            "3" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Numbered text menu over the frame pipeline.
///
/// Failures of a single request (unreadable file, failed analysis) are
/// reported and the menu continues. The first time the frame source fails,
/// the session switches to the synthetic test pattern for the rest of the
/// run.
pub struct MenuSession<R: BufRead, W: Write> {
    use_case: AnalyzeFrameUseCase,
    source: Box<dyn FrameSource>,
    presenter: Box<dyn Presenter>,
    fell_back: bool,
    frames: usize,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> MenuSession<R, W> {
    pub fn new(
        use_case: AnalyzeFrameUseCase,
        source: Box<dyn FrameSource>,
        presenter: Box<dyn Presenter>,
        input: R,
        out: W,
    ) -> Self {
        Self {
            use_case,
            source,
            presenter,
            fell_back: false,
            frames: 0,
            input,
            out,
        }
    }

    /// Runs until the user picks Exit or input ends. Returns the number of
    /// frames analyzed.
    pub fn run(&mut self) -> Result<usize, Box<dyn std::error::Error>> {
        log::info!("Menu session on {}", self.source.describe());

        loop {
            write!(self.out, "{MENU}Choice: ")?;
            self.out.flush()?;

            let Some(line) = self.read_line()? else {
                writeln!(self.out)?;
                break;
            };

            match MenuChoice::parse(&line) {
                Some(MenuChoice::Capture) => self.capture_and_analyze()?,
                Some(MenuChoice::LoadFile) => self.load_and_analyze()?,
                Some(MenuChoice::Exit) => break,
                None => writeln!(self.out, "Invalid choice: '{}'", line.trim())?,
            }
        }

        writeln!(self.out, "Goodbye.")?;
        self.use_case.finish();
        Ok(self.frames)
    }

    fn capture_and_analyze(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let frame = match self.use_case.capture(&mut *self.source) {
            Some(frame) => Some(frame),
            None if !self.fell_back => {
                self.fell_back = true;
                log::warn!(
                    "{} unavailable, switching to synthetic test pattern",
                    self.source.describe()
                );
                writeln!(
                    self.out,
                    "Frame source unavailable; using synthetic test pattern."
                )?;
                self.source = Box::new(SyntheticFrameSource::default());
                self.use_case.capture(&mut *self.source)
            }
            None => None,
        };

        match frame {
            Some(frame) => self.analyze(frame.with_index(self.frames)),
            None => {
                writeln!(self.out, "No frame captured.")?;
                Ok(())
            }
        }
    }

    fn load_and_analyze(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        write!(self.out, "Image path: ")?;
        self.out.flush()?;

        let Some(line) = self.read_line()? else {
            writeln!(self.out)?;
            return Ok(());
        };
        let path = line.trim();
        if path.is_empty() {
            writeln!(self.out, "No path given.")?;
            return Ok(());
        }

        match load_frame(Path::new(path), self.frames) {
            Ok(frame) => self.analyze(frame),
            Err(e) => {
                log::warn!("Load from file failed: {e}");
                writeln!(self.out, "Could not load image: {e}")?;
                Ok(())
            }
        }
    }

    fn analyze(&mut self, frame: Frame) -> Result<(), Box<dyn std::error::Error>> {
        match self.use_case.process(&frame, &mut *self.presenter) {
            Ok(_) => self.frames += 1,
            Err(e) => {
                log::warn!("Analysis of frame {} failed: {e}", frame.index());
                writeln!(self.out, "Analysis failed: {e}")?;
            }
        }
        Ok(())
    }

    /// `None` at end of input.
    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::domain::classification::{Classification, Gender};
    use crate::classification::domain::gender_classifier::GenderClassifier;
    use crate::detection::domain::face_locator::FaceLocator;
    use crate::pipeline::gender_analyzer::GenderAnalyzer;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::region::Region;
    use rstest::rstest;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubLocator;

    impl FaceLocator for StubLocator {
        fn locate(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            Ok(vec![Region::new(
                0,
                0,
                frame.width() as i32,
                frame.height() as i32,
                1.0,
            )])
        }
    }

    struct StubClassifier;

    impl GenderClassifier for StubClassifier {
        fn classify(
            &mut self,
            _frame: &Frame,
            _region: &Region,
        ) -> Result<Classification, Box<dyn std::error::Error>> {
            Ok(Classification::new(Gender::Male, 0.6))
        }
    }

    struct FailingSource;

    impl FrameSource for FailingSource {
        fn capture(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
            Err("no camera".into())
        }

        fn describe(&self) -> String {
            "failing".into()
        }
    }

    struct FixedSource;

    impl FrameSource for FixedSource {
        fn capture(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
            Ok(Frame::filled(30, 20, [0, 0, 0], 99))
        }

        fn describe(&self) -> String {
            "fixed".into()
        }
    }

    /// Records `(frame index, width, faces)` per call.
    #[derive(Default)]
    struct RecordingPresenter {
        calls: Arc<Mutex<Vec<(usize, u32, usize)>>>,
    }

    impl Presenter for RecordingPresenter {
        fn present(
            &mut self,
            frame: &Frame,
            regions: &[Region],
            _classifications: &[Classification],
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.calls
                .lock()
                .unwrap()
                .push((frame.index(), frame.width(), regions.len()));
            Ok(())
        }
    }

    // --- Helpers ---

    type Calls = Arc<Mutex<Vec<(usize, u32, usize)>>>;

    fn session(
        source: Box<dyn FrameSource>,
        keys: &str,
    ) -> (MenuSession<Cursor<Vec<u8>>, Vec<u8>>, Calls) {
        let presenter = RecordingPresenter::default();
        let calls = presenter.calls.clone();
        let analyzer = GenderAnalyzer::new(Box::new(StubLocator), Box::new(StubClassifier));
        let session = MenuSession::new(
            AnalyzeFrameUseCase::new(analyzer, Box::new(NullPipelineLogger)),
            source,
            Box::new(presenter),
            Cursor::new(keys.as_bytes().to_vec()),
            Vec::new(),
        );
        (session, calls)
    }

    fn output(session: MenuSession<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(session.into_output()).unwrap()
    }

    // --- Tests ---

    #[rstest]
    #[case("1\n", Some(MenuChoice::Capture))]
    #[case(" 2 ", Some(MenuChoice::LoadFile))]
    #[case("3", Some(MenuChoice::Exit))]
    #[case("4", None)]
    #[case("", None)]
    #[case("exit", None)]
    fn test_choice_parsing(#[case] line: &str, #[case] choice: Option<MenuChoice>) {
        assert_eq!(MenuChoice::parse(line), choice);
    }

    #[test]
    fn test_capture_then_exit() {
        let (mut session, calls) = session(Box::new(FixedSource), "1\n1\n3\n");
        assert_eq!(session.run().unwrap(), 2);
        // Frames are numbered by the session, not the source
        assert_eq!(calls.lock().unwrap().as_slice(), [(0, 30, 1), (1, 30, 1)]);

        let out = output(session);
        assert!(out.contains("1. Capture and analyze frame"));
        assert!(out.contains("2. Load image from file"));
        assert!(out.contains("3. Exit"));
        assert!(out.ends_with("Goodbye.\n"));
    }

    #[test]
    fn test_invalid_choice_is_reported_and_menu_continues() {
        let (mut session, calls) = session(Box::new(FixedSource), "9\n1\n3\n");
        assert_eq!(session.run().unwrap(), 1);
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(output(session).contains("Invalid choice: '9'"));
    }

    #[test]
    fn test_eof_exits() {
        let (mut session, calls) = session(Box::new(FixedSource), "");
        assert_eq!(session.run().unwrap(), 0);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failing_source_falls_back_to_synthetic_once() {
        let (mut session, calls) = session(Box::new(FailingSource), "1\n1\n3\n");
        assert_eq!(session.run().unwrap(), 2);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, 640);
        drop(calls);

        let out = output(session);
        assert_eq!(out.matches("using synthetic test pattern").count(), 1);
    }

    #[test]
    fn test_load_from_file_analyzes_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        image::RgbImage::from_pixel(48, 36, image::Rgb([200, 120, 90]))
            .save(&path)
            .unwrap();

        let keys = format!("2\n{}\n3\n", path.display());
        let (mut session, calls) = session(Box::new(FixedSource), &keys);
        assert_eq!(session.run().unwrap(), 1);
        assert_eq!(calls.lock().unwrap().as_slice(), [(0, 48, 1)]);
    }

    #[test]
    fn test_load_from_bad_path_reports_and_continues() {
        let (mut session, calls) = session(Box::new(FixedSource), "2\n/nonexistent/face.png\n1\n3\n");
        assert_eq!(session.run().unwrap(), 1);
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(output(session).contains("Could not load image"));
    }

    #[test]
    fn test_load_with_empty_path() {
        let (mut session, calls) = session(Box::new(FixedSource), "2\n\n3\n");
        assert_eq!(session.run().unwrap(), 0);
        assert!(calls.lock().unwrap().is_empty());
        assert!(output(session).contains("No path given."));
    }
}
