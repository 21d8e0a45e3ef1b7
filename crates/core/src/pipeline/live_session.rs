use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::capture::domain::frame_source::FrameSource;
use crate::presentation::infrastructure::overlay_presenter::OverlayPresenter;

use super::analyze_frame_use_case::AnalyzeFrameUseCase;
use super::snapshot_saver::SnapshotSaver;

/// Key read after each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveKey {
    Quit,
    Save,
    Next,
}

impl LiveKey {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "q" => LiveKey::Quit,
            "s" => LiveKey::Save,
            _ => LiveKey::Next,
        }
    }
}

/// What a finished live session did.
#[derive(Debug, Default, PartialEq)]
pub struct LiveSummary {
    pub frames: usize,
    pub saved: Vec<PathBuf>,
}

/// Keyboard-driven loop: capture, analyze, draw the overlay preview, then
/// wait for one line of input.
///
/// `q` quits, `s` saves the annotated frame, anything else moves on. The
/// loop also ends when the source runs dry or input reaches EOF.
pub struct LiveSession<R: BufRead, W: Write> {
    use_case: AnalyzeFrameUseCase,
    source: Box<dyn FrameSource>,
    presenter: OverlayPresenter,
    saver: SnapshotSaver,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> LiveSession<R, W> {
    pub fn new(
        use_case: AnalyzeFrameUseCase,
        source: Box<dyn FrameSource>,
        presenter: OverlayPresenter,
        saver: SnapshotSaver,
        input: R,
        out: W,
    ) -> Self {
        Self {
            use_case,
            source,
            presenter,
            saver,
            input,
            out,
        }
    }

    pub fn run(&mut self) -> Result<LiveSummary, Box<dyn std::error::Error>> {
        let mut summary = LiveSummary::default();
        log::info!("Live session on {}", self.source.describe());
        writeln!(self.out, "Press 's' to save image, 'q' to quit.")?;

        while let Some(frame) = self.use_case.capture(&mut *self.source) {
            let reports = self.use_case.process(&frame, &mut self.presenter)?;
            summary.frames += 1;

            write!(
                self.out,
                "Frame {}: {} face(s) [s=save, q=quit, Enter=next] ",
                frame.index(),
                reports.len()
            )?;
            self.out.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                break;
            }

            match LiveKey::parse(&line) {
                LiveKey::Quit => break,
                LiveKey::Save => {
                    let Some(annotated) = self.presenter.last_annotated() else {
                        continue;
                    };
                    match self.saver.save(annotated) {
                        Ok(path) => {
                            writeln!(self.out, "Saved {}", path.display())?;
                            summary.saved.push(path);
                        }
                        Err(e) => writeln!(self.out, "Could not save snapshot: {e}")?,
                    }
                }
                LiveKey::Next => {}
            }
        }

        self.use_case.finish();
        Ok(summary)
    }

    pub fn into_output(self) -> W {
        self.out
    }
}
