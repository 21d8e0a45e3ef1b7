use std::io::Write;

use crate::classification::domain::classification::Classification;
use crate::presentation::domain::presenter::Presenter;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Prints a per-face text report to any writer.
///
/// ```text
/// Frame 3: 1 face(s) detected
///   Face 1:
///     Position:   (120, 80)
///     Size:       60x60
///     Gender:     Male
///     Confidence: 75.0%
/// ```
pub struct ConsoleReportPresenter<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> ConsoleReportPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Presenter for ConsoleReportPresenter<W> {
    fn present(
        &mut self,
        frame: &Frame,
        regions: &[Region],
        classifications: &[Classification],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let faces: Vec<_> = regions.iter().zip(classifications).collect();

        if faces.is_empty() {
            writeln!(self.out, "Frame {}: No faces detected.", frame.index())?;
            self.out.flush()?;
            return Ok(());
        }

        writeln!(
            self.out,
            "Frame {}: {} face(s) detected",
            frame.index(),
            faces.len()
        )?;
        for (i, (region, class)) in faces.iter().enumerate() {
            writeln!(self.out, "  Face {}:", i + 1)?;
            writeln!(self.out, "    Position:   ({}, {})", region.x, region.y)?;
            writeln!(self.out, "    Size:       {}x{}", region.width, region.height)?;
            writeln!(self.out, "    Gender:     {}", class.gender)?;
            writeln!(
                self.out,
                "    Confidence: {:.1}%",
                class.confidence_percent()
            )?;
        }
        self.out.flush()?;
        Ok(())
    }
}
