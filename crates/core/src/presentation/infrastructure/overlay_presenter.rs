use std::path::PathBuf;

use crate::capture::domain::image_writer::ImageWriter;
use crate::classification::domain::classification::{Classification, Gender};
use crate::presentation::domain::presenter::Presenter;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

pub const BOX_COLOR: [u8; 3] = [0, 255, 0];
pub const MALE_TAG_COLOR: [u8; 3] = [255, 0, 255];
pub const FEMALE_TAG_COLOR: [u8; 3] = [255, 160, 0];
const TEXT_COLOR: [u8; 3] = [255, 255, 255];

const BOX_THICKNESS: usize = 2;
const GLYPH_SCALE: usize = 2;
const TAG_PADDING: usize = 2;
const TAG_HEIGHT: usize = GLYPH_ROWS * GLYPH_SCALE + 2 * TAG_PADDING;

const GLYPH_ROWS: usize = 7;
const GLYPH_COLS: usize = 5;

/// 5x7 bitmaps, one `u8` per row, high bit of the low five is the left column.
const GLYPH_M: [u8; GLYPH_ROWS] = [
    0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001,
];
const GLYPH_F: [u8; GLYPH_ROWS] = [
    0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000,
];

/// Draws boxes and gender tags onto a copy of the frame and writes it to the
/// preview path.
///
/// The last annotated frame is kept so a session can save it on request.
pub struct OverlayPresenter {
    writer: Box<dyn ImageWriter>,
    preview_path: PathBuf,
    last: Option<Frame>,
}

impl OverlayPresenter {
    pub fn new(writer: Box<dyn ImageWriter>, preview_path: PathBuf) -> Self {
        Self {
            writer,
            preview_path,
            last: None,
        }
    }

    pub fn last_annotated(&self) -> Option<&Frame> {
        self.last.as_ref()
    }
}

impl Presenter for OverlayPresenter {
    fn present(
        &mut self,
        frame: &Frame,
        regions: &[Region],
        classifications: &[Classification],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let annotated = annotate(frame, regions, classifications);
        self.writer.write(&self.preview_path, &annotated)?;
        log::debug!(
            "Preview of frame {} written to {}",
            frame.index(),
            self.preview_path.display()
        );
        self.last = Some(annotated);
        Ok(())
    }
}

pub fn tag_color(gender: Gender) -> [u8; 3] {
    match gender {
        Gender::Male => MALE_TAG_COLOR,
        Gender::Female => FEMALE_TAG_COLOR,
    }
}

/// Returns a copy of `frame` with one box and tag per paired face.
pub fn annotate(frame: &Frame, regions: &[Region], classifications: &[Classification]) -> Frame {
    let mut out = frame.clone();
    if out.is_empty() {
        return out;
    }
    for (region, class) in regions.iter().zip(classifications) {
        let (x, y, w, h) = region.clip_to(out.width(), out.height());
        if w == 0 || h == 0 {
            continue;
        }
        draw_box(&mut out, x, y, w, h);
        draw_tag(&mut out, x, y, class.gender);
    }
    out
}

fn draw_box(frame: &mut Frame, x: usize, y: usize, w: usize, h: usize) {
    let t = BOX_THICKNESS.min(w).min(h);
    fill_rect(frame, x, y, w, t, BOX_COLOR);
    fill_rect(frame, x, y + h - t, w, t, BOX_COLOR);
    fill_rect(frame, x, y, t, h, BOX_COLOR);
    fill_rect(frame, x + w - t, y, t, h, BOX_COLOR);
}

/// Filled tag just above the box (inside it when there is no room above).
fn draw_tag(frame: &mut Frame, box_x: usize, box_y: usize, gender: Gender) {
    let glyph = match gender {
        Gender::Male => &GLYPH_M,
        Gender::Female => &GLYPH_F,
    };
    let tag_w = GLYPH_COLS * GLYPH_SCALE + 2 * TAG_PADDING;
    let tag_y = box_y.checked_sub(TAG_HEIGHT).unwrap_or(box_y);

    fill_rect(frame, box_x, tag_y, tag_w, TAG_HEIGHT, tag_color(gender));

    for (row, &bits) in glyph.iter().enumerate() {
        for col in 0..GLYPH_COLS {
            if bits & (1u8 << (GLYPH_COLS - 1 - col)) == 0 {
                continue;
            }
            fill_rect(
                frame,
                box_x + TAG_PADDING + col * GLYPH_SCALE,
                tag_y + TAG_PADDING + row * GLYPH_SCALE,
                GLYPH_SCALE,
                GLYPH_SCALE,
                TEXT_COLOR,
            );
        }
    }
}

/// Fills a rectangle, silently cropping whatever falls outside the frame.
fn fill_rect(frame: &mut Frame, x: usize, y: usize, w: usize, h: usize, rgb: [u8; 3]) {
    let fw = frame.width() as usize;
    let fh = frame.height() as usize;
    let channels = frame.channels() as usize;
    let x_end = (x + w).min(fw);
    let y_end = (y + h).min(fh);
    let data = frame.data_mut();

    for py in y.min(fh)..y_end {
        for px in x.min(fw)..x_end {
            let offset = (py * fw + px) * channels;
            data[offset..offset + 3].copy_from_slice(&rgb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    const GRAY: [u8; 3] = [128, 128, 128];

    struct StubImageWriter {
        written: Arc<Mutex<Vec<(PathBuf, Frame)>>>,
    }

    impl ImageWriter for StubImageWriter {
        fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), frame.clone()));
            Ok(())
        }
    }

    struct FailingImageWriter;

    impl ImageWriter for FailingImageWriter {
        fn write(&self, _path: &Path, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            Err("disk full".into())
        }
    }

    #[test]
    fn test_box_outline_is_green_and_interior_untouched() {
        let frame = Frame::filled(200, 200, GRAY, 0);
        let out = annotate(
            &frame,
            &[Region::new(50, 60, 80, 80, 0.9)],
            &[Classification::new(Gender::Male, 0.9)],
        );
        assert_eq!(out.rgb(50, 100), BOX_COLOR);
        assert_eq!(out.rgb(51, 100), BOX_COLOR);
        assert_eq!(out.rgb(129, 100), BOX_COLOR);
        assert_eq!(out.rgb(90, 139), BOX_COLOR);
        assert_eq!(out.rgb(90, 100), GRAY);
        assert_eq!(out.rgb(52, 100), GRAY);
    }

    #[test]
    fn test_tag_sits_above_box_in_gender_color() {
        let frame = Frame::filled(200, 200, GRAY, 0);
        let out = annotate(
            &frame,
            &[
                Region::new(20, 60, 60, 60, 0.9),
                Region::new(120, 60, 60, 60, 0.9),
            ],
            &[
                Classification::new(Gender::Male, 0.9),
                Classification::new(Gender::Female, 0.9),
            ],
        );
        // Padding corner of each tag
        assert_eq!(out.rgb(20, 60 - TAG_HEIGHT), MALE_TAG_COLOR);
        assert_eq!(out.rgb(120, 60 - TAG_HEIGHT), FEMALE_TAG_COLOR);
        assert_ne!(MALE_TAG_COLOR, FEMALE_TAG_COLOR);
    }

    #[test]
    fn test_tag_moves_inside_box_at_top_edge() {
        let frame = Frame::filled(100, 100, GRAY, 0);
        let out = annotate(
            &frame,
            &[Region::new(10, 0, 60, 60, 0.9)],
            &[Classification::new(Gender::Female, 0.7)],
        );
        assert_eq!(out.rgb(10, 1), FEMALE_TAG_COLOR);
    }

    #[test]
    fn test_input_frame_is_not_modified() {
        let frame = Frame::filled(100, 100, GRAY, 0);
        let _ = annotate(
            &frame,
            &[Region::new(10, 20, 40, 40, 0.9)],
            &[Classification::neutral()],
        );
        assert_eq!(frame.rgb(10, 20), GRAY);
    }

    #[test]
    fn test_region_past_the_edge_is_cropped() {
        let frame = Frame::filled(100, 100, GRAY, 0);
        let out = annotate(
            &frame,
            &[Region::new(80, 80, 60, 60, 0.9)],
            &[Classification::neutral()],
        );
        assert_eq!(out.rgb(80, 90), BOX_COLOR);
        assert_eq!((out.width(), out.height()), (100, 100));
    }

    #[test]
    fn test_mismatched_lengths_draw_shorter_list() {
        let frame = Frame::filled(200, 100, GRAY, 0);
        let out = annotate(
            &frame,
            &[
                Region::new(10, 30, 50, 50, 0.9),
                Region::new(120, 30, 50, 50, 0.9),
            ],
            &[Classification::neutral()],
        );
        assert_eq!(out.rgb(10, 50), BOX_COLOR);
        assert_eq!(out.rgb(120, 50), GRAY);
    }

    #[test]
    fn test_present_writes_preview_and_keeps_last_frame() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let mut presenter = OverlayPresenter::new(
            Box::new(StubImageWriter {
                written: written.clone(),
            }),
            PathBuf::from("preview.png"),
        );
        assert!(presenter.last_annotated().is_none());

        let frame = Frame::filled(100, 100, GRAY, 7);
        presenter
            .present(
                &frame,
                &[Region::new(20, 30, 40, 40, 0.9)],
                &[Classification::new(Gender::Male, 0.8)],
            )
            .unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, PathBuf::from("preview.png"));
        let last = presenter.last_annotated().unwrap();
        assert_eq!(last, &written[0].1);
        assert_eq!(last.index(), 7);
        assert_eq!(last.rgb(20, 50), BOX_COLOR);
    }

    #[test]
    fn test_present_propagates_writer_error() {
        let mut presenter =
            OverlayPresenter::new(Box::new(FailingImageWriter), PathBuf::from("p.png"));
        let frame = Frame::filled(10, 10, GRAY, 0);
        assert!(presenter.present(&frame, &[], &[]).is_err());
        assert!(presenter.last_annotated().is_none());
    }
}
