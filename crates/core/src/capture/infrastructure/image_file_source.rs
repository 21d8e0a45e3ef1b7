use std::path::{Path, PathBuf};

use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::frame_source::FrameSource;
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

/// Serves a list of image files as consecutive frames.
///
/// Each `capture` decodes the next file. Once the list is exhausted the
/// source returns the empty sentinel frame, unless it loops, in which case
/// it starts over like a camera pointed at a fixed scene.
pub struct ImageFileSource {
    paths: Vec<PathBuf>,
    next: usize,
    frames_served: usize,
    looping: bool,
}

impl ImageFileSource {
    pub fn new(paths: Vec<PathBuf>, looping: bool) -> Result<Self, CaptureError> {
        if paths.is_empty() {
            return Err(CaptureError::NoInputs);
        }
        Ok(Self {
            paths,
            next: 0,
            frames_served: 0,
            looping,
        })
    }
}

impl FrameSource for ImageFileSource {
    fn capture(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        if self.next >= self.paths.len() {
            if !self.looping {
                return Ok(Frame::empty());
            }
            self.next = 0;
        }
        let path = &self.paths[self.next];
        let frame = load_frame(path, self.frames_served)?;
        log::debug!(
            "Captured {} ({}x{})",
            path.display(),
            frame.width(),
            frame.height()
        );
        self.next += 1;
        self.frames_served += 1;
        Ok(frame)
    }

    fn describe(&self) -> String {
        match self.paths.as_slice() {
            [single] => format!("image {}", single.display()),
            many => format!("{} images", many.len()),
        }
    }
}

/// Decodes one image file into an RGB frame with the given index.
pub fn load_frame(path: &Path, index: usize) -> Result<Frame, CaptureError> {
    if !is_image(path) {
        return Err(CaptureError::UnsupportedFormat(path.to_path_buf()));
    }
    let img = image::open(path)
        .map_err(|e| CaptureError::Decode {
            path: path.to_path_buf(),
            source: e,
        })?
        .to_rgb8();
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(CaptureError::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    Ok(Frame::new(img.into_raw(), width, height, 3, index))
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
