use std::path::{Path, PathBuf};

use crate::capture::domain::image_writer::ImageWriter;
use crate::shared::constants::{SNAPSHOT_EXTENSION, SNAPSHOT_PREFIX};
use crate::shared::frame::Frame;

/// Saves frames as `captured_0.jpg`, `captured_1.jpg`, ... in one directory.
///
/// The counter advances only when a write succeeds, so a failed save does
/// not leave a gap in the numbering.
pub struct SnapshotSaver {
    writer: Box<dyn ImageWriter>,
    dir: PathBuf,
    next: usize,
}

impl SnapshotSaver {
    pub fn new(writer: Box<dyn ImageWriter>, dir: PathBuf) -> Self {
        Self {
            writer,
            dir,
            next: 0,
        }
    }

    pub fn next_path(&self) -> PathBuf {
        snapshot_path(&self.dir, self.next)
    }

    pub fn saved(&self) -> usize {
        self.next
    }

    pub fn save(&mut self, frame: &Frame) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = self.next_path();
        self.writer.write(&path, frame)?;
        self.next += 1;
        log::info!("Saved snapshot {}", path.display());
        Ok(path)
    }
}

pub fn snapshot_path(dir: &Path, n: usize) -> PathBuf {
    dir.join(format!("{SNAPSHOT_PREFIX}{n}.{SNAPSHOT_EXTENSION}"))
}
