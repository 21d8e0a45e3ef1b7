use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("cannot read image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image {path} has zero size")]
    EmptyImage { path: PathBuf },
    #[error("unsupported image extension for {0}")]
    UnsupportedFormat(PathBuf),
    #[error("no input images given")]
    NoInputs,
}
