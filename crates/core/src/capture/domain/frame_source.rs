use crate::shared::frame::Frame;

/// Supplies one frame per pipeline iteration.
///
/// `capture` blocks until a frame is ready. An empty frame
/// ([`Frame::is_empty`]) means the source has nothing more to give; an
/// error means it failed and should not be polled again.
pub trait FrameSource: Send {
    fn capture(&mut self) -> Result<Frame, Box<dyn std::error::Error>>;

    /// Short human-readable name for log lines.
    fn describe(&self) -> String;
}
