use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

/// Side of the square "face" patch in the test pattern.
const FACE_SIZE: u32 = 160;

/// Horizontal drift of the face patch per frame, in pixels.
const DRIFT_PER_FRAME: u32 = 8;

const SKIN_BASE: [u8; 3] = [190, 130, 100];
const FEATURE_DARK: [u8; 3] = [70, 45, 40];

/// Deterministic test pattern standing in for a camera.
///
/// A cool blue gradient background (never skin-coloured) carries a textured
/// skin-toned square with darker eye and mouth patches. The square drifts
/// horizontally from frame to frame. Never runs out of frames.
pub struct SyntheticFrameSource {
    width: u32,
    height: u32,
    frame_count: usize,
}

impl SyntheticFrameSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_count: 0,
        }
    }

    /// Top-left corner of the face patch in frame `index`.
    pub fn face_origin(&self, index: usize) -> (u32, u32) {
        let span = self.width.saturating_sub(FACE_SIZE).max(1);
        let x = (index as u32).wrapping_mul(DRIFT_PER_FRAME) % span;
        let y = self.height.saturating_sub(FACE_SIZE) / 2;
        (x, y)
    }

    pub fn render(&self, index: usize) -> Frame {
        let (fx, fy) = self.face_origin(index);
        let mut data = Vec::with_capacity((self.width * self.height * 3) as usize);

        for y in 0..self.height {
            for x in 0..self.width {
                let px = if x >= fx && x < fx + FACE_SIZE && y >= fy && y < fy + FACE_SIZE {
                    face_pixel(x - fx, y - fy)
                } else {
                    background_pixel(x, y, self.width, self.height)
                };
                data.extend_from_slice(&px);
            }
        }
        Frame::new(data, self.width, self.height, 3, index)
    }
}

impl Default for SyntheticFrameSource {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl FrameSource for SyntheticFrameSource {
    fn capture(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        let frame = self.render(self.frame_count);
        self.frame_count += 1;
        Ok(frame)
    }

    fn describe(&self) -> String {
        format!("synthetic {}x{} test pattern", self.width, self.height)
    }
}

fn background_pixel(x: u32, y: u32, w: u32, h: u32) -> [u8; 3] {
    let gx = (x * 60 / w.max(1)) as u8;
    let gy = (y * 60 / h.max(1)) as u8;
    [30 + gy / 2, 60 + gx, 140 + gy]
}

/// Face patch pixel at patch-local `(u, v)`.
fn face_pixel(u: u32, v: u32) -> [u8; 3] {
    let s = FACE_SIZE;
    let in_eye = v >= s * 3 / 10
        && v < s * 4 / 10
        && ((u >= s / 5 && u < s * 2 / 5) || (u >= s * 3 / 5 && u < s * 4 / 5));
    let in_mouth = v >= s * 7 / 10 && v < s * 4 / 5 && u >= s * 3 / 10 && u < s * 7 / 10;
    if in_eye || in_mouth {
        return FEATURE_DARK;
    }
    let n = ((u * 7 + v * 13) % 48) as u8;
    SKIN_BASE.map(|c| c.saturating_add(n))
}
