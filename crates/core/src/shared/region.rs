/// A rectangular face candidate within one frame.
///
/// `confidence` is locator-specific: the skin-pixel fraction for the
/// sliding-window locator, the detector score for model-backed locators.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: f64,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// Width over height. Zero for a degenerate region.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height <= 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    /// Intersects the region with a `frame_w` x `frame_h` frame.
    ///
    /// Returns `(x, y, width, height)` in unsigned pixel units; the size is
    /// zero when the region lies entirely outside.
    pub fn clip_to(&self, frame_w: u32, frame_h: u32) -> (usize, usize, usize, usize) {
        let x1 = self.x.clamp(0, frame_w as i32);
        let y1 = self.y.clamp(0, frame_h as i32);
        let x2 = (self.x.saturating_add(self.width)).clamp(0, frame_w as i32);
        let y2 = (self.y.saturating_add(self.height)).clamp(0, frame_h as i32);
        (
            x1 as usize,
            y1 as usize,
            (x2 - x1).max(0) as usize,
            (y2 - y1).max(0) as usize,
        )
    }

    /// Greedy deduplication: keeps a region only if its IoU with every
    /// previously-kept region is at or below the threshold.
    pub fn deduplicate(regions: &[Region], iou_threshold: f64) -> Vec<Region> {
        if regions.len() <= 1 {
            return regions.to_vec();
        }
        let mut kept: Vec<Region> = Vec::with_capacity(regions.len());
        for r in regions {
            let dominated = kept.iter().any(|k| r.iou(k) > iou_threshold);
            if !dominated {
                kept.push(r.clone());
            }
        }
        kept
    }

    pub fn iou(&self, other: &Region) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.width).min(other.x + other.width);
        let iy2 = (self.y + self.height).min(other.y + other.height);

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.width as f64 * self.height as f64;
        let area_b = other.width as f64 * other.height as f64;
        inter / (area_a + area_b - inter)
    }
}
