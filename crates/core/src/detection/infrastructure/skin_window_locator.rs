use crate::detection::domain::face_locator::FaceLocator;
use crate::detection::domain::skin_rule::is_skin;
use crate::shared::frame::Frame;
use crate::shared::pixel_statistics::intensity_mean_variance;
use crate::shared::region::Region;
use crate::shared::settings::LocatorSettings;

/// Sliding-window face locator driven by skin-pixel density.
///
/// A square window walks the frame at a fixed stride; windows whose skin
/// fraction clears the threshold become candidates, then candidates with an
/// implausible aspect ratio or near-uniform texture are dropped. Windows are
/// only placed where they fit entirely inside the frame.
pub struct SkinWindowLocator {
    settings: LocatorSettings,
}

impl SkinWindowLocator {
    pub fn new(settings: LocatorSettings) -> Self {
        Self { settings }
    }

    fn propose(&self, frame: &Frame) -> Vec<Region> {
        let fw = frame.width() as usize;
        let fh = frame.height() as usize;
        let win = self.settings.window_size as usize;
        let step = self.settings.step.max(1) as usize;
        if win == 0 || fw < win || fh < win {
            return Vec::new();
        }

        let mask: Vec<bool> = (0..fh)
            .flat_map(|y| (0..fw).map(move |x| (x, y)))
            .map(|(x, y)| is_skin(frame.rgb(x, y)))
            .collect();
        let window_pixels = (win * win) as f64;

        let mut candidates = Vec::new();
        for y in (0..=fh - win).step_by(step) {
            for x in (0..=fw - win).step_by(step) {
                let skin = (y..y + win)
                    .map(|row| {
                        mask[row * fw + x..row * fw + x + win]
                            .iter()
                            .filter(|&&s| s)
                            .count()
                    })
                    .sum::<usize>();
                let fraction = skin as f64 / window_pixels;
                if fraction > self.settings.min_skin_fraction {
                    candidates.push(Region::new(
                        x as i32,
                        y as i32,
                        win as i32,
                        win as i32,
                        fraction,
                    ));
                }
            }
        }
        candidates
    }

    fn is_plausible(&self, frame: &Frame, region: &Region) -> bool {
        let ratio = region.aspect_ratio();
        if ratio < self.settings.min_aspect_ratio || ratio > self.settings.max_aspect_ratio {
            return false;
        }
        let (x, y, w, h) = region.clip_to(frame.width(), frame.height());
        let (_, variance) = intensity_mean_variance(frame, x, y, w, h);
        variance > self.settings.min_variance
    }
}

impl Default for SkinWindowLocator {
    fn default() -> Self {
        Self::new(LocatorSettings::default())
    }
}

impl FaceLocator for SkinWindowLocator {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let proposed = self.propose(frame);
        let proposed_count = proposed.len();

        let mut regions: Vec<Region> = proposed
            .into_iter()
            .filter(|r| self.is_plausible(frame, r))
            .collect();

        if let Some(iou) = self.settings.dedupe_iou {
            regions = Region::deduplicate(&regions, iou);
        }

        log::debug!(
            "Skin windows: {proposed_count} proposed, {} kept",
            regions.len()
        );
        Ok(regions)
    }
}
