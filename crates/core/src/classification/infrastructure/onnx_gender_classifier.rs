/// Gender classifier backed by the `gender_net` CNN via ONNX Runtime.
///
/// The network expects a 227x227 BGR blob with per-channel mean subtraction
/// and no scaling, and outputs one probability per label.
use std::path::Path;

use crate::classification::domain::classification::{Classification, Gender};
use crate::classification::domain::gender_classifier::GenderClassifier;
use crate::detection::infrastructure::onnx_session::load_session;
use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::shared::settings::OnnxSettings;

pub struct OnnxGenderClassifier {
    session: ort::session::Session,
    labels: Vec<Gender>,
    mean_bgr: [f32; 3],
    input_size: u32,
}

impl OnnxGenderClassifier {
    pub fn new(model_path: &Path, settings: &OnnxSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let labels = settings
            .gender_labels
            .iter()
            .map(|l| Gender::from_label(l).ok_or_else(|| format!("Unknown gender label '{l}'")))
            .collect::<Result<Vec<_>, _>>()?;

        let session = load_session(model_path)?;
        log::info!("Loaded gender model from {}", model_path.display());

        Ok(Self {
            session,
            labels,
            mean_bgr: settings.gender_mean_bgr,
            input_size: settings.gender_input_size,
        })
    }
}

impl GenderClassifier for OnnxGenderClassifier {
    fn classify(
        &mut self,
        frame: &Frame,
        region: &Region,
    ) -> Result<Classification, Box<dyn std::error::Error>> {
        let crop = crop_rgb(frame, region).ok_or("Face region is empty")?;
        let blob = bgr_blob(&crop, self.input_size, self.mean_bgr);

        let input_value = ort::value::Tensor::from_array(blob)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("Gender model produced no outputs".into());
        }
        let probs = outputs[0].try_extract_array::<f32>()?;
        let probs = probs.as_slice().ok_or("Cannot get probability slice")?;

        let (class_id, confidence) =
            arg_max(&probs[..probs.len().min(self.labels.len())]).ok_or("Empty model output")?;
        Ok(Classification::new(self.labels[class_id], confidence as f64))
    }
}

/// Copies the clipped region out of the frame as an RGB image.
fn crop_rgb(frame: &Frame, region: &Region) -> Option<image::RgbImage> {
    let (x, y, w, h) = region.clip_to(frame.width(), frame.height());
    if w == 0 || h == 0 {
        return None;
    }
    let mut data = Vec::with_capacity(w * h * 3);
    for row in y..y + h {
        for col in x..x + w {
            data.extend_from_slice(&frame.rgb(col, row));
        }
    }
    image::RgbImage::from_raw(w as u32, h as u32, data)
}

/// Resize to `size` x `size`, swap to BGR, subtract means, NCHW layout.
fn bgr_blob(crop: &image::RgbImage, size: u32, mean_bgr: [f32; 3]) -> ndarray::Array4<f32> {
    let resized = image::imageops::resize(crop, size, size, image::imageops::FilterType::Triangle);
    let n = size as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, n, n));

    for (x, y, px) in resized.enumerate_pixels() {
        let [r, g, b] = px.0;
        let (x, y) = (x as usize, y as usize);
        tensor[[0, 0, y, x]] = b as f32 - mean_bgr[0];
        tensor[[0, 1, y, x]] = g as f32 - mean_bgr[1];
        tensor[[0, 2, y, x]] = r as f32 - mean_bgr[2];
    }

    tensor
}

/// Index and value of the largest element. Ties keep the first.
fn arg_max(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((i, v)),
        })
}
