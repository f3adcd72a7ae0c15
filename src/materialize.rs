//! Image decoding and per-sample materialization.

use std::path::Path;

use image::ImageReader;
use image::imageops::{self, FilterType};
use rayon::prelude::*;
use tracing::warn;

use crate::data::{DecodedImage, MaterializedSample, RawSample};
use crate::errors::PipelineError;
use crate::metadata::render_display;

/// Decode one frame, convert it to RGB8 and resize to `(width, height)` (bicubic).
///
/// The format is sniffed from the file contents, so a mislabeled extension
/// still decodes.
pub fn load_image(path: &Path, (width, height): (u32, u32)) -> Result<DecodedImage, PipelineError> {
    let decode_error = |reason: String| PipelineError::ImageDecode {
        path: path.to_path_buf(),
        reason,
    };
    let decoded = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|err| decode_error(err.to_string()))?
        .decode()
        .map_err(|err| decode_error(err.to_string()))?;
    let rgb = decoded.to_rgb8();
    let resized = imageops::resize(&rgb, width, height, FilterType::CatmullRom);
    Ok(DecodedImage::new(path, resized))
}

/// Decode a sample's frames and render its metadata display.
///
/// Frames that fail to decode are logged and left out; the sample is kept.
pub fn materialize_sample(sample: &RawSample, target: (u32, u32)) -> MaterializedSample {
    let images = sample
        .image
        .iter()
        .filter_map(|path| match load_image(path, target) {
            Ok(image) => Some(image),
            Err(err) => {
                warn!("[wxprep:materialize] '{}': {}", sample.filename, err);
                None
            }
        })
        .collect();
    MaterializedSample {
        images,
        text: sample.text.clone(),
        filename: sample.filename.clone(),
        reportdate: sample.reportdate.clone(),
        image_metadata: render_display(&sample.image_metadata),
        metadata_count: sample.image_metadata.len(),
    }
}

/// Materialize samples in parallel, keeping input order.
pub fn materialize_all(samples: &[RawSample], target: (u32, u32)) -> Vec<MaterializedSample> {
    samples
        .par_iter()
        .map(|sample| materialize_sample(sample, target))
        .collect()
}
