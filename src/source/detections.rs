//! Per-frame detection metadata produced by the cloud/typhoon detector.
//!
//! Each JSON file maps a frame name to its detections:
//! `{"frame.jpg": {"detections": [{"class_id": 0, ...}, ...]}, ...}`.
//! Frame order in the file is preserved.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::constants::detections::{CLOUDY_CLASS_ID, TYPHOON_CLASS_ID};
use crate::data::DetectionCounts;
use crate::errors::PipelineError;

/// Detections for one frame; fields other than `detections` are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct FrameDetections {
    /// Detector hits on this frame.
    pub detections: Vec<Detection>,
}

/// One detector hit; only the class id is consumed.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Detection {
    /// Detector class; integral values may be written as floats.
    pub class_id: f64,
}

/// Ordered mapping of frame name to detections.
pub type DetectionFile = IndexMap<String, FrameDetections>;

impl FrameDetections {
    /// Count cloud and typhoon hits for this frame.
    pub fn counts(&self) -> DetectionCounts {
        let count_class = |class_id: i64| {
            self.detections
                .iter()
                .filter(|detection| detection.class_id == class_id as f64)
                .count() as u32
        };
        DetectionCounts {
            cloudy: count_class(CLOUDY_CLASS_ID),
            typhoon: count_class(TYPHOON_CLASS_ID),
        }
    }
}

/// Parse detection metadata from a JSON string, one entry per frame in file order.
pub fn counts_from_str(raw: &str) -> Result<Vec<DetectionCounts>, serde_json::Error> {
    let file: DetectionFile = serde_json::from_str(raw)?;
    Ok(file.values().map(FrameDetections::counts).collect())
}

/// Read one metadata file and return per-frame counts in file order.
pub fn read_detection_counts(path: &Path) -> Result<Vec<DetectionCounts>, PipelineError> {
    let raw = fs::read_to_string(path)?;
    counts_from_str(&raw).map_err(|err| PipelineError::MalformedMetadata {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}
