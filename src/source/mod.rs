//! Sample source interfaces.
//!
//! Ownership model:
//! - `SampleSource` is the pipeline-facing interface that yields raw samples.
//! - `ReportFolderSource` scans one report root on disk.
//! - `InMemorySource` serves prebuilt samples (tests, replays).

use tracing::warn;

use crate::data::RawSample;
use crate::errors::PipelineError;
use crate::types::SourceId;

/// Detector metadata parsing.
pub mod detections;
/// Filename and calendar helpers.
pub mod indexing;
/// Report-folder extraction.
pub mod report_folder;

pub use report_folder::{ReportFolderConfig, ReportFolderSource};

/// Per-source extraction counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Caption files seen.
    pub captions: usize,
    /// Samples emitted.
    pub emitted: usize,
    /// Captions dropped because no frame matched.
    pub dropped_without_images: usize,
    /// Captions dropped by strict alignment.
    pub dropped_misaligned: usize,
    /// Samples whose metadata was trimmed to the frame count.
    pub metadata_truncated: usize,
    /// Caption files that could not be read.
    pub unreadable_captions: usize,
    /// Metadata files that failed to parse.
    pub malformed_metadata: usize,
    /// Filenames whose date digits were invalid.
    pub malformed_dates: usize,
}

impl ExtractionStats {
    /// Add another source's counters into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.captions += other.captions;
        self.emitted += other.emitted;
        self.dropped_without_images += other.dropped_without_images;
        self.dropped_misaligned += other.dropped_misaligned;
        self.metadata_truncated += other.metadata_truncated;
        self.unreadable_captions += other.unreadable_captions;
        self.malformed_metadata += other.malformed_metadata;
        self.malformed_dates += other.malformed_dates;
    }
}

/// Result of one extraction call.
#[derive(Clone, Debug, Default)]
pub struct Extraction {
    /// Samples in source order.
    pub samples: Vec<RawSample>,
    /// Counters collected while extracting.
    pub stats: ExtractionStats,
}

/// Pipeline-facing sample source.
///
/// For a fixed on-disk state, `extract` output should be deterministic.
pub trait SampleSource: Send + Sync {
    /// Stable source identifier used in logs.
    fn id(&self) -> &str;
    /// Produce every sample this source holds.
    fn extract(&self) -> Result<Extraction, PipelineError>;
}

/// Simple in-memory source for tests and small fixtures.
pub struct InMemorySource {
    id: SourceId,
    samples: Vec<RawSample>,
}

impl InMemorySource {
    /// Create an in-memory source from a fixed sample list.
    pub fn new(id: impl Into<SourceId>, samples: Vec<RawSample>) -> Self {
        Self {
            id: id.into(),
            samples,
        }
    }
}

impl SampleSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn extract(&self) -> Result<Extraction, PipelineError> {
        let stats = ExtractionStats {
            emitted: self.samples.len(),
            ..ExtractionStats::default()
        };
        Ok(Extraction {
            samples: self.samples.clone(),
            stats,
        })
    }
}

/// Extract from every source in order, concatenating samples.
///
/// A failing source is logged and skipped; the others still contribute.
pub fn extract_all(sources: &[Box<dyn SampleSource>]) -> Extraction {
    let mut combined = Extraction::default();
    for source in sources {
        match source.extract() {
            Ok(extraction) => {
                combined.stats.merge(&extraction.stats);
                combined.samples.extend(extraction.samples);
            }
            Err(err) => {
                warn!("[wxprep:extract] skipping source '{}': {}", source.id(), err);
            }
        }
    }
    combined
}
