#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line entry points.
pub mod app;
/// Pipeline configuration types.
pub mod config;
/// Centralized constants for layout, cleanup, splits, and prompts.
pub mod constants;
/// Chat-style conversation formatting.
pub mod conversation;
/// Sample, image, and conversation record types.
pub mod data;
/// Image decoding and sample materialization.
pub mod materialize;
/// Detection metadata rendering and persisted encodings.
pub mod metadata;
/// End-to-end batch driver.
pub mod pipeline;
/// Sample source traits and the report-folder extractor.
pub mod source;
/// Temporal split assignment and split-file persistence.
pub mod splits;
/// Filesystem listing and JSON I/O helpers.
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Caption cleanup and Thai normalization.
pub mod utils;

mod errors;

pub use config::{AlignmentPolicy, PipelineConfig, ReportLayout};
pub use conversation::{
    ConversationLayout, InstructionTemplate, TemplateSlot, export_conversations, to_conversation,
};
pub use data::{
    ContentBlock, ConversationRecord, DecodedImage, DetectionCounts, MaterializedSample, Message,
    RawSample, Role,
};
pub use errors::PipelineError;
pub use materialize::{load_image, materialize_all, materialize_sample};
pub use metadata::MetadataEncoding;
pub use pipeline::{ConversationDatasets, DatasetPipeline};
pub use source::indexing::date_helpers::extract_date;
pub use source::{
    Extraction, ExtractionStats, InMemorySource, ReportFolderConfig, ReportFolderSource,
    SampleSource, extract_all,
};
pub use splits::{MonthSplitRules, SplitLabel, SplitPaths, SplitSamples, load_split, save_split};
pub use types::{Basename, Caption, MetadataDisplay, SourceId, ThaiDate};
pub use utils::{clean_text, normalize_thai};
