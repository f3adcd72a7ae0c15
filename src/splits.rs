//! Temporal split assignment and split-file persistence.
//!
//! Splits are decided from year-month tokens embedded in report filenames.
//! Each split is written to its own pretty JSON array and read back before
//! materialization, so the intermediate files can be inspected or edited.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::splits::{
    ALL_SPLITS, DEFAULT_CACHE_DIR, TEST_FILENAME, TEST_MONTH_TOKENS, TRAIN_FILENAME,
    VALIDATION_FILENAME, VALIDATION_MONTH_TOKENS,
};
use crate::conversation::ConversationLayout;
use crate::data::RawSample;
use crate::errors::PipelineError;
use crate::metadata::{MetadataEncoding, PersistedMetadata};
use crate::transport::fs::{read_json, write_json_pretty};
use crate::types::{Basename, Caption, ThaiDate};

/// Logical dataset partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitLabel {
    /// Training split.
    Train,
    /// Validation split.
    Validation,
    /// Test split.
    Test,
}

impl SplitLabel {
    /// Assign a split using the default month tokens.
    pub fn for_filename(filename: &str) -> SplitLabel {
        MonthSplitRules::default().label_for(filename)
    }

    /// Lowercase name used in logs and summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            SplitLabel::Train => "train",
            SplitLabel::Validation => "validation",
            SplitLabel::Test => "test",
        }
    }

    /// Conversation layout used when formatting this split.
    pub fn conversation_layout(self) -> ConversationLayout {
        match self {
            SplitLabel::Test => ConversationLayout::Generation,
            SplitLabel::Train | SplitLabel::Validation => ConversationLayout::Training,
        }
    }
}

impl fmt::Display for SplitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substring rules that route filenames to validation or test.
///
/// Test tokens are checked first; anything unmatched is train.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthSplitRules {
    /// Tokens routed to test.
    pub test_tokens: Vec<String>,
    /// Tokens routed to validation.
    pub validation_tokens: Vec<String>,
}

impl Default for MonthSplitRules {
    fn default() -> Self {
        Self {
            test_tokens: TEST_MONTH_TOKENS.iter().map(|t| t.to_string()).collect(),
            validation_tokens: VALIDATION_MONTH_TOKENS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl MonthSplitRules {
    /// Replace the test tokens.
    pub fn with_test_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.test_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the validation tokens.
    pub fn with_validation_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validation_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Split for `filename`. Pure and total.
    pub fn label_for(&self, filename: &str) -> SplitLabel {
        let contains_any = |tokens: &[String]| tokens.iter().any(|t| filename.contains(t.as_str()));
        if contains_any(&self.test_tokens) {
            SplitLabel::Test
        } else if contains_any(&self.validation_tokens) {
            SplitLabel::Validation
        } else {
            SplitLabel::Train
        }
    }
}

/// Samples grouped by split, each in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitSamples {
    /// Training samples.
    pub train: Vec<RawSample>,
    /// Validation samples.
    pub validation: Vec<RawSample>,
    /// Test samples.
    pub test: Vec<RawSample>,
}

impl SplitSamples {
    /// Partition `samples` by filename.
    pub fn partition(samples: Vec<RawSample>, rules: &MonthSplitRules) -> Self {
        let mut splits = SplitSamples::default();
        for sample in samples {
            let label = rules.label_for(&sample.filename);
            splits.get_mut(label).push(sample);
        }
        splits
    }

    /// Samples for one split.
    pub fn get(&self, label: SplitLabel) -> &[RawSample] {
        match label {
            SplitLabel::Train => &self.train,
            SplitLabel::Validation => &self.validation,
            SplitLabel::Test => &self.test,
        }
    }

    fn get_mut(&mut self, label: SplitLabel) -> &mut Vec<RawSample> {
        match label {
            SplitLabel::Train => &mut self.train,
            SplitLabel::Validation => &mut self.validation,
            SplitLabel::Test => &mut self.test,
        }
    }

    /// Total samples across all splits.
    pub fn len(&self) -> usize {
        ALL_SPLITS.iter().map(|label| self.get(*label).len()).sum()
    }

    /// True when every split is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// File locations for the three persisted splits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitPaths {
    /// Train split file.
    pub train: PathBuf,
    /// Validation split file.
    pub validation: PathBuf,
    /// Test split file.
    pub test: PathBuf,
}

impl Default for SplitPaths {
    fn default() -> Self {
        Self::in_dir(DEFAULT_CACHE_DIR)
    }
}

impl SplitPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            train: dir.join(TRAIN_FILENAME),
            validation: dir.join(VALIDATION_FILENAME),
            test: dir.join(TEST_FILENAME),
        }
    }

    /// File for one split.
    pub fn path_for(&self, label: SplitLabel) -> &Path {
        match label {
            SplitLabel::Train => &self.train,
            SplitLabel::Validation => &self.validation,
            SplitLabel::Test => &self.test,
        }
    }
}

/// On-disk shape of one sample.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSample {
    image: Vec<PathBuf>,
    text: Caption,
    filename: Basename,
    reportdate: Option<ThaiDate>,
    image_metadata: PersistedMetadata,
}

impl PersistedSample {
    fn encode(sample: &RawSample, encoding: MetadataEncoding) -> Self {
        Self {
            image: sample.image.clone(),
            text: sample.text.clone(),
            filename: sample.filename.clone(),
            reportdate: sample.reportdate.clone(),
            image_metadata: PersistedMetadata::encode(&sample.image_metadata, encoding),
        }
    }

    fn decode(self) -> Result<RawSample, PipelineError> {
        Ok(RawSample {
            image: self.image,
            text: self.text,
            filename: self.filename,
            reportdate: self.reportdate,
            image_metadata: self.image_metadata.into_entries()?,
        })
    }
}

/// Write one split as a pretty JSON array, creating parent directories.
pub fn save_split(
    path: &Path,
    samples: &[RawSample],
    encoding: MetadataEncoding,
) -> Result<(), PipelineError> {
    let persisted: Vec<PersistedSample> = samples
        .iter()
        .map(|sample| PersistedSample::encode(sample, encoding))
        .collect();
    write_json_pretty(path, &persisted)
}

/// Read one split back. Either metadata encoding is accepted.
///
/// A missing or unreadable file is `MissingPartition`; invalid JSON is
/// `MalformedPartition`.
pub fn load_split(path: &Path) -> Result<Vec<RawSample>, PipelineError> {
    let persisted: Vec<PersistedSample> = read_json(path).map_err(|err| match err {
        PipelineError::Io(source) => PipelineError::MissingPartition {
            path: path.to_path_buf(),
            source,
        },
        PipelineError::Json(source) if source.is_io() => PipelineError::MissingPartition {
            path: path.to_path_buf(),
            source: io::Error::other(source),
        },
        PipelineError::Json(source) => PipelineError::MalformedPartition {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    persisted.into_iter().map(PersistedSample::decode).collect()
}
