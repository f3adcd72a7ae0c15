use std::path::PathBuf;

use crate::constants::images::TARGET_EDGE;
use crate::constants::layout::{
    AIR_PRESSURE_IMAGE_DIR, DEFAULT_ROOT, FINAL_IMAGE_DIR, METADATA_DIR, TEXT_DIR,
};
use crate::conversation::InstructionTemplate;
use crate::metadata::MetadataEncoding;
use crate::splits::{MonthSplitRules, SplitPaths};

/// How detection metadata must line up with the matched frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignmentPolicy {
    /// Keep every sample; metadata is paired with the tail of the frame list
    /// by count only, and trimmed when it outnumbers the frames.
    #[default]
    Permissive,
    /// Drop samples whose metadata count differs from the number of
    /// satellite frames.
    Strict,
}

/// Sub-folder names inside one report root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportLayout {
    /// Caption folder.
    pub text_dir: String,
    /// Satellite frame folder.
    pub final_image_dir: String,
    /// Pressure-map frame folder (optional on disk).
    pub air_pressure_image_dir: String,
    /// Detection metadata folder.
    pub metadata_dir: String,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            text_dir: TEXT_DIR.to_string(),
            final_image_dir: FINAL_IMAGE_DIR.to_string(),
            air_pressure_image_dir: AIR_PRESSURE_IMAGE_DIR.to_string(),
            metadata_dir: METADATA_DIR.to_string(),
        }
    }
}

/// End-to-end dataset preparation settings.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Report roots scanned in order.
    pub roots: Vec<PathBuf>,
    /// Folder names inside each root.
    pub layout: ReportLayout,
    /// Metadata/frame alignment rule.
    pub alignment: AlignmentPolicy,
    /// Month tokens deciding validation and test membership.
    pub split_rules: MonthSplitRules,
    /// Where each split is persisted.
    pub split_paths: SplitPaths,
    /// How `image_metadata` is written into split files.
    pub metadata_encoding: MetadataEncoding,
    /// Decoded frame size `(width, height)`.
    pub target_size: (u32, u32),
    /// Instruction used for every conversation.
    pub template: InstructionTemplate,
    /// Follow symlinks while listing report folders.
    pub follow_links: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(DEFAULT_ROOT)],
            layout: ReportLayout::default(),
            alignment: AlignmentPolicy::default(),
            split_rules: MonthSplitRules::default(),
            split_paths: SplitPaths::default(),
            metadata_encoding: MetadataEncoding::default(),
            target_size: (TARGET_EDGE, TARGET_EDGE),
            template: InstructionTemplate::default(),
            follow_links: true,
        }
    }
}

impl PipelineConfig {
    /// Replace the report roots.
    pub fn with_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots = roots.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the folder layout.
    pub fn with_layout(mut self, layout: ReportLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the alignment policy.
    pub fn with_alignment(mut self, alignment: AlignmentPolicy) -> Self {
        self.alignment = alignment;
        self
    }

    /// Replace the split rules.
    pub fn with_split_rules(mut self, split_rules: MonthSplitRules) -> Self {
        self.split_rules = split_rules;
        self
    }

    /// Persist splits under `dir` with the default file names.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.split_paths = SplitPaths::in_dir(dir.into());
        self
    }

    /// Replace the split file locations.
    pub fn with_split_paths(mut self, split_paths: SplitPaths) -> Self {
        self.split_paths = split_paths;
        self
    }

    /// Set the persisted metadata encoding.
    pub fn with_metadata_encoding(mut self, encoding: MetadataEncoding) -> Self {
        self.metadata_encoding = encoding;
        self
    }

    /// Set a square decoded frame size.
    pub fn with_image_edge(mut self, edge: u32) -> Self {
        self.target_size = (edge, edge);
        self
    }

    /// Replace the instruction template.
    pub fn with_template(mut self, template: InstructionTemplate) -> Self {
        self.template = template;
        self
    }

    /// Configure symlink traversal.
    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_match_the_documented_layout() {
        let config = PipelineConfig::default();
        assert_eq!(config.roots, vec![PathBuf::from("data")]);
        assert_eq!(config.layout.final_image_dir, "img_final");
        assert_eq!(config.alignment, AlignmentPolicy::Permissive);
        assert_eq!(config.metadata_encoding, MetadataEncoding::Native);
        assert_eq!(config.target_size, (256, 256));
        assert_eq!(config.template.version, "weekly-report-v1");
    }

    #[test]
    fn builders_override_fields() {
        let config = PipelineConfig::default()
            .with_roots(["a", "b"])
            .with_cache_dir("cache")
            .with_alignment(AlignmentPolicy::Strict)
            .with_metadata_encoding(MetadataEncoding::Literal)
            .with_image_edge(64);
        assert_eq!(config.roots.len(), 2);
        assert_eq!(
            config.split_paths.validation,
            Path::new("cache").join("validation_conversation.json")
        );
        assert_eq!(config.alignment, AlignmentPolicy::Strict);
        assert_eq!(config.target_size, (64, 64));
    }
}
