//! Batch driver: extract, split, persist, reload, materialize, format.

use std::path::Path;

use tracing::info;

use crate::config::PipelineConfig;
use crate::constants::splits::ALL_SPLITS;
use crate::conversation::{export_conversations, to_conversation};
use crate::data::ConversationRecord;
use crate::errors::PipelineError;
use crate::materialize::materialize_all;
use crate::source::{
    Extraction, ReportFolderConfig, ReportFolderSource, SampleSource, extract_all,
};
use crate::splits::{SplitLabel, SplitSamples, load_split, save_split};

/// Conversation records for every split, in sample order.
#[derive(Clone, Debug, Default)]
pub struct ConversationDatasets {
    /// Training conversations.
    pub train: Vec<ConversationRecord>,
    /// Validation conversations.
    pub validation: Vec<ConversationRecord>,
    /// Test conversations (generation layout).
    pub test: Vec<ConversationRecord>,
}

impl ConversationDatasets {
    /// Records for one split.
    pub fn get(&self, label: SplitLabel) -> &[ConversationRecord] {
        match label {
            SplitLabel::Train => &self.train,
            SplitLabel::Validation => &self.validation,
            SplitLabel::Test => &self.test,
        }
    }

    fn set(&mut self, label: SplitLabel, records: Vec<ConversationRecord>) {
        match label {
            SplitLabel::Train => self.train = records,
            SplitLabel::Validation => self.validation = records,
            SplitLabel::Test => self.test = records,
        }
    }

    /// Write `<dir>/<split>.jsonl` for every split.
    pub fn export(&self, dir: &Path) -> Result<(), PipelineError> {
        for label in ALL_SPLITS {
            let path = dir.join(format!("{}.jsonl", label.as_str()));
            export_conversations(&path, self.get(label))?;
            info!(
                "[wxprep:pipeline] exported {} {} conversations to {}",
                self.get(label).len(),
                label,
                path.display()
            );
        }
        Ok(())
    }
}

/// Runs dataset preparation over a set of sample sources.
pub struct DatasetPipeline {
    config: PipelineConfig,
    sources: Vec<Box<dyn SampleSource>>,
}

impl DatasetPipeline {
    /// Build a pipeline with one report-folder source per configured root.
    pub fn new(config: PipelineConfig) -> Self {
        let sources = config
            .roots
            .iter()
            .map(|root| {
                let source_config = ReportFolderConfig::new(root.clone())
                    .with_layout(config.layout.clone())
                    .with_alignment(config.alignment)
                    .with_follow_links(config.follow_links);
                Box::new(ReportFolderSource::new(source_config)) as Box<dyn SampleSource>
            })
            .collect();
        Self { config, sources }
    }

    /// Build a pipeline over caller-provided sources; `config.roots` is ignored.
    pub fn with_sources(config: PipelineConfig, sources: Vec<Box<dyn SampleSource>>) -> Self {
        Self { config, sources }
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract raw samples from every source.
    pub fn extract(&self) -> Extraction {
        let extraction = extract_all(&self.sources);
        info!(
            "[wxprep:pipeline] extracted {} samples from {} captions across {} sources",
            extraction.stats.emitted,
            extraction.stats.captions,
            self.sources.len()
        );
        extraction
    }

    /// Partition samples and write each split file.
    pub fn persist(&self, extraction: Extraction) -> Result<SplitSamples, PipelineError> {
        let splits = SplitSamples::partition(extraction.samples, &self.config.split_rules);
        for label in ALL_SPLITS {
            let path = self.config.split_paths.path_for(label);
            save_split(path, splits.get(label), self.config.metadata_encoding)?;
            info!(
                "[wxprep:pipeline] saved {} {} samples to {}",
                splits.get(label).len(),
                label,
                path.display()
            );
        }
        Ok(splits)
    }

    /// Reload one persisted split and format it into conversations.
    pub fn build_split(&self, label: SplitLabel) -> Result<Vec<ConversationRecord>, PipelineError> {
        let samples = load_split(self.config.split_paths.path_for(label))?;
        let layout = label.conversation_layout();
        materialize_all(&samples, self.config.target_size)
            .iter()
            .map(|sample| to_conversation(sample, &self.config.template, layout))
            .collect()
    }

    /// Run every stage and return the conversation datasets.
    pub fn run(&self) -> Result<ConversationDatasets, PipelineError> {
        let extraction = self.extract();
        self.persist(extraction)?;
        let mut datasets = ConversationDatasets::default();
        for label in ALL_SPLITS {
            let records = self.build_split(label)?;
            info!(
                "[wxprep:pipeline] built {} {} conversations",
                records.len(),
                label
            );
            datasets.set(label, records);
        }
        Ok(datasets)
    }
}
