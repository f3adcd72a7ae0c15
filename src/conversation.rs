//! Chat-style conversation records built from materialized samples.

use std::borrow::Cow;
use std::path::Path;

use crate::constants::conversation::{INSTRUCTION_TEXT, INSTRUCTION_VERSION, SLOT_TOKEN};
use crate::data::{ContentBlock, ConversationRecord, MaterializedSample, Message, Role};
use crate::errors::PipelineError;
use crate::transport::fs::write_json_lines;

/// Value substituted into one instruction placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateSlot {
    /// Thai-calendar report date (empty when unknown).
    ReportDate,
    /// Report basename.
    Filename,
    /// Rendered `วันที่ N: {...}` metadata lines.
    ImageMetadata,
    /// Frames without metadata.
    PressureMapCount,
    /// Frames with metadata.
    SatelliteCount,
}

impl TemplateSlot {
    fn value(self, sample: &MaterializedSample) -> String {
        match self {
            TemplateSlot::ReportDate => sample.reportdate.clone().unwrap_or_default(),
            TemplateSlot::Filename => sample.filename.clone(),
            TemplateSlot::ImageMetadata => sample.image_metadata.clone(),
            TemplateSlot::PressureMapCount => sample.pressure_map_count().to_string(),
            TemplateSlot::SatelliteCount => sample.satellite_count().to_string(),
        }
    }
}

/// Versioned instruction text with ordered, named placeholders.
///
/// Each `{}` in `text` is filled, in order, by the matching entry of `slots`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstructionTemplate {
    /// Version tag recorded alongside the text.
    pub version: Cow<'static, str>,
    /// Template body.
    pub text: Cow<'static, str>,
    /// Slot filled by each placeholder, in order.
    pub slots: Cow<'static, [TemplateSlot]>,
}

impl InstructionTemplate {
    /// The weekly weather-report instruction.
    pub const WEEKLY_REPORT: InstructionTemplate = InstructionTemplate {
        version: Cow::Borrowed(INSTRUCTION_VERSION),
        text: Cow::Borrowed(INSTRUCTION_TEXT),
        slots: Cow::Borrowed(&[
            TemplateSlot::ReportDate,
            TemplateSlot::Filename,
            TemplateSlot::ImageMetadata,
            TemplateSlot::PressureMapCount,
            TemplateSlot::SatelliteCount,
        ]),
    };

    /// Number of `{}` placeholders in the text.
    pub fn placeholder_count(&self) -> usize {
        self.text.matches(SLOT_TOKEN).count()
    }

    /// Fill every placeholder from `sample`.
    pub fn render(&self, sample: &MaterializedSample) -> Result<String, PipelineError> {
        let expected = self.placeholder_count();
        if expected != self.slots.len() {
            return Err(PipelineError::TemplateArity {
                version: self.version.to_string(),
                expected,
                found: self.slots.len(),
            });
        }
        let mut pieces = self.text.split(SLOT_TOKEN);
        let mut rendered = pieces.next().unwrap_or_default().to_string();
        for (slot, piece) in self.slots.iter().zip(pieces) {
            rendered.push_str(&slot.value(sample));
            rendered.push_str(piece);
        }
        Ok(rendered)
    }
}

impl Default for InstructionTemplate {
    fn default() -> Self {
        Self::WEEKLY_REPORT
    }
}

/// Block ordering of a conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationLayout {
    /// Images, then the instruction; assistant answers with the caption.
    Training,
    /// Instruction, then images; assistant content is an empty placeholder.
    Generation,
}

/// Build one conversation record from a materialized sample.
pub fn to_conversation(
    sample: &MaterializedSample,
    template: &InstructionTemplate,
    layout: ConversationLayout,
) -> Result<ConversationRecord, PipelineError> {
    let instruction = ContentBlock::Text {
        text: template.render(sample)?,
    };
    let images = sample
        .images
        .iter()
        .cloned()
        .map(|image| ContentBlock::Image { image });

    let (user_content, answer) = match layout {
        ConversationLayout::Training => {
            let mut content: Vec<ContentBlock> = images.collect();
            content.push(instruction);
            (content, sample.text.clone())
        }
        ConversationLayout::Generation => {
            let mut content = vec![instruction];
            content.extend(images);
            (content, String::new())
        }
    };

    Ok(ConversationRecord {
        messages: vec![
            Message {
                role: Role::User,
                content: user_content,
            },
            Message {
                role: Role::Assistant,
                content: vec![ContentBlock::Text { text: answer }],
            },
        ],
    })
}

/// Write conversations as JSON Lines; image blocks carry their source path.
pub fn export_conversations(path: &Path, records: &[ConversationRecord]) -> Result<(), PipelineError> {
    write_json_lines(path, records)
}
