use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbImage;
use serde::{Deserialize, Serialize, Serializer};

pub use crate::types::{Basename, Caption, MetadataDisplay, ThaiDate};

/// Detection counts for one satellite frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionCounts {
    /// Number of cloud-cluster detections (class 0).
    #[serde(rename = "Cloudy")]
    pub cloudy: u32,
    /// Number of typhoon detections (class 1).
    #[serde(rename = "Typhoon")]
    pub typhoon: u32,
}

/// One extracted report before images are decoded.
///
/// `image` lists pressure-map frames first, then satellite frames. The last
/// `image_metadata.len()` entries of `image` are the satellite frames the
/// metadata describes, in the same order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSample {
    /// Frame paths, pressure maps followed by satellite images.
    pub image: Vec<PathBuf>,
    /// Cleaned caption used as the ground-truth report.
    pub text: Caption,
    /// Report basename (caption filename without extension).
    pub filename: Basename,
    /// Thai-calendar report date parsed from the filename, when present.
    pub reportdate: Option<ThaiDate>,
    /// Detection counts aligned with the satellite tail of `image`.
    pub image_metadata: Vec<DetectionCounts>,
}

impl RawSample {
    /// Number of leading frames that carry no detection metadata.
    pub fn pressure_map_count(&self) -> usize {
        self.image.len().saturating_sub(self.image_metadata.len())
    }
}

/// A decoded RGB frame together with the path it was read from.
#[derive(Clone)]
pub struct DecodedImage {
    source: PathBuf,
    pixels: RgbImage,
}

impl DecodedImage {
    /// Wrap already-decoded pixels.
    pub fn new(source: impl Into<PathBuf>, pixels: RgbImage) -> Self {
        Self {
            source: source.into(),
            pixels,
        }
    }

    /// Path the frame was decoded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Borrow the RGB8 pixel buffer.
    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("source", &self.source)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Images are exported by reference; pixel data stays in memory.
impl Serialize for DecodedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source.to_string_lossy())
    }
}

/// A report ready for conversation formatting.
#[derive(Clone, Debug)]
pub struct MaterializedSample {
    /// Decoded, resized frames in extraction order (failed frames removed).
    pub images: Vec<DecodedImage>,
    /// Cleaned caption.
    pub text: Caption,
    /// Report basename.
    pub filename: Basename,
    /// Thai-calendar report date.
    pub reportdate: Option<ThaiDate>,
    /// Rendered `วันที่ N: {...}` lines.
    pub image_metadata: MetadataDisplay,
    /// Number of structured metadata entries behind `image_metadata`.
    pub metadata_count: usize,
}

impl MaterializedSample {
    /// Frames without detection metadata (pressure maps).
    pub fn pressure_map_count(&self) -> usize {
        self.images.len().saturating_sub(self.metadata_count)
    }

    /// Frames with detection metadata (satellite images).
    pub fn satellite_count(&self) -> usize {
        self.metadata_count
    }
}

/// Chat participant role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Prompt side: frames and instruction.
    User,
    /// Answer side: the report text.
    Assistant,
}

/// One ordered piece of message content.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// A decoded frame.
    Image {
        /// Frame pixels and source path.
        image: DecodedImage,
    },
    /// A text segment.
    Text {
        /// Segment text.
        text: String,
    },
}

impl ContentBlock {
    /// Text payload, if this is a text block.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Image { .. } => None,
        }
    }

    /// True for image blocks.
    pub fn is_image(&self) -> bool {
        matches!(self, ContentBlock::Image { .. })
    }
}

/// One chat turn.
#[derive(Clone, Debug, Serialize)]
pub struct Message {
    /// Speaker of this turn.
    pub role: Role,
    /// Ordered content blocks.
    pub content: Vec<ContentBlock>,
}

/// Multimodal chat record consumed by instruction tuning.
#[derive(Clone, Debug, Serialize)]
pub struct ConversationRecord {
    /// User turn followed by assistant turn.
    pub messages: Vec<Message>,
}
