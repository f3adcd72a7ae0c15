/// Report identifier: the caption filename without extension.
/// Example: `20240513_report`
pub type Basename = String;
/// Thai-calendar date rendered for report prompts.
/// Example: `13 พฤษภาคม 2567`
pub type ThaiDate = String;
/// Cleaned caption text used as the assistant target.
/// Example: `ฝนตกหนักบริเวณภาคใต้`
pub type Caption = String;
/// Identifier for a sample source (usually the report root path).
/// Examples: `data`, `in_memory`
pub type SourceId = String;
/// Multi-line detection summary rendered for the instruction prompt.
/// Example: `วันที่ 1: {'Cloudy': 2, 'Typhoon': 1}`
pub type MetadataDisplay = String;
