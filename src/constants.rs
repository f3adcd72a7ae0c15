use crate::splits::SplitLabel;

/// Constants describing the on-disk report folder layout.
pub mod layout {
    /// Folder holding one caption `.txt` file per report.
    pub const TEXT_DIR: &str = "text";
    /// Folder holding satellite cloud-movement frames.
    pub const FINAL_IMAGE_DIR: &str = "img_final";
    /// Folder holding pressure-map frames.
    pub const AIR_PRESSURE_IMAGE_DIR: &str = "img_air_pressure";
    /// Folder holding per-report detection metadata JSON.
    pub const METADATA_DIR: &str = "img_metadata";
    /// Caption file extension.
    pub const TEXT_EXTENSION: &str = "txt";
    /// Detection metadata file extension.
    pub const METADATA_EXTENSION: &str = "json";
    /// Image file extensions matched case-insensitively.
    pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "jpeg"];
    /// Root scanned when no explicit root is configured.
    pub const DEFAULT_ROOT: &str = "data";
}

/// Constants used by detection metadata parsing and rendering.
pub mod detections {
    /// Detector class id for cloud clusters.
    pub const CLOUDY_CLASS_ID: i64 = 0;
    /// Detector class id for typhoons.
    pub const TYPHOON_CLASS_ID: i64 = 1;
    /// Display key for cloud counts.
    pub const CLOUDY_LABEL: &str = "Cloudy";
    /// Display key for typhoon counts.
    pub const TYPHOON_LABEL: &str = "Typhoon";
    /// Per-line prefix for rendered metadata ("day N").
    pub const DAY_LINE_PREFIX: &str = "วันที่";
}

/// Constants used when converting filename dates to the Thai calendar.
pub mod dates {
    /// Offset from the Gregorian year to the Buddhist Era year.
    pub const BUDDHIST_ERA_OFFSET: i32 = 543;
    /// Number of consecutive digits that encode `YYYYMMDD`.
    pub const FILENAME_DATE_DIGITS: usize = 8;
    /// Thai month names indexed by `month - 1`.
    pub const THAI_MONTHS: [&str; 12] = [
        "มกราคม",
        "กุมภาพันธ์",
        "มีนาคม",
        "เมษายน",
        "พฤษภาคม",
        "มิถุนายน",
        "กรกฎาคม",
        "สิงหาคม",
        "กันยายน",
        "ตุลาคม",
        "พฤศจิกายน",
        "ธันวาคม",
    ];
}

/// Constants used by OCR caption cleanup.
pub mod text {
    /// Literal OCR repairs, applied in order to every surviving line.
    pub const OCR_REPLACEMENTS: &[(&str, &str)] = &[
        (" า", " ำ"),
        ("ต ่า", "ต่ำ"),
        ("ก ำ", "กำ"),
        ("ก  ำ", "กำ"),
        ("ดำห์", "ดาห์"),
        ("มำ", "มา"),
    ];
    /// Lines containing any of these fragments are dropped.
    pub const BOILERPLATE_CONTAINS: &[&str] = &[
        "ที่มา:",
        "ลักษณะกลุ่มเมฆจากภาพถ่ายดาวเทียม",
        "Digital Typhoon",
    ];
    /// Lines whose trimmed text equals one of these are dropped.
    pub const BOILERPLATE_EXACT: &[&str] = &[
        "สภาพอากาศ",
        "สัปดาห์ที่ผ่านมา",
        "ข้อมูลเพิ่มเติม:",
        "สัปดาห์ที่ผ่านมาสภาพอากาศ",
        "กลุ่มเมฆและแผนที่อากาศ",
        "ภาพแผนที่อากาศ กรมอุตุนิยมวิทยา",
    ];
    /// Line separators: CRLF, or any single vertical break (LF, CR, VT, FF,
    /// file/group/record separators, NEL, line and paragraph separators).
    pub const LINE_BREAK_PATTERN: &str =
        r"\r\n|[\n\r\x0B\x0C\x1C-\x1E\x{85}\x{2028}\x{2029}]";
    /// Page-number lines: decimal digits in any script, nothing else.
    pub const PAGE_NUMBER_PATTERN: &str = r"^\s*\p{Nd}+\s*$";
    /// URL detector used to drop source-attribution lines.
    pub const URL_PATTERN: &str = r"https?://\S+";
    /// Timestamp caption lines such as `12 พ.ค. 2567 เวลา 07.00 น.`.
    pub const TIMESTAMP_LINE_PATTERN: &str = r"^\s*\d+.*น\.\s*$";
}

/// Constants used by image materialization.
pub mod images {
    /// Square edge length every decoded frame is resized to.
    pub const TARGET_EDGE: u32 = 256;
}

/// Constants used by split assignment and persistence.
pub mod splits {
    use super::SplitLabel;

    /// Year-month tokens routed to the test split.
    pub const TEST_MONTH_TOKENS: &[&str] = &["202504", "202505"];
    /// Year-month tokens routed to the validation split.
    pub const VALIDATION_MONTH_TOKENS: &[&str] = &["202502", "202503"];
    /// Canonical split iteration order.
    pub const ALL_SPLITS: [SplitLabel; 3] =
        [SplitLabel::Train, SplitLabel::Validation, SplitLabel::Test];
    /// Default directory for persisted split JSON files.
    pub const DEFAULT_CACHE_DIR: &str = "train_cache";
    /// Default train split filename.
    pub const TRAIN_FILENAME: &str = "train_conversation.json";
    /// Default validation split filename.
    pub const VALIDATION_FILENAME: &str = "validation_conversation.json";
    /// Default test split filename.
    pub const TEST_FILENAME: &str = "test_conversation.json";
    /// Indent width used for persisted JSON.
    pub const JSON_INDENT: &[u8] = b"    ";
}

/// Constants used by the conversation formatter.
pub mod conversation {
    /// Version tag of the weekly weather-report instruction.
    pub const INSTRUCTION_VERSION: &str = "weekly-report-v1";
    /// Placeholder token filled positionally by the template renderer.
    pub const SLOT_TOKEN: &str = "{}";
    /// Thai weekly weather-report instruction with five positional slots.
    pub const INSTRUCTION_TEXT: &str = r"
  นี้คือบริบทที่เกียวข้องกับรูปภาพนี้:

  เอกสารจะถูกรายงานในวันที่ {} สำหรับทำเอกสาร {}

  ``` metadata ```
  {}

  ```รูปภาพถ่ายความกดอากาศ``` (มีทั้งหมด {} รูปภาพเรียงตามลำดับ)
  - หากพบ L ในรูปภาพจะหมายถึงความกดอากาศสูง ซึ่งมีโอกาสเกิดอากาศหนาว และมีโอกาสเกิดภัยแล้ง
  - หากพบ H ในรูปภาพจะหมายถึงความกดอากาศต่ำ ซึ่งมีโอกาสเกิดอากาศร้อน และมีโอกาสเกิดฝนตก

  ```รูปภาพถ่ายดาวเทียมแสดงความเคลื่อนไหวของกลุ่มเมฆ``` (มีทั้งหมด {} รูปภาพเรียงตามลำดับ)
  - โปรดตอบเป็นภาษาไทยเท่านั้น
  - หากพบ Cloudy ในรูปภาพจะหมายถึงเกิดกลุ่มเมฆขึ้น และหากพบ Typhoon หมายถึงเกิดพายุไต้ฝุ่นในช่วงเวลาดังกล่าว
  - เนื่องจากเป็นรายงานรายสัปดาห์ วันที่ที่ใช้รายงานจะต้องอยู่ในช่วง 7 วันก่อนที่เอกสารรายงาน (เช่น หากเอกสารรายงานในวันที่ 13 พฤษภาคม 2567 หมายความว่ารูปภาพจะอยู่ในช่วงวันที่ 06 พฤษภาคม 2567 ถึง 13 พฤษภาคม 2567 เท่านั้น)

  คำถาม: กรุณาทำรายงานวิเคราะห์เกี่ยวกับเหตุการณ์ทางธรณีวิทยาและภัยพิบัติที่จะเกิดขึ้นในแต่ละภูมิภาคของประเทศไทยและประเทศข้างเคียง
  คำตอบ:
";
}
