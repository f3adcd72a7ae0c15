//! Caption cleanup helpers for OCR-derived Thai report text.

use std::sync::OnceLock;

use regex::Regex;

use crate::constants::text::{
    BOILERPLATE_CONTAINS, BOILERPLATE_EXACT, LINE_BREAK_PATTERN, OCR_REPLACEMENTS,
    PAGE_NUMBER_PATTERN, TIMESTAMP_LINE_PATTERN, URL_PATTERN,
};
use crate::types::Caption;

/// Thai orthographic normalization.
pub mod thai;

pub use thai::normalize_thai;

fn line_break_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(LINE_BREAK_PATTERN).expect("static line break pattern"))
}

fn page_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(PAGE_NUMBER_PATTERN).expect("static page number pattern"))
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(URL_PATTERN).expect("static url pattern"))
}

fn timestamp_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(TIMESTAMP_LINE_PATTERN).expect("static timestamp pattern"))
}

/// Clean raw OCR caption text into a single normalized line.
///
/// Lines are filtered in a fixed order: page numbers, URL lines, and
/// timestamp captions are dropped first; OCR repairs are applied to the
/// survivors; boilerplate is matched against the repaired text. The kept
/// lines are joined with single spaces and passed through `normalize_thai`.
pub fn clean_text(raw: &str) -> Caption {
    let kept: Vec<String> = line_break_pattern()
        .split(raw)
        .filter(|line| !is_page_number(line))
        .filter(|line| !url_pattern().is_match(line))
        .filter(|line| !timestamp_line_pattern().is_match(line))
        .map(repair_ocr)
        .filter(|line| !is_boilerplate(line))
        .collect();
    normalize_thai(&kept.join(" ")).trim().to_string()
}

/// Apply the ordered literal OCR repairs to one line.
pub fn repair_ocr(line: &str) -> String {
    OCR_REPLACEMENTS
        .iter()
        .fold(line.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// True for source attributions, section headers, and fixed captions.
pub fn is_boilerplate(line: &str) -> bool {
    let trimmed = line.trim();
    BOILERPLATE_CONTAINS
        .iter()
        .any(|fragment| line.contains(fragment))
        || BOILERPLATE_EXACT.contains(&trimmed)
}

/// True for lines made only of decimal digits (`12`, `๑๒`); `½` or `Ⅻ` are kept.
fn is_page_number(line: &str) -> bool {
    page_number_pattern().is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_section_header_and_keeps_content() {
        assert_eq!(clean_text("สภาพอากาศ\nเนื้อหา จริง"), "เนื้อหา จริง");
    }

    #[test]
    fn drops_page_numbers_urls_and_timestamps() {
        let raw = "12\nhttps://www.tmd.go.th/weather\n 13 พ.ค. 2567 เวลา 07.00 น. \nฝนตกหนัก\n๑๒";
        assert_eq!(clean_text(raw), "ฝนตกหนัก");
    }

    #[test]
    fn splits_on_carriage_returns_and_form_feeds() {
        assert_eq!(clean_text("เนื้อหา\rสภาพอากาศ"), "เนื้อหา");
        assert_eq!(clean_text("เนื้อหา\x0c12"), "เนื้อหา");
        assert_eq!(clean_text("ฝนตก\r\nลมแรง\u{2028}https://tmd.go.th"), "ฝนตก ลมแรง");
    }

    #[test]
    fn only_decimal_digit_lines_count_as_page_numbers() {
        assert_eq!(clean_text("๑๒\n34\nฝน"), "ฝน");
        assert_eq!(clean_text("½\nฝน"), "½ ฝน");
        assert_eq!(clean_text("Ⅻ\nฝน"), "Ⅻ ฝน");
    }

    #[test]
    fn url_must_have_a_target_to_drop_the_line() {
        assert_eq!(clean_text("ดู https:// ด้วย"), "ดู https:// ด้วย");
    }

    #[test]
    fn joins_kept_lines_with_single_spaces() {
        assert_eq!(
            clean_text("ภาคเหนือ\n\n  ฝนตก   เล็กน้อย  \nภาคใต้"),
            "ภาคเหนือ ฝนตก เล็กน้อย ภาคใต้"
        );
    }

    #[test]
    fn repairs_known_ocr_garbling_in_order() {
        assert_eq!(repair_ocr("อุณหภูมิต ่าสุด"), "อุณหภูมิต่ำสุด");
        assert_eq!(repair_ocr("ก ำลัง"), "กำลัง");
        assert_eq!(repair_ocr("ก  ำลัง"), "กำลัง");
        assert_eq!(repair_ocr("สัปดำห์"), "สัปดาห์");
        assert_eq!(repair_ocr("มำก"), "มาก");
        // " า" becomes " ำ" first, which then merges with the preceding ก
        assert_eq!(repair_ocr("ก า"), "กำ");
    }

    #[test]
    fn boilerplate_is_matched_after_repair() {
        let raw = "ที่มา: กรมอุตุนิยมวิทยา\nสัปดาห์ที่ผ่านมา\nภาพจาก Digital Typhoon\nกลุ่มเมฆและแผนที่อากาศ\nมีพายุ";
        assert_eq!(clean_text(raw), "มีพายุ");
        // repaired spelling now matches an exact header
        assert_eq!(clean_text("สัปดำห์ที่ผ่านมา\nลมแรง"), "ลมแรง");
    }

    #[test]
    fn exact_headers_only_match_whole_lines() {
        assert_eq!(
            clean_text("สภาพอากาศร้อนจัด"),
            "สภาพอากาศร้อนจัด"
        );
    }

    #[test]
    fn empty_and_whitespace_input_is_total() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("\n \n\t"), "");
        assert_eq!(clean_text("123\n456"), "");
    }

    #[test]
    fn cleaning_is_idempotent() {
        for raw in [
            "สภาพอากาศ\nเนื้อหา จริง",
            "ภาคเหนือ\n\n  ฝนตก   เล็กน้อย  \nภาคใต้",
            "https://x.y\nเเม่น้ำล้น\n99",
        ] {
            let once = clean_text(raw);
            assert_eq!(clean_text(&once), once, "{raw}");
        }
    }
}
