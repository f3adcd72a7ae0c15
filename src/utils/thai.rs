//! Thai orthographic normalization.
//!
//! OCR output frequently stores combining marks in a non-canonical order,
//! repeats vowels, or leaves marks with no base consonant. `normalize_thai`
//! repairs those cases without touching word content.

use std::sync::OnceLock;

use regex::{Captures, Regex};

const TONE_MARKS: &str = r"\x{0E48}-\x{0E4B}";
const ABOVE_VOWELS: &str = r"\x{0E31}\x{0E34}-\x{0E37}\x{0E47}\x{0E4D}";
const BELOW_VOWELS: &str = r"\x{0E38}-\x{0E3A}";
const FOLLOW_VOWELS: &str = r"\x{0E30}\x{0E32}\x{0E33}\x{0E45}";
const OTHER_SIGNS: &str = r"\x{0E3A}\x{0E4C}\x{0E4D}\x{0E4E}";

const ZERO_WIDTH: [char; 2] = ['\u{200B}', '\u{200C}'];

/// Characters that must never appear twice in a row.
const NO_REPEAT: &[char] = &[
    '\u{0E30}', '\u{0E32}', '\u{0E33}', '\u{0E45}', // follow vowels
    '\u{0E40}', '\u{0E41}', '\u{0E42}', '\u{0E43}', '\u{0E44}', // lead vowels
    '\u{0E31}', '\u{0E34}', '\u{0E35}', '\u{0E36}', '\u{0E37}', '\u{0E47}', '\u{0E4D}', // above
    '\u{0E38}', '\u{0E39}', '\u{0E3A}', // below
    '\u{0E4C}', '\u{0E4E}',
];

struct Rules {
    reorder: Vec<(Regex, &'static str)>,
    no_repeat: Vec<(Regex, String)>,
    tone_runs: Regex,
    newline_runs: Regex,
    dangling: Regex,
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| {
        let compile = |pattern: String| Regex::new(&pattern).expect("static Thai pattern");
        let reorder = vec![
            (compile(r"\x{0E40}\x{0E40}".to_string()), "\u{0E41}"),
            (
                compile(format!(
                    r"([{TONE_MARKS}\x{{0E4C}}]+)([{ABOVE_VOWELS}{BELOW_VOWELS}]+)"
                )),
                "$2$1",
            ),
            (
                compile(format!(r"\x{{0E4D}}([{TONE_MARKS}]*)\x{{0E32}}")),
                "${1}\u{0E33}",
            ),
            (
                compile(format!(r"([{FOLLOW_VOWELS}]+)([{TONE_MARKS}]+)")),
                "$2$1",
            ),
            (
                compile(r"([^\x{0E24}\x{0E26}])\x{0E45}".to_string()),
                "${1}\u{0E32}",
            ),
        ];
        let no_repeat = NO_REPEAT
            .iter()
            .map(|ch| {
                let escaped = format!(r"\x{{{:04X}}}", *ch as u32);
                (
                    compile(format!("({escaped}[ ]*)+{escaped}")),
                    ch.to_string(),
                )
            })
            .collect();
        Rules {
            reorder,
            no_repeat,
            tone_runs: compile(format!("[{TONE_MARKS}]{{2,}}")),
            newline_runs: compile(r"[ \n]*\n[ \n]*".to_string()),
            dangling: compile(format!(
                "^[{ABOVE_VOWELS}{BELOW_VOWELS}{TONE_MARKS}{OTHER_SIGNS}]+"
            )),
        }
    })
}

/// Normalize Thai text: drop zero-width characters, collapse spacing,
/// canonicalize mark order, remove repeated vowels and tone marks, and strip
/// marks dangling at the start of the text.
pub fn normalize_thai(text: &str) -> String {
    let rules = rules();
    let text: String = text.chars().filter(|ch| !ZERO_WIDTH.contains(ch)).collect();
    let text = collapse_spacing(&text, &rules.newline_runs);

    let mut text = text;
    for (pattern, replacement) in &rules.reorder {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    for (pattern, replacement) in &rules.no_repeat {
        text = pattern.replace_all(&text, replacement.as_str()).into_owned();
    }
    let text = rules
        .tone_runs
        .replace_all(&text, |caps: &Captures<'_>| {
            caps[0].chars().last().map(String::from).unwrap_or_default()
        })
        .into_owned();
    rules.dangling.replace(&text, "").into_owned()
}

fn collapse_spacing(text: &str, newline_runs: &Regex) -> String {
    let mut collapsed = text.to_string();
    while collapsed.contains("  ") {
        collapsed = collapsed.replace("  ", " ");
    }
    newline_runs
        .replace_all(&collapsed, "\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_thai_is_unchanged() {
        assert_eq!(normalize_thai("เนื้อหา จริง"), "เนื้อหา จริง");
        assert_eq!(normalize_thai("ฝนตกหนักบางแห่ง"), "ฝนตกหนักบางแห่ง");
    }

    #[test]
    fn removes_zero_width_and_duplicate_spaces() {
        assert_eq!(normalize_thai("  ฝน\u{200B}ตก   หนัก  "), "ฝนตก หนัก");
        assert_eq!(normalize_thai("ก \n \n ข"), "ก\nข");
    }

    #[test]
    fn merges_double_sara_e_into_sara_ae() {
        assert_eq!(normalize_thai("เเม่"), "แม่");
    }

    #[test]
    fn moves_tone_mark_after_vowel() {
        // tone mark typed before sara i
        assert_eq!(normalize_thai("ก\u{0E48}\u{0E34}"), "ก\u{0E34}\u{0E48}");
        // sara aa typed before tone mark
        assert_eq!(normalize_thai("ก\u{0E32}\u{0E49}"), "ก\u{0E49}\u{0E32}");
    }

    #[test]
    fn nikhahit_plus_sara_aa_becomes_sara_am() {
        assert_eq!(normalize_thai("ต\u{0E4D}\u{0E48}\u{0E32}"), "ต\u{0E48}\u{0E33}");
        assert_eq!(normalize_thai("ก\u{0E4D}\u{0E32}"), "กำ");
    }

    #[test]
    fn removes_repeated_vowels_and_tone_marks() {
        assert_eq!(normalize_thai("ก\u{0E32}\u{0E32}"), "ก\u{0E32}");
        assert_eq!(normalize_thai("ก\u{0E48}\u{0E49}"), "ก\u{0E49}");
    }

    #[test]
    fn lakkhangyao_becomes_sara_aa_except_after_rue_lue() {
        assert_eq!(normalize_thai("ก\u{0E45}"), "ก\u{0E32}");
        assert_eq!(normalize_thai("ฤ\u{0E45}"), "ฤ\u{0E45}");
    }

    #[test]
    fn strips_leading_dangling_marks() {
        assert_eq!(normalize_thai("\u{0E48}\u{0E34}ฝน"), "ฝน");
    }

    #[test]
    fn normalization_is_idempotent_on_mixed_text() {
        let once = normalize_thai("เเม่น้ำ\u{200C}  ไหล\u{0E4D}\u{0E32}");
        assert_eq!(normalize_thai(&once), once);
    }
}
