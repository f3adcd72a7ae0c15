//! Detection metadata rendering and persisted encodings.
//!
//! Split files store `image_metadata` either as a nested JSON array
//! (`MetadataEncoding::Native`) or as a mapping-literal string such as
//! `"[{'Cloudy': 2, 'Typhoon': 1}]"` (`MetadataEncoding::Literal`), which is
//! what older cached splits contain. Loading accepts both.

use std::iter::Peekable;
use std::str::CharIndices;

use serde::{Deserialize, Serialize};

use crate::constants::detections::{CLOUDY_LABEL, DAY_LINE_PREFIX, TYPHOON_LABEL};
use crate::data::DetectionCounts;
use crate::errors::PipelineError;
use crate::types::MetadataDisplay;

/// How `image_metadata` is written into persisted split files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MetadataEncoding {
    /// Nested JSON array of `{"Cloudy": n, "Typhoon": n}` objects.
    #[default]
    Native,
    /// Mapping-literal string, for compatibility with existing caches.
    Literal,
}

/// On-disk shape of `image_metadata`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistedMetadata {
    /// Nested array form.
    Native(Vec<DetectionCounts>),
    /// Mapping-literal string form.
    Literal(String),
}

impl PersistedMetadata {
    /// Encode structured counts with the requested encoding.
    pub fn encode(entries: &[DetectionCounts], encoding: MetadataEncoding) -> Self {
        match encoding {
            MetadataEncoding::Native => PersistedMetadata::Native(entries.to_vec()),
            MetadataEncoding::Literal => PersistedMetadata::Literal(to_literal(entries)),
        }
    }

    /// Decode back into structured counts.
    pub fn into_entries(self) -> Result<Vec<DetectionCounts>, PipelineError> {
        match self {
            PersistedMetadata::Native(entries) => Ok(entries),
            PersistedMetadata::Literal(literal) => parse_literal(&literal),
        }
    }
}

/// Render one entry as `{'Cloudy': 2, 'Typhoon': 1}`.
pub fn render_entry(entry: &DetectionCounts) -> String {
    format!(
        "{{'{}': {}, '{}': {}}}",
        CLOUDY_LABEL, entry.cloudy, TYPHOON_LABEL, entry.typhoon
    )
}

/// Render entries as 1-indexed `วันที่ N: {...}` lines joined by newlines.
pub fn render_display(entries: &[DetectionCounts]) -> MetadataDisplay {
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| format!("{} {}: {}", DAY_LINE_PREFIX, idx + 1, render_entry(entry)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Encode entries as a bracketed list literal.
pub fn to_literal(entries: &[DetectionCounts]) -> String {
    let body = entries
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{body}]")
}

/// Parse a list literal of `Cloudy`/`Typhoon` mappings.
///
/// Accepts single or double quoted keys, arbitrary whitespace, any key order,
/// and a trailing comma.
pub fn parse_literal(literal: &str) -> Result<Vec<DetectionCounts>, PipelineError> {
    let mut parser = LiteralParser {
        source: literal,
        chars: literal.char_indices().peekable(),
    };
    let entries = parser.list()?;
    parser.skip_whitespace();
    if let Some((pos, ch)) = parser.chars.next() {
        return Err(parser.error(pos, &format!("unexpected trailing '{ch}'")));
    }
    Ok(entries)
}

struct LiteralParser<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl LiteralParser<'_> {
    fn list(&mut self) -> Result<Vec<DetectionCounts>, PipelineError> {
        self.expect('[')?;
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(']') {
                return Ok(entries);
            }
            entries.push(self.mapping()?);
            self.skip_whitespace();
            if self.eat(']') {
                return Ok(entries);
            }
            self.expect(',')?;
        }
    }

    fn mapping(&mut self) -> Result<DetectionCounts, PipelineError> {
        self.expect('{')?;
        let mut cloudy = None;
        let mut typhoon = None;
        loop {
            self.skip_whitespace();
            if self.eat('}') {
                break;
            }
            let key_pos = self.position();
            let key = self.quoted()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.integer()?;
            match key.as_str() {
                CLOUDY_LABEL => cloudy = Some(value),
                TYPHOON_LABEL => typhoon = Some(value),
                other => return Err(self.error(key_pos, &format!("unknown key '{other}'"))),
            }
            self.skip_whitespace();
            if self.eat('}') {
                break;
            }
            self.expect(',')?;
        }
        match (cloudy, typhoon) {
            (Some(cloudy), Some(typhoon)) => Ok(DetectionCounts { cloudy, typhoon }),
            _ => Err(PipelineError::MetadataLiteral(format!(
                "entry is missing '{CLOUDY_LABEL}' or '{TYPHOON_LABEL}' in '{}'",
                self.source
            ))),
        }
    }

    fn quoted(&mut self) -> Result<String, PipelineError> {
        let pos = self.position();
        let quote = match self.chars.next() {
            Some((_, ch @ ('\'' | '"'))) => ch,
            _ => return Err(self.error(pos, "expected quoted key")),
        };
        let mut key = String::new();
        for (_, ch) in self.chars.by_ref() {
            if ch == quote {
                return Ok(key);
            }
            key.push(ch);
        }
        Err(self.error(pos, "unterminated key"))
    }

    fn integer(&mut self) -> Result<u32, PipelineError> {
        let pos = self.position();
        let mut digits = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            digits.push(ch);
            self.chars.next();
        }
        digits
            .parse::<u32>()
            .map_err(|_| self.error(pos, "expected non-negative integer"))
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}
    }

    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if(|&(_, ch)| ch == expected).is_some()
    }

    fn expect(&mut self, expected: char) -> Result<(), PipelineError> {
        self.skip_whitespace();
        let pos = self.position();
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(pos, &format!("expected '{expected}'")))
        }
    }

    fn position(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(pos, _)| pos)
            .unwrap_or(self.source.len())
    }

    fn error(&self, pos: usize, message: &str) -> PipelineError {
        PipelineError::MetadataLiteral(format!("{message} at byte {pos} of '{}'", self.source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(cloudy: u32, typhoon: u32) -> DetectionCounts {
        DetectionCounts { cloudy, typhoon }
    }

    #[test]
    fn display_is_one_indexed_and_ordered() {
        let display = render_display(&[counts(2, 1), counts(0, 0)]);
        assert_eq!(
            display,
            "วันที่ 1: {'Cloudy': 2, 'Typhoon': 1}\nวันที่ 2: {'Cloudy': 0, 'Typhoon': 0}"
        );
        assert_eq!(render_display(&[]), "");
    }

    #[test]
    fn literal_round_trips_through_parser() {
        let entries = vec![counts(3, 0), counts(1, 2)];
        let literal = to_literal(&entries);
        assert_eq!(literal, "[{'Cloudy': 3, 'Typhoon': 0}, {'Cloudy': 1, 'Typhoon': 2}]");
        assert_eq!(parse_literal(&literal).unwrap(), entries);
        assert_eq!(parse_literal("[]").unwrap(), Vec::new());
    }

    #[test]
    fn literal_parser_accepts_loose_formatting() {
        let parsed =
            parse_literal(" [ {\"Typhoon\":4 ,'Cloudy' : 5}, ] ").unwrap();
        assert_eq!(parsed, vec![counts(5, 4)]);
    }

    #[test]
    fn literal_parser_rejects_malformed_input() {
        for bad in [
            "",
            "[",
            "[{'Cloudy': 1}]",
            "[{'Rain': 1, 'Cloudy': 1, 'Typhoon': 0}]",
            "[{'Cloudy': -1, 'Typhoon': 0}]",
            "[] extra",
        ] {
            let err = parse_literal(bad).unwrap_err();
            assert!(matches!(err, PipelineError::MetadataLiteral(_)), "{bad}");
        }
    }

    #[test]
    fn persisted_metadata_decodes_both_encodings() {
        let entries = vec![counts(2, 1)];
        let native: PersistedMetadata =
            serde_json::from_str(r#"[{"Cloudy": 2, "Typhoon": 1}]"#).unwrap();
        assert_eq!(native.into_entries().unwrap(), entries);

        let literal: PersistedMetadata =
            serde_json::from_str(r#""[{'Cloudy': 2, 'Typhoon': 1}]""#).unwrap();
        assert_eq!(literal.into_entries().unwrap(), entries);

        assert_eq!(
            PersistedMetadata::encode(&entries, MetadataEncoding::Literal),
            PersistedMetadata::Literal("[{'Cloudy': 2, 'Typhoon': 1}]".into())
        );
    }
}
