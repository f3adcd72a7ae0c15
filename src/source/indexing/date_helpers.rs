use chrono::{Datelike, NaiveDate};

use crate::constants::dates::{BUDDHIST_ERA_OFFSET, FILENAME_DATE_DIGITS, THAI_MONTHS};
use crate::errors::PipelineError;
use crate::types::ThaiDate;

/// Extract the first `YYYYMMDD` run from a filename and render it in the Thai calendar.
///
/// Returns `Ok(None)` when the name has no run of eight ASCII digits, and
/// `PipelineError::MalformedDate` when the digits are not a real calendar date.
pub fn extract_date(filename: &str) -> Result<Option<ThaiDate>, PipelineError> {
    let Some(digits) = first_digit_run(filename, FILENAME_DATE_DIGITS) else {
        return Ok(None);
    };
    let date = NaiveDate::parse_from_str(digits, "%Y%m%d").map_err(|_| {
        PipelineError::MalformedDate {
            digits: digits.to_string(),
        }
    })?;
    Ok(Some(thai_date(&date)))
}

/// Render a Gregorian date as `DD <Thai month> <Buddhist Era year>`.
pub fn thai_date(date: &NaiveDate) -> ThaiDate {
    let month = THAI_MONTHS[date.month0() as usize];
    format!(
        "{:02} {} {}",
        date.day(),
        month,
        date.year() + BUDDHIST_ERA_OFFSET
    )
}

/// First window of `len` consecutive ASCII digits, scanning left to right.
fn first_digit_run(value: &str, len: usize) -> Option<&str> {
    let bytes = value.as_bytes();
    let mut run_start = 0;
    let mut run_len = 0;
    for (idx, byte) in bytes.iter().enumerate() {
        if byte.is_ascii_digit() {
            if run_len == 0 {
                run_start = idx;
            }
            run_len += 1;
            if run_len == len {
                return Some(&value[run_start..=idx]);
            }
        } else {
            run_len = 0;
        }
    }
    None
}
