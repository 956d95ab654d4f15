use super::utils::{TSV_MIN_FIELDS, TSV_WORD_LEVEL};
use crate::types::WordRecords;
use crate::{FolioError, Result};
use std::str::FromStr;

/// Convert Tesseract TSV output (`tesseract ... tsv`) into word records.
///
/// Only word-level rows (level 5) are kept. Rows with confidence `-1` are kept
/// as-is; word filtering rejects them later.
///
/// # Errors
///
/// `FolioError::MalformedInput` naming the 1-based line when a word row is
/// truncated or carries a non-numeric geometry or confidence field.
pub fn parse_tsv(tsv_data: &str) -> Result<WordRecords> {
    let mut records = WordRecords::new();

    for (index, line) in tsv_data.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() || line.starts_with("level") {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let level = field::<u32>(&fields, 0, line_number)?;
        if level != TSV_WORD_LEVEL {
            continue;
        }

        if fields.len() < TSV_MIN_FIELDS {
            return Err(FolioError::malformed_input(format!(
                "TSV line {}: expected at least {} columns, found {}",
                line_number,
                TSV_MIN_FIELDS,
                fields.len()
            )));
        }

        records.push(
            field(&fields, 6, line_number)?,
            field(&fields, 7, line_number)?,
            field(&fields, 8, line_number)?,
            field(&fields, 9, line_number)?,
            fields.get(11).copied().unwrap_or_default(),
            field(&fields, 10, line_number)?,
        );
    }

    Ok(records)
}

fn field<T: FromStr>(fields: &[&str], column: usize, line_number: usize) -> Result<T> {
    let raw = fields.get(column).copied().unwrap_or_default().trim();
    raw.parse().map_err(|_| {
        FolioError::malformed_input(format!(
            "TSV line {}: column {} is not a number: '{}'",
            line_number,
            column + 1,
            raw
        ))
    })
}
