use crate::Result;
use crate::core::config::LayoutConfig;
use crate::types::{Word, WordRecords};

/// Turn raw OCR records into reading-ordered words.
///
/// Keeps tokens with `confidence > config.min_confidence`, non-blank text and a
/// non-degenerate box; text is trimmed. The result is stably sorted by `(y, x)`,
/// so tokens sharing a position keep the engine's relative order.
///
/// # Errors
///
/// `FolioError::MalformedInput` when the record arrays disagree in length.
/// Nothing is emitted in that case.
pub fn filter_words(records: &WordRecords, config: &LayoutConfig) -> Result<Vec<Word>> {
    let n = records.checked_len()?;

    let mut words: Vec<Word> = (0..n)
        .filter_map(|i| {
            let text = records.text[i].trim();
            let confidence = records.confidence[i];
            let (width, height) = (records.width[i], records.height[i]);

            if confidence > config.min_confidence && !text.is_empty() && width > 0 && height > 0 {
                Some(Word::new(records.left[i], records.top[i], width, height, text, confidence))
            } else {
                None
            }
        })
        .collect();

    words.sort_by_key(|w| (w.y, w.x));

    if words.len() < n {
        tracing::trace!(kept = words.len(), dropped = n - words.len(), "filtered OCR tokens");
    }

    Ok(words)
}
