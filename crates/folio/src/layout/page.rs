use super::filter::filter_words;
use super::lines::group_words_into_lines;
use super::paragraphs::group_lines_into_paragraphs;
use crate::Result;
use crate::core::config::LayoutConfig;
use crate::types::{PageLayout, PageResult, WordRecords};

/// Reconstruct one page with full geometry.
///
/// Runs word filtering, line grouping and paragraph grouping in sequence. A page
/// whose tokens are all rejected yields a layout with no paragraphs.
///
/// # Errors
///
/// `FolioError::MalformedInput` when the record arrays disagree in length.
pub fn reconstruct_page_layout(page_number: usize, records: &WordRecords, config: &LayoutConfig) -> Result<PageLayout> {
    let words = filter_words(records, config)?;
    if words.is_empty() {
        tracing::debug!(page_number, "page has no recognized words");
        return Ok(PageLayout {
            page_number,
            paragraphs: Vec::new(),
        });
    }

    let word_count = words.len();
    let lines = group_words_into_lines(words, config.line_tolerance);
    let line_count = lines.len();
    let paragraphs = group_lines_into_paragraphs(lines, config);

    tracing::debug!(
        page_number,
        words = word_count,
        lines = line_count,
        paragraphs = paragraphs.len(),
        "reconstructed page"
    );

    Ok(PageLayout {
        page_number,
        paragraphs,
    })
}

/// Reconstruct one page as ordered, addressed paragraph text.
///
/// Paragraph indices start at 0 and follow top-to-bottom order. The function
/// is pure: identical records and config always give an identical result.
///
/// # Example
///
/// ```rust
/// use folio::core::config::LayoutConfig;
/// use folio::layout::reconstruct_page;
/// use folio::types::WordRecords;
///
/// let mut records = WordRecords::new();
/// records.push(0, 0, 10, 10, "Hello", 0.9);
/// records.push(15, 0, 10, 10, "World", 0.9);
///
/// let page = reconstruct_page(1, &records, &LayoutConfig::default()).unwrap();
/// assert_eq!(page.paragraphs.len(), 1);
/// assert_eq!(page.paragraphs[0].text, "Hello World");
/// ```
pub fn reconstruct_page(page_number: usize, records: &WordRecords, config: &LayoutConfig) -> Result<PageResult> {
    reconstruct_page_layout(page_number, records, config).map(PageResult::from)
}
