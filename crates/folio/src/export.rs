//! Per-page text export.
//!
//! Layout on disk:
//!
//! ```text
//! <dir>/page_1/paragraph_texts.txt
//! <dir>/page_2/paragraph_texts.txt
//! ```
//!
//! Each file holds the page's paragraphs separated by one blank line.

use crate::types::{DocumentResult, PageResult, ParagraphEntry};
use crate::{FolioError, Result};
use std::path::Path;
use tokio::fs;

pub const PARAGRAPH_TEXTS_FILE: &str = "paragraph_texts.txt";
const PAGE_DIR_PREFIX: &str = "page_";
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Write one `page_<n>/paragraph_texts.txt` per reconstructed page.
///
/// Blank pages produce an empty file so every processed page is visible on disk.
pub async fn write_paragraph_texts(dir: impl AsRef<Path>, document: &DocumentResult) -> Result<()> {
    let dir = dir.as_ref();
    for page in &document.pages {
        let page_dir = dir.join(format!("{}{}", PAGE_DIR_PREFIX, page.page_number));
        fs::create_dir_all(&page_dir).await?;
        fs::write(page_dir.join(PARAGRAPH_TEXTS_FILE), page.to_text()).await?;
    }

    tracing::debug!(dir = %dir.display(), pages = document.pages.len(), "exported paragraph texts");
    Ok(())
}

/// Read pages written by [`write_paragraph_texts`], in ascending page order.
///
/// Directories that are not `page_<n>` or lack a text file are ignored.
pub async fn read_paragraph_texts(dir: impl AsRef<Path>) -> Result<Vec<PageResult>> {
    let dir = dir.as_ref();
    let mut entries = fs::read_dir(dir).await?;
    let mut pages = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(page_number) = name
            .to_str()
            .and_then(|n| n.strip_prefix(PAGE_DIR_PREFIX))
            .and_then(|n| n.parse::<usize>().ok())
        else {
            continue;
        };

        let text_path = entry.path().join(PARAGRAPH_TEXTS_FILE);
        if !fs::try_exists(&text_path).await? {
            continue;
        }

        let content = fs::read_to_string(&text_path).await.map_err(|e| {
            FolioError::malformed_input_with_source(format!("unreadable page text file {}", text_path.display()), e)
        })?;

        pages.push(PageResult {
            page_number,
            paragraphs: split_paragraphs(&content),
        });
    }

    pages.sort_by_key(|p| p.page_number);
    Ok(pages)
}

fn split_paragraphs(content: &str) -> Vec<ParagraphEntry> {
    if content.is_empty() {
        return Vec::new();
    }

    content
        .split(PARAGRAPH_SEPARATOR)
        .enumerate()
        .map(|(paragraph_index, text)| ParagraphEntry {
            paragraph_index,
            text: text.to_string(),
        })
        .collect()
}
