//! Structural reconstruction of a page from word-level OCR output.
//!
//! The pipeline runs strictly forward:
//!
//! 1. [`filter_words`] drops rejected or blank tokens and orders the rest by `(y, x)`.
//! 2. [`group_words_into_lines`] clusters words sharing a baseline.
//! 3. [`group_lines_into_paragraphs`] splits lines on a gap derived from the
//!    page's own median line spacing.
//! 4. [`reconstruct_page`] runs the three stages and addresses the paragraphs.
//!
//! Every stage is a pure function of its input and a [`LayoutConfig`]; no state
//! survives a call.
//!
//! [`LayoutConfig`]: crate::core::config::LayoutConfig
pub mod filter;
pub mod lines;
pub mod page;
pub mod paragraphs;

pub use filter::filter_words;
pub use lines::{LineBuilder, group_words_into_lines, line_boxes};
pub use page::{reconstruct_page, reconstruct_page_layout};
pub use paragraphs::{ParagraphBuilder, group_lines_into_paragraphs, median, paragraph_threshold};
