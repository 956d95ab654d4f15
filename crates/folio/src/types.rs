//! Core data types: OCR word records, geometry, lines, paragraphs and results.
//!
//! Everything here is an owned value. A [`Word`] is owned by the [`Line`] that
//! consumes it, a `Line` by its [`Paragraph`]; nothing is shared or mutated once
//! built. Coordinates are page pixels with the origin at the top-left corner.
use crate::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Raw per-token OCR output for one page, as parallel arrays.
///
/// This is the shape OCR engines such as Tesseract report (`image_to_data`):
/// one entry per detected token, in arbitrary order. A confidence `<= 0` means
/// the engine rejected the token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordRecords {
    pub left: Vec<i32>,
    pub top: Vec<i32>,
    pub width: Vec<i32>,
    pub height: Vec<i32>,
    pub text: Vec<String>,
    pub confidence: Vec<f64>,
}

impl WordRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build records from already-constructed words, preserving their order.
    pub fn from_words(words: &[Word]) -> Self {
        let mut records = Self::new();
        for word in words {
            records.push(word.x, word.y, word.width, word.height, word.text.clone(), word.confidence);
        }
        records
    }

    /// Append one token to every array.
    pub fn push(&mut self, left: i32, top: i32, width: i32, height: i32, text: impl Into<String>, confidence: f64) {
        self.left.push(left);
        self.top.push(top);
        self.width.push(width);
        self.height.push(height);
        self.text.push(text.into());
        self.confidence.push(confidence);
    }

    /// Number of tokens, or `MalformedInput` if the arrays disagree in length.
    pub fn checked_len(&self) -> Result<usize> {
        let n = self.text.len();
        let lengths = [
            ("left", self.left.len()),
            ("top", self.top.len()),
            ("width", self.width.len()),
            ("height", self.height.len()),
            ("confidence", self.confidence.len()),
        ];

        if let Some((name, len)) = lengths.iter().find(|(_, len)| *len != n) {
            return Err(FolioError::malformed_input(format!(
                "word record arrays disagree in length: text has {} entries, {} has {}",
                n, name, len
            )));
        }

        Ok(n)
    }
}

/// One recognized token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub text: String,
    pub confidence: f64,
}

impl Word {
    pub fn new(x: i32, y: i32, width: i32, height: i32, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            text: text.into(),
            confidence,
        }
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }
}

/// Axis-aligned box, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Minimal box enclosing all of `boxes`, or `None` when there are none.
    pub fn enclosing<I>(boxes: I) -> Option<Self>
    where
        I: IntoIterator<Item = BoundingBox>,
    {
        let mut iter = boxes.into_iter();
        let first = iter.next()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.right(), first.bottom());

        for b in iter {
            x0 = x0.min(b.x);
            y0 = y0.min(b.y);
            x1 = x1.max(b.right());
            y1 = y1.max(b.bottom());
        }

        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Whether `other` lies entirely inside this box (edges inclusive).
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x && other.y >= self.y && other.right() <= self.right() && other.bottom() <= self.bottom()
    }
}

/// A horizontal run of words sharing a baseline, ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    words: Vec<Word>,
    bbox: BoundingBox,
}

impl Line {
    /// Build a line from its words; returns `None` for an empty word list.
    ///
    /// Words are re-sorted by `x` (stable, so equal `x` keeps input order).
    pub fn from_words(mut words: Vec<Word>) -> Option<Self> {
        let bbox = BoundingBox::enclosing(words.iter().map(Word::bbox))?;
        words.sort_by_key(|w| w.x);
        Some(Self { words, bbox })
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Word texts joined by a single space.
    pub fn text(&self) -> String {
        self.words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ")
    }
}

/// A vertical run of lines judged to belong to one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    lines: Vec<Line>,
    bbox: BoundingBox,
    text: String,
}

impl Paragraph {
    /// Build a paragraph from lines in top-to-bottom order; `None` when empty.
    pub fn from_lines(lines: Vec<Line>) -> Option<Self> {
        let bbox = BoundingBox::enclosing(lines.iter().map(Line::bbox))?;
        let text = lines.iter().map(Line::text).collect::<Vec<_>>().join(" ");
        Some(Self { lines, bbox, text })
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Full geometric reconstruction of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_number: usize,
    pub paragraphs: Vec<Paragraph>,
}

/// One addressed paragraph of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphEntry {
    pub paragraph_index: usize,
    pub text: String,
}

/// Text-only reconstruction of one page.
///
/// `paragraphs` is empty for an OCR-blank page; that is a valid outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub page_number: usize,
    pub paragraphs: Vec<ParagraphEntry>,
}

impl PageResult {
    pub fn empty(page_number: usize) -> Self {
        Self {
            page_number,
            paragraphs: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Paragraph texts separated by a blank line.
    pub fn to_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl From<PageLayout> for PageResult {
    fn from(layout: PageLayout) -> Self {
        Self {
            page_number: layout.page_number,
            paragraphs: layout
                .paragraphs
                .into_iter()
                .enumerate()
                .map(|(paragraph_index, p)| ParagraphEntry {
                    paragraph_index,
                    text: p.into_text(),
                })
                .collect(),
        }
    }
}

/// A page that failed under the best-effort error policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    pub page_number: usize,
    pub error_kind: String,
    pub message: String,
}

impl PageFailure {
    pub fn from_error(page_number: usize, error: &FolioError) -> Self {
        Self {
            page_number,
            error_kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Reconstruction of a page range, in ascending page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub pages: Vec<PageResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<PageFailure>,
}

impl DocumentResult {
    /// `(page_number, paragraph_index, text)` triples in document order.
    pub fn triples(&self) -> impl Iterator<Item = (usize, usize, &str)> + '_ {
        self.pages.iter().flat_map(|page| {
            page.paragraphs
                .iter()
                .map(move |p| (page.page_number, p.paragraph_index, p.text.as_str()))
        })
    }

    pub fn paragraph_count(&self) -> usize {
        self.pages.iter().map(|p| p.paragraphs.len()).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Encoded image of one rasterized page (PNG, JPEG, TIFF, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub page_number: usize,
    pub bytes: Vec<u8>,
}

impl PageImage {
    pub fn new(page_number: usize, bytes: Vec<u8>) -> Self {
        Self { page_number, bytes }
    }
}

/// Inclusive, 1-based page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start == 0 {
            return Err(FolioError::validation("page 0 is invalid (pages start at 1)"));
        }
        if end < start {
            return Err(FolioError::validation(format!(
                "page range end ({}) is before start ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(page_number: usize) -> Result<Self> {
        Self::new(page_number, page_number)
    }

    /// Clamp-free resolution against a document: `None` means the whole document.
    pub fn resolve(range: Option<PageRange>, page_count: usize) -> Result<RangeInclusive<usize>> {
        match range {
            None => Ok(1..=page_count),
            Some(r) if r.end > page_count => Err(FolioError::validation(format!(
                "page {} exceeds document page count ({})",
                r.end, page_count
            ))),
            Some(r) => Ok(r.start..=r.end),
        }
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for PageRange {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| FolioError::validation(format!("invalid page number: '{}'", part.trim())))
        };

        match s.split_once('-') {
            Some((start, end)) => Self::new(parse(start)?, parse(end)?),
            None => Self::single(parse(s)?),
        }
    }
}
