use crate::types::{BoundingBox, Line, Word};

/// Accumulator for the line currently being built.
///
/// A word is accepted when the line is empty or its `y` differs from the last
/// accepted word's `y` by less than `word.height * tolerance`.
#[derive(Debug)]
pub struct LineBuilder {
    words: Vec<Word>,
    tolerance: f64,
}

impl LineBuilder {
    pub fn new(tolerance: f64) -> Self {
        Self {
            words: Vec::new(),
            tolerance,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn accepts(&self, word: &Word) -> bool {
        match self.words.last() {
            None => true,
            Some(last) => {
                let dy = (i64::from(word.y) - i64::from(last.y)).abs() as f64;
                dy < f64::from(word.height) * self.tolerance
            }
        }
    }

    pub fn push(&mut self, word: Word) {
        self.words.push(word);
    }

    /// Close the accumulator. Returns `None` if nothing was pushed.
    pub fn flush(&mut self) -> Option<Line> {
        Line::from_words(std::mem::take(&mut self.words))
    }
}

/// Cluster `(y, x)`-ordered words into lines, top to bottom.
pub fn group_words_into_lines(words: Vec<Word>, tolerance: f64) -> Vec<Line> {
    let mut builder = LineBuilder::new(tolerance);
    let mut lines = Vec::new();

    for word in words {
        if !builder.accepts(&word) {
            lines.extend(builder.flush());
        }
        builder.push(word);
    }
    lines.extend(builder.flush());

    lines
}

/// Line boxes, index-aligned with `lines`.
pub fn line_boxes(lines: &[Line]) -> Vec<BoundingBox> {
    lines.iter().map(Line::bbox).collect()
}
