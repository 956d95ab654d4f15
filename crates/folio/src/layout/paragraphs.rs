use crate::core::config::LayoutConfig;
use crate::types::{Line, Paragraph};

/// Median of `values`; the mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Page-adaptive paragraph-break gap.
///
/// `median(top[i+1] - top[i]) * spacing_multiplier`, or the fixed fallback
/// when fewer than two lines leave no spacing to measure.
pub fn paragraph_threshold(lines: &[Line], config: &LayoutConfig) -> f64 {
    let gaps: Vec<f64> = lines
        .windows(2)
        .map(|pair| f64::from(pair[1].bbox().y) - f64::from(pair[0].bbox().y))
        .collect();

    match median(&gaps) {
        Some(m) => m * config.spacing_multiplier,
        None => config.fallback_paragraph_gap,
    }
}

/// Accumulator for the paragraph currently being built.
#[derive(Debug)]
pub struct ParagraphBuilder {
    lines: Vec<Line>,
    threshold: f64,
}

impl ParagraphBuilder {
    pub fn new(threshold: f64) -> Self {
        Self {
            lines: Vec::new(),
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// A line joins when the paragraph is empty or the distance from the
    /// bottom of the last accepted line to this line's top is below the threshold.
    pub fn accepts(&self, line: &Line) -> bool {
        match self.lines.last() {
            None => true,
            Some(last) => {
                let gap = f64::from(line.bbox().y) - f64::from(last.bbox().bottom());
                gap < self.threshold
            }
        }
    }

    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn flush(&mut self) -> Option<Paragraph> {
        Paragraph::from_lines(std::mem::take(&mut self.lines))
    }
}

/// Cluster top-to-bottom lines into paragraphs.
pub fn group_lines_into_paragraphs(lines: Vec<Line>, config: &LayoutConfig) -> Vec<Paragraph> {
    let threshold = paragraph_threshold(&lines, config);
    tracing::trace!(lines = lines.len(), threshold, "grouping lines into paragraphs");

    let mut builder = ParagraphBuilder::new(threshold);
    let mut paragraphs = Vec::new();

    for line in lines {
        if !builder.accepts(&line) {
            paragraphs.extend(builder.flush());
        }
        builder.push(line);
    }
    paragraphs.extend(builder.flush());

    paragraphs
}
