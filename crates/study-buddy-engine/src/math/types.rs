use serde::Serialize;

use super::kinds::{DisplayMath, InlineMath};

/// A byte range `[start, end)` into the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

/// What a [`Segment`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum SegmentKind {
    /// A literal run of text outside any math delimiters.
    PlainText,
    /// A math expression. `display` is true for `$$...$$`, false for `$...$`.
    Math { display: bool },
}

/// One chunk of scanned text.
///
/// `content` borrows from the scanned input. For math it excludes the
/// delimiters; for plain text it is the literal run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub content: &'a str,
    /// Byte offset of the segment's first byte (the opening delimiter for math).
    pub source_offset: usize,
}

impl<'a> Segment<'a> {
    pub fn plain(content: &'a str, source_offset: usize) -> Self {
        Self {
            kind: SegmentKind::PlainText,
            content,
            source_offset,
        }
    }

    pub fn math(content: &'a str, display: bool, source_offset: usize) -> Self {
        Self {
            kind: SegmentKind::Math { display },
            content,
            source_offset,
        }
    }

    pub fn is_math(&self) -> bool {
        matches!(self.kind, SegmentKind::Math { .. })
    }

    /// Display-mode flag; always false for plain text.
    pub fn display_mode(&self) -> bool {
        matches!(self.kind, SegmentKind::Math { display: true })
    }

    /// The delimiter surrounding the content, empty for plain text.
    pub fn delimiter(&self) -> &'static str {
        match self.kind {
            SegmentKind::PlainText => "",
            SegmentKind::Math { display: true } => DisplayMath::DELIM,
            SegmentKind::Math { display: false } => InlineMath::DELIM,
        }
    }

    /// The exact source text this segment was scanned from, delimiters included.
    pub fn literal(&self) -> String {
        let delim = self.delimiter();
        format!("{delim}{}{delim}", self.content)
    }

    /// Span of the segment in the source, delimiters included.
    pub fn span(&self) -> Span {
        let start = self.source_offset;
        Span {
            start,
            end: start + self.content.len() + 2 * self.delimiter().len(),
        }
    }
}
