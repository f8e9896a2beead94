// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source positions.
//!
//! A [`Span`] is a half-open byte range into the original source text. Spans
//! are attached to every token, AST node, and diagnostic; line and column
//! numbers are only derived at reporting time via [`LineIndex`], so the hot
//! paths never carry display-oriented position data.

use std::ops::Range;

/// A half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Span {
    start: u32,
    end: u32,
}

impl Span {
    /// Creates a span from byte offsets.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Creates an empty span at a single offset.
    #[must_use]
    pub const fn point(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    /// Start byte offset.
    #[must_use]
    pub const fn start(self) -> u32 {
        self.start
    }

    /// End byte offset (exclusive).
    #[must_use]
    pub const fn end(self) -> u32 {
        self.end
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start >= self.end
    }

    /// Whether `offset` falls inside the span.
    #[must_use]
    pub const fn contains(self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The span as a `usize` range, for slicing source text.
    #[must_use]
    pub fn as_range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl From<Range<usize>> for Span {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start as u32, range.end as u32)
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        Self::new((span.start as usize).into(), span.len() as usize)
    }
}

/// Maps byte offsets to one-based line and column numbers.
///
/// Built once per report from the source text; columns are byte-based, which
/// matches how the lexer measured them.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    /// Indexes `source`, recording the start offset of every line.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self {
            line_starts,
            len: source.len() as u32,
        }
    }

    /// One-based `(line, column)` for a byte offset.
    ///
    /// Offsets past the end of the source resolve to the final position, so
    /// end-of-input diagnostics still render on the last line.
    #[must_use]
    pub fn position(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        #[expect(
            clippy::cast_possible_truncation,
            reason = "line count is bounded by the u32 source length"
        )]
        let line_number = line as u32 + 1;
        (line_number, offset - self.line_starts[line] + 1)
    }

    /// The full text of a one-based line, without its trailing newline.
    #[must_use]
    pub fn line_text<'src>(&self, source: &'src str, line: u32) -> &'src str {
        let line = line.saturating_sub(1) as usize;
        let Some(&start) = self.line_starts.get(line) else {
            return "";
        };
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(self.len, |&next| next);
        source[start as usize..end as usize].trim_end_matches(['\n', '\r'])
    }
}
