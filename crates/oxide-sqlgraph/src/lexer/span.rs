//! Source location tracking for tokens and clause fragments.

/// Byte range of a token or fragment in the statement text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the slice of `source` covered by this span, trimmed.
    ///
    /// Out-of-range or reversed spans yield an empty string.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).map_or("", str::trim)
    }
}
