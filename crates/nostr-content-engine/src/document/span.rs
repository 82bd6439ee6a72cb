use std::ops::Range;

use serde::Serialize;

/// A half-open range `[from, to)` of positions.
///
/// Used both for offsets into a plain string (matcher output) and for
/// positions in a [`Doc`](super::Doc). A span never owns text; slicing the
/// source with it reproduces the exact characters it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Span {
    /// Inclusive start position.
    pub from: usize,
    /// Exclusive end position.
    pub to: usize,
}

impl Span {
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// A zero-width span at `pos`.
    pub const fn at(pos: usize) -> Self {
        Self { from: pos, to: pos }
    }

    /// Returns the length. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.to.saturating_sub(self.from)
    }

    /// Returns true if the span is empty (from >= to).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Shifts both ends forward by `by`.
    #[must_use]
    pub fn offset(self, by: usize) -> Self {
        Self::new(self.from + by, self.to + by)
    }

    /// True when the spans share at least one position.
    pub fn intersects(self, other: Span) -> bool {
        self.from < other.to && other.from < self.to
    }

    /// True when the spans intersect or meet end to end.
    pub fn touches(self, other: Span) -> bool {
        self.from <= other.to && other.from <= self.to
    }

    pub fn contains(self, other: Span) -> bool {
        self.from <= other.from && other.to <= self.to
    }

    /// Smallest span covering both.
    #[must_use]
    pub fn union(self, other: Span) -> Self {
        Self::new(self.from.min(other.from), self.to.max(other.to))
    }

    pub fn range(self) -> Range<usize> {
        self.from..self.to
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_saturates_for_inverted_spans() {
        assert_eq!(Span::new(5, 3).len(), 0);
        assert!(Span::new(5, 3).is_empty());
    }

    #[test]
    fn adjacent_spans_touch_but_do_not_intersect() {
        let a = Span::new(0, 4);
        let b = Span::new(4, 8);
        assert!(!a.intersects(b));
        assert!(a.touches(b));
    }

    #[test]
    fn single_position_overlap_intersects() {
        assert!(Span::new(0, 5).intersects(Span::new(4, 9)));
    }

    #[test]
    fn collapsed_span_touches_its_neighbours() {
        let caret = Span::at(4);
        assert!(caret.touches(Span::new(0, 4)));
        assert!(caret.touches(Span::new(4, 6)));
        assert!(!caret.intersects(Span::new(0, 4)));
    }

    #[test]
    fn union_and_offset() {
        assert_eq!(Span::new(2, 4).union(Span::new(6, 9)), Span::new(2, 9));
        assert_eq!(Span::new(2, 4).offset(10), Span::new(12, 14));
    }
}
