use std::fmt;

use serde::Serialize;
use xi_rope::delta::{Builder, DeltaElement};
use xi_rope::{Delta, Rope, RopeInfo};

use super::Operation;
use crate::document::Span;

/// Which side a position sticks to when content is inserted exactly there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    /// Stay before the inserted content.
    Before,
    /// Move past the inserted content.
    After,
}

/// One applied operation and the delta it produced.
pub struct Step {
    pub operation: Operation,
    delta: Delta<RopeInfo>,
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("operation", &self.operation)
            .field("segments", &self.segments())
            .finish()
    }
}

impl Step {
    pub(crate) fn new(operation: Operation, delta: Delta<RopeInfo>) -> Self {
        Self { operation, delta }
    }

    pub fn delta(&self) -> &Delta<RopeInfo> {
        &self.delta
    }

    pub fn is_split(&self) -> bool {
        matches!(self.operation, Operation::SplitBlock { .. })
    }

    /// The delta as alternating copied and changed regions covering both the
    /// old and the new document.
    fn segments(&self) -> Vec<Segment> {
        segments(&self.delta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    old: Span,
    new: Span,
    copied: bool,
}

fn segments(delta: &Delta<RopeInfo>) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut old_pos = 0;
    let mut new_pos = 0;
    let mut gap_new_from = 0;
    for el in &delta.els {
        match el {
            DeltaElement::Copy(beg, end) => {
                if *beg != old_pos || new_pos != gap_new_from {
                    out.push(Segment {
                        old: Span::new(old_pos, *beg),
                        new: Span::new(gap_new_from, new_pos),
                        copied: false,
                    });
                }
                out.push(Segment {
                    old: Span::new(*beg, *end),
                    new: Span::new(new_pos, new_pos + (end - beg)),
                    copied: true,
                });
                new_pos += end - beg;
                old_pos = *end;
                gap_new_from = new_pos;
            }
            DeltaElement::Insert(rope) => new_pos += rope.len(),
        }
    }
    if old_pos != delta.base_len || new_pos != gap_new_from {
        out.push(Segment {
            old: Span::new(old_pos, delta.base_len),
            new: Span::new(gap_new_from, new_pos),
            copied: false,
        });
    }
    out
}

/// Maps `pos` across one step's segments, old to new when `forward`.
///
/// Positions inside a changed region land on the side `assoc` picks. A
/// deleted region's own boundaries stay on their side regardless.
fn map_segments(segments: &[Segment], pos: usize, assoc: Assoc, forward: bool) -> usize {
    let mut last = 0;
    for seg in segments {
        let (src, dst) = if forward { (seg.old, seg.new) } else { (seg.new, seg.old) };
        last = dst.to;
        if seg.copied {
            if src.from <= pos && pos < src.to {
                return dst.from + (pos - src.from);
            }
            continue;
        }
        if pos < src.from || pos > src.to {
            continue;
        }
        if !src.is_empty() && pos == src.from {
            return dst.from;
        }
        if !src.is_empty() && pos == src.to {
            return dst.to;
        }
        return match assoc {
            Assoc::Before => dst.from,
            Assoc::After => dst.to,
        };
    }
    last
}

/// Builds the delta for replacing `range` with `inserted` in a projection of
/// length `base_len`.
pub(crate) fn edit_delta(base_len: usize, range: Span, inserted: &str) -> Delta<RopeInfo> {
    let mut builder = Builder::new(base_len);
    if inserted.is_empty() {
        if !range.is_empty() {
            builder.delete(range.range());
        }
    } else {
        builder.replace(range.range(), Rope::from(inserted));
    }
    builder.build()
}

/// A region touched by an edit, in pre-edit (`old`) and post-edit (`new`)
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangedRange {
    pub old: Span,
    pub new: Span,
    /// The region includes a block split.
    pub split: bool,
}

/// The steps of one applied batch, composed.
#[derive(Debug, Default)]
pub struct Transform {
    steps: Vec<Step>,
    history_replay: bool,
}

impl Transform {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            history_replay: false,
        }
    }

    /// Flags the transform as an undo or redo replay.
    #[must_use]
    pub fn history_replay(mut self) -> Self {
        self.history_replay = true;
        self
    }

    pub fn is_history_replay(&self) -> bool {
        self.history_replay
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.steps.iter().map(|s| &s.operation)
    }

    /// False when every step only restyled text.
    pub fn doc_changed(&self) -> bool {
        self.operations().any(Operation::changes_content)
    }

    /// Maps a pre-edit position into post-edit coordinates.
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.steps
            .iter()
            .fold(pos, |pos, step| map_segments(&step.segments(), pos, assoc, true))
    }

    /// Maps a post-edit position back into pre-edit coordinates.
    pub fn map_back(&self, pos: usize, assoc: Assoc) -> usize {
        self.steps
            .iter()
            .rev()
            .fold(pos, |pos, step| map_segments(&step.segments(), pos, assoc, false))
    }

    /// Maps a span so that content inserted at either edge stays outside it.
    pub fn map_span(&self, span: Span) -> Span {
        let from = self.map(span.from, Assoc::After);
        let to = self.map(span.to, Assoc::Before);
        Span::new(from, to.max(from))
    }

    /// Every region the content steps touched, merged where they overlap or
    /// meet.
    ///
    /// Each changed region of a step is carried forward through the later
    /// steps to get its post-edit extent, which is then mapped back through
    /// the whole transform for its pre-edit extent.
    pub fn changed_ranges(&self) -> Vec<ChangedRange> {
        let mut ranges = Vec::new();
        for (i, step) in self.steps.iter().enumerate() {
            if !step.operation.changes_content() {
                continue;
            }
            let later = &self.steps[i + 1..];
            for seg in step.segments().into_iter().filter(|s| !s.copied) {
                let mut new = seg.new;
                for next in later {
                    let segs = next.segments();
                    let from = map_segments(&segs, new.from, Assoc::Before, true);
                    let to = map_segments(&segs, new.to, Assoc::After, true);
                    new = Span::new(from, to.max(from));
                }
                let old_from = self.map_back(new.from, Assoc::Before);
                let old_to = self.map_back(new.to, Assoc::After);
                ranges.push(ChangedRange {
                    old: Span::new(old_from, old_to.max(old_from)),
                    new,
                    split: step.is_split(),
                });
            }
        }
        merge(ranges)
    }
}

fn merge(mut ranges: Vec<ChangedRange>) -> Vec<ChangedRange> {
    ranges.sort_by_key(|r| (r.new.from, r.new.to));
    let mut out: Vec<ChangedRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match out.last_mut() {
            Some(last) if range.new.from <= last.new.to => {
                last.new = last.new.union(range.new);
                last.old = last.old.union(range.old);
                last.split |= range.split;
            }
            _ => out.push(range),
        }
    }
    out
}
