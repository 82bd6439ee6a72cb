/*!
 * # Edit model
 *
 * The host side of incremental matching: a [`Doc`](crate::document::Doc) is
 * an immutable snapshot, edits are [`Operation`]s, and applying a batch of
 * them yields a new snapshot plus a [`Transform`] describing what moved.
 *
 * ## Deltas
 *
 * Every applied operation is recorded as one `xi_rope` delta over the
 * whole-document projection (see [`Doc::projection`](crate::document::Doc::projection)):
 *
 * - text insertion, deletion and replacement become a single replace
 * - a block split inserts the two boundary tokens it creates
 * - mark changes leave positions untouched and record an identity delta
 *
 * Deltas are what [`Transform::map`] and [`Transform::changed_ranges`] work
 * from; the tree itself is never consulted to map a position.
 */

mod apply;
pub mod patch;
pub mod transform;

use crate::document::{Inline, Mark, MarkKind, Span};

pub use patch::Patch;
pub use transform::{Assoc, ChangedRange, Step, Transform};

/// A primitive edit, addressed in document positions.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Inserts text, inheriting the marks of the text it lands in.
    InsertText { at: usize, text: String },
    DeleteRange { range: Span },
    /// Replaces a range with an inline fragment. A range spanning sibling
    /// textblocks joins them into the first.
    ReplaceRange { range: Span, content: Vec<Inline> },
    /// Splits the textblock at `at` into two blocks of the same kind.
    SplitBlock { at: usize },
    AddMark { range: Span, mark: Mark },
    RemoveMark { range: Span, kind: MarkKind },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::InsertText { .. } => "insert_text",
            Operation::DeleteRange { .. } => "delete_range",
            Operation::ReplaceRange { .. } => "replace_range",
            Operation::SplitBlock { .. } => "split_block",
            Operation::AddMark { .. } => "add_mark",
            Operation::RemoveMark { .. } => "remove_mark",
        }
    }

    /// True for operations that move or change content rather than styling.
    pub fn changes_content(&self) -> bool {
        !matches!(self, Operation::AddMark { .. } | Operation::RemoveMark { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("position {pos} is outside the document (size {size})")]
    OutOfRange { pos: usize, size: usize },

    #[error("range {from}..{to} ends before it starts")]
    InvertedRange { from: usize, to: usize },

    #[error("position {0} is not inside a textblock")]
    NotInTextblock(usize),

    #[error("position {0} is not on a character boundary")]
    NotCharBoundary(usize),

    #[error("range {from}..{to} crosses blocks that are not siblings")]
    CrossesBlocks { from: usize, to: usize },
}

impl EditError {
    /// Re-expresses an error raised against a slice starting at `by`.
    pub(crate) fn shifted(self, by: usize) -> Self {
        match self {
            EditError::OutOfRange { pos, size } => EditError::OutOfRange {
                pos: pos + by,
                size: size + by,
            },
            EditError::NotCharBoundary(pos) => EditError::NotCharBoundary(pos + by),
            EditError::NotInTextblock(pos) => EditError::NotInTextblock(pos + by),
            other => other,
        }
    }
}
