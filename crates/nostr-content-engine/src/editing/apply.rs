use xi_rope::{Delta, RopeInfo};

use super::transform::edit_delta;
use super::{EditError, Operation, Patch, Step, Transform};
use crate::document::{Block, Doc, Inline, Span, content};

impl Doc {
    /// Applies `ops` in order to a copy of this snapshot.
    ///
    /// Each operation addresses the document as left by the previous one.
    /// The batch fails as a whole on the first invalid operation.
    pub fn apply(&self, ops: &[Operation]) -> Result<Patch, EditError> {
        let mut doc = self.clone();
        let mut steps = Vec::with_capacity(ops.len());
        for op in ops {
            let delta = doc.apply_operation(op)?;
            steps.push(Step::new(op.clone(), delta));
        }
        doc.version += 1;
        log::trace!("applied {} operations, now at version {}", steps.len(), doc.version);
        Ok(Patch {
            doc,
            transform: Transform::new(steps),
        })
    }

    fn apply_operation(&mut self, op: &Operation) -> Result<Delta<RopeInfo>, EditError> {
        let size = self.content_size();
        match op {
            Operation::InsertText { at, text } => {
                self.check_range(Span::at(*at))?;
                let (path, start, updated) = {
                    let tb = self.textblock_at(*at).ok_or(EditError::NotInTextblock(*at))?;
                    let updated = content::insert_text(tb.content(), at - tb.start, text)
                        .map_err(|e| e.shifted(tb.start))?;
                    (tb.path, tb.start, updated)
                };
                self.set_content(&path, start, updated)?;
                Ok(edit_delta(size, Span::at(*at), text))
            }
            Operation::DeleteRange { range } => {
                self.replace_range(*range, Vec::new())?;
                Ok(edit_delta(size, *range, ""))
            }
            Operation::ReplaceRange { range, content: fragment } => {
                self.replace_range(*range, fragment.clone())?;
                Ok(edit_delta(size, *range, &content::projection(fragment)))
            }
            Operation::SplitBlock { at } => {
                self.split_block(*at)?;
                Ok(edit_delta(size, Span::at(*at), "\n\n"))
            }
            Operation::AddMark { range, mark } => {
                self.restyle(*range, |c, span| content::add_mark(c, span, mark))?;
                Ok(edit_delta(size, Span::at(0), ""))
            }
            Operation::RemoveMark { range, kind } => {
                self.restyle(*range, |c, span| content::remove_mark(c, span, *kind))?;
                Ok(edit_delta(size, Span::at(0), ""))
            }
        }
    }

    fn check_range(&self, range: Span) -> Result<(), EditError> {
        if range.from > range.to {
            return Err(EditError::InvertedRange {
                from: range.from,
                to: range.to,
            });
        }
        let size = self.content_size();
        if range.to > size {
            return Err(EditError::OutOfRange { pos: range.to, size });
        }
        Ok(())
    }

    fn set_content(&mut self, path: &[usize], pos: usize, updated: Vec<Inline>) -> Result<(), EditError> {
        let slot = self
            .block_mut(path)
            .and_then(Block::inline_content_mut)
            .ok_or(EditError::NotInTextblock(pos))?;
        *slot = updated;
        Ok(())
    }

    /// Replaces `range` with `fragment`, joining sibling textblocks when the
    /// range runs from one into another.
    fn replace_range(&mut self, range: Span, fragment: Vec<Inline>) -> Result<(), EditError> {
        self.check_range(range)?;
        let first = self
            .textblock_at(range.from)
            .ok_or(EditError::NotInTextblock(range.from))?;
        let last = self
            .textblock_at(range.to)
            .ok_or(EditError::NotInTextblock(range.to))?;

        if first.path == last.path {
            let local = Span::new(range.from - first.start, range.to - first.start);
            let updated =
                content::replace(first.content(), local, fragment).map_err(|e| e.shifted(first.start))?;
            let (path, start) = (first.path, first.start);
            return self.set_content(&path, start, updated);
        }

        let (first_parent, first_index) = split_path(&first.path);
        let (last_parent, last_index) = split_path(&last.path);
        if first_parent != last_parent {
            return Err(EditError::CrossesBlocks {
                from: range.from,
                to: range.to,
            });
        }
        let (head, _) = content::split_at(first.content(), range.from - first.start)
            .map_err(|e| e.shifted(first.start))?;
        let (_, tail) =
            content::split_at(last.content(), range.to - last.start).map_err(|e| e.shifted(last.start))?;
        let mut joined = head;
        joined.extend(fragment);
        joined.extend(tail);
        let block = first.block.with_inline_content(content::normalize(joined));
        let parent = first_parent.to_vec();

        let container = self
            .container_mut(&parent)
            .ok_or(EditError::NotInTextblock(range.from))?;
        container.splice(first_index..=last_index, [block]);
        Ok(())
    }

    fn split_block(&mut self, at: usize) -> Result<(), EditError> {
        self.check_range(Span::at(at))?;
        let tb = self.textblock_at(at).ok_or(EditError::NotInTextblock(at))?;
        let (left, right) = content::split_at(tb.content(), at - tb.start).map_err(|e| e.shifted(tb.start))?;
        let pair = [tb.block.with_inline_content(left), tb.block.with_inline_content(right)];
        let (parent, index) = split_path(&tb.path);
        let parent = parent.to_vec();

        let container = self.container_mut(&parent).ok_or(EditError::NotInTextblock(at))?;
        container.splice(index..=index, pair);
        Ok(())
    }

    /// Rewrites the content of every textblock `range` covers part of.
    fn restyle(
        &mut self,
        range: Span,
        update: impl Fn(&[Inline], Span) -> Result<Vec<Inline>, EditError>,
    ) -> Result<(), EditError> {
        self.check_range(range)?;
        let mut rewrites = Vec::new();
        for tb in self.textblocks() {
            let span = tb.span();
            let from = range.from.max(span.from);
            let to = range.to.min(span.to);
            if from >= to {
                continue;
            }
            let local = Span::new(from - tb.start, to - tb.start);
            let updated = update(tb.content(), local).map_err(|e| e.shifted(tb.start))?;
            rewrites.push((tb.path, tb.start, updated));
        }
        for (path, start, updated) in rewrites {
            self.set_content(&path, start, updated)?;
        }
        Ok(())
    }
}

fn split_path(path: &[usize]) -> (&[usize], usize) {
    match path.split_last() {
        Some((&index, parent)) => (parent, index),
        None => (&[], 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Atom, Mark, MarkKind};
    use pretty_assertions::assert_eq;
    use xi_rope::Rope;

    fn doc() -> Doc {
        Doc::new(vec![
            Block::paragraph_text("hello world"),
            Block::Blockquote {
                content: vec![Block::paragraph_text("quoted")],
            },
            Block::paragraph_text("tail"),
        ])
    }

    /// Applies each operation on its own and checks its delta turns the old
    /// projection into the new one.
    fn apply_checked(doc: &Doc, ops: &[Operation]) -> Doc {
        let mut current = doc.clone();
        for op in ops {
            let patch = current.apply(std::slice::from_ref(op)).unwrap();
            let delta = patch.transform.steps()[0].delta();
            let rope = Rope::from(current.projection().as_str());
            assert_eq!(delta.apply(&rope).to_string(), patch.doc.projection(), "{op:?}");
            current = patch.doc;
        }
        current
    }

    #[test]
    fn insert_text_inherits_marks() {
        let doc = Doc::new(vec![Block::paragraph(vec![Inline::marked("bold", vec![Mark::Bold])])]);
        let after = apply_checked(
            &doc,
            &[Operation::InsertText {
                at: 5,
                text: "er".into(),
            }],
        );
        assert_eq!(
            after.blocks[0],
            Block::paragraph(vec![Inline::marked("bolder", vec![Mark::Bold])])
        );
    }

    #[test]
    fn delete_within_a_block() {
        let after = apply_checked(&doc(), &[Operation::DeleteRange { range: Span::new(6, 12) }]);
        assert_eq!(after.blocks[0], Block::paragraph_text("hello"));
    }

    #[test]
    fn replace_with_an_atom() {
        let atom = Inline::Atom(Atom::Video {
            src: "https://x.com/a.mp4".into(),
            fallback: "world".into(),
        });
        let after = apply_checked(
            &doc(),
            &[Operation::ReplaceRange {
                range: Span::new(7, 12),
                content: vec![atom.clone()],
            }],
        );
        assert_eq!(after.blocks[0], Block::paragraph(vec![Inline::text("hello "), atom]));
        assert_eq!(after.content_size(), doc().content_size() - 4);
    }

    #[test]
    fn split_and_rejoin() {
        let split = apply_checked(&doc(), &[Operation::SplitBlock { at: 6 }]);
        assert_eq!(split.blocks[0], Block::paragraph_text("hello"));
        assert_eq!(split.blocks[1], Block::paragraph_text(" world"));

        let joined = apply_checked(&split, &[Operation::DeleteRange { range: Span::new(6, 8) }]);
        assert_eq!(joined.blocks, doc().blocks);
    }

    #[test]
    fn ranges_across_non_siblings_are_rejected() {
        let err = doc().apply(&[Operation::DeleteRange { range: Span::new(3, 17) }]);
        assert_eq!(err.unwrap_err(), EditError::CrossesBlocks { from: 3, to: 17 });
    }

    #[test]
    fn marks_span_several_blocks() {
        let after = apply_checked(
            &doc(),
            &[
                Operation::AddMark {
                    range: Span::new(7, 22),
                    mark: Mark::Italic,
                },
                Operation::RemoveMark {
                    range: Span::new(0, 10),
                    kind: MarkKind::Italic,
                },
            ],
        );
        assert_eq!(
            after.blocks[0],
            Block::paragraph(vec![Inline::text("hello wor"), Inline::marked("ld", vec![Mark::Italic])])
        );
        assert_eq!(
            after.blocks[1],
            Block::Blockquote {
                content: vec![Block::paragraph(vec![Inline::marked("quoted", vec![Mark::Italic])])],
            }
        );
        assert_eq!(after.blocks[2], Block::paragraph_text("tail"));
    }

    #[test]
    fn batches_bump_the_version_once() {
        let patch = doc()
            .apply(&[
                Operation::InsertText {
                    at: 1,
                    text: "a".into(),
                },
                Operation::InsertText {
                    at: 2,
                    text: "b".into(),
                },
            ])
            .unwrap();
        assert_eq!(patch.version(), 1);
        assert_eq!(patch.doc.blocks[0], Block::paragraph_text("abhello world"));
    }

    #[test]
    fn invalid_positions() {
        let d = doc();
        assert_eq!(
            d.apply(&[Operation::InsertText { at: 0, text: "x".into() }]).unwrap_err(),
            EditError::NotInTextblock(0)
        );
        assert_eq!(
            d.apply(&[Operation::DeleteRange { range: Span::new(5, 2) }]).unwrap_err(),
            EditError::InvertedRange { from: 5, to: 2 }
        );
        assert!(matches!(
            d.apply(&[Operation::SplitBlock { at: 99 }]),
            Err(EditError::OutOfRange { pos: 99, .. })
        ));
    }
}
