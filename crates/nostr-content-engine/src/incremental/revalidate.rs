use crate::document::{Doc, Mark, MarkRange, Span};
use crate::editing::{ChangedRange, Operation, Transform};
use crate::matching::{HashtagMatcher, LinkMatcher, Match, MatchContext, Matcher, glued_after_atoms};
use crate::structure::{Structured, structure_of};

/// Outcome of re-checking the auto marks an edit touched.
#[derive(Debug, Default)]
pub(crate) struct Revalidation {
    /// `RemoveMark` for marks whose text no longer matches.
    pub removals: Vec<Operation>,
    /// `AddMark` for marks that still match but with new attributes.
    pub reissues: Vec<Operation>,
    /// Marks that hold after the edit, in post-edit coordinates.
    pub retained: Vec<MarkRange>,
    checked: Vec<MarkRange>,
}

impl Revalidation {
    /// Checks every auto mark that touched a changed range before the edit,
    /// followed to where it sits now, plus every auto mark touching a
    /// changed range after it.
    pub fn run(old: &Doc, transform: &Transform, new: &Doc, ranges: &[ChangedRange], ctx: &MatchContext) -> Self {
        let mut out = Self::default();
        for range in ranges {
            for stale in old.mark_ranges(range.old, Mark::is_auto) {
                let mapped = transform.map_span(stale.span);
                if mapped.is_empty() {
                    log::trace!("{:?} at {:?} was deleted", stale.mark.kind(), stale.span);
                    continue;
                }
                let kind = stale.mark.kind();
                for current in new.mark_ranges(mapped, |m| m.kind() == kind) {
                    if current.span.intersects(mapped) {
                        out.check(current, new, ctx);
                    }
                }
            }
            for current in new.mark_ranges(range.new, Mark::is_auto) {
                out.check(current, new, ctx);
            }
        }
        out
    }

    fn check(&mut self, current: MarkRange, doc: &Doc, ctx: &MatchContext) {
        if self.checked.contains(&current) {
            return;
        }
        self.checked.push(current.clone());

        let kind = current.mark.kind();
        let rematched = doc.textblock_at(current.span.from).and_then(|tb| {
            let local = Span::new(current.span.from - tb.start, current.span.to - tb.start);
            let glued = glued_after_atoms(tb.content());
            rematch(&current.mark, &tb.text(), ctx)
                .into_iter()
                .find(|m| m.span == local && !glued.contains(&m.span.from))
        });

        match rematched.map(|m| structure_of(&m, ctx)) {
            Some(Structured::Mark(mark)) if mark == current.mark => self.retained.push(current),
            Some(Structured::Mark(mark)) => {
                log::trace!("re-issuing {kind:?} at {:?}", current.span);
                self.removals.push(Operation::RemoveMark {
                    range: current.span,
                    kind,
                });
                self.reissues.push(Operation::AddMark {
                    range: current.span,
                    mark: mark.clone(),
                });
                self.retained.push(MarkRange {
                    mark,
                    span: current.span,
                });
            }
            _ => {
                log::trace!("{kind:?} at {:?} no longer matches", current.span);
                self.removals.push(Operation::RemoveMark {
                    range: current.span,
                    kind,
                });
            }
        }
    }
}

/// Runs the matcher that produces `mark` over a block's text.
fn rematch(mark: &Mark, text: &str, ctx: &MatchContext) -> Vec<Match> {
    match mark {
        Mark::AutoLink { .. } => LinkMatcher.find(text, ctx),
        Mark::Tag { .. } => HashtagMatcher.find(text, ctx),
        _ => Vec::new(),
    }
}
