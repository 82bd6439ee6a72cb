//! # Incremental matching
//!
//! Keeps auto-derived structure correct while a document is edited. After
//! every applied batch the host hands [`MatchSession::on_edit`] the old
//! snapshot, the [`Transform`] and the new snapshot, and appends whatever
//! operations come back to the same edit.
//!
//! A pass only looks at the regions the transform changed:
//!
//! 1. replays of history and styling-only batches are ignored
//! 2. auto marks that touched a changed region are followed through the
//!    transform and re-checked against their text; stale ones are removed
//! 3. textblocks touching a changed region are rescanned and every match
//!    touching the region is resolved against the marks that survived
//! 4. removals come first, then new marks and atoms by descending end
//!
//! An empty result is a real no-op, so feeding the emitted operations back
//! through the host loop settles after one more pass.

mod revalidate;

use std::cmp::Reverse;

use nostr_content_config::Config;

use crate::document::{Doc, Inline};
use crate::editing::{ChangedRange, Operation, Transform};
use crate::matching::{Match, MatchContext, find_all, glued_after_atoms, resolve};
use crate::models::Event;
use crate::parsing;
use crate::structure::{Structured, structure_of};

use revalidate::Revalidation;

/// Matching state for one document being edited.
///
/// The context is fixed for the session; only [`MatchSession::refresh`]
/// swaps it.
#[derive(Debug, Clone, Default)]
pub struct MatchSession {
    context: MatchContext,
}

impl MatchSession {
    pub fn new(context: MatchContext) -> Self {
        Self { context }
    }

    /// A session primed with the event's own imeta tags and references.
    pub fn for_event(event: &Event, config: &Config) -> Self {
        Self::new(parsing::context_for(event, &config.matching, None, None))
    }

    pub fn context(&self) -> &MatchContext {
        &self.context
    }

    pub fn refresh(&mut self, context: MatchContext) {
        self.context = context;
    }

    /// Operations to append to the edit that turned `old` into `new`.
    pub fn on_edit(&self, old: &Doc, transform: &Transform, new: &Doc) -> Vec<Operation> {
        if transform.is_history_replay() {
            log::debug!("history replay, not matching");
            return Vec::new();
        }
        if !transform.doc_changed() {
            log::debug!("styling-only edit, not matching");
            return Vec::new();
        }

        let ranges = transform.changed_ranges();
        let revalidation = Revalidation::run(old, transform, new, &ranges, &self.context);
        let retained: Vec<_> = revalidation
            .retained
            .iter()
            .map(|r| (r, new.text_between(r.span)))
            .collect();
        let is_retained = |m: &Match| {
            retained
                .iter()
                .any(|(r, text)| r.span.from == m.span.from && *text == m.text)
        };

        let accepted = resolve(rescan(new, &ranges, &self.context));
        let fresh: Vec<&Match> = accepted.iter().filter(|m| !is_retained(m)).collect();

        let displaced: Vec<Operation> = retained
            .iter()
            .filter(|(r, _)| fresh.iter().any(|m| m.span.intersects(r.span)))
            .map(|(r, _)| Operation::RemoveMark {
                range: r.span,
                kind: r.mark.kind(),
            })
            .collect();

        let reissues: Vec<Operation> = revalidation
            .reissues
            .iter()
            .filter(|op| match op {
                Operation::AddMark { range, .. } => !fresh.iter().any(|m| m.span.intersects(*range)),
                _ => true,
            })
            .cloned()
            .collect();

        log::debug!(
            "incremental pass over {} ranges: {} removed, {} re-issued, {} new",
            ranges.len(),
            revalidation.removals.len() + displaced.len(),
            reissues.len(),
            fresh.len(),
        );

        let mut fresh = fresh;
        fresh.sort_by_key(|m| Reverse(m.span.to));

        let mut ops = revalidation.removals.clone();
        ops.extend(displaced);
        ops.extend(reissues);
        ops.extend(fresh.into_iter().map(|m| operation_for(m, &self.context)));
        ops
    }
}

/// Matches in every non-code textblock touching a changed range, kept when
/// they touch one of the ranges. A split's range covers both boundary
/// tokens, so matches ending at the split or starting right after it count.
fn rescan(doc: &Doc, ranges: &[ChangedRange], ctx: &MatchContext) -> Vec<Match> {
    let mut out = Vec::new();
    for tb in doc.textblocks() {
        let span = tb.span();
        if tb.is_code() || !ranges.iter().any(|r| r.new.touches(span)) {
            continue;
        }
        let protected = tb.protected_spans();
        let glued = glued_after_atoms(tb.content());
        out.extend(
            find_all(&tb.text(), ctx)
                .into_iter()
                .filter(|m| !protected.iter().any(|p| p.intersects(m.span)))
                .filter(|m| !glued.contains(&m.span.from))
                .map(|m| m.offset(tb.start))
                .filter(|m| ranges.iter().any(|r| r.new.touches(m.span))),
        );
    }
    out
}

fn operation_for(m: &Match, ctx: &MatchContext) -> Operation {
    match structure_of(m, ctx) {
        Structured::Mark(mark) => Operation::AddMark { range: m.span, mark },
        Structured::Atom(atom) => Operation::ReplaceRange {
            range: m.span,
            content: vec![Inline::Atom(atom)],
        },
    }
}
