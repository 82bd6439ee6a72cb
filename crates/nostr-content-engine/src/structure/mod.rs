//! # Structuring resolved matches
//!
//! Turns each resolved [`Match`] into either a mark laid over the text it
//! covers or an atom that replaces that text. The decision is a closed
//! match over [`MatchKind`]:
//!
//! | kind | result |
//! |---|---|
//! | text link, hashtag | mark |
//! | image, video, tweet, youtube, invoice | atom, source text kept as fallback |
//! | profile reference | inline atom |
//! | event or address reference | block atom |

use crate::document::{Atom, Inline, Mark, Span, TextRun, content};
use crate::matching::{Match, MatchContext, MatchKind, find_all, glued_after_atoms, resolve};
use crate::pointer::NostrPointer;

#[derive(Debug, Clone, PartialEq)]
pub enum Structured {
    Mark(Mark),
    Atom(Atom),
}

pub fn structure_of(m: &Match, ctx: &MatchContext) -> Structured {
    let fallback = m.text.clone();
    match &m.kind {
        MatchKind::TextLink { href } => Structured::Mark(Mark::AutoLink { href: href.clone() }),
        MatchKind::Hashtag { tag } => Structured::Mark(Mark::Tag { tag: tag.clone() }),
        MatchKind::Image { src } => {
            let meta = ctx.imeta.get(&m.text).or_else(|| ctx.imeta.get(src));
            Structured::Atom(Atom::Image {
                src: src.clone(),
                alt: meta.and_then(|meta| meta.alt.clone()),
                dimensions: meta.and_then(|meta| meta.dimensions),
                fallback,
            })
        }
        MatchKind::Video { src } => Structured::Atom(Atom::Video {
            src: src.clone(),
            fallback,
        }),
        MatchKind::Tweet { src } => Structured::Atom(Atom::Tweet {
            src: src.clone(),
            fallback,
        }),
        MatchKind::Youtube { src } => Structured::Atom(Atom::Youtube {
            src: src.clone(),
            fallback,
        }),
        MatchKind::Invoice { invoice } => Structured::Atom(Atom::Invoice {
            invoice: invoice.clone(),
            fallback,
        }),
        MatchKind::NostrRef { entity } => {
            let entity = entity.clone();
            Structured::Atom(match entity.pointer {
                NostrPointer::Profile(_) => Atom::NProfile { entity },
                NostrPointer::Event(_) => Atom::NEvent { entity },
                NostrPointer::Address(_) => Atom::NAddr { entity },
            })
        }
    }
}

/// Applies resolved matches to a single text run.
pub fn apply(run: &TextRun, matches: &[Match], ctx: &MatchContext) -> Vec<Inline> {
    apply_to_content(&[Inline::Text(run.clone())], matches, ctx)
}

/// Applies resolved matches, whose spans are offsets into the projection of
/// `content`.
///
/// Matches are applied from the last to the first so earlier spans stay
/// valid while atoms shrink the text behind them.
pub fn apply_to_content(content: &[Inline], matches: &[Match], ctx: &MatchContext) -> Vec<Inline> {
    let mut ordered: Vec<&Match> = matches.iter().collect();
    ordered.sort_by_key(|m| std::cmp::Reverse(m.span.to));

    let mut out = content::normalize(content.to_vec());
    for m in ordered {
        let applied = match structure_of(m, ctx) {
            Structured::Mark(mark) => content::add_mark(&out, m.span, &mark),
            Structured::Atom(atom) => content::replace(&out, m.span, vec![Inline::Atom(atom)]),
        };
        match applied {
            Ok(next) => out = next,
            Err(err) => log::warn!("skipping {} at {:?}: {err}", m.kind.name(), m.span),
        }
    }
    out
}

/// Runs every matcher over `content`, resolves and applies the result.
///
/// Text under code and authored link marks is left alone, and nothing
/// starts right after an atom that glues to it.
pub fn structure_content(content: &[Inline], ctx: &MatchContext) -> Vec<Inline> {
    let text = content::projection(content);
    let protected: Vec<Span> = content::mark_ranges(content)
        .into_iter()
        .filter(|r| r.mark.is_protected())
        .map(|r| r.span)
        .collect();
    let glued = glued_after_atoms(content);
    let candidates = find_all(&text, ctx)
        .into_iter()
        .filter(|m| !protected.iter().any(|p| p.intersects(m.span)))
        .filter(|m| !glued.contains(&m.span.from))
        .collect();
    apply_to_content(content, &resolve(candidates), ctx)
}
