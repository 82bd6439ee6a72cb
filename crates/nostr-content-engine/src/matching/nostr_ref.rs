use super::{Match, MatchContext, MatchKind, Matcher};
use crate::document::Span;
use crate::pointer::{NostrReference, scan_references};

/// Entity mentions, driven by the context's pre-parsed reference list.
///
/// A reference whose span still lines up with the text is used as is.
/// Otherwise the text is searched for its raw string, which is how
/// references parsed from a whole post are found inside a single block.
/// Without a reference list the text is scanned directly.
pub struct NostrRefMatcher;

impl Matcher for NostrRefMatcher {
    fn find(&self, text: &str, ctx: &MatchContext) -> Vec<Match> {
        let references = match &ctx.references {
            Some(list) => locate(list, text),
            None => scan_references(text),
        };
        references
            .into_iter()
            .map(|r| Match {
                span: r.span,
                text: r.text,
                kind: MatchKind::NostrRef { entity: r.entity },
            })
            .collect()
    }
}

fn locate(list: &[NostrReference], text: &str) -> Vec<NostrReference> {
    let mut found: Vec<NostrReference> = Vec::new();
    for reference in list {
        if text.get(reference.span.range()) == Some(reference.text.as_str()) {
            found.push(reference.clone());
            continue;
        }
        found.extend(
            text.match_indices(reference.text.as_str())
                .map(|(start, raw)| NostrReference {
                    span: Span::new(start, start + raw.len()),
                    ..reference.clone()
                }),
        );
    }
    found.sort_by_key(|r| r.span);
    found.dedup_by_key(|r| r.span);
    found
}
