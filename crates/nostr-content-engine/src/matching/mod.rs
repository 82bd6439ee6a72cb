//! # Entity matchers
//!
//! Each matcher scans a piece of text and reports candidate entities with
//! their spans. Matchers are pure: they never mutate the context and report
//! candidates in no particular order. Overlaps between candidates, within
//! one matcher or across matchers, are settled by [`resolve`].
//!
//! Failures are local. A candidate that fails to decode or validate is
//! dropped and the scan carries on with the rest of the text.

mod cursor;
mod hashtag;
mod invoice;
mod link;
mod nostr_ref;
mod resolve;

use nostr_content_config::MatchingConfig;
use serde::Serialize;

use crate::document::{Inline, Span};
use crate::invoice::Invoice;
use crate::models::IMetaTable;
use crate::pointer::{Entity, NostrReference};

pub use cursor::Cursor;
pub use hashtag::HashtagMatcher;
pub use invoice::InvoiceMatcher;
pub use link::LinkMatcher;
pub use nostr_ref::NostrRefMatcher;
pub use resolve::resolve;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub span: Span,
    /// The matched slice of the scanned text.
    pub text: String,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchKind {
    TextLink { href: String },
    Image { src: String },
    Video { src: String },
    Tweet { src: String },
    Youtube { src: String },
    Hashtag { tag: String },
    NostrRef { entity: Entity },
    Invoice { invoice: Invoice },
}

impl MatchKind {
    pub fn name(&self) -> &'static str {
        match self {
            MatchKind::TextLink { .. } => "text-link",
            MatchKind::Image { .. } => "image",
            MatchKind::Video { .. } => "video",
            MatchKind::Tweet { .. } => "tweet",
            MatchKind::Youtube { .. } => "youtube",
            MatchKind::Hashtag { .. } => "hashtag",
            MatchKind::NostrRef { .. } => "nostr-ref",
            MatchKind::Invoice { .. } => "invoice",
        }
    }
}

impl Match {
    /// Shifts the span, e.g. from block-local into document coordinates.
    #[must_use]
    pub fn offset(mut self, by: usize) -> Self {
        self.span = self.span.offset(by);
        self
    }
}

/// Per-post state threaded through every matcher call.
///
/// Built once per source post (or editing session) and passed explicitly;
/// nothing here is refreshed as a side effect of matching.
#[derive(Debug, Clone, Default)]
pub struct MatchContext {
    pub imeta: IMetaTable,
    /// Pre-parsed entity mentions. `None` makes the nostr matcher scan the
    /// text it is given instead.
    pub references: Option<Vec<NostrReference>>,
    pub config: MatchingConfig,
}

impl MatchContext {
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_imeta(mut self, imeta: IMetaTable) -> Self {
        self.imeta = imeta;
        self
    }

    #[must_use]
    pub fn with_references(mut self, references: Vec<NostrReference>) -> Self {
        self.references = Some(references);
        self
    }
}

pub trait Matcher {
    fn find(&self, text: &str, ctx: &MatchContext) -> Vec<Match>;
}

/// Every matcher, in the order their candidates are collected.
pub const MATCHERS: [&dyn Matcher; 4] = [&LinkMatcher, &HashtagMatcher, &NostrRefMatcher, &InvoiceMatcher];

/// Unresolved candidates from all matchers.
pub fn find_all(text: &str, ctx: &MatchContext) -> Vec<Match> {
    MATCHERS.iter().flat_map(|m| m.find(text, ctx)).collect()
}

/// Candidates from all matchers with overlaps settled.
pub fn match_text(text: &str, ctx: &MatchContext) -> Vec<Match> {
    resolve(find_all(text, ctx))
}

pub(crate) fn char_before(text: &str, pos: usize) -> Option<char> {
    text.get(..pos)?.chars().next_back()
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Characters that glue a hashtag or invoice to whatever precedes it, such
/// as a URL path or query.
pub(crate) fn is_glue(c: char) -> bool {
    is_word_char(c) || matches!(c, '.' | '/' | ':' | '=')
}

/// Content-local positions just past an atom whose source text ends in a
/// glue character. Atoms project as a space, so a candidate starting at one
/// of these would not exist in the source text and is dropped.
pub(crate) fn glued_after_atoms(content: &[Inline]) -> Vec<usize> {
    let mut pos = 0;
    let mut out = Vec::new();
    for inline in content {
        pos += inline.size();
        if matches!(inline, Inline::Atom(atom) if atom.fallback_text().chars().next_back().is_some_and(is_glue)) {
            out.push(pos);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NEVENT: &str = "nevent1qqstna2yrezu5wghjvswqqculvvwxsrcvu7uc0f78gan4xqhvz49d9spz3mhxue69uhhyetvv9ujuerpd46hxtnfdupzqwlsccluhy6xxsr6l9a9uhhxf75g85g8a709tprjcn4e42h053vaqvzqqqqqqyhtq5ax";

    fn names(matches: &[Match]) -> Vec<(&'static str, &str)> {
        matches.iter().map(|m| (m.kind.name(), m.text.as_str())).collect()
    }

    #[test]
    fn all_matchers_contribute() {
        let text = format!("gm #nostr https://example.com nostr:{NEVENT}");
        let matches = match_text(&text, &MatchContext::default());

        assert_eq!(
            names(&matches),
            vec![
                ("hashtag", "#nostr"),
                ("text-link", "https://example.com"),
                ("nostr-ref", format!("nostr:{NEVENT}").as_str()),
            ]
        );
    }

    #[test]
    fn matching_twice_gives_identical_results() {
        let text = format!("#a https://x.com/#b {NEVENT} lnbc1invalid https://youtu.be/abc");
        let ctx = MatchContext::default();
        assert_eq!(match_text(&text, &ctx), match_text(&text, &ctx));
    }

    #[test]
    fn glue_characters() {
        assert_eq!(char_before("ab", 1), Some('a'));
        assert_eq!(char_before("ab", 0), None);
        assert!(is_glue('é'));
        assert!(is_glue('='));
        assert!(!is_glue('('));
        assert!(!is_glue(' '));
    }

    #[test]
    fn atoms_glue_by_their_source_text() {
        use crate::document::Atom;
        let video = |fallback: &str| {
            Inline::Atom(Atom::Video {
                src: "https://x.com/v.mp4".into(),
                fallback: fallback.into(),
            })
        };
        let content = [
            Inline::text("a"),
            video("https://x.com/v.mp4"),
            Inline::text("#b"),
            video("(https://x.com/v.mp4)"),
        ];
        assert_eq!(glued_after_atoms(&content), vec![2]);
    }
}
