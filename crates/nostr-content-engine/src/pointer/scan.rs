use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::{Entity, decode};
use crate::document::Span;
use crate::matching::{char_before, is_word_char};

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(?i:nostr:))?(?:npub|nprofile|note|nevent|naddr)1[qpzry9x8gf2tvdw0s3jn54khce6mua7l]+")
        .unwrap()
});

/// An entity mention found in a piece of text. `text` is the raw matched
/// slice, including any `nostr:` prefix; `span` locates it in the text it
/// was scanned from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NostrReference {
    pub span: Span,
    pub text: String,
    pub entity: Entity,
}

/// Finds every decodable entity mention in `text`, in order.
///
/// A mention must not continue a word. Candidates that look like entities
/// but fail to decode are skipped.
pub fn scan_references(text: &str) -> Vec<NostrReference> {
    REFERENCE_RE
        .find_iter(text)
        .filter(|m| !char_before(text, m.start()).is_some_and(is_word_char))
        .filter_map(|m| match decode(m.as_str()) {
            Ok(entity) => Some(NostrReference {
                span: Span::new(m.start(), m.end()),
                text: m.as_str().to_string(),
                entity,
            }),
            Err(err) => {
                log::trace!("ignoring {:?}: {err}", m.as_str());
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::Prefix;
    use pretty_assertions::assert_eq;

    const NPUB: &str = "npub180cvv07tjdrrgpa0j7j7tmnyl2yr6yr7l8j4s3evf6u64th6gkwsyjh6w6";
    const NOTE: &str = "note1h865g8j9egu30yequqp3e7ccudq8seeaes7nuw3m82vpwc9226tqtudlvp";

    #[test]
    fn finds_plain_and_uri_mentions() {
        let text = format!("hi {NPUB}, see nostr:{NOTE}!");
        let refs = scan_references(&text);

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].span, Span::new(3, 3 + NPUB.len()));
        assert_eq!(refs[0].entity.prefix, Prefix::Npub);
        assert_eq!(refs[1].text, format!("nostr:{NOTE}"));
        assert_eq!(&text[refs[1].span.range()], refs[1].text);
    }

    #[test]
    fn undecodable_candidates_are_skipped() {
        let refs = scan_references("npub1qqqqqqqq and note1xyz");
        assert!(refs.is_empty());
    }

    #[test]
    fn mentions_glued_to_a_word_are_ignored() {
        assert!(scan_references(&format!("x{NPUB}")).is_empty());
        assert!(scan_references(&format!("_nostr:{NOTE}")).is_empty());
        assert_eq!(scan_references(&format!("({NPUB})")).len(), 1);
    }

    #[test]
    fn scheme_is_case_insensitive_but_entities_are_not() {
        let refs = scan_references(&format!("NOSTR:{NPUB} {}", NOTE.to_uppercase()));
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].entity.bech32, NPUB);
    }

    #[test]
    fn mentions_inside_urls_are_still_found() {
        let text = format!("https://github.com/{NPUB}/wrong/link/");
        let refs = scan_references(&text);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].span.from, "https://github.com/".len());
    }
}
