use super::{Cursor, Match, MatchContext, MatchKind, Matcher, is_glue, is_word_char};
use crate::document::Span;

/// `#` followed by one or more Unicode letters, digits or underscores.
///
/// Not matched when glued to a preceding word or URL (`a#b`, `x.com/#b`,
/// `?q=#b`). The tag keeps its original case.
pub struct HashtagMatcher;

impl HashtagMatcher {
    const HASH: char = '#';
}

impl Matcher for HashtagMatcher {
    fn find(&self, text: &str, _ctx: &MatchContext) -> Vec<Match> {
        let mut out = Vec::new();
        let mut cur = Cursor::new(text, 0);

        while let Some(c) = cur.peek() {
            if c != Self::HASH || cur.prev().is_some_and(is_glue) {
                cur.bump();
                continue;
            }
            let start = cur.pos();
            cur.bump();
            let tag = cur.eat_while(is_word_char);
            if !tag.is_empty() {
                out.push(Match {
                    span: Span::new(start, cur.pos()),
                    text: text[start..cur.pos()].to_string(),
                    kind: MatchKind::Hashtag { tag: tag.to_string() },
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn tags(text: &str) -> Vec<(Span, String)> {
        HashtagMatcher
            .find(text, &MatchContext::default())
            .into_iter()
            .map(|m| match m.kind {
                MatchKind::Hashtag { tag } => (m.span, tag),
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn finds_tags_and_keeps_case() {
        assert_eq!(
            tags("#Nostr is #fun_2024!"),
            vec![
                (Span::new(0, 6), "Nostr".to_string()),
                (Span::new(10, 19), "fun_2024".to_string()),
            ]
        );
    }

    #[test]
    fn unicode_letters_are_tag_characters() {
        assert_eq!(tags("日本 #日本語"), vec![(Span::new(7, 17), "日本語".to_string())]);
    }

    #[rstest]
    #[case::glued_to_word("abc#tag")]
    #[case::url_fragment("https://x.com/#tag")]
    #[case::query_value("?q=#tag")]
    #[case::after_dot("end.#tag")]
    #[case::after_colon("note:#tag")]
    #[case::bare_hash("# heading")]
    #[case::double_hash("##")]
    fn not_a_hashtag(#[case] text: &str) {
        assert!(tags(text).is_empty());
    }

    #[test]
    fn punctuation_before_is_fine() {
        assert_eq!(tags("(#tag)"), vec![(Span::new(1, 5), "tag".to_string())]);
    }
}
