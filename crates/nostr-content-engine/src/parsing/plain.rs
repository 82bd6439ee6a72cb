use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Block, Doc, Inline};
use crate::matching::MatchContext;
use crate::structure::structure_content;

static LINE_BREAKS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\r?\n)+").unwrap());

/// One paragraph; each run of line breaks becomes a single hard break.
pub(super) fn parse(text: &str, ctx: &MatchContext) -> Doc {
    let mut content = Vec::new();
    let mut last = 0;
    for m in LINE_BREAKS_RE.find_iter(text) {
        if m.start() > last {
            content.push(Inline::text(&text[last..m.start()]));
        }
        content.push(Inline::HardBreak);
        last = m.end();
    }
    if last < text.len() {
        content.push(Inline::text(&text[last..]));
    }
    Doc::new(vec![Block::paragraph(structure_content(&content, ctx))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Mark;
    use pretty_assertions::assert_eq;

    fn content(doc: &Doc) -> &[Inline] {
        doc.blocks[0].inline_content().unwrap()
    }

    #[test]
    fn break_runs_collapse() {
        let doc = parse("one\n\n\ntwo\r\nthree", &MatchContext::default());
        assert_eq!(
            content(&doc),
            [
                Inline::text("one"),
                Inline::HardBreak,
                Inline::text("two"),
                Inline::HardBreak,
                Inline::text("three"),
            ]
        );
    }

    #[test]
    fn matches_run_across_the_whole_text() {
        let doc = parse("#a\n#b", &MatchContext::default());
        assert_eq!(
            content(&doc),
            [
                Inline::marked("#a", vec![Mark::Tag { tag: "a".into() }]),
                Inline::HardBreak,
                Inline::marked("#b", vec![Mark::Tag { tag: "b".into() }]),
            ]
        );
    }

    #[test]
    fn empty_text_is_an_empty_paragraph() {
        let doc = parse("", &MatchContext::default());
        assert_eq!(doc.blocks, vec![Block::paragraph(vec![])]);
    }
}
