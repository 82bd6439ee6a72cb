use crate::document::{Block, Doc, Inline};

/// Panics if `doc` is not in normal form.
pub fn check(doc: &Doc) {
    assert_eq!(
        doc.projection().len(),
        doc.content_size(),
        "projection length differs from content size"
    );
    for block in &doc.blocks {
        check_block(block);
    }
}

fn check_block(block: &Block) {
    if let Some(children) = block.children() {
        children.iter().for_each(check_block);
        return;
    }
    let Some(content) = block.inline_content() else {
        return;
    };
    for inline in content {
        if let Inline::Text(run) = inline {
            assert!(!run.text.is_empty(), "empty text run in {}", block.name());
            assert!(
                run.marks.windows(2).all(|w| w[0].kind() != w[1].kind() && w[0] < w[1]),
                "marks not sorted or repeated: {:?}",
                run.marks
            );
            if block.is_code() {
                assert!(run.marks.is_empty(), "marked text in a code block: {run:?}");
            }
        } else {
            assert!(!block.is_code(), "non-text node in a code block: {inline:?}");
        }
    }
    for pair in content.windows(2) {
        if let [Inline::Text(a), Inline::Text(b)] = pair {
            assert_ne!(a.marks, b.marks, "adjacent runs share marks: {:?} {:?}", a.text, b.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Mark;

    #[test]
    fn normalized_doc_passes() {
        check(&Doc::new(vec![
            Block::paragraph(vec![Inline::text("a"), Inline::marked("b", vec![Mark::Bold])]),
            Block::HorizontalRule,
        ]));
    }

    #[test]
    #[should_panic(expected = "adjacent runs share marks")]
    fn unmerged_runs_fail() {
        check(&Doc::new(vec![Block::paragraph(vec![Inline::text("a"), Inline::text("b")])]));
    }

    #[test]
    #[should_panic(expected = "marked text in a code block")]
    fn marked_code_fails() {
        check(&Doc::new(vec![Block::CodeBlock {
            language: None,
            content: vec![Inline::marked("x", vec![Mark::Bold])],
        }]));
    }
}
