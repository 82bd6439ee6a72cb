//! Operations over a textblock's inline content.
//!
//! All offsets here are local to the content (0 is the first content
//! position). Every function that rebuilds content returns it normalized:
//! no empty runs, adjacent runs with equal marks merged.

use super::{Inline, Mark, MarkKind, MarkRange, Span};
use crate::editing::EditError;

pub fn size(content: &[Inline]) -> usize {
    content.iter().map(Inline::size).sum()
}

/// The string matchers see: text verbatim, `'\n'` per hard break, one space
/// per atom.
pub fn projection(content: &[Inline]) -> String {
    let mut out = String::with_capacity(size(content));
    content.iter().for_each(|inline| inline.project_into(&mut out));
    out
}

/// Splits content at `offset`, cutting a text run in two when needed.
pub fn split_at(content: &[Inline], offset: usize) -> Result<(Vec<Inline>, Vec<Inline>), EditError> {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pos = 0;
    for inline in content {
        let end = pos + inline.size();
        match inline {
            Inline::Text(run) if pos < offset && offset < end => {
                let at = offset - pos;
                if !run.text.is_char_boundary(at) {
                    return Err(EditError::NotCharBoundary(offset));
                }
                let (a, b) = run.text.split_at(at);
                left.push(Inline::marked(a, run.marks.clone()));
                right.push(Inline::marked(b, run.marks.clone()));
            }
            _ if pos < offset => left.push(inline.clone()),
            _ => right.push(inline.clone()),
        }
        pos = end;
    }
    if offset > pos {
        return Err(EditError::OutOfRange { pos: offset, size: pos });
    }
    Ok((left, right))
}

/// Marks that text typed at `offset` picks up: those of the run containing
/// the offset, or else of the run ending right before it.
pub fn marks_at(content: &[Inline], offset: usize) -> Vec<Mark> {
    let mut pos = 0;
    let mut before: &[Mark] = &[];
    for inline in content {
        let end = pos + inline.size();
        if pos < offset && offset < end {
            return inline.marks().to_vec();
        }
        if end == offset {
            before = inline.marks();
        }
        if end >= offset {
            break;
        }
        pos = end;
    }
    before.to_vec()
}

pub fn insert_text(content: &[Inline], offset: usize, text: &str) -> Result<Vec<Inline>, EditError> {
    let marks = marks_at(content, offset);
    let (mut out, tail) = split_at(content, offset)?;
    out.push(Inline::marked(text, marks));
    out.extend(tail);
    Ok(normalize(out))
}

/// Replaces `span` with `fragment`. An empty fragment deletes.
pub fn replace(content: &[Inline], span: Span, fragment: Vec<Inline>) -> Result<Vec<Inline>, EditError> {
    let (mut out, rest) = split_at(content, span.from)?;
    let (_, tail) = split_at(&rest, span.len()).map_err(|e| e.shifted(span.from))?;
    out.extend(fragment);
    out.extend(tail);
    Ok(normalize(out))
}

/// Sets `mark` on every text run in `span`, replacing any mark of the same kind.
pub fn add_mark(content: &[Inline], span: Span, mark: &Mark) -> Result<Vec<Inline>, EditError> {
    restyle(content, span, |marks| {
        marks.retain(|m| m.kind() != mark.kind());
        marks.push(mark.clone());
        marks.sort();
    })
}

pub fn remove_mark(content: &[Inline], span: Span, kind: MarkKind) -> Result<Vec<Inline>, EditError> {
    restyle(content, span, |marks| marks.retain(|m| m.kind() != kind))
}

fn restyle(
    content: &[Inline],
    span: Span,
    update: impl Fn(&mut Vec<Mark>),
) -> Result<Vec<Inline>, EditError> {
    let (mut out, rest) = split_at(content, span.from)?;
    let (mid, tail) = split_at(&rest, span.len()).map_err(|e| e.shifted(span.from))?;
    out.extend(mid.into_iter().map(|inline| match inline {
        Inline::Text(mut run) => {
            update(&mut run.marks);
            Inline::Text(run)
        }
        other => other,
    }));
    out.extend(tail);
    Ok(normalize(out))
}

pub fn normalize(content: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(content.len());
    for inline in content {
        match inline {
            Inline::Text(run) if run.text.is_empty() => {}
            Inline::Text(run) => {
                if let Some(Inline::Text(prev)) = out.last_mut() {
                    if prev.marks == run.marks {
                        prev.text.push_str(&run.text);
                        continue;
                    }
                }
                out.push(Inline::Text(run));
            }
            other => out.push(other),
        }
    }
    out
}

/// Maximal ranges of each mark, in local coordinates, ordered by position.
pub fn mark_ranges(content: &[Inline]) -> Vec<MarkRange> {
    let mut out = Vec::new();
    let mut open: Vec<MarkRange> = Vec::new();
    let mut pos = 0;
    for inline in content {
        let end = pos + inline.size();
        let mut continued = Vec::new();
        for mark in inline.marks() {
            match open.iter().position(|r| &r.mark == mark) {
                Some(i) => {
                    let mut range = open.swap_remove(i);
                    range.span.to = end;
                    continued.push(range);
                }
                None => continued.push(MarkRange {
                    mark: mark.clone(),
                    span: Span::new(pos, end),
                }),
            }
        }
        out.append(&mut open);
        open = continued;
        pos = end;
    }
    out.append(&mut open);
    out.sort_by(|a, b| a.span.cmp(&b.span).then_with(|| a.mark.cmp(&b.mark)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Atom;
    use pretty_assertions::assert_eq;

    fn tag(t: &str) -> Mark {
        Mark::Tag { tag: t.into() }
    }

    #[test]
    fn split_cuts_text_runs() {
        let content = vec![Inline::text("hello"), Inline::HardBreak, Inline::text("x")];
        let (left, right) = split_at(&content, 2).unwrap();
        assert_eq!(left, vec![Inline::text("he")]);
        assert_eq!(right, vec![Inline::text("llo"), Inline::HardBreak, Inline::text("x")]);
    }

    #[test]
    fn split_at_leaf_boundaries() {
        let content = vec![Inline::text("ab"), Inline::HardBreak];
        let (left, right) = split_at(&content, 3).unwrap();
        assert_eq!(left.len(), 2);
        assert!(right.is_empty());
    }

    #[test]
    fn split_rejects_positions_inside_a_character() {
        let content = vec![Inline::text("é")];
        assert_eq!(split_at(&content, 1), Err(EditError::NotCharBoundary(1)));
        assert!(matches!(split_at(&content, 3), Err(EditError::OutOfRange { .. })));
    }

    #[test]
    fn typed_text_inherits_marks_of_the_run_before() {
        let content = vec![Inline::text("see "), Inline::marked("#rust", vec![tag("rust")])];
        assert_eq!(marks_at(&content, 9), vec![tag("rust")]);
        assert_eq!(marks_at(&content, 7), vec![tag("rust")]);
        assert_eq!(marks_at(&content, 4), Vec::<Mark>::new());
        assert_eq!(marks_at(&content, 0), Vec::<Mark>::new());
    }

    #[test]
    fn insert_extends_the_marked_run() {
        let content = vec![Inline::marked("#rus", vec![tag("rus")])];
        let out = insert_text(&content, 4, "t").unwrap();
        assert_eq!(out, vec![Inline::marked("#rust", vec![tag("rus")])]);
    }

    #[test]
    fn replace_swaps_text_for_an_atom() {
        let content = vec![Inline::text("a https://x.com/a.png b")];
        let atom = Inline::Atom(Atom::Image {
            src: "https://x.com/a.png".into(),
            alt: None,
            dimensions: None,
            fallback: "https://x.com/a.png".into(),
        });
        let out = replace(&content, Span::new(2, 21), vec![atom.clone()]).unwrap();
        assert_eq!(out, vec![Inline::text("a "), atom, Inline::text(" b")]);
        assert_eq!(size(&out), 5);
    }

    #[test]
    fn add_and_remove_mark_round_trip_to_merged_content() {
        let content = vec![Inline::text("see #rust now")];
        let marked = add_mark(&content, Span::new(4, 9), &tag("rust")).unwrap();
        assert_eq!(
            marked,
            vec![
                Inline::text("see "),
                Inline::marked("#rust", vec![tag("rust")]),
                Inline::text(" now"),
            ]
        );
        let cleared = remove_mark(&marked, Span::new(4, 9), MarkKind::Tag).unwrap();
        assert_eq!(cleared, content);
    }

    #[test]
    fn add_mark_replaces_same_kind() {
        let content = vec![Inline::marked("x.com", vec![Mark::AutoLink { href: "a".into() }])];
        let out = add_mark(&content, Span::new(0, 5), &Mark::AutoLink { href: "b".into() }).unwrap();
        assert_eq!(out[0].marks(), &[Mark::AutoLink { href: "b".into() }]);
    }

    #[test]
    fn mark_ranges_merge_across_runs() {
        let content = vec![
            Inline::marked("a", vec![Mark::Bold]),
            Inline::marked("b", vec![Mark::Bold, Mark::Italic]),
            Inline::marked("c", vec![Mark::Bold]),
            Inline::HardBreak,
            Inline::marked("d", vec![Mark::Bold]),
        ];
        let ranges: Vec<_> = mark_ranges(&content)
            .into_iter()
            .map(|r| (r.mark, r.span))
            .collect();
        assert_eq!(
            ranges,
            vec![
                (Mark::Bold, Span::new(0, 3)),
                (Mark::Italic, Span::new(1, 2)),
                (Mark::Bold, Span::new(4, 5)),
            ]
        );
    }

    #[test]
    fn projection_uses_placeholders() {
        let content = vec![
            Inline::text("a"),
            Inline::HardBreak,
            Inline::Atom(Atom::Video {
                src: "v".into(),
                fallback: "v".into(),
            }),
            Inline::text("b"),
        ];
        assert_eq!(projection(&content), "a\n b");
    }
}
