//! # Structured document tree
//!
//! A [`Doc`] is the typed tree that post content is parsed into and that the
//! editing core mutates. Blocks nest (`Blockquote`, `List`, `ListItem`) or
//! hold inline content (`Paragraph`, `Heading`, `CodeBlock`); inline content
//! is a flat sequence of marked text runs, hard breaks and atoms.
//!
//! ## Positions
//!
//! Every node occupies a fixed number of positions so that edits, marks and
//! matches can be addressed with plain integers:
//!
//! - a non-leaf block takes `1 + content + 1` (an open and a close token)
//! - a text run takes its length in UTF-8 bytes
//! - a hard break, an atom and a horizontal rule take exactly 1
//!
//! The first block opens at position 0. The content of a textblock starts one
//! position after its open token. The *projection* of inline content is the
//! string matchers run over: text verbatim, `'\n'` for a hard break and a
//! single space for an atom, which keeps projection offsets equal to
//! document offsets within the block.

pub mod content;
mod position;
pub mod span;

use serde::Serialize;

use crate::invoice::Invoice;
use crate::models::Dimensions;
use crate::pointer::Entity;

pub use position::TextblockRef;
pub use span::Span;

/// Character standing in for an atom in a projection.
pub const ATOM_PLACEHOLDER: char = ' ';
/// Character standing in for a hard break in a projection.
pub const BREAK_PLACEHOLDER: char = '\n';
/// Character standing in for a block boundary token in a whole-document projection.
pub const BOUNDARY_PLACEHOLDER: char = '\n';

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Doc {
    /// Bumped once per applied batch of operations.
    pub version: u64,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        content: Vec<Inline>,
    },
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    /// Raw text only. Matchers never run inside code blocks.
    CodeBlock {
        language: Option<String>,
        content: Vec<Inline>,
    },
    Blockquote {
        content: Vec<Block>,
    },
    List {
        ordered: bool,
        start: Option<u64>,
        content: Vec<Block>,
    },
    ListItem {
        content: Vec<Block>,
    },
    HorizontalRule,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text(TextRun),
    HardBreak,
    Atom(Atom),
}

/// A run of text sharing one set of marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub text: String,
    /// Kept sorted, at most one mark per [`MarkKind`].
    pub marks: Vec<Mark>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mark {
    Bold,
    Italic,
    Strike,
    Code,
    /// A link authored in markdown, `[label](href)`.
    Link { href: String },
    /// A link produced by matching a URL in the text itself.
    AutoLink { href: String },
    /// A hashtag; `tag` excludes the leading `#`.
    Tag { tag: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MarkKind {
    Bold,
    Italic,
    Strike,
    Code,
    Link,
    AutoLink,
    Tag,
}

impl Mark {
    pub fn kind(&self) -> MarkKind {
        match self {
            Mark::Bold => MarkKind::Bold,
            Mark::Italic => MarkKind::Italic,
            Mark::Strike => MarkKind::Strike,
            Mark::Code => MarkKind::Code,
            Mark::Link { .. } => MarkKind::Link,
            Mark::AutoLink { .. } => MarkKind::AutoLink,
            Mark::Tag { .. } => MarkKind::Tag,
        }
    }

    /// Marks that are derived from matching and may be revoked when the
    /// text under them stops matching.
    pub fn is_auto(&self) -> bool {
        matches!(self, Mark::AutoLink { .. } | Mark::Tag { .. })
    }

    /// Text under these marks is never matched against.
    pub fn is_protected(&self) -> bool {
        matches!(self, Mark::Code | Mark::Link { .. })
    }
}

/// How an atom is laid out by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Display {
    Inline,
    Block,
}

/// A leaf node occupying one position. The matched source text is kept as
/// `fallback` so a renderer can degrade to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Atom {
    Image {
        src: String,
        alt: Option<String>,
        dimensions: Option<Dimensions>,
        fallback: String,
    },
    Video {
        src: String,
        fallback: String,
    },
    Tweet {
        src: String,
        fallback: String,
    },
    Youtube {
        src: String,
        fallback: String,
    },
    Invoice {
        invoice: Invoice,
        fallback: String,
    },
    NProfile {
        entity: Entity,
    },
    NEvent {
        entity: Entity,
    },
    NAddr {
        entity: Entity,
    },
}

impl Atom {
    pub fn name(&self) -> &'static str {
        match self {
            Atom::Image { .. } => "image",
            Atom::Video { .. } => "video",
            Atom::Tweet { .. } => "tweet",
            Atom::Youtube { .. } => "youtube",
            Atom::Invoice { .. } => "invoice",
            Atom::NProfile { .. } => "nprofile",
            Atom::NEvent { .. } => "nevent",
            Atom::NAddr { .. } => "naddr",
        }
    }

    /// Profiles render inline, like a mention; everything else is a card.
    pub fn display(&self) -> Display {
        match self {
            Atom::NProfile { .. } => Display::Inline,
            _ => Display::Block,
        }
    }

    /// The source text the atom replaced.
    pub fn fallback_text(&self) -> &str {
        match self {
            Atom::Image { fallback, .. }
            | Atom::Video { fallback, .. }
            | Atom::Tweet { fallback, .. }
            | Atom::Youtube { fallback, .. }
            | Atom::Invoice { fallback, .. } => fallback,
            Atom::NProfile { entity } | Atom::NEvent { entity } | Atom::NAddr { entity } => {
                &entity.bech32
            }
        }
    }
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(TextRun {
            text: text.into(),
            marks: Vec::new(),
        })
    }

    pub fn marked(text: impl Into<String>, mut marks: Vec<Mark>) -> Self {
        marks.sort();
        Inline::Text(TextRun {
            text: text.into(),
            marks,
        })
    }

    /// Number of positions this node occupies.
    pub fn size(&self) -> usize {
        match self {
            Inline::Text(run) => run.text.len(),
            Inline::HardBreak | Inline::Atom(_) => 1,
        }
    }

    pub fn marks(&self) -> &[Mark] {
        match self {
            Inline::Text(run) => &run.marks,
            _ => &[],
        }
    }

    pub(crate) fn project_into(&self, out: &mut String) {
        match self {
            Inline::Text(run) => out.push_str(&run.text),
            Inline::HardBreak => out.push(BREAK_PLACEHOLDER),
            Inline::Atom(_) => out.push(ATOM_PLACEHOLDER),
        }
    }
}

impl Block {
    pub fn paragraph(content: Vec<Inline>) -> Self {
        Block::Paragraph { content }
    }

    /// A paragraph holding a single unmarked run.
    pub fn paragraph_text(text: &str) -> Self {
        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![Inline::text(text)]
        };
        Block::Paragraph { content }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Block::Paragraph { .. } => "paragraph",
            Block::Heading { .. } => "heading",
            Block::CodeBlock { .. } => "code_block",
            Block::Blockquote { .. } => "blockquote",
            Block::List { .. } => "list",
            Block::ListItem { .. } => "list_item",
            Block::HorizontalRule => "horizontal_rule",
        }
    }

    pub fn inline_content(&self) -> Option<&Vec<Inline>> {
        match self {
            Block::Paragraph { content }
            | Block::Heading { content, .. }
            | Block::CodeBlock { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn inline_content_mut(&mut self) -> Option<&mut Vec<Inline>> {
        match self {
            Block::Paragraph { content }
            | Block::Heading { content, .. }
            | Block::CodeBlock { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&Vec<Block>> {
        match self {
            Block::Blockquote { content }
            | Block::List { content, .. }
            | Block::ListItem { content } => Some(content),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            Block::Blockquote { content }
            | Block::List { content, .. }
            | Block::ListItem { content } => Some(content),
            _ => None,
        }
    }

    pub fn is_textblock(&self) -> bool {
        self.inline_content().is_some()
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Block::CodeBlock { .. })
    }

    /// Number of positions this block occupies, tokens included.
    pub fn size(&self) -> usize {
        if let Some(content) = self.inline_content() {
            2 + content::size(content)
        } else if let Some(children) = self.children() {
            2 + children.iter().map(Block::size).sum::<usize>()
        } else {
            1
        }
    }

    /// A block of the same kind and attributes holding `content`.
    pub(crate) fn with_inline_content(&self, content: Vec<Inline>) -> Block {
        let mut block = self.clone();
        if let Some(slot) = block.inline_content_mut() {
            *slot = content;
        }
        block
    }

    fn project_into(&self, out: &mut String) {
        if let Some(content) = self.inline_content() {
            out.push(BOUNDARY_PLACEHOLDER);
            content.iter().for_each(|inline| inline.project_into(out));
            out.push(BOUNDARY_PLACEHOLDER);
        } else if let Some(children) = self.children() {
            out.push(BOUNDARY_PLACEHOLDER);
            children.iter().for_each(|child| child.project_into(out));
            out.push(BOUNDARY_PLACEHOLDER);
        } else {
            out.push(BOUNDARY_PLACEHOLDER);
        }
    }
}

/// A contiguous stretch of one textblock carrying the same mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkRange {
    pub mark: Mark,
    pub span: Span,
}

impl Doc {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { version: 0, blocks }
    }

    /// Total number of positions in the document.
    pub fn content_size(&self) -> usize {
        self.blocks.iter().map(Block::size).sum()
    }

    /// Whole-document projection, one character per position.
    ///
    /// Block tokens and hard breaks project to `'\n'`, atoms to a space. The
    /// deltas recorded by a [`Transform`](crate::editing::Transform) apply to
    /// this string.
    pub fn projection(&self) -> String {
        let mut out = String::with_capacity(self.content_size());
        self.blocks.iter().for_each(|b| b.project_into(&mut out));
        out
    }

    /// Projection of the inline content covered by `span`, skipping block
    /// tokens. Positions outside any textblock contribute nothing.
    pub fn text_between(&self, span: Span) -> String {
        let mut out = String::new();
        for tb in self.textblocks() {
            let block_span = tb.span();
            if !block_span.touches(span) {
                continue;
            }
            let from = span.from.max(block_span.from) - block_span.from;
            let to = span.to.min(block_span.to) - block_span.from;
            if from < to {
                let text = tb.text();
                if let Some(slice) = text.get(from..to) {
                    out.push_str(slice);
                }
            }
        }
        out
    }

    /// Every maximal range of a mark accepted by `filter` that touches `span`.
    ///
    /// Ranges never cross textblocks and are returned in document order.
    pub fn mark_ranges(&self, span: Span, filter: impl Fn(&Mark) -> bool) -> Vec<MarkRange> {
        let mut out = Vec::new();
        for tb in self.textblocks() {
            if !tb.span().touches(span) {
                continue;
            }
            out.extend(
                tb.mark_ranges()
                    .into_iter()
                    .filter(|r| filter(&r.mark) && r.span.touches(span)),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Doc {
        Doc::new(vec![
            Block::paragraph(vec![
                Inline::text("ab"),
                Inline::HardBreak,
                Inline::marked("cd", vec![Mark::Bold]),
            ]),
            Block::Blockquote {
                content: vec![Block::paragraph_text("xy")],
            },
            Block::HorizontalRule,
        ])
    }

    #[test]
    fn sizes_count_tokens_and_leaves() {
        let doc = sample();
        assert_eq!(doc.blocks[0].size(), 7);
        assert_eq!(doc.blocks[1].size(), 6);
        assert_eq!(doc.blocks[2].size(), 1);
        assert_eq!(doc.content_size(), 14);
    }

    #[test]
    fn projection_has_one_char_per_position() {
        let doc = sample();
        let projection = doc.projection();
        assert_eq!(projection, "\nab\ncd\n\n\nxy\n\n\n");
        assert_eq!(projection.len(), doc.content_size());
    }

    #[test]
    fn text_between_skips_block_tokens() {
        let doc = sample();
        assert_eq!(doc.text_between(Span::new(0, 14)), "ab\ncdxy");
        assert_eq!(doc.text_between(Span::new(2, 5)), "b\nc");
    }

    #[test]
    fn marks_are_kept_sorted() {
        let inline = Inline::marked("x", vec![Mark::Tag { tag: "x".into() }, Mark::Bold]);
        assert_eq!(inline.marks(), &[Mark::Bold, Mark::Tag { tag: "x".into() }]);
    }

    #[test]
    fn profile_atoms_render_inline() {
        let link = Atom::Youtube {
            src: "https://youtu.be/x".into(),
            fallback: "https://youtu.be/x".into(),
        };
        assert_eq!(link.display(), Display::Block);
        assert_eq!(link.fallback_text(), "https://youtu.be/x");
    }
}
