use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use crate::document::{Atom, Block, Doc, Inline, Mark, MarkKind, content};
use crate::matching::MatchContext;
use crate::structure::structure_content;

/// Converts markdown to a document, then structures every textblock that is
/// not a code block.
pub(super) fn parse(text: &str, ctx: &MatchContext) -> Doc {
    let mut builder = TreeBuilder::new(ctx);
    for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
        builder.push(event);
    }
    Doc::new(builder.finish())
}

/// What each `Start` opened, so the matching `End` knows what to close.
#[derive(Debug, Clone, Copy)]
enum Opened {
    Textblock,
    Container,
    Mark(MarkKind),
    Image,
    Ignored,
}

struct Container {
    block: Block,
    children: Vec<Block>,
}

struct ImageState {
    src: String,
    alt: String,
}

struct TreeBuilder<'a> {
    ctx: &'a MatchContext,
    opened: Vec<Opened>,
    containers: Vec<Container>,
    /// The textblock being filled and its content so far.
    textblock: Option<(Block, Vec<Inline>)>,
    marks: Vec<Mark>,
    image: Option<ImageState>,
    out: Vec<Block>,
}

impl<'a> TreeBuilder<'a> {
    fn new(ctx: &'a MatchContext) -> Self {
        Self {
            ctx,
            opened: Vec::new(),
            containers: Vec::new(),
            textblock: None,
            marks: Vec::new(),
            image: None,
            out: Vec::new(),
        }
    }

    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                let mut marks = self.marks.clone();
                marks.push(Mark::Code);
                self.inline(Inline::marked(code.to_string(), marks));
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.inline(Inline::HardBreak),
            Event::Rule => {
                self.flush();
                self.emit(Block::HorizontalRule);
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let opened = match tag {
            Tag::Paragraph => self.open_textblock(Block::paragraph(Vec::new())),
            Tag::Heading { level, .. } => self.open_textblock(Block::Heading {
                level: level as u8,
                content: Vec::new(),
            }),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.open_textblock(Block::CodeBlock {
                    language,
                    content: Vec::new(),
                })
            }
            Tag::BlockQuote(_) => self.open_container(Block::Blockquote { content: Vec::new() }),
            Tag::List(start) => self.open_container(Block::List {
                ordered: start.is_some(),
                start,
                content: Vec::new(),
            }),
            Tag::Item => self.open_container(Block::ListItem { content: Vec::new() }),
            Tag::Emphasis => self.open_mark(Mark::Italic),
            Tag::Strong => self.open_mark(Mark::Bold),
            Tag::Strikethrough => self.open_mark(Mark::Strike),
            Tag::Link { dest_url, .. } => self.open_mark(Mark::Link {
                href: dest_url.to_string(),
            }),
            Tag::Image { dest_url, .. } => {
                self.image = Some(ImageState {
                    src: dest_url.to_string(),
                    alt: String::new(),
                });
                Opened::Image
            }
            _ => Opened::Ignored,
        };
        self.opened.push(opened);
    }

    fn end(&mut self) {
        match self.opened.pop() {
            Some(Opened::Textblock) => self.flush(),
            Some(Opened::Container) => {
                self.flush();
                if let Some(Container { mut block, children }) = self.containers.pop() {
                    if let Some(slot) = block.children_mut() {
                        *slot = children;
                    }
                    self.emit(block);
                }
            }
            Some(Opened::Mark(kind)) => {
                if let Some(i) = self.marks.iter().rposition(|m| m.kind() == kind) {
                    self.marks.remove(i);
                }
            }
            Some(Opened::Image) => {
                if let Some(image) = self.image.take() {
                    let atom = self.image_atom(image);
                    self.inline(Inline::Atom(atom));
                }
            }
            Some(Opened::Ignored) | None => {}
        }
    }

    fn open_textblock(&mut self, block: Block) -> Opened {
        self.flush();
        self.textblock = Some((block, Vec::new()));
        Opened::Textblock
    }

    fn open_container(&mut self, block: Block) -> Opened {
        self.flush();
        self.containers.push(Container {
            block,
            children: Vec::new(),
        });
        Opened::Container
    }

    fn open_mark(&mut self, mark: Mark) -> Opened {
        let kind = mark.kind();
        self.marks.push(mark);
        Opened::Mark(kind)
    }

    fn text(&mut self, text: &str) {
        if let Some(image) = self.image.as_mut() {
            image.alt.push_str(text);
            return;
        }
        let marks = self.marks.clone();
        self.inline(Inline::marked(text, marks));
    }

    /// Appends to the open textblock, opening an implicit paragraph for
    /// inline content that arrives outside one (tight list items).
    fn inline(&mut self, inline: Inline) {
        let (_, content) = self
            .textblock
            .get_or_insert_with(|| (Block::paragraph(Vec::new()), Vec::new()));
        content.push(inline);
    }

    fn image_atom(&self, image: ImageState) -> Atom {
        let meta = self.ctx.imeta.get(&image.src);
        let alt = if image.alt.is_empty() {
            meta.and_then(|m| m.alt.clone())
        } else {
            Some(image.alt)
        };
        Atom::Image {
            fallback: image.src.clone(),
            dimensions: meta.and_then(|m| m.dimensions),
            src: image.src,
            alt,
        }
    }

    /// Closes the open textblock, structuring its content.
    fn flush(&mut self) {
        let Some((block, inlines)) = self.textblock.take() else {
            return;
        };
        let inlines = content::normalize(inlines);
        let inlines = if block.is_code() {
            let text = content::projection(&inlines);
            let text = text.strip_suffix('\n').unwrap_or(&text);
            if text.is_empty() { Vec::new() } else { vec![Inline::text(text)] }
        } else {
            structure_content(&inlines, self.ctx)
        };
        self.emit(block.with_inline_content(inlines));
    }

    fn emit(&mut self, block: Block) {
        match self.containers.last_mut() {
            Some(container) => container.children.push(block),
            None => self.out.push(block),
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        while let Some(Container { mut block, children }) = self.containers.pop() {
            if let Some(slot) = block.children_mut() {
                *slot = children;
            }
            self.emit(block);
        }
        self.out
    }
}
