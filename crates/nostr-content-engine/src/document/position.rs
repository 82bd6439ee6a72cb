use super::{Block, Doc, Inline, MarkRange, Span, content};

/// A textblock located in a document.
#[derive(Debug, Clone)]
pub struct TextblockRef<'a> {
    /// Indices from the document root down to the block.
    pub path: Vec<usize>,
    /// Position of the first content position (one past the open token).
    pub start: usize,
    pub block: &'a Block,
}

impl<'a> TextblockRef<'a> {
    pub fn content(&self) -> &'a [Inline] {
        self.block.inline_content().map(Vec::as_slice).unwrap_or_default()
    }

    /// Content positions, `[start, start + content size)`.
    pub fn span(&self) -> Span {
        Span::new(self.start, self.start + content::size(self.content()))
    }

    pub fn text(&self) -> String {
        content::projection(self.content())
    }

    pub fn is_code(&self) -> bool {
        self.block.is_code()
    }

    /// Maximal mark ranges inside this block, in document coordinates.
    pub fn mark_ranges(&self) -> Vec<MarkRange> {
        content::mark_ranges(self.content())
            .into_iter()
            .map(|r| MarkRange {
                mark: r.mark,
                span: r.span.offset(self.start),
            })
            .collect()
    }

    /// Spans whose text must not be matched over, in block-local coordinates.
    pub fn protected_spans(&self) -> Vec<Span> {
        content::mark_ranges(self.content())
            .into_iter()
            .filter(|r| r.mark.is_protected())
            .map(|r| r.span)
            .collect()
    }
}

impl Doc {
    /// All textblocks in document order.
    pub fn textblocks(&self) -> Vec<TextblockRef<'_>> {
        let mut out = Vec::new();
        collect(&self.blocks, 0, &mut Vec::new(), &mut out);
        out
    }

    /// The textblock whose content range contains `pos` (ends inclusive).
    pub fn textblock_at(&self, pos: usize) -> Option<TextblockRef<'_>> {
        self.textblocks().into_iter().find(|tb| {
            let span = tb.span();
            span.from <= pos && pos <= span.to
        })
    }

    pub(crate) fn block_mut(&mut self, path: &[usize]) -> Option<&mut Block> {
        let (&last, parent) = path.split_last()?;
        container_mut(&mut self.blocks, parent)?.get_mut(last)
    }

    pub(crate) fn container_mut(&mut self, parent: &[usize]) -> Option<&mut Vec<Block>> {
        container_mut(&mut self.blocks, parent)
    }
}

fn container_mut<'a>(blocks: &'a mut Vec<Block>, parent: &[usize]) -> Option<&'a mut Vec<Block>> {
    match parent.split_first() {
        None => Some(blocks),
        Some((&i, rest)) => container_mut(blocks.get_mut(i)?.children_mut()?, rest),
    }
}

fn collect<'a>(
    blocks: &'a [Block],
    mut pos: usize,
    path: &mut Vec<usize>,
    out: &mut Vec<TextblockRef<'a>>,
) {
    for (i, block) in blocks.iter().enumerate() {
        path.push(i);
        if block.is_textblock() {
            out.push(TextblockRef {
                path: path.clone(),
                start: pos + 1,
                block,
            });
        } else if let Some(children) = block.children() {
            collect(children, pos + 1, path, out);
        }
        path.pop();
        pos += block.size();
    }
}
