//! # Snapshot testing support
//!
//! - **`format_doc`**: renders a [`Doc`] as an indented outline, stable
//!   enough to compare with `insta` inline snapshots
//! - **`invariants`**: structural checks every parsed or edited document
//!   must pass (normalized runs, sorted marks, plain code blocks, sizes)

pub mod invariants;

use std::fmt::Write;

use crate::document::{Atom, Block, Doc, Inline, Mark};

pub use invariants::check as invariants;

/// One line per block and per inline node, children indented two spaces.
pub fn format_doc(doc: &Doc) -> String {
    let mut out = String::new();
    for block in &doc.blocks {
        format_block(block, 0, &mut out);
    }
    out.truncate(out.trim_end().len());
    out
}

fn format_block(block: &Block, depth: usize, out: &mut String) {
    indent(depth, out);
    out.push_str(block.name());
    match block {
        Block::Heading { level, .. } => {
            let _ = write!(out, " {level}");
        }
        Block::CodeBlock {
            language: Some(language),
            ..
        } => {
            let _ = write!(out, " {language}");
        }
        Block::List { ordered, start, .. } => {
            out.push_str(if *ordered { " ordered" } else { " bullet" });
            if let Some(start) = start {
                let _ = write!(out, " start={start}");
            }
        }
        _ => {}
    }
    out.push('\n');

    if let Some(content) = block.inline_content() {
        for inline in content {
            format_inline(inline, depth + 1, out);
        }
    } else if let Some(children) = block.children() {
        for child in children {
            format_block(child, depth + 1, out);
        }
    }
}

fn format_inline(inline: &Inline, depth: usize, out: &mut String) {
    indent(depth, out);
    match inline {
        Inline::Text(run) => {
            let _ = write!(out, "text {:?}", run.text);
            for mark in &run.marks {
                let _ = write!(out, " [{}]", format_mark(mark));
            }
        }
        Inline::HardBreak => out.push_str("hardbreak"),
        Inline::Atom(atom) => format_atom(atom, out),
    }
    out.push('\n');
}

fn format_mark(mark: &Mark) -> String {
    match mark {
        Mark::Bold => "bold".into(),
        Mark::Italic => "italic".into(),
        Mark::Strike => "strike".into(),
        Mark::Code => "code".into(),
        Mark::Link { href } => format!("link {href}"),
        Mark::AutoLink { href } => format!("autolink {href}"),
        Mark::Tag { tag } => format!("tag {tag}"),
    }
}

fn format_atom(atom: &Atom, out: &mut String) {
    out.push_str(atom.name());
    match atom {
        Atom::Image {
            src,
            alt,
            dimensions,
            ..
        } => {
            let _ = write!(out, " {src}");
            if let Some(alt) = alt {
                let _ = write!(out, " alt={alt:?}");
            }
            if let Some(d) = dimensions {
                let _ = write!(out, " {}x{}", d.width, d.height);
            }
        }
        Atom::Video { src, .. } | Atom::Tweet { src, .. } | Atom::Youtube { src, .. } => {
            let _ = write!(out, " {src}");
        }
        Atom::Invoice { invoice, .. } => match invoice.amount_msat {
            Some(msat) => {
                let _ = write!(out, " {msat}msat");
            }
            None => out.push_str(" any amount"),
        },
        Atom::NProfile { entity } | Atom::NEvent { entity } | Atom::NAddr { entity } => {
            let _ = write!(out, " {}", entity.prefix.as_str());
        }
    }
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}
