//! Media metadata carried in `imeta` tags (NIP-92).
//!
//! Each tag looks like `["imeta", "url https://…", "m image/jpeg", "dim 640x480", …]`:
//! every entry after the tag name is a key, one space, and a value. The table
//! is keyed by the literal URL so matchers can look up a candidate exactly as
//! it appears in the text.

use std::collections::HashMap;

use serde::Serialize;

use super::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Parses `WIDTHxHEIGHT`.
    pub fn parse(s: &str) -> Option<Self> {
        let (w, h) = s.split_once('x')?;
        Some(Self {
            width: w.trim().parse().ok()?,
            height: h.trim().parse().ok()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IMeta {
    pub url: String,
    pub mime_type: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub blurhash: Option<String>,
    pub sha256: Option<String>,
    pub alt: Option<String>,
    pub fallback: Vec<String>,
}

impl IMeta {
    /// Reads one `imeta` tag. Returns `None` when it carries no `url`.
    pub fn from_tag(tag: &[String]) -> Option<Self> {
        let mut meta = IMeta::default();
        for entry in tag.iter().skip(1) {
            let Some((key, value)) = entry.split_once(' ') else {
                continue;
            };
            let value = value.trim();
            match key {
                "url" => meta.url = value.to_string(),
                "m" => meta.mime_type = Some(value.to_ascii_lowercase()),
                "dim" => meta.dimensions = Dimensions::parse(value),
                "blurhash" => meta.blurhash = Some(value.to_string()),
                "x" => meta.sha256 = Some(value.to_string()),
                "alt" => meta.alt = Some(value.to_string()),
                "fallback" => meta.fallback.push(value.to_string()),
                _ => {}
            }
        }
        (!meta.url.is_empty()).then_some(meta)
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.as_deref().is_some_and(|m| m.starts_with("image/"))
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.as_deref().is_some_and(|m| m.starts_with("video/"))
    }
}

/// `imeta` entries by URL. Later tags for the same URL win.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IMetaTable {
    entries: HashMap<String, IMeta>,
}

impl IMetaTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tags(tags: &[Vec<String>]) -> Self {
        let mut table = Self::new();
        tags.iter()
            .filter(|tag| tag.first().is_some_and(|name| name == "imeta"))
            .filter_map(|tag| IMeta::from_tag(tag))
            .for_each(|meta| table.insert(meta));
        table
    }

    pub fn from_event(event: &Event) -> Self {
        Self::from_tags(&event.tags)
    }

    pub fn insert(&mut self, meta: IMeta) {
        self.entries.insert(meta.url.clone(), meta);
    }

    pub fn get(&self, url: &str) -> Option<&IMeta> {
        self.entries.get(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<IMeta> for IMetaTable {
    fn from_iter<T: IntoIterator<Item = IMeta>>(iter: T) -> Self {
        let mut table = Self::new();
        iter.into_iter().for_each(|meta| table.insert(meta));
        table
    }
}
