use serde::{Deserialize, Serialize};

/// Event kinds the parser distinguishes.
pub mod kinds {
    /// Short text note (NIP-01).
    pub const TEXT_NOTE: u16 = 1;
    /// Long-form article (NIP-23).
    pub const LONG_FORM: u16 = nostr_content_config::LONG_FORM_KIND;
}

/// A nostr event as far as content parsing is concerned.
///
/// Signature and id are carried through untouched; nothing here verifies
/// them. Unknown JSON fields such as `sig` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pubkey: String,
    #[serde(default)]
    pub created_at: u64,
    pub kind: u16,
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
    pub content: String,
}

impl Event {
    pub fn new(kind: u16, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn text_note(content: impl Into<String>) -> Self {
        Self::new(kinds::TEXT_NOTE, content)
    }

    #[must_use]
    pub fn with_tag<S: Into<String>>(mut self, tag: impl IntoIterator<Item = S>) -> Self {
        self.tags.push(tag.into_iter().map(Into::into).collect());
        self
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Tags whose first element equals `name`.
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a [String]> + 'a {
        self.tags
            .iter()
            .filter(move |tag| tag.first().is_some_and(|n| n == name))
            .map(Vec::as_slice)
    }
}
