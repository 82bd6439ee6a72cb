//! # Event parsing
//!
//! Entry points that turn a whole post into a structured [`Doc`]. The
//! event kind picks the pipeline: long-form kinds go through markdown
//! first, everything else is plain text with collapsed line breaks. Both
//! pipelines finish by running the matchers over each textblock.

mod markdown;
mod plain;

use nostr_content_config::{Config, MatchingConfig};

use crate::document::Doc;
use crate::matching::MatchContext;
use crate::models::{Event, IMetaTable};
use crate::pointer::{NostrReference, scan_references};

#[derive(Debug, Clone, Default)]
pub struct EventParser {
    config: Config,
}

impl EventParser {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Structures an event's content.
    ///
    /// `references` and `imeta` default to what the event itself carries:
    /// the references scanned from its content and its `imeta` tags.
    pub fn parse(&self, event: &Event, references: Option<Vec<NostrReference>>, imeta: Option<IMetaTable>) -> Doc {
        let ctx = context_for(event, &self.config.matching, references, imeta);
        if self.config.is_long_form(event.kind) {
            log::debug!("kind {} parsed as markdown", event.kind);
            markdown::parse(&event.content, &ctx)
        } else {
            log::debug!("kind {} parsed as plain text", event.kind);
            plain::parse(&event.content, &ctx)
        }
    }

    /// Structures profile bio text. No references or imeta apply.
    pub fn parse_user_about(&self, text: &str) -> Doc {
        let ctx = MatchContext::new(self.config.matching.clone()).with_references(Vec::new());
        plain::parse(text, &ctx)
    }
}

/// [`EventParser::parse`] with the default configuration.
pub fn parse_content(event: &Event, references: Option<Vec<NostrReference>>, imeta: Option<IMetaTable>) -> Doc {
    EventParser::default().parse(event, references, imeta)
}

/// [`EventParser::parse_user_about`] with the default configuration.
pub fn parse_user_about(text: &str) -> Doc {
    EventParser::default().parse_user_about(text)
}

/// The match context for an event, filling in whatever the caller left out.
pub fn context_for(
    event: &Event,
    config: &MatchingConfig,
    references: Option<Vec<NostrReference>>,
    imeta: Option<IMetaTable>,
) -> MatchContext {
    let imeta = imeta.unwrap_or_else(|| IMetaTable::from_event(event));
    let references = references.unwrap_or_else(|| scan_references(&event.content));
    MatchContext::new(config.clone())
        .with_imeta(imeta)
        .with_references(references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Block;
    use crate::models::kinds;
    use pretty_assertions::assert_eq;

    #[test]
    fn kind_selects_the_pipeline() {
        let text = "# Title";
        let note = parse_content(&Event::text_note(text), None, None);
        let article = parse_content(&Event::new(kinds::LONG_FORM, text), None, None);

        assert!(matches!(note.blocks[..], [Block::Paragraph { .. }]));
        assert!(matches!(article.blocks[..], [Block::Heading { level: 1, .. }]));
    }

    #[test]
    fn long_form_kinds_come_from_config() {
        let parser = EventParser::new(Config {
            long_form_kinds: vec![kinds::TEXT_NOTE],
            ..Config::default()
        });
        let doc = parser.parse(&Event::text_note("## Sub"), None, None);
        assert!(matches!(doc.blocks[..], [Block::Heading { level: 2, .. }]));
    }

    #[test]
    fn context_defaults_come_from_the_event() {
        let npub = "npub180cvv07tjdrrgpa0j7j7tmnyl2yr6yr7l8j4s3evf6u64th6gkwsyjh6w6";
        let event = Event::text_note(format!("hi nostr:{npub}"))
            .with_tag(["imeta", "url https://x.com/a", "m image/png"]);
        let ctx = context_for(&event, &MatchingConfig::default(), None, None);

        assert_eq!(ctx.imeta.len(), 1);
        let references = ctx.references.unwrap();
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].text, format!("nostr:{npub}"));
    }

    #[test]
    fn supplied_context_wins() {
        let event = Event::text_note("plain").with_tag(["imeta", "url https://x.com/a", "m image/png"]);
        let ctx = context_for(&event, &MatchingConfig::default(), Some(Vec::new()), Some(IMetaTable::new()));
        assert!(ctx.imeta.is_empty());
        assert_eq!(ctx.references, Some(Vec::new()));
    }
}
