use std::sync::LazyLock;

use regex::Regex;

use super::{Match, MatchContext, MatchKind, Matcher, char_before, is_glue};
use crate::document::Span;
use crate::invoice;

static INVOICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ln(?:bcrt|bc|tbs|tb|sb)[0-9a-z]+").unwrap());

/// Lightning payment requests that decode as BOLT11.
pub struct InvoiceMatcher;

impl Matcher for InvoiceMatcher {
    fn find(&self, text: &str, _ctx: &MatchContext) -> Vec<Match> {
        INVOICE_RE
            .find_iter(text)
            .filter(|m| !char_before(text, m.start()).is_some_and(is_glue))
            .filter_map(|m| match invoice::decode(m.as_str()) {
                Ok(invoice) => Some(Match {
                    span: Span::new(m.start(), m.end()),
                    text: m.as_str().to_string(),
                    kind: MatchKind::Invoice { invoice },
                }),
                Err(err) => {
                    log::debug!("dropping invoice candidate at {}: {err}", m.start());
                    None
                }
            })
            .collect()
    }
}
