use super::NostrPointer;

/// Host-supplied source of relay hints for a pointer, e.g. a relay list
/// cache keyed by author.
pub trait RelayHints {
    fn relay_hints(&self, pointer: &NostrPointer) -> Vec<String>;
}

impl<F> RelayHints for F
where
    F: Fn(&NostrPointer) -> Vec<String>,
{
    fn relay_hints(&self, pointer: &NostrPointer) -> Vec<String> {
        self(pointer)
    }
}

/// Drops repeated relay URLs, keeping first occurrences in order.
/// Comparison is exact; URLs are not normalized.
pub fn dedupe_relays<I>(relays: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for relay in relays {
        if !out.contains(&relay) {
            out.push(relay);
        }
    }
    out
}

/// Returns the pointer with its relays extended by the host's hints.
/// Without hints the pointer is returned with its own relays deduplicated.
pub fn resolve_relays(pointer: NostrPointer, hints: Option<&dyn RelayHints>) -> NostrPointer {
    let extra = hints.map(|h| h.relay_hints(&pointer)).unwrap_or_default();
    let relays = dedupe_relays(pointer.relays().iter().cloned().chain(extra));
    pointer.with_relays(relays)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::{EventPointer, ProfilePointer};
    use pretty_assertions::assert_eq;

    fn profile(relays: &[&str]) -> NostrPointer {
        NostrPointer::Profile(ProfilePointer {
            pubkey: "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d".into(),
            relays: relays.iter().map(|r| r.to_string()).collect(),
        })
    }

    #[test]
    fn dedupe_keeps_first_occurrence_order() {
        let relays = ["wss://b", "wss://a", "wss://b"].map(String::from);
        assert_eq!(dedupe_relays(relays), vec!["wss://b".to_string(), "wss://a".to_string()]);
    }

    #[test]
    fn hints_are_unioned_after_own_relays() {
        let hints = |_: &NostrPointer| vec!["wss://a".to_string(), "wss://c".to_string()];
        let resolved = resolve_relays(profile(&["wss://a", "wss://b"]), Some(&hints));
        assert_eq!(resolved.relays(), ["wss://a", "wss://b", "wss://c"].map(String::from));
    }

    #[test]
    fn hints_can_depend_on_the_pointer() {
        let hints = |p: &NostrPointer| match p {
            NostrPointer::Event(e) if e.author.is_some() => vec!["wss://author".to_string()],
            _ => Vec::new(),
        };
        let event = NostrPointer::Event(EventPointer {
            id: "b9f5441e45ca39179320e0031cfb18e34078673dcc3d3e3a3b3a981760aa5696".into(),
            kind: None,
            author: Some("82341f882b6eabcd2ba7f1ef90aad961cf074af15b9ef44a09f9d2a8fbfbe6a2".into()),
            relays: Vec::new(),
        });

        assert_eq!(resolve_relays(event, Some(&hints)).relays(), ["wss://author".to_string()]);
        assert!(resolve_relays(profile(&[]), Some(&hints)).relays().is_empty());
    }

    #[test]
    fn no_hints_only_dedupes() {
        let resolved = resolve_relays(profile(&["wss://a", "wss://a"]), None);
        assert_eq!(resolved.relays(), ["wss://a".to_string()]);
    }
}
