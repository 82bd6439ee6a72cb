//! URL-like candidates: scheme URLs, `tel:`/`mailto:` links, email
//! addresses and bare domains.
//!
//! A candidate survives only when its host ends in a known public suffix
//! (checked with `psl` on the top-level label) or when it uses a non-http
//! scheme from the configured allow list. Survivors are classified, in
//! priority order, by `imeta` mime type, by well-known video and post
//! permalink hosts, by path extension, and otherwise become text links.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::{Host, Url};

use super::{Match, MatchContext, MatchKind, Matcher, char_before, is_word_char};
use crate::document::Span;

static CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?i)"#,
        r#"(?P<scheme>[a-z][a-z0-9+.\-]*://[^\s<>"]+)"#,
        r#"|(?P<tel>tel:\+?[0-9][0-9\-.()]*[0-9])"#,
        r#"|(?P<mailto>mailto:[^\s<>"]+)"#,
        r#"|(?P<email>[a-z0-9._%+\-]+@[a-z0-9\-]+(?:\.[a-z0-9\-]+)+)"#,
        r#"|(?P<bare>(?:[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?\.)+[a-z]{2,63}(?::[0-9]{1,5})?(?:[/?#][^\s<>"]*)?)"#,
    ))
    .unwrap()
});

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:www|m|music)\.)?(?:youtube\.com/(?:watch\?(?:[^#\s]*&)?v=|shorts/|embed/|live/)|youtu\.be/)[\w\-]+",
    )
    .unwrap()
});

static TWEET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:(?:www|mobile)\.)?(?:twitter\.com|x\.com)/\w+/status(?:es)?/\d+").unwrap()
});

pub struct LinkMatcher;

impl Matcher for LinkMatcher {
    fn find(&self, text: &str, ctx: &MatchContext) -> Vec<Match> {
        CANDIDATE_RE
            .captures_iter(text)
            .filter_map(|caps| candidate(text, &caps, ctx))
            .collect()
    }
}

fn candidate(text: &str, caps: &Captures<'_>, ctx: &MatchContext) -> Option<Match> {
    let whole = caps.get(0)?;
    if char_before(text, whole.start()).is_some_and(is_link_glue) {
        return None;
    }
    let raw = trim_trailing(whole.as_str());
    let config = &ctx.config;

    let (href, url) = if caps.name("scheme").is_some() {
        let (scheme, _) = raw.split_once("://")?;
        let scheme = scheme.to_ascii_lowercase();
        match scheme.as_str() {
            "http" | "https" => (raw.to_string(), Some(web_url(raw)?)),
            other if config.is_allowed_scheme(other) => (raw.to_string(), None),
            _ => return None,
        }
    } else if caps.name("tel").is_some() {
        config.is_allowed_scheme("tel").then(|| (raw.to_string(), None))?
    } else if caps.name("mailto").is_some() {
        config.is_allowed_scheme("mailto").then(|| (raw.to_string(), None))?
    } else if caps.name("email").is_some() {
        let (_, domain) = raw.rsplit_once('@')?;
        (config.is_allowed_scheme("mailto") && has_public_suffix(domain))
            .then(|| (format!("mailto:{raw}"), None))?
    } else {
        if !config.bare_domains {
            return None;
        }
        let href = format!("https://{raw}");
        let url = web_url(&href)?;
        (href, Some(url))
    };

    let kind = classify(raw, href, url.as_ref(), ctx);
    let start = whole.start();
    Some(Match {
        span: Span::new(start, start + raw.len()),
        text: raw.to_string(),
        kind,
    })
}

fn classify(raw: &str, href: String, url: Option<&Url>, ctx: &MatchContext) -> MatchKind {
    if let Some(meta) = ctx.imeta.get(raw).or_else(|| ctx.imeta.get(&href)) {
        if meta.is_image() {
            return MatchKind::Image { src: href };
        }
        if meta.is_video() {
            return MatchKind::Video { src: href };
        }
    }
    let Some(url) = url else {
        return MatchKind::TextLink { href };
    };
    if YOUTUBE_RE.is_match(&href) {
        return MatchKind::Youtube { src: href };
    }
    if TWEET_RE.is_match(&href) {
        return MatchKind::Tweet { src: href };
    }
    match path_extension(url) {
        Some(ext) if ctx.config.is_image_extension(ext) => MatchKind::Image { src: href },
        Some(ext) if ctx.config.is_video_extension(ext) => MatchKind::Video { src: href },
        _ => MatchKind::TextLink { href },
    }
}

fn is_link_glue(c: char) -> bool {
    is_word_char(c) || matches!(c, '.' | '/' | ':' | '=' | '@' | '#' | '&' | '-' | '+' | '%' | '~')
}

/// Parses an http(s) URL and keeps it only if the host is a domain under a
/// known public suffix. IP hosts and single-label hosts are rejected.
fn web_url(href: &str) -> Option<Url> {
    let url = Url::parse(href).ok()?;
    match url.host()? {
        Host::Domain(domain) if has_public_suffix(domain) => {}
        _ => return None,
    }
    Some(url)
}

fn has_public_suffix(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.');
    let Some((_, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !tld.is_empty() && psl::suffix(tld.as_bytes()).is_some_and(|s| s.is_known())
}

fn path_extension(url: &Url) -> Option<&str> {
    let file = url.path_segments()?.next_back()?;
    file.rsplit_once('.').map(|(_, ext)| ext)
}

/// Strips sentence punctuation and unbalanced closing brackets from the end
/// of a candidate.
fn trim_trailing(mut s: &str) -> &str {
    loop {
        let Some(last) = s.chars().next_back() else {
            return s;
        };
        let trim = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '*' => true,
            ')' => s.matches('(').count() < s.matches(')').count(),
            ']' => s.matches('[').count() < s.matches(']').count(),
            '}' => s.matches('{').count() < s.matches('}').count(),
            _ => false,
        };
        if !trim {
            return s;
        }
        s = &s[..s.len() - last.len_utf8()];
    }
}
