// SPDX-License-Identifier: MPL-2.0

//! Bare URL detection for plain-text runs.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::mentions::segment::{Segment, push_text};

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>]+|www\.[^\s<>]+").unwrap());

/// Trim trailing punctuation that is likely sentence-ending, not part of the URL.
/// A closing paren is only trimmed when it has no opening partner inside the URL.
fn trim_url_trailing(url: &str) -> &str {
    let mut end = url.len();
    loop {
        let candidate = &url[..end];
        let Some(last) = candidate.chars().last() else {
            return candidate;
        };
        let trim = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' => true,
            ')' => candidate.matches('(').count() < candidate.matches(')').count(),
            _ => false,
        };
        if !trim {
            return candidate;
        }
        end -= last.len_utf8();
    }
}

/// Resolve a matched token to an href, or `None` if it is not a usable URL.
fn href_for(token: &str) -> Option<String> {
    let href = if token.starts_with("www.") {
        format!("https://{token}")
    } else {
        token.to_string()
    };
    let parsed = Url::parse(&href).ok()?;
    parsed.host_str().filter(|h| h.contains('.') || *h == "localhost")?;
    Some(href)
}

/// Append `text` to `segments`, turning bare URLs into link segments.
pub fn linkify_into(segments: &mut Vec<Segment>, text: &str) {
    let mut last = 0;
    for m in URL_RE.find_iter(text) {
        let token = trim_url_trailing(m.as_str());
        let Some(href) = href_for(token) else {
            continue;
        };
        push_text(segments, &text[last..m.start()]);
        segments.push(Segment::Url {
            href,
            text: token.to_string(),
        });
        last = m.start() + token.len();
    }
    push_text(segments, &text[last..]);
}

pub fn linkify(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    linkify_into(&mut segments, text);
    segments
}
