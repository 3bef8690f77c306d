// SPDX-License-Identifier: MPL-2.0

//! Mention encodings, one detector per encoding.
//!
//! Each detector either claims the content and returns the full segment list,
//! or returns `None` so the next detector can try.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::api::MentionRecord;
use crate::mentions::linkify::linkify_into;
use crate::mentions::segment::{RenderOptions, Segment};

/// Display name (as written after `@`) to the user it resolved to.
pub type ResolutionMap = HashMap<String, MentionRecord>;

/// Everything a detector may look at.
pub struct RenderContext<'a> {
    pub content: &'a str,
    pub mentions: &'a [MentionRecord],
    pub resolved: &'a ResolutionMap,
    pub options: RenderOptions,
}

impl RenderContext<'_> {
    fn record_by_id(&self, user_id: &str) -> Option<&MentionRecord> {
        self.mentions.iter().find(|m| m.user_id == user_id)
    }
}

pub trait MentionDetector: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_parse(&self, ctx: &RenderContext<'_>) -> Option<Vec<Segment>>;
}

static SPAN_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<span\b([^>]*)>").unwrap());

/// Opening or closing span tag; group 1 is `/` for a close.
static SPAN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(/?)span\b[^>]*>").unwrap());

// Attribute names must start the attribute list or follow whitespace, so
// `data-class` never reads as `class`.
static CLASS_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(?:^|\s)class\s*=\s*["']([^"']*)["']"#).unwrap());

static USER_ID_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)data-user-id\s*=\s*["']([^"']+)["']"#).unwrap()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\[([^\]\n]+)\]\(([^)\s]+)\)").unwrap());

/// Strip markup from server-rendered HTML, leaving readable text.
fn html_to_text(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, "");
    html_escape::decode_html_entities(&stripped).into_owned()
}

/// Pull the mentioned user id out of a span's attribute list.
fn mention_span_user_id(attrs: &str) -> Option<&str> {
    let class = CLASS_ATTR_RE.captures(attrs)?.get(1)?.as_str();
    if !class.split_whitespace().any(|c| c == "mention") {
        return None;
    }
    USER_ID_ATTR_RE
        .captures(attrs)?
        .get(1)
        .map(|m| m.as_str().trim())
        .filter(|id| !id.is_empty())
}

/// Byte range of the `</span>` that closes a span whose content starts at `from`.
fn matching_span_close(content: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    for caps in SPAN_TAG_RE.captures_iter(&content[from..]) {
        let tag = caps.get(0)?;
        if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
            depth -= 1;
            if depth == 0 {
                return Some((from + tag.start(), from + tag.end()));
            }
        } else {
            depth += 1;
        }
    }
    None
}

/// `<span class="mention" data-user-id="ID">@Name</span>` from server-rendered HTML.
///
/// Other spans are only stripped as markup, so a mention nested inside a
/// wrapper span is still found.
pub struct SpanDetector;

impl MentionDetector for SpanDetector {
    fn name(&self) -> &'static str {
        "span"
    }

    fn try_parse(&self, ctx: &RenderContext<'_>) -> Option<Vec<Segment>> {
        let content = ctx.content;
        if !content.contains("<span") && !content.contains("<SPAN") {
            return None;
        }

        let mut segments = Vec::new();
        let mut last = 0;
        let mut found = false;

        for caps in SPAN_OPEN_RE.captures_iter(content) {
            let (Some(open), Some(attrs)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if open.start() < last {
                continue;
            }
            let Some(user_id) = mention_span_user_id(attrs.as_str()) else {
                continue;
            };
            let Some((close_start, close_end)) = matching_span_close(content, open.end()) else {
                continue;
            };
            found = true;

            linkify_into(&mut segments, &html_to_text(&content[last..open.start()]));

            let record = ctx.record_by_id(user_id);
            let inner_text = html_to_text(&content[open.end()..close_start]);
            let label = record
                .map(|r| r.username.as_str())
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(inner_text.as_str());
            segments.push(Segment::mention(user_id, label, record, ctx.options));
            last = close_end;
        }

        if !found {
            return None;
        }
        linkify_into(&mut segments, &html_to_text(&content[last..]));
        Some(segments)
    }
}

/// `@[Display Name](userId)` placeholders.
pub struct PlaceholderDetector;

impl MentionDetector for PlaceholderDetector {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn try_parse(&self, ctx: &RenderContext<'_>) -> Option<Vec<Segment>> {
        let content = ctx.content;
        if !content.contains("@[") {
            return None;
        }

        let mut segments = Vec::new();
        let mut last = 0;
        let mut found = false;

        for caps in PLACEHOLDER_RE.captures_iter(content) {
            let (Some(whole), Some(name), Some(user_id)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            found = true;

            linkify_into(&mut segments, &content[last..whole.start()]);
            let record = ctx.record_by_id(user_id.as_str());
            let label = record
                .map(|r| r.username.as_str())
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(name.as_str());
            segments.push(Segment::mention(user_id.as_str(), label, record, ctx.options));
            last = whole.end();
        }

        if !found {
            return None;
        }
        linkify_into(&mut segments, &content[last..]);
        Some(segments)
    }
}

/// Bare `@Name` text, using names resolved against the user directory.
pub struct ResolvedNameDetector;

impl MentionDetector for ResolvedNameDetector {
    fn name(&self) -> &'static str {
        "resolved-name"
    }

    fn try_parse(&self, ctx: &RenderContext<'_>) -> Option<Vec<Segment>> {
        if !ctx.mentions.is_empty() || ctx.resolved.is_empty() || !ctx.content.contains('@') {
            return None;
        }
        let names = ctx
            .resolved
            .iter()
            .map(|(name, record)| (name.as_str(), record))
            .collect();
        link_known_names(ctx.content, names, ctx.options)
    }
}

/// Bare `@username` text when the host supplied structured mentions.
pub struct KnownMentionsDetector;

impl MentionDetector for KnownMentionsDetector {
    fn name(&self) -> &'static str {
        "known-mentions"
    }

    fn try_parse(&self, ctx: &RenderContext<'_>) -> Option<Vec<Segment>> {
        if ctx.mentions.is_empty() || !ctx.content.contains('@') {
            return None;
        }
        let names = ctx
            .mentions
            .iter()
            .map(|m| (m.username.as_str(), m))
            .collect();
        link_known_names(ctx.content, names, ctx.options)
    }
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Replace `@<name>` occurrences with mention segments.
///
/// Names are tried longest first at every `@`, so "John" wins over "Jo". A
/// candidate only matches when it is not immediately followed by another
/// name character. Returns `None` when nothing was linked.
fn link_known_names(
    content: &str,
    mut names: Vec<(&str, &MentionRecord)>,
    options: RenderOptions,
) -> Option<Vec<Segment>> {
    names.retain(|(name, _)| !name.trim().is_empty());
    names.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
    names.dedup_by(|a, b| a.0 == b.0);
    if names.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    let mut last = 0;
    let mut linked = false;
    let mut search_from = 0;

    while let Some(offset) = content[search_from..].find('@') {
        let at = search_from + offset;
        let rest = &content[at + 1..];

        let hit = names.iter().find(|(name, _)| {
            rest.starts_with(name)
                && !rest[name.len()..]
                    .chars()
                    .next()
                    .is_some_and(is_name_char)
        });

        match hit {
            Some((name, record)) => {
                linkify_into(&mut segments, &content[last..at]);
                segments.push(Segment::mention(&record.user_id, name, Some(*record), options));
                last = at + 1 + name.len();
                search_from = last;
                linked = true;
            }
            None => search_from = at + 1,
        }
    }

    if !linked {
        return None;
    }
    linkify_into(&mut segments, &content[last..]);
    Some(segments)
}
