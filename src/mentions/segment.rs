// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};

use crate::api::{MentionRecord, profile_href};

/// How mentions are drawn by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Inline profile link.
    #[default]
    Link,
    /// Avatar + label chip.
    Chip,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub display_mode: DisplayMode,
    pub show_avatar: bool,
}

impl RenderOptions {
    pub fn chip(show_avatar: bool) -> Self {
        Self {
            display_mode: DisplayMode::Chip,
            show_avatar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionSegment {
    pub user_id: String,
    /// Visible text, always starting with `@`.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub chip: bool,
}

impl MentionSegment {
    pub fn href(&self) -> String {
        profile_href(&self.user_id)
    }
}

/// One contiguous piece of rendered content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Text { text: String },
    Url { href: String, text: String },
    Mention(MentionSegment),
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Segment::Text { text: text.into() }
    }

    /// Build a mention segment, applying the display options. Only the
    /// avatar is taken from `record`; the caller picks the label.
    pub fn mention(
        user_id: &str,
        label: &str,
        record: Option<&MentionRecord>,
        options: RenderOptions,
    ) -> Self {
        let chip = options.display_mode == DisplayMode::Chip;
        let avatar = if chip && options.show_avatar {
            record.and_then(|r| r.avatar.clone())
        } else {
            None
        };
        Segment::Mention(MentionSegment {
            user_id: user_id.to_string(),
            label: at_label(label),
            avatar,
            chip,
        })
    }

    /// Text as it appears on screen.
    pub fn visible_text(&self) -> &str {
        match self {
            Segment::Text { text } | Segment::Url { text, .. } => text,
            Segment::Mention(m) => &m.label,
        }
    }
}

/// Prefix `@` unless the label already carries one.
fn at_label(label: &str) -> String {
    let trimmed = label.trim();
    if trimmed.starts_with('@') {
        trimmed.to_string()
    } else {
        format!("@{trimmed}")
    }
}

/// Push a text run, merging with a preceding text segment and skipping empties.
pub(crate) fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text { text: last }) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::text(text));
    }
}
