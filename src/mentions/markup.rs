// SPDX-License-Identifier: MPL-2.0

//! HTML output for hosts that draw rich text from an HTML string.
//!
//! Chips use `<span>` and `<img>`, which toolkit markup dialects such as
//! Pango do not accept.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::mentions::segment::Segment;

/// Escape every text run and turn links and mentions into `<a>` elements.
/// Chips are wrapped in a `mention-chip` span so the host can style them.
pub fn to_markup(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text { text } => out.push_str(&encode_text(text)),
            Segment::Url { href, text } => {
                out.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    encode_double_quoted_attribute(href),
                    encode_text(text)
                ));
            }
            Segment::Mention(m) => {
                let link = format!(
                    "<a href=\"{}\">{}</a>",
                    encode_double_quoted_attribute(&m.href()),
                    encode_text(&m.label)
                );
                if m.chip {
                    let avatar = m
                        .avatar
                        .as_deref()
                        .map(|src| {
                            format!("<img src=\"{}\" alt=\"\"/>", encode_double_quoted_attribute(src))
                        })
                        .unwrap_or_default();
                    out.push_str(&format!("<span class=\"mention-chip\">{avatar}{link}</span>"));
                } else {
                    out.push_str(&link);
                }
            }
        }
    }
    out
}
