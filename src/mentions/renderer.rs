// SPDX-License-Identifier: MPL-2.0

use tracing::trace;

use crate::api::MentionRecord;
use crate::mentions::detectors::{
    KnownMentionsDetector, MentionDetector, PlaceholderDetector, RenderContext, ResolutionMap,
    ResolvedNameDetector, SpanDetector,
};
use crate::mentions::linkify::linkify;
use crate::mentions::segment::{RenderOptions, Segment};

/// Turns stored content into display segments.
///
/// Detectors run in order; the first one that claims the content wins. Content
/// nobody claims is only linkified.
pub struct MentionRenderer {
    detectors: Vec<Box<dyn MentionDetector>>,
}

impl MentionRenderer {
    pub fn new() -> Self {
        Self {
            detectors: vec![
                Box::new(SpanDetector),
                Box::new(PlaceholderDetector),
                Box::new(ResolvedNameDetector),
                Box::new(KnownMentionsDetector),
            ],
        }
    }

    pub fn with_detectors(detectors: Vec<Box<dyn MentionDetector>>) -> Self {
        Self { detectors }
    }

    pub fn render(
        &self,
        content: &str,
        mentions: &[MentionRecord],
        resolved: &ResolutionMap,
        options: RenderOptions,
    ) -> Vec<Segment> {
        let ctx = RenderContext {
            content,
            mentions,
            resolved,
            options,
        };

        for detector in &self.detectors {
            if let Some(segments) = detector.try_parse(&ctx).filter(|s| !s.is_empty()) {
                trace!(detector = detector.name(), count = segments.len(), "content parsed");
                return segments;
            }
        }
        linkify(content)
    }
}

impl Default for MentionRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render with the default detector chain and no resolved names.
pub fn render_content(
    content: &str,
    mentions: &[MentionRecord],
    options: RenderOptions,
) -> Vec<Segment> {
    MentionRenderer::new().render(content, mentions, &ResolutionMap::new(), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mentions::segment::MentionSegment;
    use pretty_assertions::assert_eq;

    fn mention(id: &str, label: &str) -> Segment {
        Segment::Mention(MentionSegment {
            user_id: id.to_string(),
            label: label.to_string(),
            avatar: None,
            chip: false,
        })
    }

    fn joined(segments: &[Segment]) -> String {
        segments.iter().map(Segment::visible_text).collect()
    }

    #[test]
    fn test_plain_content_is_one_text_segment() {
        let content = "Looking for a drummer this Friday";
        let segs = render_content(content, &[], RenderOptions::default());
        assert_eq!(segs, vec![Segment::text(content)]);
    }

    #[test]
    fn test_placeholder_round_trip() {
        let segs = render_content(
            "Hello @[Alice](u1), check this out",
            &[],
            RenderOptions::default(),
        );
        assert_eq!(
            segs,
            vec![
                Segment::text("Hello "),
                mention("u1", "@Alice"),
                Segment::text(", check this out"),
            ]
        );
        if let Segment::Mention(m) = &segs[1] {
            assert_eq!(m.href(), "/profile/u1");
        }
    }

    #[test]
    fn test_longest_known_name_wins() {
        let mentions = [MentionRecord::new("1", "Jo"), MentionRecord::new("2", "John")];
        let segs = render_content("@John hi", &mentions, RenderOptions::default());
        assert_eq!(segs, vec![mention("2", "@John"), Segment::text(" hi")]);
    }

    #[test]
    fn test_span_form() {
        let segs = render_content(
            r#"<span class="mention" data-user-id="42">@Bob</span> rocks"#,
            &[],
            RenderOptions::default(),
        );
        assert_eq!(segs, vec![mention("42", "@Bob"), Segment::text(" rocks")]);
    }

    #[test]
    fn test_url_in_fallback() {
        let segs = render_content("Check www.example.com now", &[], RenderOptions::default());
        assert_eq!(
            segs,
            vec![
                Segment::text("Check "),
                Segment::Url {
                    href: "https://www.example.com".to_string(),
                    text: "www.example.com".to_string(),
                },
                Segment::text(" now"),
            ]
        );
    }

    #[test]
    fn test_placeholders_win_even_with_mentions() {
        let mentions = [MentionRecord::new("u1", "Alice Smith")];
        let segs = render_content("@[Alice](u1) and @Alice Smith", &mentions, RenderOptions::default());
        // The placeholder detector claims the content; bare names are left alone.
        assert_eq!(
            segs,
            vec![
                mention("u1", "@Alice Smith"),
                Segment::text(" and @Alice Smith"),
            ]
        );
    }

    #[test]
    fn test_unresolved_at_name_is_plain_text() {
        let segs = render_content("thanks @Nobody!", &[], RenderOptions::default());
        assert_eq!(segs, vec![Segment::text("thanks @Nobody!")]);
    }

    #[test]
    fn test_resolved_names_are_linked() {
        let mut resolved = ResolutionMap::new();
        resolved.insert("Nina Simone".to_string(), MentionRecord::new("n1", "Nina Simone"));
        let segs = MentionRenderer::new().render(
            "with @Nina Simone tonight",
            &[],
            &resolved,
            RenderOptions::default(),
        );
        assert_eq!(
            segs,
            vec![
                Segment::text("with "),
                mention("n1", "@Nina Simone"),
                Segment::text(" tonight"),
            ]
        );
    }

    #[test]
    fn test_mentions_and_urls_keep_all_text() {
        let content = "@Sam see https://gig.link/x, or www.a.io. @Pat? done";
        let mentions = [MentionRecord::new("1", "Sam"), MentionRecord::new("2", "Pat")];
        let segs = render_content(content, &mentions, RenderOptions::default());
        assert_eq!(joined(&segs), content);
        assert_eq!(
            segs.iter()
                .filter(|s| matches!(s, Segment::Url { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_chip_mode_carries_avatar() {
        let mentions = [MentionRecord::new("7", "Ray").with_avatar("ray.jpg")];
        let segs = render_content("@Ray!", &mentions, RenderOptions::chip(true));
        let Segment::Mention(m) = &segs[0] else {
            panic!("expected mention first");
        };
        assert!(m.chip);
        assert_eq!(m.avatar.as_deref(), Some("ray.jpg"));
    }

    #[test]
    fn test_custom_detector_chain() {
        let renderer = MentionRenderer::with_detectors(vec![Box::new(PlaceholderDetector)]);
        let segs = renderer.render(
            r#"<span class="mention" data-user-id="1">@A</span>"#,
            &[],
            &ResolutionMap::new(),
            RenderOptions::default(),
        );
        assert_eq!(
            segs,
            vec![Segment::text(r#"<span class="mention" data-user-id="1">@A</span>"#)]
        );
    }
}
