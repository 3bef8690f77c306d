// SPDX-License-Identifier: MPL-2.0

//! Capturing, rendering and resolving `@mentions`.

mod composer;
mod detectors;
mod generation;
mod input;
mod linkify;
mod markup;
mod ranking;
mod renderer;
mod resolver;
mod search;
mod segment;

pub use composer::MentionComposer;
pub use detectors::{
    KnownMentionsDetector, MentionDetector, PlaceholderDetector, RenderContext, ResolutionMap,
    ResolvedNameDetector, SpanDetector,
};
pub use generation::{Generation, Ticket};
pub use input::{ChangeEvent, HitRegion, InputEvent, Key, KeyOutcome, MentionInput, Point, Rect};
pub use linkify::linkify;
pub use markup::to_markup;
pub use ranking::{match_priority, rank_candidates};
pub use renderer::{MentionRenderer, render_content};
pub use resolver::{
    MentionView, ResolutionOutcome, ResolutionRequest, extract_candidate_names, needs_resolution,
    resolve_names,
};
pub use search::{SearchResponse, SuggestionSearch};
pub use segment::{DisplayMode, MentionSegment, RenderOptions, Segment};
