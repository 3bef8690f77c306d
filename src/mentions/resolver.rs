// SPDX-License-Identifier: MPL-2.0

//! Best-effort resolution of bare `@Name` text to users.
//!
//! Used only for content that carries no structured mention data. Every
//! failure is swallowed: an unresolved name simply stays plain text.

use futures::future::join_all;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::api::{MentionRecord, UserDirectory};
use crate::config::{MAX_RESOLVE_CANDIDATES, RESOLVE_LOOKUP_LIMIT};
use crate::mentions::detectors::ResolutionMap;
use crate::mentions::generation::{Generation, Ticket};
use crate::mentions::renderer::MentionRenderer;
use crate::mentions::segment::{RenderOptions, Segment};

/// A capitalized word, then up to three more on the same line.
static CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(\p{Lu}[\p{L}\p{N}'-]*(?:[ \t]+\p{Lu}[\p{L}\p{N}'-]*){0,3})").unwrap()
});

/// Unique Title-Case names following `@`, in order of appearance, capped.
pub fn extract_candidate_names(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in CANDIDATE_RE.captures_iter(content) {
        let Some(name) = caps.get(1) else {
            continue;
        };
        let name = name.as_str();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        if names.len() == MAX_RESOLVE_CANDIDATES {
            break;
        }
    }
    names
}

pub fn needs_resolution(content: &str, mentions: &[MentionRecord], authenticated: bool) -> bool {
    authenticated && mentions.is_empty() && content.contains('@') && !content.contains("@[")
}

/// Look every candidate up in parallel, keeping exact (case-insensitive) matches.
pub async fn resolve_names(directory: &dyn UserDirectory, candidates: &[String]) -> ResolutionMap {
    let lookups = candidates.iter().map(|name| async move {
        match directory.search_users(name, RESOLVE_LOOKUP_LIMIT).await {
            Ok(users) => {
                let wanted = name.to_lowercase();
                users
                    .into_iter()
                    .find(|u| u.name.to_lowercase() == wanted)
                    .map(|u| (name.clone(), u.to_mention()))
            }
            Err(e) => {
                debug!(%name, error = %e, "mention lookup failed");
                None
            }
        }
    });

    join_all(lookups).await.into_iter().flatten().collect()
}

/// Work order for one resolution pass, tied to the content it was made for.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    pub ticket: Ticket,
    pub candidates: Vec<String>,
    generation: Generation,
}

impl ResolutionRequest {
    pub fn is_stale(&self) -> bool {
        !self.generation.is_current(self.ticket)
    }

    /// Run the lookups. A request that went stale before starting does no work.
    pub async fn run(self, directory: &dyn UserDirectory) -> ResolutionOutcome {
        let resolved = if self.is_stale() {
            ResolutionMap::new()
        } else {
            resolve_names(directory, &self.candidates).await
        };
        ResolutionOutcome {
            ticket: self.ticket,
            resolved,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub ticket: Ticket,
    pub resolved: ResolutionMap,
}

/// Displayed content plus its name resolution state.
///
/// Changing the content or unmounting advances the generation, so an
/// outcome that arrives late is discarded rather than applied.
pub struct MentionView {
    content: String,
    mentions: Vec<MentionRecord>,
    options: RenderOptions,
    resolved: ResolutionMap,
    generation: Generation,
    renderer: MentionRenderer,
}

impl MentionView {
    pub fn new(
        content: impl Into<String>,
        mentions: Vec<MentionRecord>,
        options: RenderOptions,
    ) -> Self {
        Self {
            content: content.into(),
            mentions,
            options,
            resolved: ResolutionMap::new(),
            generation: Generation::new(),
            renderer: MentionRenderer::new(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn resolved(&self) -> &ResolutionMap {
        &self.resolved
    }

    pub fn set_content(&mut self, content: impl Into<String>, mentions: Vec<MentionRecord>) {
        self.generation.advance();
        self.content = content.into();
        self.mentions = mentions;
        self.resolved.clear();
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    pub fn unmount(&mut self) {
        self.generation.advance();
    }

    /// Start a resolution pass if this content needs one.
    pub fn resolution_request(&mut self, authenticated: bool) -> Option<ResolutionRequest> {
        if !needs_resolution(&self.content, &self.mentions, authenticated) {
            return None;
        }
        let candidates = extract_candidate_names(&self.content);
        if candidates.is_empty() {
            return None;
        }
        Some(ResolutionRequest {
            ticket: self.generation.advance(),
            candidates,
            generation: self.generation.clone(),
        })
    }

    /// Apply a finished pass. Returns `false` if it belonged to older content.
    pub fn apply_resolution(&mut self, outcome: ResolutionOutcome) -> bool {
        if !self.generation.is_current(outcome.ticket) {
            debug!("discarding stale mention resolution");
            return false;
        }
        self.resolved = outcome.resolved;
        true
    }

    /// Full round trip for callers that can hold the view across the lookup.
    pub async fn resolve(&mut self, directory: &dyn UserDirectory) -> bool {
        let Some(request) = self.resolution_request(directory.is_authenticated()) else {
            return false;
        };
        let outcome = request.run(directory).await;
        self.apply_resolution(outcome)
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.renderer
            .render(&self.content, &self.mentions, &self.resolved, self.options)
    }
}
