// SPDX-License-Identifier: MPL-2.0

//! State machine behind a text field that offers `@mention` suggestions.
//!
//! The host feeds it value changes, key presses and pointer events; it
//! answers with what to search for, whether to suppress a key's default
//! behaviour, and the rewritten value after a suggestion is picked. Caret
//! positions are char offsets into the value.

use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

use crate::api::{MentionRecord, UserSummary};
use crate::mentions::detectors::is_name_char;
use crate::mentions::ranking::rank_candidates;

static ACTIVE_MENTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@(\w*)$").unwrap());

/// Result of feeding a value change into the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// An `@query` is being typed; suggestions should be fetched for it.
    Query(String),
    /// No mention in progress; the panel is closed.
    Closed,
    /// The change echoed a commit and was not treated as typing.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Tab,
    Escape,
    Other,
}

/// The value the host text field should take on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub value: String,
    pub caret: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// The key was consumed; the text field must not act on it.
    pub prevent_default: bool,
    pub change: Option<ChangeEvent>,
}

impl KeyOutcome {
    fn pass() -> Self {
        Self::default()
    }

    fn consumed() -> Self {
        Self {
            prevent_default: true,
            change: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Containment test a widget reports to its owner, used for click-outside.
pub trait HitRegion: Send {
    fn contains(&self, point: Point) -> bool;
}

impl HitRegion for Rect {
    fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

impl<F> HitRegion for F
where
    F: Fn(Point) -> bool + Send,
{
    fn contains(&self, point: Point) -> bool {
        self(point)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveMention {
    /// Char offset of the `@`.
    start: usize,
    query: String,
}

#[derive(Default)]
pub struct MentionInput {
    value: String,
    caret: usize,
    active: Option<ActiveMention>,
    results: Vec<UserSummary>,
    selected: usize,
    suppress_next_change: bool,
    committed: Vec<UserSummary>,
    input_region: Option<Box<dyn HitRegion>>,
    panel_region: Option<Box<dyn HitRegion>>,
}

fn byte_offset(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl MentionInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn active_query(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.query.as_str())
    }

    pub fn results(&self) -> &[UserSummary] {
        &self.results
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&UserSummary> {
        self.results.get(self.selected)
    }

    /// The suggestion panel is showing.
    pub fn is_open(&self) -> bool {
        self.active.is_some() && !self.results.is_empty()
    }

    /// Feed the text field's new value and caret.
    pub fn on_change(&mut self, value: impl Into<String>, caret: usize) -> InputEvent {
        self.value = value.into();
        self.caret = caret.min(self.value.chars().count());

        if self.suppress_next_change {
            self.suppress_next_change = false;
            return InputEvent::Ignored;
        }

        let before_caret = &self.value[..byte_offset(&self.value, self.caret)];
        let Some(caps) = ACTIVE_MENTION_RE.captures(before_caret) else {
            self.close();
            return InputEvent::Closed;
        };
        let (Some(whole), Some(query)) = (caps.get(0), caps.get(1)) else {
            self.close();
            return InputEvent::Closed;
        };

        let active = ActiveMention {
            start: before_caret[..whole.start()].chars().count(),
            query: query.as_str().to_string(),
        };
        trace!(query = %active.query, "mention query active");
        let event = InputEvent::Query(active.query.clone());
        self.active = Some(active);
        event
    }

    /// Install search results for `query`. Results for any query other than
    /// the active one are stale and dropped.
    pub fn apply_results(&mut self, query: &str, results: Vec<UserSummary>) -> bool {
        if self.active_query() != Some(query) {
            trace!(%query, "dropping stale suggestions");
            return false;
        }
        self.results = rank_candidates(query, results);
        self.selected = 0;
        true
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        if !self.is_open() {
            return KeyOutcome::pass();
        }
        let last = self.results.len() - 1;
        match key {
            Key::ArrowDown => {
                self.selected = (self.selected + 1).min(last);
                KeyOutcome::consumed()
            }
            Key::ArrowUp => {
                self.selected = self.selected.saturating_sub(1).min(last);
                KeyOutcome::consumed()
            }
            Key::Enter | Key::Tab => KeyOutcome {
                prevent_default: true,
                change: self.commit_selected(),
            },
            Key::Escape => {
                self.close();
                KeyOutcome::consumed()
            }
            Key::Other => KeyOutcome::pass(),
        }
    }

    pub fn commit_selected(&mut self) -> Option<ChangeEvent> {
        let candidate = self.selected()?.clone();
        self.commit(&candidate)
    }

    /// Replace the `@query` span with `@<name> ` and close the panel.
    pub fn commit(&mut self, candidate: &UserSummary) -> Option<ChangeEvent> {
        let active = self.active.take()?;

        let start = byte_offset(&self.value, active.start);
        let end = byte_offset(&self.value, self.caret);
        let inserted = format!("@{} ", candidate.name);

        let mut value = String::with_capacity(self.value.len() + inserted.len());
        value.push_str(&self.value[..start]);
        value.push_str(&inserted);
        value.push_str(&self.value[end..]);

        let caret = active.start + inserted.chars().count();
        self.value = value;
        self.caret = caret;
        self.close();
        self.suppress_next_change = true;
        if !self.committed.iter().any(|c| c.id == candidate.id) {
            self.committed.push(candidate.clone());
        }

        Some(ChangeEvent {
            value: self.value.clone(),
            caret,
        })
    }

    pub fn close(&mut self) {
        self.active = None;
        self.results.clear();
        self.selected = 0;
    }

    /// Users picked from suggestions whose `@name` is still in the text.
    pub fn committed_mentions(&self) -> Vec<MentionRecord> {
        self.committed
            .iter()
            .filter(|c| mentions_name(&self.value, &c.name))
            .map(UserSummary::to_mention)
            .collect()
    }

    pub fn set_input_region(&mut self, region: impl HitRegion + 'static) {
        self.input_region = Some(Box::new(region));
    }

    /// Called by the suggestion panel when it is shown.
    pub fn attach_panel(&mut self, region: impl HitRegion + 'static) {
        self.panel_region = Some(Box::new(region));
    }

    pub fn detach_panel(&mut self) {
        self.panel_region = None;
    }

    /// Close the panel when the pointer lands outside both the input and the
    /// panel. Returns whether it closed.
    pub fn on_pointer_down(&mut self, point: Point) -> bool {
        if !self.is_open() {
            return false;
        }
        let inside = |region: &Option<Box<dyn HitRegion>>| {
            region.as_ref().is_some_and(|r| r.contains(point))
        };
        if inside(&self.input_region) || inside(&self.panel_region) {
            return false;
        }
        self.close();
        true
    }
}

/// True when `@name` appears in `value` as a whole name, not as the start
/// of a longer one.
fn mentions_name(value: &str, name: &str) -> bool {
    let needle = format!("@{name}");
    value.match_indices(&needle).any(|(at, _)| {
        !value[at + needle.len()..]
            .chars()
            .next()
            .is_some_and(is_name_char)
    })
}
