// SPDX-License-Identifier: MPL-2.0

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::api::UserDirectory;
use crate::mentions::input::{InputEvent, Key, KeyOutcome, MentionInput, Point};
use crate::mentions::search::{SearchResponse, SuggestionSearch};
use crate::state::AppSettings;

/// A [`MentionInput`] wired to a debounced [`SuggestionSearch`].
pub struct MentionComposer {
    input: MentionInput,
    search: SuggestionSearch,
    responses: mpsc::UnboundedReceiver<SearchResponse>,
}

impl MentionComposer {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        let (search, responses) = SuggestionSearch::new(directory);
        Self::with_search(search, responses)
    }

    /// Use the debounce and result limit from user settings.
    pub fn from_settings(directory: Arc<dyn UserDirectory>, settings: &AppSettings) -> Self {
        let (search, responses) = SuggestionSearch::new(directory);
        let search = search
            .with_debounce(settings.debounce())
            .with_limit(settings.search_limit);
        Self::with_search(search, responses)
    }

    pub fn with_search(
        search: SuggestionSearch,
        responses: mpsc::UnboundedReceiver<SearchResponse>,
    ) -> Self {
        Self {
            input: MentionInput::new(),
            search,
            responses,
        }
    }

    pub fn input(&self) -> &MentionInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut MentionInput {
        &mut self.input
    }

    pub fn handle_change(&mut self, value: impl Into<String>, caret: usize) -> InputEvent {
        let event = self.input.on_change(value, caret);
        match &event {
            InputEvent::Query(query) => {
                self.search.schedule(query);
            }
            InputEvent::Closed => self.search.cancel(),
            InputEvent::Ignored => {}
        }
        event
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let outcome = self.input.handle_key(key);
        if outcome.prevent_default && !self.input.is_open() {
            self.search.cancel();
        }
        outcome
    }

    pub fn on_pointer_down(&mut self, point: Point) -> bool {
        let closed = self.input.on_pointer_down(point);
        if closed {
            self.search.cancel();
        }
        closed
    }

    /// Apply every response already delivered. Returns whether the visible
    /// suggestions changed.
    pub fn poll_results(&mut self) -> bool {
        let mut changed = false;
        while let Ok(response) = self.responses.try_recv() {
            changed |= self.apply(response);
        }
        changed
    }

    /// Wait for the next response and apply it.
    pub async fn next_results(&mut self) -> Option<bool> {
        let response = self.responses.recv().await?;
        Some(self.apply(response))
    }

    fn apply(&mut self, response: SearchResponse) -> bool {
        if !self.search.is_current(response.ticket) {
            return false;
        }
        self.input.apply_results(&response.query, response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClientError, UserSummary};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers slowly for short queries, quickly for long ones.
    struct SlowForShortQueries;

    #[async_trait]
    impl UserDirectory for SlowForShortQueries {
        async fn search_users(
            &self,
            query: &str,
            _limit: usize,
        ) -> Result<Vec<UserSummary>, ClientError> {
            let delay = if query.len() < 3 { 1_000 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(vec![
                UserSummary::new(format!("{query}-1"), format!("{query} one")),
                UserSummary::new(format!("{query}-2"), format!("{query} two")),
            ])
        }
    }

    #[derive(Default)]
    struct LimitRecorder {
        limits: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl UserDirectory for LimitRecorder {
        async fn search_users(
            &self,
            query: &str,
            limit: usize,
        ) -> Result<Vec<UserSummary>, ClientError> {
            self.limits.lock().unwrap().push(limit);
            Ok(vec![UserSummary::new("1", format!("{query} one"))])
        }
    }

    fn names(composer: &MentionComposer) -> Vec<String> {
        composer
            .input()
            .results()
            .iter()
            .map(|u| u.name.clone())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_query_never_overwrites() {
        let mut composer = MentionComposer::new(Arc::new(SlowForShortQueries));

        composer.handle_change("hey @al", 7);
        // Past the debounce: the "al" lookup is now in flight.
        tokio::time::sleep(Duration::from_millis(400)).await;
        composer.handle_change("hey @alex", 9);

        assert_eq!(composer.next_results().await, Some(true));
        assert_eq!(names(&composer), vec!["alex one", "alex two"]);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!composer.poll_results());
        assert_eq!(names(&composer), vec!["alex one", "alex two"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_compose_flow() {
        let mut composer = MentionComposer::new(Arc::new(SlowForShortQueries));

        assert_eq!(
            composer.handle_change("Hi @alic", 8),
            InputEvent::Query("alic".to_string())
        );
        assert_eq!(composer.next_results().await, Some(true));
        assert!(composer.input().is_open());

        assert!(composer.handle_key(Key::ArrowDown).prevent_default);
        let outcome = composer.handle_key(Key::Enter);
        let change = outcome.change.unwrap();
        assert_eq!(change.value, "Hi @alic two ");
        assert_eq!(
            composer.handle_change(change.value.clone(), change.caret),
            InputEvent::Ignored
        );
        assert!(!composer.input().is_open());
        assert_eq!(composer.input().committed_mentions()[0].user_id, "alic-2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_cancels_pending_search() {
        let mut composer = MentionComposer::new(Arc::new(SlowForShortQueries));
        composer.handle_change("@alex", 5);
        assert_eq!(composer.handle_change("@alex ", 6), InputEvent::Closed);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!composer.poll_results());
        assert!(composer.input().results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_drive_debounce_and_limit() {
        let settings = AppSettings {
            debounce_ms: 50,
            search_limit: 3,
            ..AppSettings::default()
        };
        let dir = Arc::new(LimitRecorder::default());
        let mut composer = MentionComposer::from_settings(dir.clone(), &settings);
        let started = tokio::time::Instant::now();

        composer.handle_change("@al", 3);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!composer.poll_results());
        assert!(dir.limits.lock().unwrap().is_empty());

        assert_eq!(composer.next_results().await, Some(true));
        assert!(started.elapsed() < Duration::from_millis(300));
        assert_eq!(names(&composer), vec!["al one"]);
        assert_eq!(*dir.limits.lock().unwrap(), vec![3]);
    }
}
