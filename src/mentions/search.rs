// SPDX-License-Identifier: MPL-2.0

//! Debounced suggestion search.
//!
//! Scheduling a query aborts whatever was pending and invalidates its ticket,
//! so at most one search is ever live and a superseded one can never report.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{UserDirectory, UserSummary};
use crate::config::{SEARCH_DEBOUNCE_MS, SEARCH_LIMIT};
use crate::mentions::generation::{Generation, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    /// The query that started this search.
    pub query: String,
    pub ticket: Ticket,
    pub results: Vec<UserSummary>,
}

pub struct SuggestionSearch {
    directory: Arc<dyn UserDirectory>,
    debounce: Duration,
    limit: usize,
    generation: Generation,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<SearchResponse>,
}

impl SuggestionSearch {
    /// Must be called from within a Tokio runtime; searches are spawned onto it.
    pub fn new(
        directory: Arc<dyn UserDirectory>,
    ) -> (Self, mpsc::UnboundedReceiver<SearchResponse>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let search = Self {
            directory,
            debounce: Duration::from_millis(SEARCH_DEBOUNCE_MS),
            limit: SEARCH_LIMIT,
            generation: Generation::new(),
            pending: None,
            tx,
        };
        (search, rx)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.is_current(ticket)
    }

    /// Replace any pending search with one for `query`.
    pub fn schedule(&mut self, query: &str) -> Ticket {
        self.abort_pending();
        let ticket = self.generation.advance();

        let directory = Arc::clone(&self.directory);
        let generation = self.generation.clone();
        let tx = self.tx.clone();
        let debounce = self.debounce;
        let limit = self.limit;
        let query = query.to_string();

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if !generation.is_current(ticket) {
                return;
            }

            let results = match directory.search_users(&query, limit).await {
                Ok(users) => users,
                Err(e) => {
                    warn!(%query, error = %e, "suggestion search failed");
                    Vec::new()
                }
            };

            if !generation.is_current(ticket) {
                debug!(%query, "suggestion search superseded");
                return;
            }
            let _ = tx.send(SearchResponse {
                query,
                ticket,
                results,
            });
        }));
        ticket
    }

    /// Drop any pending search; nothing it produces will be delivered.
    pub fn cancel(&mut self) {
        self.abort_pending();
        self.generation.advance();
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for SuggestionSearch {
    fn drop(&mut self) {
        self.abort_pending();
    }
}
