// SPDX-License-Identifier: MPL-2.0

pub const APP_ID: &str = "io.giglink.GigLink";
pub const APP_NAME: &str = "GigLink";

pub const DEFAULT_API_BASE: &str = "http://localhost:5000";

/// Path of the user-search endpoint, relative to the API base.
pub const MENTION_SEARCH_PATH: &str = "/api/mentions/search";

/// Delay between the last keystroke and the suggestion request.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Number of suggestions requested per query.
pub const SEARCH_LIMIT: usize = 8;

/// Upper bound on bare `@Name` candidates looked up per piece of content.
pub const MAX_RESOLVE_CANDIDATES: usize = 5;

/// Results requested per bare-name lookup; only an exact match is kept.
pub const RESOLVE_LOOKUP_LIMIT: usize = 5;

pub const PROFILE_PATH_PREFIX: &str = "/profile/";
