// SPDX-License-Identifier: MPL-2.0

use crate::api::UserSummary;

pub const PRIORITY_EXACT: u8 = 0;
pub const PRIORITY_PREFIX: u8 = 1;
pub const PRIORITY_WORD_PREFIX: u8 = 2;
pub const PRIORITY_SUBSTRING: u8 = 3;
pub const PRIORITY_NONE: u8 = 9;

/// Lower is better. All comparisons ignore case.
pub fn match_priority(name: &str, query: &str) -> u8 {
    let name = name.to_lowercase();
    let query = query.to_lowercase();

    if name == query {
        PRIORITY_EXACT
    } else if name.starts_with(&query) {
        PRIORITY_PREFIX
    } else if name.split_whitespace().any(|word| word.starts_with(&query)) {
        PRIORITY_WORD_PREFIX
    } else if name.contains(&query) {
        PRIORITY_SUBSTRING
    } else {
        PRIORITY_NONE
    }
}

/// Order suggestions by match priority, then by name.
pub fn rank_candidates(query: &str, mut candidates: Vec<UserSummary>) -> Vec<UserSummary> {
    candidates.sort_by_cached_key(|c| (match_priority(&c.name, query), c.name.to_lowercase()));
    candidates
}
