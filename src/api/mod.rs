// SPDX-License-Identifier: MPL-2.0

mod client;
mod types;

pub use client::{ClientError, GigLinkClient, UserDirectory};
pub use types::{MentionRecord, UserSummary, profile_href};
