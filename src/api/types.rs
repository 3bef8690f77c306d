// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};

use crate::config::PROFILE_PATH_PREFIX;

/// Snapshot of a mentioned user, as attached to posts, comments and replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionRecord {
    pub user_id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl MentionRecord {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// One entry of the user-search endpoint's response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserSummary {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            username: None,
            avatar: None,
        }
    }

    /// Mentions are displayed by name, never by the login username.
    pub fn to_mention(&self) -> MentionRecord {
        MentionRecord {
            user_id: self.id.clone(),
            username: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Route of a user's profile page in the host router.
pub fn profile_href(user_id: &str) -> String {
    format!("{PROFILE_PATH_PREFIX}{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mention_record_uses_camel_case() {
        let record: MentionRecord =
            serde_json::from_str(r#"{"userId":"u1","username":"Alice"}"#).unwrap();
        assert_eq!(record, MentionRecord::new("u1", "Alice"));

        let json = serde_json::to_string(&record.with_avatar("a.png")).unwrap();
        assert_eq!(json, r#"{"userId":"u1","username":"Alice","avatar":"a.png"}"#);
    }

    #[test]
    fn test_user_summary_reads_mongo_id() {
        let users: Vec<UserSummary> = serde_json::from_str(
            r#"[{"_id":"64ab","name":"Alice Smith","username":"alice","avatar":null}]"#,
        )
        .unwrap();
        assert_eq!(users[0].id, "64ab");
        assert_eq!(users[0].username.as_deref(), Some("alice"));
        assert_eq!(users[0].to_mention().username, "Alice Smith");
    }

    #[test]
    fn test_profile_href() {
        assert_eq!(profile_href("42"), "/profile/42");
    }
}
