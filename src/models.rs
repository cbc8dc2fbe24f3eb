//! Stored records and the input/output shapes around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AUTHOR: &str = "Anonymous";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    #[default]
    Active,
    Closed,
}

/// A poll together with its tallies and comments, stored under `"polls"`.
///
/// Fields are crate-private so tallies only change through the operations in
/// [`crate::poll`]. Decoding goes through [`RawPoll`], which lines the tallies
/// up with the options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawPoll")]
pub struct Poll {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) options: Vec<String>,
    pub(crate) votes: Vec<u64>,
    pub(crate) total_votes: u64,
    pub(crate) allow_comments: bool,
    pub(crate) multiple_choice: bool,
    pub(crate) status: PollStatus,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) comments: Vec<Comment>,
}

/// A poll record as stored, before its tallies are checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPoll {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    options: Vec<String>,
    #[serde(default)]
    votes: Vec<u64>,
    #[serde(default)]
    total_votes: u64,
    #[serde(default)]
    allow_comments: bool,
    #[serde(default)]
    multiple_choice: bool,
    #[serde(default)]
    status: PollStatus,
    created_at: DateTime<Utc>,
    #[serde(default)]
    comments: Vec<Comment>,
}

impl From<RawPoll> for Poll {
    /// One vote slot per option; the total is always the sum of the slots.
    fn from(raw: RawPoll) -> Self {
        let mut votes = raw.votes;
        if votes.len() != raw.options.len() {
            tracing::warn!(
                poll_id = %raw.id,
                options = raw.options.len(),
                slots = votes.len(),
                "vote slots do not match options, resizing"
            );
            votes.resize(raw.options.len(), 0);
        }
        let total_votes = votes.iter().sum();
        if total_votes != raw.total_votes {
            tracing::warn!(
                poll_id = %raw.id,
                stored = raw.total_votes,
                counted = total_votes,
                "stored vote total disagrees with tallies, recounting"
            );
        }

        Self {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            options: raw.options,
            votes,
            total_votes,
            allow_comments: raw.allow_comments,
            multiple_choice: raw.multiple_choice,
            status: raw.status,
            created_at: raw.created_at,
            comments: raw.comments,
        }
    }
}

impl Poll {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The description, or `None` when it was left blank.
    pub fn description(&self) -> Option<&str> {
        if self.description.is_empty() {
            None
        } else {
            Some(&self.description)
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn votes(&self) -> &[u64] {
        &self.votes
    }

    pub fn total_votes(&self) -> u64 {
        self.total_votes
    }

    pub fn allow_comments(&self) -> bool {
        self.allow_comments
    }

    pub fn multiple_choice(&self) -> bool {
        self.multiple_choice
    }

    pub fn status(&self) -> PollStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == PollStatus::Active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Profile record stored under `"user"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub allow_comments: bool,
    #[serde(default)]
    pub multiple_choice: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileInput {
    pub name: String,
    pub email: String,
    pub bio: String,
}

/// One bar of a poll's result chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionResult {
    pub label: String,
    pub votes: u64,
    pub percentage: u8,
}

/// What a client needs to share a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLink {
    pub title: String,
    pub text: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn decodes_record_without_optional_fields() {
        let raw = r#"{
            "id": "1",
            "title": "What's your favorite programming language?",
            "description": "Help us understand developer preferences",
            "options": ["JavaScript", "Python", "Java", "Go"],
            "votes": [45, 32, 18, 12],
            "totalVotes": 107,
            "createdAt": "2024-05-01T12:00:00.000Z",
            "status": "active"
        }"#;

        let poll: Poll = serde_json::from_str(raw).unwrap();
        assert_eq!(poll.id(), "1");
        assert_eq!(poll.total_votes(), 107);
        assert!(poll.comments().is_empty());
        assert!(!poll.allow_comments());
        assert!(!poll.multiple_choice());
        assert!(poll.is_active());
    }

    #[test]
    fn encodes_camel_case_fields() {
        let raw = r#"{"id":"9","title":"T","options":["a","b"],"votes":[0,0],
            "totalVotes":0,"createdAt":"2024-05-01T12:00:00Z","status":"closed"}"#;
        let poll: Poll = serde_json::from_str(raw).unwrap();
        assert_eq!(poll.status(), PollStatus::Closed);
        assert_eq!(poll.description(), None);

        let value = serde_json::to_value(&poll).unwrap();
        assert_eq!(value["totalVotes"], 0);
        assert_eq!(value["allowComments"], false);
        assert_eq!(value["multipleChoice"], false);
        assert_eq!(value["status"], "closed");
    }

    #[test]
    fn stored_total_is_recounted() {
        let raw = r#"{"id":"1","title":"T","options":["A","B"],"votes":[1,1],
            "totalVotes":50,"createdAt":"2024-05-01T12:00:00Z"}"#;
        let poll: Poll = serde_json::from_str(raw).unwrap();
        assert_eq!(poll.votes(), &[1, 1]);
        assert_eq!(poll.total_votes(), 2);
        assert_eq!(poll.percentage(0), 50);
    }

    #[rstest]
    #[case::extra_slots("[4,1,7]", &[4, 1], 5)]
    #[case::missing_slots("[3]", &[3, 0], 3)]
    #[case::no_slots("[]", &[0, 0], 0)]
    fn vote_slots_follow_options(
        #[case] votes: &str,
        #[case] expected: &[u64],
        #[case] total: u64,
    ) {
        let raw = format!(
            r#"{{"id":"1","title":"T","options":["A","B"],"votes":{votes},
            "totalVotes":12,"createdAt":"2024-05-01T12:00:00Z"}}"#
        );
        let poll: Poll = serde_json::from_str(&raw).unwrap();
        assert_eq!(poll.votes(), expected);
        assert_eq!(poll.total_votes(), total);
        assert_eq!(poll.results().len(), 2);
    }

    #[test]
    fn profile_fields_default_to_empty() {
        let profile: UserProfile = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
        assert_eq!(profile.name, "Ada");
        assert!(profile.email.is_empty());
        assert!(profile.bio.is_empty());
    }
}
