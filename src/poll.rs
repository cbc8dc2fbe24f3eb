//! The poll aggregate: creation, voting, comments and derived percentages.

use std::collections::BTreeSet;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{PollError, PollResult};
use crate::models::{Comment, CreatePollInput, OptionResult, Poll, PollStatus, DEFAULT_AUTHOR};

pub const MIN_OPTIONS: usize = 2;

impl Poll {
    /// Validate the input and build a fresh poll with zeroed tallies.
    pub fn create(input: CreatePollInput) -> PollResult<Self> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(PollError::validation("Poll title cannot be empty"));
        }

        let mut options = Vec::with_capacity(input.options.len());
        for option in &input.options {
            let option = option.trim();
            if option.is_empty() {
                return Err(PollError::validation("Poll options cannot be empty"));
            }
            options.push(option.to_string());
        }
        if options.len() < MIN_OPTIONS {
            return Err(PollError::validation(format!(
                "Poll must have at least {MIN_OPTIONS} options"
            )));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: input.description.trim().to_string(),
            votes: vec![0; options.len()],
            options,
            total_votes: 0,
            allow_comments: input.allow_comments,
            multiple_choice: input.multiple_choice,
            status: PollStatus::Active,
            created_at: Utc::now(),
            comments: Vec::new(),
        })
    }

    /// Record one vote event: every selected option gains one vote.
    ///
    /// Selections are a set, so repeated indices count once. The whole
    /// selection is checked before any tally moves. Single-choice gating is
    /// left to the caller.
    pub fn cast_vote<I>(&mut self, selections: I) -> PollResult<()>
    where
        I: IntoIterator<Item = usize>,
    {
        if self.status == PollStatus::Closed {
            return Err(PollError::Closed);
        }

        let selections: BTreeSet<usize> = selections.into_iter().collect();
        if selections.is_empty() {
            return Err(PollError::validation("Select at least one option"));
        }
        if let Some(bad) = selections.iter().find(|&&i| i >= self.options.len()) {
            return Err(PollError::validation(format!("Invalid option index {bad}")));
        }

        for index in selections {
            self.votes[index] += 1;
            self.total_votes += 1;
        }
        Ok(())
    }

    /// Append a comment; an empty author is stored as "Anonymous".
    pub fn add_comment(&mut self, text: &str, author: &str) -> PollResult<&Comment> {
        if !self.allow_comments {
            return Err(PollError::CommentsDisabled);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(PollError::validation("Comment cannot be empty"));
        }
        let author = match author.trim() {
            "" => DEFAULT_AUTHOR,
            name => name,
        };

        self.comments.push(Comment {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            author: author.to_string(),
            created_at: Utc::now(),
        });
        Ok(&self.comments[self.comments.len() - 1])
    }

    /// Share of the total held by one option, rounded to the nearest whole
    /// percent with halves rounded up.
    ///
    /// Each option is rounded on its own, so the figures of a poll need not
    /// add up to exactly 100.
    pub fn percentage(&self, index: usize) -> u8 {
        let Some(&votes) = self.votes.get(index) else {
            return 0;
        };
        percent_of(votes, self.total_votes)
    }

    /// Per-option chart rows, in option order.
    pub fn results(&self) -> Vec<OptionResult> {
        self.options
            .iter()
            .zip(&self.votes)
            .map(|(label, &votes)| OptionResult {
                label: label.clone(),
                votes,
                percentage: percent_of(votes, self.total_votes),
            })
            .collect()
    }

    pub fn close(&mut self) {
        self.status = PollStatus::Closed;
    }

    /// Build a poll with existing tallies; used for the bundled demo data.
    pub(crate) fn with_tallies(
        id: &str,
        title: &str,
        description: &str,
        tallies: &[(&str, u64)],
    ) -> Self {
        let votes: Vec<u64> = tallies.iter().map(|&(_, v)| v).collect();
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            options: tallies.iter().map(|&(o, _)| o.to_string()).collect(),
            total_votes: votes.iter().sum(),
            votes,
            allow_comments: false,
            multiple_choice: false,
            status: PollStatus::Active,
            created_at: Utc::now(),
            comments: Vec::new(),
        }
    }
}

/// `round(part / whole * 100)`, or 0 for an empty whole.
pub(crate) fn percent_of(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = u128::from(part.min(whole));
    let whole = u128::from(whole);
    ((part * 200 + whole) / (whole * 2)) as u8
}
