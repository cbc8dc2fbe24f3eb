//! Application operations over one injected store.

use std::collections::BTreeSet;

use chrono::Utc;

use crate::analytics::{self, DashboardSummary};
use crate::config::Config;
use crate::error::{PollError, PollResult};
use crate::models::{CreatePollInput, Poll, ShareLink, UpdateProfileInput, UserProfile};
use crate::repository::{PollRepository, UserRepository, VoteReceipts};
use crate::store::KeyValueStore;

/// Poll operations backed by one injected store.
pub struct PollService<S> {
    store: S,
    config: Config,
}

impl<S: KeyValueStore> PollService<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn polls(&self) -> PollRepository<'_, S> {
        PollRepository::new(&self.store)
    }

    fn receipts(&self) -> VoteReceipts<'_, S> {
        VoteReceipts::new(&self.store)
    }

    fn users(&self) -> UserRepository<'_, S> {
        UserRepository::new(&self.store)
    }

    /// Validate and store a new poll.
    pub fn create_poll(&self, input: CreatePollInput) -> PollResult<Poll> {
        let poll = Poll::create(input)?;
        self.polls().insert(&poll)?;
        tracing::info!(poll_id = %poll.id(), options = poll.options().len(), "poll created");
        Ok(poll)
    }

    pub fn get_poll(&self, id: &str) -> PollResult<Option<Poll>> {
        self.polls().get(id)
    }

    pub fn list_polls(&self) -> PollResult<Vec<Poll>> {
        self.polls().load_all()
    }

    /// Polls whose title or description contains `term`, ignoring case.
    pub fn search_polls(&self, term: &str) -> PollResult<Vec<Poll>> {
        let term = term.trim().to_lowercase();
        let polls = self.list_polls()?;
        if term.is_empty() {
            return Ok(polls);
        }
        Ok(polls
            .into_iter()
            .filter(|p| {
                p.title().to_lowercase().contains(&term)
                    || p.description().is_some_and(|d| d.to_lowercase().contains(&term))
            })
            .collect())
    }

    pub fn has_voted(&self, id: &str) -> PollResult<bool> {
        self.receipts().has_voted(id)
    }

    /// Cast this client's vote and remember that it voted.
    ///
    /// Unknown ids are a no-op. A single-choice poll takes exactly one
    /// option per vote. The receipt is written before the tallies, and is
    /// taken back if the tallies cannot be written, so a failed vote leaves
    /// neither behind.
    pub fn vote(&self, id: &str, selections: &[usize]) -> PollResult<Option<Poll>> {
        let receipts = self.receipts();
        if receipts.has_voted(id)? {
            return Err(PollError::AlreadyVoted(id.to_string()));
        }

        let polls = self.polls();
        let mut all = polls.load_all()?;
        let Some(poll) = all.iter_mut().find(|p| p.id() == id) else {
            tracing::debug!(poll_id = %id, "vote on unknown poll ignored");
            return Ok(None);
        };

        let distinct: BTreeSet<usize> = selections.iter().copied().collect();
        if !poll.multiple_choice() && distinct.len() > 1 {
            return Err(PollError::validation(
                "This poll accepts a single option per vote",
            ));
        }
        poll.cast_vote(distinct)?;
        let updated = poll.clone();

        receipts.record(id)?;
        if let Err(e) = polls.save_all(&all) {
            if let Err(undo) = receipts.forget(id) {
                tracing::warn!(poll_id = %id, error = %undo, "could not take back vote receipt");
            }
            return Err(e);
        }

        tracing::info!(poll_id = %id, total_votes = updated.total_votes(), "vote recorded");
        Ok(Some(updated))
    }

    /// Append a comment. A missing author falls back to the configured one.
    pub fn comment(&self, id: &str, text: &str, author: Option<&str>) -> PollResult<Option<Poll>> {
        let author = author.unwrap_or(self.config.default_author.as_str());
        let updated = self.polls().update(id, |poll| {
            poll.add_comment(text, author)?;
            Ok(())
        })?;
        if updated.is_some() {
            tracing::info!(poll_id = %id, "comment added");
        }
        Ok(updated)
    }

    pub fn delete_poll(&self, id: &str) -> PollResult<bool> {
        let removed = self.polls().delete(id)?;
        if removed {
            tracing::info!(poll_id = %id, "poll deleted");
        }
        Ok(removed)
    }

    /// Write the two sample polls when nothing was ever stored.
    ///
    /// Returns true if the samples were written.
    pub fn seed_demo_polls(&self) -> PollResult<bool> {
        let polls = self.polls();
        if polls.is_seeded()? {
            return Ok(false);
        }
        polls.save_all(&demo_polls())?;
        tracing::info!("demo polls seeded");
        Ok(true)
    }

    pub fn share_link(&self, id: &str) -> PollResult<Option<ShareLink>> {
        Ok(self.get_poll(id)?.map(|poll| ShareLink {
            url: format!("{}/poll/{}", self.config.share_origin, poll.id()),
            text: match poll.description() {
                Some(description) => description.to_string(),
                None => format!("Vote on: {}", poll.title()),
            },
            title: poll.title().to_string(),
        }))
    }

    pub fn profile(&self) -> PollResult<Option<UserProfile>> {
        self.users().load()
    }

    /// Replace name, email and bio, keeping the original creation time.
    pub fn update_profile(&self, input: UpdateProfileInput) -> PollResult<UserProfile> {
        let created_at = self
            .users()
            .load()?
            .map_or_else(Utc::now, |existing| existing.created_at);
        let profile = UserProfile {
            name: input.name,
            email: input.email,
            bio: input.bio,
            created_at,
        };
        self.users().save(&profile)?;
        tracing::info!("profile updated");
        Ok(profile)
    }

    pub fn dashboard(&self) -> PollResult<DashboardSummary> {
        Ok(analytics::summarize(&self.list_polls()?))
    }
}

fn demo_polls() -> Vec<Poll> {
    vec![
        Poll::with_tallies(
            "1",
            "What's your favorite programming language?",
            "Help us understand developer preferences",
            &[("JavaScript", 45), ("Python", 32), ("Java", 18), ("Go", 12)],
        ),
        Poll::with_tallies(
            "2",
            "Best time for team meetings?",
            "Finding the optimal meeting time",
            &[("9 AM", 23), ("11 AM", 34), ("2 PM", 28), ("4 PM", 15)],
        ),
    ]
}
