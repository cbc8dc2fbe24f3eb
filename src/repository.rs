//! Typed access to the collections kept in a [`KeyValueStore`].
//!
//! Every mutation loads the whole collection, changes it and writes the
//! whole collection back.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::PollResult;
use crate::models::{Poll, UserProfile};
use crate::store::KeyValueStore;

pub const POLLS_KEY: &str = "polls";
pub const VOTED_POLLS_KEY: &str = "votedPolls";
pub const USER_KEY: &str = "user";

fn load_json<S: KeyValueStore, T: DeserializeOwned>(store: &S, key: &str) -> PollResult<Option<T>> {
    match store.load(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

fn save_json<S: KeyValueStore, T: Serialize + ?Sized>(store: &S, key: &str, value: &T) -> PollResult<()> {
    let raw = serde_json::to_string(value)?;
    store.save(key, &raw)
}

/// The poll collection stored under `"polls"`.
pub struct PollRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> PollRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Whether a collection was ever written, even an empty one.
    pub fn is_seeded(&self) -> PollResult<bool> {
        Ok(self.store.load(POLLS_KEY)?.is_some())
    }

    /// Load every poll in stored order.
    ///
    /// A collection that fails to decode is logged and treated as empty.
    pub fn load_all(&self) -> PollResult<Vec<Poll>> {
        let Some(raw) = self.store.load(POLLS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(polls) => Ok(polls),
            Err(e) => {
                tracing::warn!(error = %e, "stored polls are unreadable, starting empty");
                Ok(Vec::new())
            }
        }
    }

    pub fn save_all(&self, polls: &[Poll]) -> PollResult<()> {
        save_json(self.store, POLLS_KEY, polls)
    }

    pub fn get(&self, id: &str) -> PollResult<Option<Poll>> {
        Ok(self.load_all()?.into_iter().find(|p| p.id() == id))
    }

    /// Append a poll to the end of the collection.
    pub fn insert(&self, poll: &Poll) -> PollResult<()> {
        let mut polls = self.load_all()?;
        polls.push(poll.clone());
        self.save_all(&polls)
    }

    /// Apply `change` to one poll and write the collection back.
    ///
    /// Returns `Ok(None)` without writing when the id is unknown. When
    /// `change` fails nothing is written.
    pub fn update<F>(&self, id: &str, change: F) -> PollResult<Option<Poll>>
    where
        F: FnOnce(&mut Poll) -> PollResult<()>,
    {
        let mut polls = self.load_all()?;
        let Some(poll) = polls.iter_mut().find(|p| p.id() == id) else {
            return Ok(None);
        };
        change(poll)?;
        let updated = poll.clone();
        self.save_all(&polls)?;
        Ok(Some(updated))
    }

    /// Remove a poll. Returns true if it existed.
    pub fn delete(&self, id: &str) -> PollResult<bool> {
        let mut polls = self.load_all()?;
        let before = polls.len();
        polls.retain(|p| p.id() != id);
        if polls.len() == before {
            return Ok(false);
        }
        self.save_all(&polls)?;
        Ok(true)
    }
}

/// Ids of polls this client already voted on, stored under `"votedPolls"`.
pub struct VoteReceipts<'a, S> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> VoteReceipts<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn all(&self) -> PollResult<Vec<String>> {
        Ok(load_json(self.store, VOTED_POLLS_KEY)?.unwrap_or_default())
    }

    pub fn has_voted(&self, poll_id: &str) -> PollResult<bool> {
        Ok(self.all()?.iter().any(|id| id == poll_id))
    }

    /// Remember a vote on `poll_id`. Recording twice keeps one entry.
    pub fn record(&self, poll_id: &str) -> PollResult<()> {
        let mut ids = self.all()?;
        if ids.iter().any(|id| id == poll_id) {
            return Ok(());
        }
        ids.push(poll_id.to_string());
        save_json(self.store, VOTED_POLLS_KEY, &ids)
    }

    /// Drop the receipt for `poll_id`. Returns true if there was one.
    pub fn forget(&self, poll_id: &str) -> PollResult<bool> {
        let mut ids = self.all()?;
        let before = ids.len();
        ids.retain(|id| id != poll_id);
        if ids.len() == before {
            return Ok(false);
        }
        save_json(self.store, VOTED_POLLS_KEY, &ids)?;
        Ok(true)
    }
}

/// The single profile record stored under `"user"`.
pub struct UserRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> UserRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> PollResult<Option<UserProfile>> {
        load_json(self.store, USER_KEY)
    }

    pub fn save(&self, profile: &UserProfile) -> PollResult<()> {
        save_json(self.store, USER_KEY, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PollError;
    use crate::models::CreatePollInput;
    use crate::store::InMemoryStore;

    fn poll(title: &str) -> Poll {
        Poll::create(CreatePollInput {
            title: title.into(),
            options: vec!["A".into(), "B".into()],
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn insert_keeps_order() {
        let store = InMemoryStore::new();
        let repo = PollRepository::new(&store);
        assert!(!repo.is_seeded().unwrap());

        repo.insert(&poll("first")).unwrap();
        repo.insert(&poll("second")).unwrap();

        let titles: Vec<String> = repo
            .load_all()
            .unwrap()
            .iter()
            .map(|p| p.title().to_string())
            .collect();
        assert_eq!(titles, ["first", "second"]);
        assert!(repo.is_seeded().unwrap());
    }

    #[test]
    fn corrupt_collection_loads_empty() {
        let store = InMemoryStore::new();
        store.save(POLLS_KEY, "{oops").unwrap();
        assert!(PollRepository::new(&store).load_all().unwrap().is_empty());
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let store = InMemoryStore::new();
        let repo = PollRepository::new(&store);
        repo.insert(&poll("only")).unwrap();
        let before = store.load(POLLS_KEY).unwrap();

        let result = repo.update("missing", |p| p.cast_vote([0])).unwrap();
        assert!(result.is_none());
        assert_eq!(store.load(POLLS_KEY).unwrap(), before);
    }

    #[test]
    fn failed_update_writes_nothing() {
        let store = InMemoryStore::new();
        let repo = PollRepository::new(&store);
        let p = poll("only");
        repo.insert(&p).unwrap();

        let err = repo.update(p.id(), |p| p.cast_vote([9])).unwrap_err();
        assert!(matches!(err, PollError::Validation(_)));
        assert_eq!(repo.get(p.id()).unwrap().unwrap().total_votes(), 0);
    }

    #[test]
    fn update_persists_change() {
        let store = InMemoryStore::new();
        let repo = PollRepository::new(&store);
        let p = poll("only");
        repo.insert(&p).unwrap();

        let updated = repo.update(p.id(), |p| p.cast_vote([1])).unwrap().unwrap();
        assert_eq!(updated.votes(), &[0, 1]);
        assert_eq!(repo.get(p.id()).unwrap().unwrap().votes(), &[0, 1]);
    }

    #[test]
    fn delete_reports_presence() {
        let store = InMemoryStore::new();
        let repo = PollRepository::new(&store);
        let keep = poll("keep");
        let gone = poll("gone");
        repo.insert(&keep).unwrap();
        repo.insert(&gone).unwrap();

        assert!(repo.delete(gone.id()).unwrap());
        assert!(!repo.delete(gone.id()).unwrap());
        let remaining = repo.load_all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), keep.id());
    }

    #[test]
    fn receipts_record_once() {
        let store = InMemoryStore::new();
        let receipts = VoteReceipts::new(&store);
        assert!(!receipts.has_voted("1").unwrap());

        receipts.record("1").unwrap();
        receipts.record("1").unwrap();
        receipts.record("2").unwrap();

        assert!(receipts.has_voted("1").unwrap());
        assert_eq!(receipts.all().unwrap(), ["1", "2"]);
        assert_eq!(store.load(VOTED_POLLS_KEY).unwrap().as_deref(), Some(r#"["1","2"]"#));
    }

    #[test]
    fn forget_drops_one_receipt() {
        let store = InMemoryStore::new();
        let receipts = VoteReceipts::new(&store);
        receipts.record("1").unwrap();
        receipts.record("2").unwrap();

        assert!(receipts.forget("1").unwrap());
        assert!(!receipts.forget("1").unwrap());
        assert_eq!(receipts.all().unwrap(), ["2"]);
    }

    #[test]
    fn profile_round_trips_through_store() {
        let store = InMemoryStore::new();
        let users = UserRepository::new(&store);
        assert!(users.load().unwrap().is_none());

        store
            .save(USER_KEY, r#"{"name":"Ada","email":"ada@example.com","bio":"","createdAt":"2024-01-01T00:00:00Z"}"#)
            .unwrap();
        let profile = users.load().unwrap().unwrap();
        assert_eq!(profile.email, "ada@example.com");
    }
}
