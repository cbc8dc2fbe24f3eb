//! Local poll creation and voting.
//!
//! Polls, vote receipts and the user profile live as JSON documents in a
//! flat key-value store injected into [`PollService`]. The tally rules live
//! on [`Poll`] itself; see [`poll`].

pub mod analytics;
pub mod config;
pub mod error;
pub mod models;
pub mod poll;
pub mod repository;
pub mod services;
pub mod store;

pub use analytics::{DashboardSummary, DistributionSlice, PollPerformance};
pub use config::Config;
pub use error::{PollError, PollResult};
pub use models::{
    Comment, CreatePollInput, OptionResult, Poll, PollStatus, ShareLink, UpdateProfileInput,
    UserProfile,
};
pub use repository::{PollRepository, UserRepository, VoteReceipts};
pub use services::PollService;
pub use store::{FileStore, InMemoryStore, KeyValueStore};
