//! Boot binary: opens the file store, seeds demo polls and logs the dashboard.

use std::process::ExitCode;

use pollbox::{analytics, Config, FileStore, PollResult, PollService};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "pollbox failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> PollResult<()> {
    let config = Config::from_env()?;
    tracing::info!(store = %config.store_path.display(), "opening store");

    let store = FileStore::new(&config.store_path);
    let service = PollService::new(store, config);
    service.seed_demo_polls()?;

    let polls = service.list_polls()?;
    let summary = analytics::summarize(&polls);
    tracing::info!(
        total_polls = summary.total_polls,
        total_votes = summary.total_votes,
        active_polls = summary.active_polls,
        average_votes = summary.average_votes_per_poll,
        "dashboard"
    );

    for poll in analytics::recent_polls(&polls, analytics::RECENT_POLLS) {
        tracing::info!(poll = %poll.title(), votes = poll.total_votes(), "recent poll");
    }
    Ok(())
}
