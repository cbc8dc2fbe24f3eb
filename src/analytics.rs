//! Aggregate figures shown on the dashboard, analytics and profile screens.

use serde::Serialize;

use crate::models::Poll;
use crate::poll::percent_of;

pub const PERFORMANCE_NAME_LEN: usize = 20;
pub const DISTRIBUTION_NAME_LEN: usize = 15;
pub const RECENT_POLLS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_polls: usize,
    pub total_votes: u64,
    pub active_polls: usize,
    pub average_votes_per_poll: u64,
    pub total_comments: usize,
    /// Active polls as a rounded percentage of all polls.
    pub active_share: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollPerformance {
    pub name: String,
    pub votes: u64,
    pub comments: usize,
    /// Votes plus two points per comment.
    pub engagement: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionSlice {
    pub name: String,
    pub votes: u64,
}

pub fn summarize(polls: &[Poll]) -> DashboardSummary {
    let total_polls = polls.len();
    let total_votes: u64 = polls.iter().map(Poll::total_votes).sum();
    let active_polls = polls.iter().filter(|p| p.is_active()).count();
    let total_comments = polls.iter().map(|p| p.comments().len()).sum();

    let average_votes_per_poll = if total_polls == 0 {
        0
    } else {
        let n = total_polls as u64;
        (total_votes * 2 + n) / (n * 2)
    };

    DashboardSummary {
        total_polls,
        total_votes,
        active_polls,
        average_votes_per_poll,
        total_comments,
        active_share: percent_of(active_polls as u64, total_polls as u64),
    }
}

/// The first `limit` polls in stored order, as the dashboard lists them.
pub fn recent_polls(polls: &[Poll], limit: usize) -> &[Poll] {
    &polls[..polls.len().min(limit)]
}

/// The `limit` polls with the most votes; ties keep stored order.
pub fn top_performers(polls: &[Poll], limit: usize) -> Vec<PollPerformance> {
    let mut rows: Vec<PollPerformance> = polls
        .iter()
        .map(|p| {
            let comments = p.comments().len();
            PollPerformance {
                name: truncate_title(p.title(), PERFORMANCE_NAME_LEN),
                votes: p.total_votes(),
                comments,
                engagement: p.total_votes() + 2 * comments as u64,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.votes.cmp(&a.votes));
    rows.truncate(limit);
    rows
}

/// Polls that received at least one vote.
pub fn vote_distribution(polls: &[Poll]) -> Vec<DistributionSlice> {
    polls
        .iter()
        .filter(|p| p.total_votes() > 0)
        .map(|p| DistributionSlice {
            name: truncate_title(p.title(), DISTRIBUTION_NAME_LEN),
            votes: p.total_votes(),
        })
        .collect()
}

/// Cut `title` to `max` characters, marking the cut with "...".
pub fn truncate_title(title: &str, max: usize) -> String {
    match title.char_indices().nth(max) {
        Some((byte, _)) => format!("{}...", &title[..byte]),
        None => title.to_string(),
    }
}
