use std::collections::HashSet;

use anyhow::Result;
use sqlx::PgPool;

use crate::common::UserId;
use crate::domains::deck::ranking::CandidateRow;
use crate::domains::decisions::models::UserAction;

/// Filter outcome with removal counts for observability.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    pub candidates: Vec<CandidateRow>,
    pub removed_swiped: usize,
    pub removed_duplicates: usize,
}

/// Defensive second pass over a ranked candidate list.
///
/// Re-queries action history for the candidate id set, closing the race
/// window between ranking and deck assembly, and collapses duplicate ids
/// preserving first-seen order. Read-only; empty input yields an empty
/// result.
pub async fn filter(
    actor_id: UserId,
    candidates: Vec<CandidateRow>,
    pool: &PgPool,
) -> Result<FilterResult> {
    if candidates.is_empty() {
        return Ok(FilterResult {
            candidates,
            removed_swiped: 0,
            removed_duplicates: 0,
        });
    }

    let ids: Vec<UserId> = candidates.iter().map(|c| c.target_id).collect();
    let swiped: HashSet<UserId> = UserAction::decided_targets_among(actor_id, &ids, pool)
        .await?
        .into_iter()
        .collect();

    Ok(apply(candidates, &swiped))
}

fn apply(candidates: Vec<CandidateRow>, swiped: &HashSet<UserId>) -> FilterResult {
    let mut seen: HashSet<UserId> = HashSet::new();
    let mut filtered = Vec::with_capacity(candidates.len());
    let mut removed_swiped = 0;
    let mut removed_duplicates = 0;

    for candidate in candidates {
        if swiped.contains(&candidate.target_id) {
            removed_swiped += 1;
            continue;
        }
        if !seen.insert(candidate.target_id) {
            removed_duplicates += 1;
            continue;
        }
        filtered.push(candidate);
    }

    FilterResult {
        candidates: filtered,
        removed_swiped,
        removed_duplicates,
    }
}
