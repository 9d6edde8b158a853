//! # Results
//!
//! Tally of every vote record, both channels, per position.
use serde::Serialize;
use tracing::debug;

use crate::{
    database::Store,
    error::ElectionError,
    models::{Candidate, Channel, VoteRecord},
    utils::percentage,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateResult {
    pub candidate: String,
    pub votes: u64,
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionResults {
    pub position: String,
    pub results: Vec<CandidateResult>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsStats {
    pub total_voters: u64,
    pub results_by_position: Vec<PositionResults>,
}

impl ResultsStats {
    pub fn position(&self, position: &str) -> Option<&PositionResults> {
        self.results_by_position
            .iter()
            .find(|results| results.position == position)
    }
}

pub fn tally(candidates: &[Candidate], records: &[VoteRecord]) -> ResultsStats {
    let mut positions: Vec<&str> = Vec::new();
    for candidate in candidates {
        if !positions.contains(&candidate.position.as_str()) {
            positions.push(candidate.position.as_str());
        }
    }

    let results_by_position = positions
        .into_iter()
        .map(|position| tally_position(position, candidates, records))
        .collect();

    ResultsStats {
        total_voters: records.len() as u64,
        results_by_position,
    }
}

fn tally_position(
    position: &str,
    candidates: &[Candidate],
    records: &[VoteRecord],
) -> PositionResults {
    let mut counts: Vec<(&str, u64)> = Vec::new();
    for candidate in candidates.iter().filter(|c| c.position == position) {
        if !counts.iter().any(|(name, _)| *name == candidate.name) {
            counts.push((candidate.name.as_str(), 0));
        }
    }

    for record in records {
        let Some(choice) = record.votes.get(position) else {
            continue;
        };

        match counts.iter_mut().find(|(name, _)| name == choice) {
            Some((_, count)) => *count += 1,
            None => {
                #[cfg(feature = "verbose")]
                tracing::info!("Ignoring vote for unknown {position} candidate {choice}");
            }
        }
    }

    let total: u64 = counts.iter().map(|(_, count)| count).sum();

    let mut results: Vec<CandidateResult> = counts
        .into_iter()
        .map(|(name, votes)| CandidateResult {
            candidate: name.to_string(),
            votes,
            percentage: percentage(votes, total),
        })
        .collect();

    results.sort_by(|a, b| b.votes.cmp(&a.votes));

    PositionResults {
        position: position.to_string(),
        results,
    }
}

pub async fn fetch_results<S: Store>(store: &S) -> Result<ResultsStats, ElectionError> {
    let candidates = store.candidates().await?;

    let mut records = Vec::new();
    for channel in Channel::ALL {
        records.extend(store.votes(channel).await?);
    }

    debug!(
        "Tallying {} records over {} candidates",
        records.len(),
        candidates.len()
    );

    Ok(tally(&candidates, &records))
}
