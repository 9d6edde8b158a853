//! # Ballot
//!
//! One single-choice group per position, built from the candidate list the
//! booth already fetched. Nothing here touches the store.
use serde::Serialize;

use crate::{
    error::ElectionError,
    models::{Candidate, VotePayload},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PositionGroup {
    pub position: String,
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Ballot {
    groups: Vec<PositionGroup>,
}

impl Ballot {
    /// Groups by position in order of first appearance.
    pub fn from_candidates(candidates: impl IntoIterator<Item = Candidate>) -> Self {
        let mut groups: Vec<PositionGroup> = Vec::new();

        for candidate in candidates {
            match groups
                .iter_mut()
                .find(|group| group.position == candidate.position)
            {
                Some(group) => group.candidates.push(candidate),
                None => groups.push(PositionGroup {
                    position: candidate.position.clone(),
                    candidates: vec![candidate],
                }),
            }
        }

        Self { groups }
    }

    pub fn groups(&self) -> &[PositionGroup] {
        &self.groups
    }

    pub fn positions(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.position.as_str())
    }

    pub fn position_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn has_candidate(&self, position: &str, candidate: &str) -> bool {
        self.groups
            .iter()
            .find(|group| group.position == position)
            .is_some_and(|group| group.candidates.iter().any(|c| c.name == candidate))
    }

    /// Key count must equal the position count and every position must be
    /// chosen.
    pub fn check_complete(&self, votes: &VotePayload) -> Result<(), ElectionError> {
        let required = self.position_count();
        let selected = self
            .positions()
            .filter(|position| votes.contains_key(*position))
            .count();

        if votes.len() != required || selected != required {
            return Err(ElectionError::IncompleteBallot { selected, required });
        }

        Ok(())
    }

    /// Every choice must name a candidate standing for that position.
    pub fn check_choices(&self, votes: &VotePayload) -> Result<(), ElectionError> {
        match votes
            .iter()
            .find(|(position, candidate)| !self.has_candidate(position, candidate))
        {
            Some((position, candidate)) => Err(ElectionError::UnknownCandidate {
                position: position.clone(),
                candidate: candidate.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// In-progress choices, position to candidate name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    votes: VotePayload,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any earlier choice for the same position.
    pub fn select(
        &mut self,
        ballot: &Ballot,
        position: &str,
        candidate: &str,
    ) -> Result<(), ElectionError> {
        if !ballot.has_candidate(position, candidate) {
            return Err(ElectionError::UnknownCandidate {
                position: position.to_string(),
                candidate: candidate.to_string(),
            });
        }

        self.votes
            .insert(position.to_string(), candidate.to_string());

        Ok(())
    }

    pub fn choice(&self, position: &str) -> Option<&str> {
        self.votes.get(position).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn is_complete(&self, ballot: &Ballot) -> bool {
        ballot.check_complete(&self.votes).is_ok()
    }

    /// Percent of positions chosen.
    pub fn progress(&self, ballot: &Ballot) -> f64 {
        if ballot.is_empty() {
            return 0.0;
        }

        self.votes.len() as f64 / ballot.position_count() as f64 * 100.0
    }

    pub fn votes(&self) -> &VotePayload {
        &self.votes
    }

    pub fn into_votes(self) -> VotePayload {
        self.votes
    }
}
