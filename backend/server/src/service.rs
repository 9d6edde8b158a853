//! # Election Service
//!
//! Entry point for every booth operation. The store is handed in at
//! construction, so each service is scoped to whatever backend it was built
//! with.
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    ballot::Ballot,
    config::Config,
    database::{DEADLINE_KEY, Store},
    error::ElectionError,
    models::{Admin, Candidate, Channel, VotePayload, VoteRecord, Voter},
    results::{ResultsStats, fetch_results},
    submission::{Submission, SubmissionGuard, submit_physical_vote},
    utils::{is_past, parse_deadline},
    verification::verify_voter,
};

/// Everything the booth shows when it opens.
#[derive(Clone, Debug, Serialize)]
pub struct BoothData {
    pub candidates: Vec<Candidate>,
    pub deadline: Option<DateTime<Utc>>,
    pub voting_ended: bool,
    pub live_vote_count: u64,
}

impl BoothData {
    pub fn ballot(&self) -> Ballot {
        Ballot::from_candidates(self.candidates.iter().cloned())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Policy {
    pub guard: SubmissionGuard,
    pub verify_identity: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            guard: SubmissionGuard::Atomic,
            verify_identity: true,
        }
    }
}

impl From<&Config> for Policy {
    fn from(config: &Config) -> Self {
        Self {
            guard: config.submission_guard,
            verify_identity: config.verify_identity,
        }
    }
}

pub struct ElectionService<S> {
    store: S,
    policy: Policy,
}

impl<S: Store> ElectionService<S> {
    pub fn new(store: S, policy: Policy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Admin, ElectionError> {
        let username = username.trim();

        if username.is_empty() || password.is_empty() {
            return Err(ElectionError::MissingField("username and password"));
        }

        match self.store.find_director(username).await? {
            Some(director) if director.password == password => {
                info!("Admin {username} logged in");
                Ok(Admin {
                    username: director.username,
                })
            }
            _ => {
                warn!("Rejected login for {username}");
                Err(ElectionError::InvalidCredentials)
            }
        }
    }

    /// Resolves the operator named on a submission to a known director.
    pub async fn operator(&self, username: &str) -> Result<Admin, ElectionError> {
        let username = username.trim();

        if username.is_empty() {
            return Err(ElectionError::MissingField("operator"));
        }

        match self.store.find_director(username).await? {
            Some(director) => Ok(Admin {
                username: director.username,
            }),
            None => {
                warn!("Rejected submission by unknown operator {username}");
                Err(ElectionError::InvalidCredentials)
            }
        }
    }

    pub async fn verify_voter(
        &self,
        registration_number: &str,
        identity: &str,
    ) -> Result<Voter, ElectionError> {
        verify_voter(
            &self.store,
            registration_number,
            identity,
            self.policy.verify_identity,
        )
        .await
    }

    /// Ordered by position, then name.
    pub async fn candidates(&self) -> Result<Vec<Candidate>, ElectionError> {
        let mut candidates = self.store.candidates().await?;
        candidates.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));

        Ok(candidates)
    }

    /// `None` when unset, unreadable, or unparsable.
    pub async fn deadline(&self) -> Option<DateTime<Utc>> {
        let raw = match self.store.setting(DEADLINE_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to fetch deadline: {e}");
                return None;
            }
        };

        let deadline = parse_deadline(&raw);
        if deadline.is_none() {
            warn!("Ignoring unparsable deadline {raw:?}");
        }

        deadline
    }

    /// Physical votes only. Failures read as zero.
    pub async fn live_vote_count(&self) -> u64 {
        self.store
            .count_votes(Channel::Physical)
            .await
            .unwrap_or_else(|e| {
                error!("Error fetching vote count: {e}");
                0
            })
    }

    pub async fn load_booth(&self) -> Result<BoothData, ElectionError> {
        let (candidates, deadline, live_vote_count) = tokio::join!(
            self.candidates(),
            self.deadline(),
            self.live_vote_count()
        );

        Ok(BoothData {
            candidates: candidates?,
            deadline,
            voting_ended: is_past(deadline, Utc::now()),
            live_vote_count,
        })
    }

    /// `ballot` and `deadline` are what the booth already loaded, so an
    /// incomplete ballot is rejected without touching the store.
    pub async fn submit_vote(
        &self,
        ballot: &Ballot,
        votes: VotePayload,
        registration_number: &str,
        operator: &Admin,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<VoteRecord, ElectionError> {
        submit_physical_vote(
            &self.store,
            self.policy.guard,
            Submission {
                ballot,
                votes,
                registration_number,
                operator: &operator.username,
                deadline,
                now: Utc::now(),
            },
        )
        .await
    }

    pub async fn results(&self) -> Result<ResultsStats, ElectionError> {
        fetch_results(&self.store).await
    }
}
