//! # Vote Submission
//!
//! Physical votes entered by an operator on behalf of a voter at the booth.
//!
//! Two orderings are supported:
//!
//! - [`SubmissionGuard::Unguarded`]: insert the record, then flip `has_voted`.
//!   Nothing stops two submissions for the same voter from both landing.
//! - [`SubmissionGuard::Atomic`]: claim the voter with one conditional write
//!   first, then insert the record. Only one submission per voter gets
//!   through.
//!
//! Either way a failure of the second write leaves the records disagreeing and
//! is reported as [`ElectionError::CriticalInconsistency`]. Nothing is rolled
//! back.
use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::{
    ballot::Ballot,
    database::{Claim, Store},
    error::ElectionError,
    models::{Channel, VotePayload, VoteRecord},
    utils::{is_past, normalize_reg_number},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmissionGuard {
    Unguarded,
    #[default]
    Atomic,
}

impl FromStr for SubmissionGuard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unguarded" => Ok(SubmissionGuard::Unguarded),
            "atomic" => Ok(SubmissionGuard::Atomic),
            other => Err(format!("expected \"atomic\" or \"unguarded\", got {other:?}")),
        }
    }
}

impl fmt::Display for SubmissionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubmissionGuard::Unguarded => "unguarded",
            SubmissionGuard::Atomic => "atomic",
        })
    }
}

pub struct Submission<'a> {
    pub ballot: &'a Ballot,
    pub votes: VotePayload,
    pub registration_number: &'a str,
    pub operator: &'a str,
    pub deadline: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

pub async fn submit_physical_vote<S: Store>(
    store: &S,
    guard: SubmissionGuard,
    submission: Submission<'_>,
) -> Result<VoteRecord, ElectionError> {
    submission.ballot.check_complete(&submission.votes)?;
    submission.ballot.check_choices(&submission.votes)?;

    if is_past(submission.deadline, submission.now) {
        return Err(ElectionError::VotingClosed);
    }

    let registration_number = normalize_reg_number(submission.registration_number);
    if registration_number.is_empty() {
        return Err(ElectionError::MissingField("registration number"));
    }

    let record = VoteRecord {
        votes: submission.votes,
        voter_reg_number: registration_number.clone(),
        admin_operator: submission.operator.to_string(),
        vote_type: Channel::Physical,
    };

    match guard {
        SubmissionGuard::Unguarded => record_then_flag(store, &record).await?,
        SubmissionGuard::Atomic => claim_then_record(store, &record).await?,
    }

    info!(
        "Recorded physical vote for {registration_number} by {}",
        record.admin_operator
    );

    Ok(record)
}

async fn record_then_flag<S: Store>(store: &S, record: &VoteRecord) -> Result<(), ElectionError> {
    store.insert_vote(record).await?;

    match store.mark_voted(&record.voter_reg_number).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            warn!(
                "Vote recorded for {} but no voter record matched",
                record.voter_reg_number
            );
            Ok(())
        }
        Err(source) => {
            error!(
                "CRITICAL: Vote for {} recorded, but failed to mark as voted: {source}",
                record.voter_reg_number
            );
            Err(ElectionError::CriticalInconsistency {
                registration_number: record.voter_reg_number.clone(),
                source,
            })
        }
    }
}

async fn claim_then_record<S: Store>(store: &S, record: &VoteRecord) -> Result<(), ElectionError> {
    match store.claim_voter(&record.voter_reg_number).await? {
        Claim::Claimed => {}
        Claim::AlreadyVoted => {
            warn!(
                "Rejected second ballot for {}",
                record.voter_reg_number
            );
            return Err(ElectionError::AlreadyVoted);
        }
        Claim::Missing => return Err(ElectionError::NotRegistered),
    }

    store.insert_vote(record).await.map_err(|source| {
        error!(
            "CRITICAL: {} marked as voted, but failed to record the vote: {source}",
            record.voter_reg_number
        );
        ElectionError::CriticalInconsistency {
            registration_number: record.voter_reg_number.clone(),
            source,
        }
    })
}
