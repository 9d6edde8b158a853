//! # Voter Verification
//!
//! Roll lookup, identity check, then create-or-resume of the voter record.
//! Registration numbers are normalized before every lookup and write.
use tracing::{info, warn};

use crate::{
    database::Store,
    error::{ElectionError, StoreError},
    models::Voter,
    utils::{identities_match, normalize_reg_number},
};

pub async fn verify_voter<S: Store>(
    store: &S,
    registration_number: &str,
    identity: &str,
    check_identity: bool,
) -> Result<Voter, ElectionError> {
    let registration_number = normalize_reg_number(registration_number);

    if registration_number.is_empty() {
        return Err(ElectionError::MissingField("registration number"));
    }
    if identity.trim().is_empty() {
        return Err(ElectionError::MissingField("student name"));
    }

    let Some(registration) = store.find_registration(&registration_number).await? else {
        warn!("{registration_number} is not on the roll");
        return Err(ElectionError::NotRegistered);
    };

    if check_identity && !identities_match(identity, &registration.student_name) {
        warn!("Identity mismatch for {registration_number}");
        return Err(ElectionError::IdentityMismatch);
    }

    if let Some(voter) = store.find_voter(&registration_number).await? {
        if voter.has_voted {
            warn!("{registration_number} has already voted");
            return Err(ElectionError::AlreadyVoted);
        }

        info!("Resuming session for {registration_number}");
        return Ok(voter);
    }

    let voter = Voter::new(registration_number, registration.student_name);

    if store.insert_voter_if_absent(&voter).await? {
        info!("Registered voter {}", voter.registration_number);
        return Ok(voter);
    }

    // Lost the insert to a concurrent verification, use whatever landed.
    match store.find_voter(&voter.registration_number).await? {
        Some(existing) if existing.has_voted => Err(ElectionError::AlreadyVoted),
        Some(existing) => Ok(existing),
        None => {
            warn!(
                "Voter insert for {} conflicted but no record is readable",
                voter.registration_number
            );
            Err(StoreError::Unavailable(format!(
                "voter {} neither inserted nor found",
                voter.registration_number
            ))
            .into())
        }
    }
}
