//! # Booth Session
//!
//! Operator-side flow at a single booth.
//!
//! ```text
//! Unauthenticated --LoggedIn--> AdminAuthenticated --VoterVerified--> VoterVerified
//!        ^                            ^    ^                                |
//!        |                            |    +--------Cancelled---------------+
//!    LoggedOut                        |                                     |
//!   (any admin state)          Submitted / Cancelled                   BallotOpened
//!                                     |                                     v
//!                                     +-------------------------------- Voting
//! ```
//!
//! Submitted and Cancelled are not states of their own, they reset the booth
//! for the next voter. Nothing here is persisted.
use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    ballot::{Ballot, Selection},
    database::Store,
    error::ElectionError,
    models::{Admin, VoteRecord, Voter},
    service::ElectionService,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    AdminAuthenticated {
        admin: Admin,
    },
    VoterVerified {
        admin: Admin,
        voter: Voter,
    },
    Voting {
        admin: Admin,
        voter: Voter,
        selection: Selection,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::AdminAuthenticated { .. } => "admin authenticated",
            SessionState::VoterVerified { .. } => "voter verified",
            SessionState::Voting { .. } => "voting",
        }
    }

    pub fn admin(&self) -> Option<&Admin> {
        match self {
            SessionState::Unauthenticated => None,
            SessionState::AdminAuthenticated { admin }
            | SessionState::VoterVerified { admin, .. }
            | SessionState::Voting { admin, .. } => Some(admin),
        }
    }

    pub fn voter(&self) -> Option<&Voter> {
        match self {
            SessionState::VoterVerified { voter, .. } | SessionState::Voting { voter, .. } => {
                Some(voter)
            }
            _ => None,
        }
    }

    /// Invalid events leave the state untouched.
    pub fn apply(self, event: SessionEvent) -> Result<SessionState, ElectionError> {
        let event_name = event.name();

        match (self, event) {
            (SessionState::Unauthenticated, SessionEvent::LoggedIn(admin)) => {
                Ok(SessionState::AdminAuthenticated { admin })
            }
            (
                SessionState::AdminAuthenticated { .. }
                | SessionState::VoterVerified { .. }
                | SessionState::Voting { .. },
                SessionEvent::LoggedOut,
            ) => Ok(SessionState::Unauthenticated),
            (SessionState::AdminAuthenticated { admin }, SessionEvent::VoterVerified(voter)) => {
                Ok(SessionState::VoterVerified { admin, voter })
            }
            (SessionState::VoterVerified { admin, voter }, SessionEvent::BallotOpened) => {
                Ok(SessionState::Voting {
                    admin,
                    voter,
                    selection: Selection::new(),
                })
            }
            (SessionState::Voting { admin, .. }, SessionEvent::Submitted)
            | (
                SessionState::VoterVerified { admin, .. } | SessionState::Voting { admin, .. },
                SessionEvent::Cancelled,
            ) => Ok(SessionState::AdminAuthenticated { admin }),
            (state, _) => Err(ElectionError::InvalidTransition {
                state: state.name(),
                event: event_name,
            }),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    LoggedIn(Admin),
    LoggedOut,
    VoterVerified(Voter),
    BallotOpened,
    Submitted,
    Cancelled,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::LoggedIn(_) => "log in",
            SessionEvent::LoggedOut => "log out",
            SessionEvent::VoterVerified(_) => "verify a voter",
            SessionEvent::BallotOpened => "open the ballot",
            SessionEvent::Submitted => "submit",
            SessionEvent::Cancelled => "cancel",
        }
    }
}

/// Drives a [`SessionState`] against the election service.
pub struct Booth<S> {
    service: Arc<ElectionService<S>>,
    state: SessionState,
    ballot: Ballot,
    deadline: Option<DateTime<Utc>>,
}

impl<S: Store> Booth<S> {
    pub fn new(service: Arc<ElectionService<S>>) -> Self {
        Self {
            service,
            state: SessionState::Unauthenticated,
            ballot: Ballot::default(),
            deadline: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn ballot(&self) -> &Ballot {
        &self.ballot
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    fn ensure(&self, event: &SessionEvent) -> Result<(), ElectionError> {
        self.state.clone().apply(event.clone()).map(|_| ())
    }

    fn transition(&mut self, event: SessionEvent) -> Result<(), ElectionError> {
        let next = self.state.clone().apply(event)?;
        info!("Booth {} -> {}", self.state, next);
        self.state = next;

        Ok(())
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ElectionError> {
        if self.state != SessionState::Unauthenticated {
            return Err(ElectionError::InvalidTransition {
                state: self.state.name(),
                event: "log in",
            });
        }

        let admin = self.service.login(username, password).await?;
        self.transition(SessionEvent::LoggedIn(admin))
    }

    pub fn logout(&mut self) -> Result<(), ElectionError> {
        self.transition(SessionEvent::LoggedOut)
    }

    pub async fn verify_voter(
        &mut self,
        registration_number: &str,
        identity: &str,
    ) -> Result<(), ElectionError> {
        if !matches!(self.state, SessionState::AdminAuthenticated { .. }) {
            return Err(ElectionError::InvalidTransition {
                state: self.state.name(),
                event: "verify a voter",
            });
        }

        let voter = self
            .service
            .verify_voter(registration_number, identity)
            .await?;
        self.transition(SessionEvent::VoterVerified(voter))
    }

    /// Loads candidates, deadline and live count, then shows the ballot.
    pub async fn open_ballot(&mut self) -> Result<u64, ElectionError> {
        self.ensure(&SessionEvent::BallotOpened)?;

        let booth = self.service.load_booth().await?;
        self.ballot = booth.ballot();
        self.deadline = booth.deadline;
        self.transition(SessionEvent::BallotOpened)?;

        Ok(booth.live_vote_count)
    }

    pub fn select(&mut self, position: &str, candidate: &str) -> Result<(), ElectionError> {
        match &mut self.state {
            SessionState::Voting { selection, .. } => {
                selection.select(&self.ballot, position, candidate)
            }
            state => Err(ElectionError::InvalidTransition {
                state: state.name(),
                event: "select a candidate",
            }),
        }
    }

    pub fn progress(&self) -> f64 {
        match &self.state {
            SessionState::Voting { selection, .. } => selection.progress(&self.ballot),
            _ => 0.0,
        }
    }

    /// On failure the booth stays in `Voting` so the operator can retry.
    pub async fn submit(&mut self) -> Result<VoteRecord, ElectionError> {
        let SessionState::Voting {
            admin,
            voter,
            selection,
        } = &self.state
        else {
            return Err(ElectionError::InvalidTransition {
                state: self.state.name(),
                event: "submit",
            });
        };

        let record = self
            .service
            .submit_vote(
                &self.ballot,
                selection.votes().clone(),
                &voter.registration_number,
                admin,
                self.deadline,
            )
            .await?;

        self.transition(SessionEvent::Submitted)?;

        Ok(record)
    }

    pub fn cancel(&mut self) -> Result<(), ElectionError> {
        self.transition(SessionEvent::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Admin {
        Admin {
            username: "chief".to_string(),
        }
    }

    fn voter() -> Voter {
        Voter::new("REG-1".to_string(), "Ada Lovelace".to_string())
    }

    #[test]
    fn test_full_cycle() {
        let state = SessionState::default()
            .apply(SessionEvent::LoggedIn(admin()))
            .unwrap()
            .apply(SessionEvent::VoterVerified(voter()))
            .unwrap()
            .apply(SessionEvent::BallotOpened)
            .unwrap();

        assert_eq!(state.name(), "voting");
        assert_eq!(state.voter(), Some(&voter()));

        let state = state.apply(SessionEvent::Submitted).unwrap();
        assert_eq!(state, SessionState::AdminAuthenticated { admin: admin() });
    }

    #[test]
    fn test_cancel_returns_to_admin() {
        let verified = SessionState::VoterVerified {
            admin: admin(),
            voter: voter(),
        };

        assert_eq!(
            verified.clone().apply(SessionEvent::Cancelled).unwrap(),
            SessionState::AdminAuthenticated { admin: admin() }
        );

        let voting = verified.apply(SessionEvent::BallotOpened).unwrap();
        assert_eq!(
            voting.apply(SessionEvent::Cancelled).unwrap(),
            SessionState::AdminAuthenticated { admin: admin() }
        );
    }

    #[test]
    fn test_logout_from_any_admin_state() {
        let states = [
            SessionState::AdminAuthenticated { admin: admin() },
            SessionState::VoterVerified {
                admin: admin(),
                voter: voter(),
            },
            SessionState::Voting {
                admin: admin(),
                voter: voter(),
                selection: Selection::new(),
            },
        ];

        for state in states {
            assert_eq!(
                state.apply(SessionEvent::LoggedOut).unwrap(),
                SessionState::Unauthenticated
            );
        }
    }

    #[test]
    fn test_invalid_transitions() {
        let error = SessionState::Unauthenticated
            .apply(SessionEvent::VoterVerified(voter()))
            .unwrap_err();
        assert!(matches!(
            error,
            ElectionError::InvalidTransition {
                state: "unauthenticated",
                event: "verify a voter"
            }
        ));

        let admin_state = SessionState::AdminAuthenticated { admin: admin() };
        assert!(admin_state.clone().apply(SessionEvent::Submitted).is_err());
        assert!(admin_state.clone().apply(SessionEvent::BallotOpened).is_err());
        assert!(admin_state.apply(SessionEvent::LoggedIn(admin())).is_err());
        assert!(
            SessionState::Unauthenticated
                .apply(SessionEvent::LoggedOut)
                .is_err()
        );
    }
}
