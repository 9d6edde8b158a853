use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ElectionError {
    #[error("Please provide the {0}.")]
    MissingField(&'static str),

    #[error("Invalid admin credentials")]
    InvalidCredentials,

    #[error("This registration number is not on the official roll.")]
    NotRegistered,

    #[error("The provided identity does not match the official roll.")]
    IdentityMismatch,

    #[error("This student has already cast their vote.")]
    AlreadyVoted,

    #[error("Please select a candidate for every position ({selected} of {required} chosen).")]
    IncompleteBallot { selected: usize, required: usize },

    #[error("{candidate:?} is not a candidate for {position:?}")]
    UnknownCandidate { position: String, candidate: String },

    #[error("Voting has ended.")]
    VotingClosed,

    #[error("Cannot {event} while {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },

    #[error("Database error: {0}")]
    Database(#[from] StoreError),

    #[error(
        "CRITICAL: ballot for {registration_number} is half recorded and needs manual reconciliation: {source}"
    )]
    CriticalInconsistency {
        registration_number: String,
        #[source]
        source: StoreError,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error(transparent)]
    Election(#[from] ElectionError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::Election(error) => match error {
                ElectionError::MissingField(_)
                | ElectionError::IncompleteBallot { .. }
                | ElectionError::UnknownCandidate { .. }
                | ElectionError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
                ElectionError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                ElectionError::NotRegistered
                | ElectionError::IdentityMismatch
                | ElectionError::VotingClosed => StatusCode::FORBIDDEN,
                ElectionError::AlreadyVoted => StatusCode::CONFLICT,
                ElectionError::Database(_) | ElectionError::CriticalInconsistency { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        };

        (status, self.to_string()).into_response()
    }
}
