use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    ballot::Ballot,
    database::Store,
    error::AppError,
    models::{Admin, VotePayload, VoteRecord, Voter},
    results::ResultsStats,
    service::BoothData,
    state::AppState,
};

type AppResult<T> = Result<T, AppError>;

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    registration_number: String,
    identity: String,
}

#[derive(Deserialize)]
pub struct VoteRequest {
    registration_number: String,
    operator: String,
    votes: VotePayload,
}

fn payload<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(payload)| payload)
        .map_err(|_| AppError::MalformedPayload)
}

pub async fn health_handler() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn login_handler<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<Admin>> {
    let request = payload(request)?;
    let admin = state
        .service
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(admin))
}

pub async fn verify_handler<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    request: Result<Json<VerifyRequest>, JsonRejection>,
) -> AppResult<Json<Voter>> {
    let request = payload(request)?;
    let voter = state
        .service
        .verify_voter(&request.registration_number, &request.identity)
        .await?;

    Ok(Json(voter))
}

pub async fn booth_handler<S: Store>(
    State(state): State<Arc<AppState<S>>>,
) -> AppResult<Json<BoothData>> {
    Ok(Json(state.service.load_booth().await?))
}

pub async fn votes_handler<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    request: Result<Json<VoteRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<VoteRecord>)> {
    let request = payload(request)?;
    let operator = state.service.operator(&request.operator).await?;

    let (candidates, deadline) =
        tokio::join!(state.service.candidates(), state.service.deadline());
    let ballot = Ballot::from_candidates(candidates?);

    let record = state
        .service
        .submit_vote(
            &ballot,
            request.votes,
            &request.registration_number,
            &operator,
            deadline,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn results_handler<S: Store>(
    State(state): State<Arc<AppState<S>>>,
) -> AppResult<Json<ResultsStats>> {
    if let Some(stats) = state.poller.latest() {
        return Ok(Json(stats));
    }

    Ok(Json(state.service.results().await?))
}
