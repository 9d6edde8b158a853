//! # Backend Store
//!
//! Query primitives the booth issues against the backend. Every election
//! operation is a short sequence of these calls, so the trait stays close to
//! the record sets rather than to the operations built on top of them.
//!
//! ## Record Sets
//!
//! - `directors`: admin accounts, keyed by username
//! - `registrations`: official roll, keyed by registration number
//! - `voters`: booth-side voter tracking, keyed by registration number
//! - `candidates`: static ballot entries
//! - `physical_votes` / `votes`: append-only vote records per channel
//! - `settings`: key-value election settings such as the deadline
//!
//! ## Atomicity
//!
//! Only single-record primitives are atomic. `insert_voter_if_absent` and
//! `claim_voter` are the two conditional writes; nothing spans records.
use std::future::Future;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::{RedisStore, init_redis};

use crate::{
    error::StoreError,
    models::{Candidate, Channel, Director, Registration, VoteRecord, Voter},
};

pub const DIRECTORS: &str = "directors";
pub const REGISTRATIONS: &str = "registrations";
pub const VOTERS: &str = "voters";
pub const VOTED: &str = "voted";
pub const CANDIDATES: &str = "candidates";
pub const PHYSICAL_VOTES: &str = "physical_votes";
pub const ONLINE_VOTES: &str = "votes";
pub const SETTINGS: &str = "settings";

pub const DEADLINE_KEY: &str = "voting_deadline";

pub fn votes_table(channel: Channel) -> &'static str {
    match channel {
        Channel::Physical => PHYSICAL_VOTES,
        Channel::Online => ONLINE_VOTES,
    }
}

/// Outcome of the conditional `has_voted` false to true write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Claim {
    Claimed,
    AlreadyVoted,
    Missing,
}

pub trait Store: Send + Sync + 'static {
    fn find_director(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<Director>, StoreError>> + Send;

    fn find_registration(
        &self,
        registration_number: &str,
    ) -> impl Future<Output = Result<Option<Registration>, StoreError>> + Send;

    fn find_voter(
        &self,
        registration_number: &str,
    ) -> impl Future<Output = Result<Option<Voter>, StoreError>> + Send;

    /// Returns `false` when a voter with the same number already exists.
    fn insert_voter_if_absent(
        &self,
        voter: &Voter,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Unconditional `has_voted = true`. Returns whether a voter matched.
    fn mark_voted(
        &self,
        registration_number: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Atomic `has_voted` false to true. Exactly one concurrent caller wins.
    fn claim_voter(
        &self,
        registration_number: &str,
    ) -> impl Future<Output = Result<Claim, StoreError>> + Send;

    fn insert_vote(&self, record: &VoteRecord)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    fn candidates(&self) -> impl Future<Output = Result<Vec<Candidate>, StoreError>> + Send;

    fn votes(
        &self,
        channel: Channel,
    ) -> impl Future<Output = Result<Vec<VoteRecord>, StoreError>> + Send;

    fn count_votes(&self, channel: Channel)
    -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn setting(&self, key: &str)
    -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    fn put_director(
        &self,
        director: &Director,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn put_registration(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn put_candidate(
        &self,
        candidate: &Candidate,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn put_setting(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
