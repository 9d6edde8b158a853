//! # Redis
//!
//! Production store.
//!
//! ## Implementation
//!
//! - Hashes for keyed sets: `directors`, `registrations`, `voters`, `settings`
//! - Lists for ordered sets: `candidates`, `physical_votes`, `votes`
//! - Records are JSON strings, field names as in [`crate::models`]
//! - `has_voted` lives in its own `voted` hash so the false to true flip is a
//!   single `HSETNX`, Redis queues commands so exactly one caller sees `1`
//! - Voters are never deleted, so checking existence before the flip does not
//!   open a window
use std::time::Duration;

use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::info;

use super::{
    CANDIDATES, Claim, DIRECTORS, REGISTRATIONS, SETTINGS, Store, VOTED, VOTERS, votes_table,
};
use crate::{
    error::StoreError,
    models::{Candidate, Channel, Director, Registration, VoteRecord, Voter},
};

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    info!("Connected to Redis");

    Ok(connection_manager)
}

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        Ok(Self::new(init_redis(redis_url).await?))
    }

    async fn hget_json<T: DeserializeOwned>(
        &self,
        key: &str,
        field: &str,
    ) -> Result<Option<T>, StoreError> {
        let mut connection = self.connection.clone();
        let raw: Option<String> = connection.hget(key, field).await?;

        Ok(raw.map(|raw| serde_json::from_str(&raw)).transpose()?)
    }

    async fn hset_json<T: Serialize>(
        &self,
        key: &str,
        field: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: () = connection
            .hset(key, field, serde_json::to_string(value)?)
            .await?;

        Ok(())
    }

    async fn list_json<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        let mut connection = self.connection.clone();
        let raw: Vec<String> = connection.lrange(key, 0, -1).await?;

        raw.iter()
            .map(|entry| serde_json::from_str(entry).map_err(StoreError::from))
            .collect()
    }

    async fn push_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: () = connection.rpush(key, serde_json::to_string(value)?).await?;

        Ok(())
    }

    async fn voter_exists(&self, registration_number: &str) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();

        Ok(connection.hexists(VOTERS, registration_number).await?)
    }
}

impl Store for RedisStore {
    async fn find_director(&self, username: &str) -> Result<Option<Director>, StoreError> {
        self.hget_json(DIRECTORS, username).await
    }

    async fn find_registration(
        &self,
        registration_number: &str,
    ) -> Result<Option<Registration>, StoreError> {
        self.hget_json(REGISTRATIONS, registration_number).await
    }

    async fn find_voter(&self, registration_number: &str) -> Result<Option<Voter>, StoreError> {
        let Some(mut voter) = self
            .hget_json::<Voter>(VOTERS, registration_number)
            .await?
        else {
            return Ok(None);
        };

        let mut connection = self.connection.clone();
        voter.has_voted = connection.hexists(VOTED, registration_number).await?;

        Ok(Some(voter))
    }

    async fn insert_voter_if_absent(&self, voter: &Voter) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();
        let created: bool = connection
            .hset_nx(
                VOTERS,
                &voter.registration_number,
                serde_json::to_string(voter)?,
            )
            .await?;

        if created && voter.has_voted {
            let _: () = connection.hset(VOTED, &voter.registration_number, 1).await?;
        }

        Ok(created)
    }

    async fn mark_voted(&self, registration_number: &str) -> Result<bool, StoreError> {
        if !self.voter_exists(registration_number).await? {
            return Ok(false);
        }

        let mut connection = self.connection.clone();
        let _: () = connection.hset(VOTED, registration_number, 1).await?;

        Ok(true)
    }

    async fn claim_voter(&self, registration_number: &str) -> Result<Claim, StoreError> {
        if !self.voter_exists(registration_number).await? {
            return Ok(Claim::Missing);
        }

        let mut connection = self.connection.clone();
        let claimed: bool = connection.hset_nx(VOTED, registration_number, 1).await?;

        Ok(if claimed {
            Claim::Claimed
        } else {
            Claim::AlreadyVoted
        })
    }

    async fn insert_vote(&self, record: &VoteRecord) -> Result<(), StoreError> {
        self.push_json(votes_table(record.vote_type), record).await
    }

    async fn candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        self.list_json(CANDIDATES).await
    }

    async fn votes(&self, channel: Channel) -> Result<Vec<VoteRecord>, StoreError> {
        self.list_json(votes_table(channel)).await
    }

    async fn count_votes(&self, channel: Channel) -> Result<u64, StoreError> {
        let mut connection = self.connection.clone();

        Ok(connection.llen(votes_table(channel)).await?)
    }

    async fn setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut connection = self.connection.clone();

        Ok(connection.hget(SETTINGS, key).await?)
    }

    async fn put_director(&self, director: &Director) -> Result<(), StoreError> {
        self.hset_json(DIRECTORS, &director.username, director).await
    }

    async fn put_registration(&self, registration: &Registration) -> Result<(), StoreError> {
        self.hset_json(
            REGISTRATIONS,
            &registration.registration_number,
            registration,
        )
        .await
    }

    async fn put_candidate(&self, candidate: &Candidate) -> Result<(), StoreError> {
        self.push_json(CANDIDATES, candidate).await
    }

    async fn put_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: () = connection.hset(SETTINGS, key, value).await?;

        Ok(())
    }
}
