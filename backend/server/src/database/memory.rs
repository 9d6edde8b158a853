//! In-process store for tests and local runs. Same semantics as Redis, with a
//! single lock standing in for Redis' command queue.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use super::{Claim, Store};
use crate::{
    error::StoreError,
    models::{Candidate, Channel, Director, Registration, VoteRecord, Voter},
};

#[derive(Default)]
struct Tables {
    directors: HashMap<String, Director>,
    registrations: HashMap<String, Registration>,
    voters: HashMap<String, Voter>,
    candidates: Vec<Candidate>,
    votes: HashMap<Channel, Vec<VoteRecord>>,
    settings: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl Store for MemoryStore {
    async fn find_director(&self, username: &str) -> Result<Option<Director>, StoreError> {
        Ok(self.tables()?.directors.get(username).cloned())
    }

    async fn find_registration(
        &self,
        registration_number: &str,
    ) -> Result<Option<Registration>, StoreError> {
        Ok(self
            .tables()?
            .registrations
            .get(registration_number)
            .cloned())
    }

    async fn find_voter(&self, registration_number: &str) -> Result<Option<Voter>, StoreError> {
        Ok(self.tables()?.voters.get(registration_number).cloned())
    }

    async fn insert_voter_if_absent(&self, voter: &Voter) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;

        if tables.voters.contains_key(&voter.registration_number) {
            return Ok(false);
        }

        tables
            .voters
            .insert(voter.registration_number.clone(), voter.clone());

        Ok(true)
    }

    async fn mark_voted(&self, registration_number: &str) -> Result<bool, StoreError> {
        Ok(match self.tables()?.voters.get_mut(registration_number) {
            Some(voter) => {
                voter.has_voted = true;
                true
            }
            None => false,
        })
    }

    async fn claim_voter(&self, registration_number: &str) -> Result<Claim, StoreError> {
        Ok(match self.tables()?.voters.get_mut(registration_number) {
            None => Claim::Missing,
            Some(voter) if voter.has_voted => Claim::AlreadyVoted,
            Some(voter) => {
                voter.has_voted = true;
                Claim::Claimed
            }
        })
    }

    async fn insert_vote(&self, record: &VoteRecord) -> Result<(), StoreError> {
        self.tables()?
            .votes
            .entry(record.vote_type)
            .or_default()
            .push(record.clone());

        Ok(())
    }

    async fn candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.tables()?.candidates.clone())
    }

    async fn votes(&self, channel: Channel) -> Result<Vec<VoteRecord>, StoreError> {
        Ok(self
            .tables()?
            .votes
            .get(&channel)
            .cloned()
            .unwrap_or_default())
    }

    async fn count_votes(&self, channel: Channel) -> Result<u64, StoreError> {
        Ok(self.tables()?.votes.get(&channel).map_or(0, Vec::len) as u64)
    }

    async fn setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.tables()?.settings.get(key).cloned())
    }

    async fn put_director(&self, director: &Director) -> Result<(), StoreError> {
        self.tables()?
            .directors
            .insert(director.username.clone(), director.clone());

        Ok(())
    }

    async fn put_registration(&self, registration: &Registration) -> Result<(), StoreError> {
        self.tables()?.registrations.insert(
            registration.registration_number.clone(),
            registration.clone(),
        );

        Ok(())
    }

    async fn put_candidate(&self, candidate: &Candidate) -> Result<(), StoreError> {
        self.tables()?.candidates.push(candidate.clone());

        Ok(())
    }

    async fn put_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.tables()?
            .settings
            .insert(key.to_string(), value.to_string());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voter(number: &str) -> Voter {
        Voter::new(number.to_string(), "Grace Hopper".to_string())
    }

    #[tokio::test]
    async fn test_insert_voter_if_absent_keeps_first() {
        let store = MemoryStore::new();

        assert!(store.insert_voter_if_absent(&voter("REG-1")).await.unwrap());

        let mut again = voter("REG-1");
        again.full_name = "Someone Else".to_string();
        assert!(!store.insert_voter_if_absent(&again).await.unwrap());

        let stored = store.find_voter("REG-1").await.unwrap().unwrap();
        assert_eq!(stored.full_name, "Grace Hopper");
    }

    #[tokio::test]
    async fn test_claim_voter_once() {
        let store = MemoryStore::new();
        store.insert_voter_if_absent(&voter("REG-1")).await.unwrap();

        assert_eq!(store.claim_voter("REG-1").await.unwrap(), Claim::Claimed);
        assert_eq!(
            store.claim_voter("REG-1").await.unwrap(),
            Claim::AlreadyVoted
        );
        assert_eq!(store.claim_voter("REG-2").await.unwrap(), Claim::Missing);
    }

    #[tokio::test]
    async fn test_mark_voted_unknown_voter() {
        let store = MemoryStore::new();

        assert!(!store.mark_voted("REG-404").await.unwrap());
    }
}
