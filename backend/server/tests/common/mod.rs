#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use ballot::{
    database::{Claim, MemoryStore, Store},
    error::StoreError,
    models::{Admin, Candidate, Channel, Director, Registration, VotePayload, VoteRecord, Voter},
    service::{ElectionService, Policy},
    submission::SubmissionGuard,
};

pub const DIRECTOR: &str = "chief";
pub const PASSWORD: &str = "hunter2";

pub fn admin() -> Admin {
    Admin {
        username: DIRECTOR.to_string(),
    }
}

pub fn candidate(id: u32, name: &str, position: &str) -> Candidate {
    Candidate {
        id,
        name: name.to_string(),
        position: position.to_string(),
        photo_url: format!("https://example.org/{id}.png"),
    }
}

pub fn payload(choices: &[(&str, &str)]) -> VotePayload {
    choices
        .iter()
        .map(|(position, name)| (position.to_string(), name.to_string()))
        .collect()
}

pub fn full_ballot() -> VotePayload {
    payload(&[("President", "Grace Hopper"), ("Treasurer", "Linus Torvalds")])
}

pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();

    store
        .put_director(&Director {
            username: DIRECTOR.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();

    for (number, name) in [
        ("CS/21/001", "Ada Lovelace"),
        ("CS/21/002", "Alan Turing"),
        ("CS/21/003", "Barbara Liskov"),
    ] {
        store
            .put_registration(&Registration {
                registration_number: number.to_string(),
                student_name: name.to_string(),
            })
            .await
            .unwrap();
    }

    for candidate in [
        candidate(3, "Linus Torvalds", "Treasurer"),
        candidate(1, "Grace Hopper", "President"),
        candidate(2, "Dennis Ritchie", "President"),
    ] {
        store.put_candidate(&candidate).await.unwrap();
    }

    store
}

pub fn service<S: Store>(store: S, guard: SubmissionGuard) -> ElectionService<S> {
    ElectionService::new(
        store,
        Policy {
            guard,
            verify_identity: true,
        },
    )
}

pub async fn vote_count(store: &impl Store) -> u64 {
    store.count_votes(Channel::Physical).await.unwrap()
        + store.count_votes(Channel::Online).await.unwrap()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    FindDirector,
    FindRegistration,
    FindVoter,
    InsertVoter,
    MarkVoted,
    ClaimVoter,
    InsertVote,
    Candidates,
    Votes,
    CountVotes,
    Setting,
    Put,
}

/// Counts every call and fails the operations it is told to.
#[derive(Clone, Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    calls: Arc<AtomicUsize>,
    failing: Arc<Mutex<HashSet<Op>>>,
    lose_voter_insert: Arc<AtomicBool>,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    /// Voter inserts report a conflict without writing anything.
    pub fn lose_voter_insert(&self) {
        self.lose_voter_insert.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, op: Op) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(&op) {
            return Err(StoreError::Unavailable(format!("{op:?} failed")));
        }

        Ok(())
    }
}

impl Store for FaultyStore {
    async fn find_director(&self, username: &str) -> Result<Option<Director>, StoreError> {
        self.check(Op::FindDirector)?;
        self.inner.find_director(username).await
    }

    async fn find_registration(
        &self,
        registration_number: &str,
    ) -> Result<Option<Registration>, StoreError> {
        self.check(Op::FindRegistration)?;
        self.inner.find_registration(registration_number).await
    }

    async fn find_voter(&self, registration_number: &str) -> Result<Option<Voter>, StoreError> {
        self.check(Op::FindVoter)?;
        self.inner.find_voter(registration_number).await
    }

    async fn insert_voter_if_absent(&self, voter: &Voter) -> Result<bool, StoreError> {
        self.check(Op::InsertVoter)?;

        if self.lose_voter_insert.load(Ordering::SeqCst) {
            return Ok(false);
        }

        self.inner.insert_voter_if_absent(voter).await
    }

    async fn mark_voted(&self, registration_number: &str) -> Result<bool, StoreError> {
        self.check(Op::MarkVoted)?;
        self.inner.mark_voted(registration_number).await
    }

    async fn claim_voter(&self, registration_number: &str) -> Result<Claim, StoreError> {
        self.check(Op::ClaimVoter)?;
        self.inner.claim_voter(registration_number).await
    }

    async fn insert_vote(&self, record: &VoteRecord) -> Result<(), StoreError> {
        self.check(Op::InsertVote)?;
        self.inner.insert_vote(record).await
    }

    async fn candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        self.check(Op::Candidates)?;
        self.inner.candidates().await
    }

    async fn votes(&self, channel: Channel) -> Result<Vec<VoteRecord>, StoreError> {
        self.check(Op::Votes)?;
        self.inner.votes(channel).await
    }

    async fn count_votes(&self, channel: Channel) -> Result<u64, StoreError> {
        self.check(Op::CountVotes)?;
        self.inner.count_votes(channel).await
    }

    async fn setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check(Op::Setting)?;
        self.inner.setting(key).await
    }

    async fn put_director(&self, director: &Director) -> Result<(), StoreError> {
        self.check(Op::Put)?;
        self.inner.put_director(director).await
    }

    async fn put_registration(&self, registration: &Registration) -> Result<(), StoreError> {
        self.check(Op::Put)?;
        self.inner.put_registration(registration).await
    }

    async fn put_candidate(&self, candidate: &Candidate) -> Result<(), StoreError> {
        self.check(Op::Put)?;
        self.inner.put_candidate(candidate).await
    }

    async fn put_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check(Op::Put)?;
        self.inner.put_setting(key, value).await
    }
}
