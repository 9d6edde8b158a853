//! # Records
//!
//! Shapes of the rows held by the backend store. Field names match what the
//! store already holds, so a few of them keep their camelCase spelling on the
//! wire.

use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Position name to chosen candidate name, e.g. `{ "President": "Jane Doe" }`.
pub type VotePayload = HashMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Director {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub username: String,
}

/// Entry of the official registration roll. Never written by the booth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub registration_number: String,
    pub student_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub registration_number: String,
    pub full_name: String,
    pub has_voted: bool,
}

impl Voter {
    pub fn new(registration_number: String, full_name: String) -> Self {
        Self {
            registration_number,
            full_name,
            has_voted: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: u32,
    pub name: String,
    pub position: String,
    #[serde(default)]
    pub photo_url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Physical,
    Online,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Physical, Channel::Online];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Physical => "physical",
            Channel::Online => "online",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "physical" => Ok(Channel::Physical),
            "online" => Ok(Channel::Online),
            other => Err(format!("unknown vote channel {other:?}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub votes: VotePayload,
    pub voter_reg_number: String,
    #[serde(rename = "adminOperator")]
    pub admin_operator: String,
    #[serde(rename = "voteType")]
    pub vote_type: Channel,
}
